use std::fmt;

use url::Url;

/// Address-space prefix for private supergroup/channel containers.
///
/// A `t.me/c/<digits>/<msg>` link carries the bare internal id; the remote
/// side addresses the same container as `-100<digits>`.
pub const PRIVATE_CONTAINER_PREFIX: &str = "-100";

/// Hosts recognized as message-link origins.
const LINK_HOSTS: &[&str] = &["t.me", "telegram.me", "telegram.dog"];

/// Path segment reserved for private-container links.
const PRIVATE_SEGMENT: &str = "c";

/// A container addressed by a message link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    /// Private container, already offset into the `-100…` address space.
    Numeric(i64),
    /// Public container addressed by handle. Case is preserved.
    Named(String),
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Named(handle) => write!(f, "@{handle}"),
        }
    }
}

/// A fully resolved (container, item) address.
///
/// Produced only by [`resolve`]; `item_id` is always strictly positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAddress {
    pub container: ContainerRef,
    pub item_id: i64,
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.container {
            ContainerRef::Numeric(id) => {
                let digits = id.to_string();
                let bare = digits
                    .strip_prefix(PRIVATE_CONTAINER_PREFIX)
                    .unwrap_or(&digits);
                write!(f, "https://t.me/c/{bare}/{}", self.item_id)
            },
            ContainerRef::Named(handle) => write!(f, "https://t.me/{handle}/{}", self.item_id),
        }
    }
}

/// Parse a candidate message link into a [`LinkAddress`].
///
/// Two shapes are accepted:
/// - `.../c/<digits>/<digits>`: private container plus item id
/// - `.../<handle>/<digits>`: public container plus item id
///
/// Returns `None` for anything else, including digit groups that overflow
/// or item ids that are not strictly positive. `None` means "not a link",
/// never an error.
pub fn resolve(raw: &str) -> Option<LinkAddress> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let url = parse_lenient(trimmed)?;
    match url.scheme() {
        "http" | "https" => {},
        _ => return None,
    }

    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if !LINK_HOSTS.contains(&host) {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [PRIVATE_SEGMENT, container, item] => {
            let container = parse_private_container(container)?;
            let item_id = parse_item_id(item)?;
            Some(LinkAddress {
                container: ContainerRef::Numeric(container),
                item_id,
            })
        },
        [handle, item] => {
            if !is_valid_handle(handle) {
                return None;
            }
            let item_id = parse_item_id(item)?;
            Some(LinkAddress {
                container: ContainerRef::Named((*handle).to_string()),
                item_id,
            })
        },
        _ => None,
    }
}

/// Parse with an implied `https://` when the scheme is missing.
fn parse_lenient(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{raw}")).ok()
        },
        Err(_) => None,
    }
}

/// Offset a bare private-container digit string into the `-100…` space.
/// Overflow fails closed.
fn parse_private_container(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    format!("{PRIVATE_CONTAINER_PREFIX}{digits}").parse().ok()
}

fn parse_item_id(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|id| *id > 0)
}

/// Handles are `[A-Za-z0-9_]+` and must not collide with the reserved
/// private-container segment.
fn is_valid_handle(handle: &str) -> bool {
    handle != PRIVATE_SEGMENT
        && !handle.is_empty()
        && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn private_link_offsets_container() {
        let addr = resolve("https://t.me/c/123456789/10").unwrap();
        assert_eq!(addr.container, ContainerRef::Numeric(-100123456789));
        assert_eq!(addr.item_id, 10);
    }

    #[test]
    fn public_link_keeps_handle() {
        let addr = resolve("https://t.me/some_channel/42").unwrap();
        assert_eq!(addr.container, ContainerRef::Named("some_channel".into()));
        assert_eq!(addr.item_id, 42);
    }

    #[rstest]
    #[case("t.me/c/777/3")]
    #[case("  https://t.me/c/777/3  ")]
    #[case("HTTPS://T.ME/c/777/3")]
    #[case("https://www.t.me/c/777/3")]
    #[case("https://telegram.me/c/777/3")]
    #[case("https://t.me/c/777/3?single")]
    #[case("https://t.me/c/777/3/")]
    fn lenient_shapes_resolve(#[case] raw: &str) {
        let addr = resolve(raw).unwrap();
        assert_eq!(addr.container, ContainerRef::Numeric(-100777));
        assert_eq!(addr.item_id, 3);
    }

    #[rstest]
    #[case("hello there")]
    #[case("")]
    #[case("https://example.com/c/1/2")]
    #[case("https://t.me/c/1")]
    #[case("https://t.me/c/1/2/3")]
    #[case("https://t.me/c/abc/2")]
    #[case("https://t.me/c/1/abc")]
    #[case("https://t.me/bad-handle/2")]
    #[case("https://t.me/c/1/0")]
    #[case("ftp://t.me/c/1/2")]
    #[case("https://t.me/handle")]
    fn non_links_resolve_to_none(#[case] raw: &str) {
        assert_eq!(resolve(raw), None);
    }

    #[test]
    fn overflow_fails_closed() {
        // Digit group too large for i64 once prefixed.
        assert_eq!(resolve("https://t.me/c/99999999999999999999/1"), None);
        assert_eq!(resolve("https://t.me/chan/99999999999999999999"), None);
    }

    #[test]
    fn handle_case_is_preserved() {
        let addr = resolve("https://t.me/MyChannel/5").unwrap();
        assert_eq!(addr.container, ContainerRef::Named("MyChannel".into()));
    }

    #[test]
    fn reserved_segment_is_not_a_handle() {
        // `/c/<digits>` alone looks like handle+item but `c` is reserved.
        assert_eq!(resolve("https://t.me/c/123"), None);
    }

    #[test]
    fn roundtrip_through_display() {
        for raw in ["https://t.me/c/123456789/10", "https://t.me/channel/7"] {
            let addr = resolve(raw).unwrap();
            let again = resolve(&addr.to_string()).unwrap();
            assert_eq!(addr, again);
        }
    }
}

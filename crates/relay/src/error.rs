use crate::session::SessionError;

/// Longest remote error text allowed into a user-facing reply.
pub const REMOTE_MESSAGE_PREVIEW_CHARS: usize = 300;

/// User-facing outcome classes for a relay invocation.
///
/// The set is closed: every failure the pipeline can observe lands in
/// exactly one of these, and classification stays stable even where the
/// reply wording changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input did not parse as a message link. A non-error: silent unless
    /// the pipeline was invoked in link-required mode.
    NotALink,
    /// Address parsed but no item exists there.
    NotFound,
    /// Item exists but has no downloadable payload.
    NoMedia,
    /// The reading identity lacks visibility or membership.
    AccessDenied,
    /// The reading identity is banned from the container.
    Banned,
    /// Retry budget exhausted under sustained rate limiting.
    RateLimited,
    /// The download capability expired twice in a row.
    StaleReference,
    /// Unclassified remote failure; message already truncated.
    RemoteUnknown { message: String },
    /// No configured identity can read the requested container.
    ConfigurationError,
}

impl ErrorKind {
    /// Total mapping from session errors; anything unrecognized becomes
    /// [`ErrorKind::RemoteUnknown`] rather than a raw internal type.
    pub fn classify(err: SessionError) -> Self {
        match err {
            SessionError::RateLimited { .. } => Self::RateLimited,
            SessionError::StaleReference => Self::StaleReference,
            SessionError::UnknownContainer => Self::NotFound,
            SessionError::AccessDenied => Self::AccessDenied,
            SessionError::Banned => Self::Banned,
            SessionError::Remote { message } => Self::remote_unknown(message),
        }
    }

    /// Wrap an arbitrary failure text, truncated for chat output.
    pub fn remote_unknown(message: impl AsRef<str>) -> Self {
        Self::RemoteUnknown {
            message: truncate_chars(message.as_ref(), REMOTE_MESSAGE_PREVIEW_CHARS),
        }
    }

    /// The single reply text shown to the requester.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotALink => {
                "Send a message link, e.g. https://t.me/c/123456789/10 or https://t.me/channel/42."
                    .to_string()
            },
            Self::NotFound => "No message exists at that link.".to_string(),
            Self::NoMedia => "That message has no downloadable media.".to_string(),
            Self::AccessDenied => {
                "I can't see that chat. The reading account must be a member.".to_string()
            },
            Self::Banned => "The reading account is banned from that chat.".to_string(),
            Self::RateLimited => {
                "Telegram is rate limiting the relay. Try again in a little while.".to_string()
            },
            Self::StaleReference => {
                "The download reference kept expiring. Try the link again.".to_string()
            },
            Self::RemoteUnknown { message } => format!("Telegram error: {message}"),
            Self::ConfigurationError => {
                "No configured account can read that chat.".to_string()
            },
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotALink => f.write_str("not_a_link"),
            Self::NotFound => f.write_str("not_found"),
            Self::NoMedia => f.write_str("no_media"),
            Self::AccessDenied => f.write_str("access_denied"),
            Self::Banned => f.write_str("banned"),
            Self::RateLimited => f.write_str("rate_limited"),
            Self::StaleReference => f.write_str("stale_reference"),
            Self::RemoteUnknown { .. } => f.write_str("remote_unknown"),
            Self::ConfigurationError => f.write_str("configuration_error"),
        }
    }
}

/// Char-boundary-safe truncation with an ellipsis marker.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::time::Duration};

    #[test]
    fn classification_is_total_and_stable() {
        assert_eq!(
            ErrorKind::classify(SessionError::RateLimited {
                wait: Duration::from_secs(9),
            }),
            ErrorKind::RateLimited
        );
        assert_eq!(
            ErrorKind::classify(SessionError::StaleReference),
            ErrorKind::StaleReference
        );
        assert_eq!(
            ErrorKind::classify(SessionError::UnknownContainer),
            ErrorKind::NotFound
        );
        assert_eq!(
            ErrorKind::classify(SessionError::AccessDenied),
            ErrorKind::AccessDenied
        );
        assert_eq!(ErrorKind::classify(SessionError::Banned), ErrorKind::Banned);
        assert!(matches!(
            ErrorKind::classify(SessionError::remote("boom")),
            ErrorKind::RemoteUnknown { .. }
        ));
    }

    #[test]
    fn oversized_remote_text_is_truncated() {
        let long = "x".repeat(REMOTE_MESSAGE_PREVIEW_CHARS * 2);
        let ErrorKind::RemoteUnknown { message } =
            ErrorKind::classify(SessionError::remote(long))
        else {
            panic!("expected RemoteUnknown");
        };
        assert_eq!(message.chars().count(), REMOTE_MESSAGE_PREVIEW_CHARS + 1);
        assert!(message.ends_with('…'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "🙂".repeat(REMOTE_MESSAGE_PREVIEW_CHARS + 5);
        let ErrorKind::RemoteUnknown { message } = ErrorKind::remote_unknown(&text) else {
            panic!("expected RemoteUnknown");
        };
        assert_eq!(message.chars().count(), REMOTE_MESSAGE_PREVIEW_CHARS + 1);
    }

    #[test]
    fn every_kind_has_a_reply() {
        let kinds = [
            ErrorKind::NotALink,
            ErrorKind::NotFound,
            ErrorKind::NoMedia,
            ErrorKind::AccessDenied,
            ErrorKind::Banned,
            ErrorKind::RateLimited,
            ErrorKind::StaleReference,
            ErrorKind::remote_unknown("details"),
            ErrorKind::ConfigurationError,
        ];
        for kind in kinds {
            assert!(!kind.user_message().is_empty());
        }
    }
}

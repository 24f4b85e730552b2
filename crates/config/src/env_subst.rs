/// Replace `${ENV_VAR}` placeholders in config string values.
///
/// Unresolvable variables are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Replace `${ENV_VAR}` placeholders using a custom lookup function.
///
/// This is the implementation used by [`substitute_env`]; the separate
/// signature makes it testable without mutating the process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after_marker = &rest[start + 2..];

        let Some(end) = after_marker.find('}') else {
            // Unclosed placeholder, emit the tail verbatim.
            result.push_str(&rest[start..]);
            return result;
        };

        let name = &after_marker[..end];
        match lookup(name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value),
            // Unresolvable or empty-named placeholder stays as-is.
            None => result.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after_marker[end + 1..];
    }

    result.push_str(rest);
    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "BOT_TOKEN" => Some("123:ABC".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_variables() {
        assert_eq!(
            substitute_env_with("token = \"${BOT_TOKEN}\"", lookup),
            "token = \"123:ABC\""
        );
    }

    #[test]
    fn unknown_variables_stay_verbatim() {
        assert_eq!(
            substitute_env_with("token = \"${MISSING}\"", lookup),
            "token = \"${MISSING}\""
        );
    }

    #[test]
    fn empty_value_substitutes_to_nothing() {
        assert_eq!(substitute_env_with("[${EMPTY}]", lookup), "[]");
    }

    #[test]
    fn malformed_placeholders_are_literal() {
        assert_eq!(
            substitute_env_with("tail ${UNCLOSED", lookup),
            "tail ${UNCLOSED"
        );
        assert_eq!(
            substitute_env_with("plain $BOT_TOKEN", lookup),
            "plain $BOT_TOKEN"
        );
        assert_eq!(substitute_env_with("empty ${}", lookup), "empty ${}");
    }

    #[test]
    fn multiple_placeholders_in_one_document() {
        assert_eq!(
            substitute_env_with("${BOT_TOKEN}/${MISSING}/${BOT_TOKEN}", lookup),
            "123:ABC/${MISSING}/123:ABC"
        );
    }
}

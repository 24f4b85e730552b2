use secrecy::{ExposeSecret, Secret};

/// Runtime configuration for the public bot account.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,
}

impl BotConfig {
    pub fn new(token: Secret<String>) -> Self {
        Self { token }
    }

    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_leaks_the_token() {
        let config = BotConfig::new(Secret::new("123:SECRET".into()));
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("SECRET"));
    }

    #[test]
    fn empty_token_is_detected() {
        assert!(!BotConfig::new(Secret::new(String::new())).has_token());
        assert!(BotConfig::new(Secret::new("t".into())).has_token());
    }
}

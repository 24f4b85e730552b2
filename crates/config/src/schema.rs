use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaygramConfig {
    pub telegram: TelegramSettings,
    pub relay: RelaySettings,
    pub server: ServerSettings,
}

/// Settings for the public bot identity.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
        }
    }
}

/// Relay pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Refuse fetches with a configuration error when no delegated session
    /// is wired in, instead of attempting them through the public bot.
    pub require_delegated: bool,

    /// Retry attempts allowed under sustained rate limiting.
    pub rate_limit_max_retries: usize,

    /// Spool directory for per-request payload files. Defaults to a
    /// `relaygram` directory under the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spool_dir: Option<PathBuf>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            require_delegated: true,
            rate_limit_max_retries: 5,
            spool_dir: None,
        }
    }
}

/// Health probe server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 10000,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

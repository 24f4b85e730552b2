use std::path::{Path, PathBuf};

use {thiserror::Error, tracing::{debug, warn}};

use crate::{env_subst::substitute_env, schema::RelaygramConfig};

/// Config file name, checked in the working directory and the user config
/// directory.
const CONFIG_FILENAME: &str = "relaygram.toml";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Load config from the given TOML file, with `${ENV_VAR}` substitution.
pub fn load_config(path: &Path) -> Result<RelaygramConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    let config = toml::from_str(&raw).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(apply_env_overrides(config))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./relaygram.toml` (project-local)
/// 2. `~/.config/relaygram/relaygram.toml` (user-global)
///
/// Falls back to defaults when no file is found or a file fails to load;
/// environment overrides apply in every case.
pub fn discover_and_load() -> RelaygramConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    apply_env_overrides(RelaygramConfig::default())
}

/// Apply environment-variable overrides on top of file values.
///
/// `RELAYGRAM_BOT_TOKEN` (or plain `BOT_TOKEN`) replaces the bot token and
/// `PORT` the health probe port, so a bare container deployment needs no
/// config file at all.
pub fn apply_env_overrides(config: RelaygramConfig) -> RelaygramConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: RelaygramConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> RelaygramConfig {
    if let Some(token) = lookup("RELAYGRAM_BOT_TOKEN").or_else(|| lookup("BOT_TOKEN")) {
        if !token.is_empty() {
            config.telegram.token = secrecy::Secret::new(token);
        }
    }
    if let Some(port) = lookup("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(%port, "ignoring unparseable PORT override"),
        }
    }
    if let Some(dir) = lookup("RELAYGRAM_SPOOL_DIR") {
        if !dir.is_empty() {
            config.relay.spool_dir = Some(PathBuf::from(dir));
        }
    }
    config
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "relaygram") {
        let p = dirs.config_dir().join(CONFIG_FILENAME);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

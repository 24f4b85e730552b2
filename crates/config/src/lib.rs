//! Configuration loading and env substitution.
//!
//! Config file: `relaygram.toml`, searched in `./` then
//! `~/.config/relaygram/`. Supports `${ENV_VAR}` substitution in all string
//! values, plus direct environment overrides for containerized deployments.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, discover_and_load, load_config},
    schema::{RelaySettings, RelaygramConfig, ServerSettings, TelegramSettings},
};

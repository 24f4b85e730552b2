use std::sync::Arc;

use {relaygram_relay::RelayPipeline, tokio_util::sync::CancellationToken};

use crate::config::BotConfig;

/// Runtime state shared between the polling loop and the handlers.
pub struct BotState {
    pub bot: teloxide::Bot,
    pub bot_username: Option<String>,
    pub config: BotConfig,
    pub pipeline: Arc<RelayPipeline>,
    pub cancel: CancellationToken,
}

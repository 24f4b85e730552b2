//! Telegram surface for relaygram.
//!
//! Runs the public bot identity over the Bot API via teloxide: a manual
//! long-polling loop feeds inbound links into the relay pipeline, and
//! [`outbound::TelegramSink`] carries the pipeline's single reply back to
//! the requester.

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod session;
pub mod state;

pub use {bot::start_polling, config::BotConfig, outbound::TelegramSink, session::BotSession};

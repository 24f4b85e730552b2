use std::path::Path;

use {
    async_trait::async_trait,
    teloxide::{
        prelude::*,
        types::{ChatId, Recipient},
    },
    tracing::debug,
};

use relaygram_relay::{ContainerRef, RemoteItem, RemoteSession, SessionError};

use crate::error::classify_request_error;

/// The public bot identity as a remote session.
///
/// The Bot API covers the probe and payload legs: `touch` maps to
/// `getChat` and `download` to `getFile` plus an HTTP fetch of the file
/// path. It exposes no message-by-id read, so `lookup` reports the bot's
/// visibility gap; containers behind membership need the delegated
/// session.
pub struct BotSession {
    bot: Bot,
}

impl BotSession {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn recipient(container: &ContainerRef) -> Recipient {
    match container {
        ContainerRef::Numeric(id) => Recipient::Id(ChatId(*id)),
        ContainerRef::Named(handle) => Recipient::ChannelUsername(format!("@{handle}")),
    }
}

#[async_trait]
impl RemoteSession for BotSession {
    fn label(&self) -> &str {
        "public"
    }

    async fn touch(&self, container: &ContainerRef) -> Result<(), SessionError> {
        self.bot
            .get_chat(recipient(container))
            .await
            .map_err(classify_request_error)?;
        Ok(())
    }

    async fn lookup(
        &self,
        container: &ContainerRef,
        item_id: i64,
    ) -> Result<Option<RemoteItem>, SessionError> {
        debug!(
            container = %container,
            item_id,
            "bot identity cannot read container history"
        );
        Err(SessionError::AccessDenied)
    }

    async fn download(&self, item: &RemoteItem, dest: &Path) -> Result<(), SessionError> {
        let file = self
            .bot
            .get_file(item.handle.0.clone())
            .await
            .map_err(classify_request_error)?;

        // File URL format: https://api.telegram.org/file/bot<token>/<path>
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );
        let response = reqwest::get(&url)
            .await
            .map_err(|e| SessionError::remote(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // File paths from getFile expire; a fresh lookup mints a new one.
            return Err(SessionError::StaleReference);
        }
        if !response.status().is_success() {
            return Err(SessionError::remote(format!(
                "file download failed: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SessionError::remote(e.to_string()))?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| SessionError::remote(e.to_string()))?;

        debug!(bytes = bytes.len(), path = %dest.display(), "telegram file downloaded");
        Ok(())
    }
}

use std::{future::Future, path::Path, time::Duration};

use {
    anyhow::Result,
    async_trait::async_trait,
    teloxide::{
        RequestError,
        payloads::{
            SendAnimationSetters, SendAudioSetters, SendDocumentSetters, SendMessageSetters,
            SendPhotoSetters, SendVideoSetters, SendVoiceSetters,
        },
        prelude::*,
        types::{ChatAction, ChatId, InputFile, MessageId, ReplyParameters},
    },
    tracing::{info, warn},
};

use relaygram_relay::{MediaKind, OutputSink};

/// Retries allowed when Telegram answers a send with retry-after.
const RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Outbound reply channel for one inbound request: a fixed chat, threaded
/// onto the triggering message when one is known. The relay pipeline's
/// single reply leaves through this sink, always under the bot identity.
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
    reply_to: Option<MessageId>,
}

impl TelegramSink {
    pub fn new(bot: Bot, chat_id: ChatId, reply_to: Option<MessageId>) -> Self {
        Self {
            bot,
            chat_id,
            reply_to,
        }
    }

    fn reply_params(&self) -> Option<ReplyParameters> {
        self.reply_to
            .map(|id| ReplyParameters::new(id).allow_sending_without_reply())
    }
}

#[async_trait]
impl OutputSink for TelegramSink {
    async fn send_text(&self, text: &str) -> Result<()> {
        let rp = self.reply_params();
        run_with_retry_after(self.chat_id, "send text", || {
            let mut req = self.bot.send_message(self.chat_id, text);
            if let Some(rp) = rp.clone() {
                req = req.reply_parameters(rp);
            }
            async move { req.await }
        })
        .await?;
        Ok(())
    }

    async fn send_media(&self, kind: MediaKind, artifact: &Path, caption: &str) -> Result<()> {
        let rp = self.reply_params();

        // Uploading can take a while; show activity in the chat meanwhile.
        let _ = self
            .bot
            .send_chat_action(self.chat_id, ChatAction::Typing)
            .await;

        info!(
            chat_id = self.chat_id.0,
            kind = kind.as_str(),
            caption_len = caption.len(),
            "telegram outbound media send start"
        );

        match kind {
            MediaKind::Video => {
                run_with_retry_after(self.chat_id, "send video", || {
                    let mut req = self
                        .bot
                        .send_video(self.chat_id, InputFile::file(artifact.to_path_buf()));
                    if !caption.is_empty() {
                        req = req.caption(caption);
                    }
                    if let Some(rp) = rp.clone() {
                        req = req.reply_parameters(rp);
                    }
                    async move { req.await }
                })
                .await?;
            },
            MediaKind::Document => {
                run_with_retry_after(self.chat_id, "send document", || {
                    let mut req = self
                        .bot
                        .send_document(self.chat_id, InputFile::file(artifact.to_path_buf()));
                    if !caption.is_empty() {
                        req = req.caption(caption);
                    }
                    if let Some(rp) = rp.clone() {
                        req = req.reply_parameters(rp);
                    }
                    async move { req.await }
                })
                .await?;
            },
            MediaKind::Animation => {
                run_with_retry_after(self.chat_id, "send animation", || {
                    let mut req = self
                        .bot
                        .send_animation(self.chat_id, InputFile::file(artifact.to_path_buf()));
                    if !caption.is_empty() {
                        req = req.caption(caption);
                    }
                    if let Some(rp) = rp.clone() {
                        req = req.reply_parameters(rp);
                    }
                    async move { req.await }
                })
                .await?;
            },
            MediaKind::Audio => {
                run_with_retry_after(self.chat_id, "send audio", || {
                    let mut req = self
                        .bot
                        .send_audio(self.chat_id, InputFile::file(artifact.to_path_buf()));
                    if !caption.is_empty() {
                        req = req.caption(caption);
                    }
                    if let Some(rp) = rp.clone() {
                        req = req.reply_parameters(rp);
                    }
                    async move { req.await }
                })
                .await?;
            },
            MediaKind::Voice => {
                run_with_retry_after(self.chat_id, "send voice", || {
                    let mut req = self
                        .bot
                        .send_voice(self.chat_id, InputFile::file(artifact.to_path_buf()));
                    if !caption.is_empty() {
                        req = req.caption(caption);
                    }
                    if let Some(rp) = rp.clone() {
                        req = req.reply_parameters(rp);
                    }
                    async move { req.await }
                })
                .await?;
            },
            MediaKind::Photo => {
                run_with_retry_after(self.chat_id, "send photo", || {
                    let mut req = self
                        .bot
                        .send_photo(self.chat_id, InputFile::file(artifact.to_path_buf()));
                    if !caption.is_empty() {
                        req = req.caption(caption);
                    }
                    if let Some(rp) = rp.clone() {
                        req = req.reply_parameters(rp);
                    }
                    async move { req.await }
                })
                .await?;
            },
        }

        info!(
            chat_id = self.chat_id.0,
            kind = kind.as_str(),
            "telegram outbound media sent"
        );
        Ok(())
    }
}

/// Run a Bot API request, honoring retry-after answers up to a bound.
///
/// Sends already sit downstream of the pipeline's retry wrapper, so this
/// loop only covers the outbound leg's own rate limits.
async fn run_with_retry_after<T, F, Fut>(
    chat_id: ChatId,
    operation: &'static str,
    mut request: F,
) -> std::result::Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RequestError>>,
{
    let mut retries = 0usize;

    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let Some(wait) = retry_after_duration(&err) else {
                    return Err(err);
                };

                if retries >= RETRY_AFTER_MAX_RETRIES {
                    warn!(
                        chat_id = chat_id.0,
                        operation,
                        retries,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limit persisted after retries"
                    );
                    return Err(err);
                }

                retries += 1;
                warn!(
                    chat_id = chat_id.0,
                    operation,
                    retries,
                    max_retries = RETRY_AFTER_MAX_RETRIES,
                    retry_after_secs = wait.as_secs(),
                    "telegram rate limited, waiting before retry"
                );
                tokio::time::sleep(wait).await;
            },
        }
    }
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}

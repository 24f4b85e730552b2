use {
    relaygram_relay::SessionError,
    teloxide::{ApiError, RequestError},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] RequestError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Map a Bot API request error onto the relay's classified error channel.
///
/// Well-known variants map directly; everything else is classified by the
/// error text, since the Bot API folds many conditions into free-form
/// "Bad Request" strings.
pub(crate) fn classify_request_error(err: RequestError) -> SessionError {
    match err {
        RequestError::RetryAfter(wait) => SessionError::RateLimited {
            wait: wait.duration(),
        },
        RequestError::Api(ApiError::ChatNotFound) => SessionError::UnknownContainer,
        RequestError::Api(ApiError::BotKicked | ApiError::BotKickedFromSupergroup) => {
            SessionError::Banned
        },
        RequestError::Api(ApiError::BotBlocked) => SessionError::AccessDenied,
        other => classify_error_text(other.to_string()),
    }
}

fn classify_error_text(text: String) -> SessionError {
    let lowered = text.to_lowercase();
    if lowered.contains("file reference")
        || lowered.contains("file_reference")
        || lowered.contains("wrong file id")
        || lowered.contains("temporarily unavailable")
    {
        SessionError::StaleReference
    } else if lowered.contains("chat_admin_required")
        || lowered.contains("not enough rights")
        || lowered.contains("have no rights")
        || lowered.contains("forbidden")
    {
        SessionError::AccessDenied
    } else if lowered.contains("banned") || lowered.contains("kicked") {
        SessionError::Banned
    } else {
        SessionError::remote(text)
    }
}

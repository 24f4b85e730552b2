use std::{path::Path, time::Duration};

use {async_trait::async_trait, thiserror::Error};

use crate::link::ContainerRef;

/// Media kind of a remote item, in relay precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Document,
    Animation,
    Audio,
    Voice,
    Photo,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Document => "document",
            Self::Animation => "animation",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Photo => "photo",
        }
    }

    /// Extension for the spooled payload file.
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Document => "bin",
            Self::Animation => "mp4",
            Self::Audio => "mp3",
            Self::Voice => "ogg",
            Self::Photo => "jpg",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind attributes a remote item exposes. An item may carry several at once;
/// [`MediaFlags::classify`] picks one by fixed precedence so repeated relays
/// of the same item stay reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaFlags {
    pub video: bool,
    pub document: bool,
    pub animation: bool,
    pub audio: bool,
    pub voice: bool,
    pub photo: bool,
}

impl MediaFlags {
    /// Flags with exactly one kind set.
    pub fn of(kind: MediaKind) -> Self {
        let mut flags = Self::default();
        match kind {
            MediaKind::Video => flags.video = true,
            MediaKind::Document => flags.document = true,
            MediaKind::Animation => flags.animation = true,
            MediaKind::Audio => flags.audio = true,
            MediaKind::Voice => flags.voice = true,
            MediaKind::Photo => flags.photo = true,
        }
        flags
    }

    /// First present kind wins: Video, Document, Animation, Audio, Voice,
    /// Photo. `None` means the item has no downloadable payload.
    pub fn classify(self) -> Option<MediaKind> {
        if self.video {
            Some(MediaKind::Video)
        } else if self.document {
            Some(MediaKind::Document)
        } else if self.animation {
            Some(MediaKind::Animation)
        } else if self.audio {
            Some(MediaKind::Audio)
        } else if self.voice {
            Some(MediaKind::Voice)
        } else if self.photo {
            Some(MediaKind::Photo)
        } else {
            None
        }
    }
}

/// Opaque download capability. Valid for a bounded time window and only
/// under the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHandle(pub String);

/// A remote item returned by a lookup. Per-request; never cached across
/// pipeline invocations because the handle expires.
#[derive(Debug, Clone)]
pub struct RemoteItem {
    pub media: MediaFlags,
    pub size_hint: Option<u64>,
    pub caption: String,
    pub handle: DownloadHandle,
}

/// Classified failure surfaced by a remote session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The remote dictated a wait before the call may be repeated.
    #[error("rate limited for {}s", wait.as_secs())]
    RateLimited { wait: Duration },

    /// The download capability expired between lookup and use.
    #[error("download reference expired")]
    StaleReference,

    /// The container does not exist or cannot be reached at all.
    #[error("container is unreachable")]
    UnknownContainer,

    /// The session lacks visibility or membership for the container.
    #[error("access denied")]
    AccessDenied,

    /// The session is banned from the container.
    #[error("banned from container")]
    Banned,

    /// Anything the remote surfaced that fits no other class.
    #[error("{message}")]
    Remote { message: String },
}

impl SessionError {
    #[must_use]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

/// A long-lived remote session bound to one identity.
///
/// The pipeline borrows sessions and never manages their connect/disconnect
/// lifecycle; that belongs to the surrounding process.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Identity label for logging ("public" / "delegated").
    fn label(&self) -> &str;

    /// Best-effort existence/membership probe, used to warm the session's
    /// address cache before a lookup. Callers ignore failures.
    async fn touch(&self, container: &ContainerRef) -> Result<(), SessionError>;

    /// Fetch item metadata. `Ok(None)` means the container is readable but
    /// no item exists at that id.
    async fn lookup(
        &self,
        container: &ContainerRef,
        item_id: i64,
    ) -> Result<Option<RemoteItem>, SessionError>;

    /// Download the item's payload into `dest`.
    async fn download(&self, item: &RemoteItem, dest: &Path) -> Result<(), SessionError>;
}

/// Where the pipeline's single outbound payload goes. Implemented by the
/// public identity's transport.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn send_text(&self, text: &str) -> anyhow::Result<()>;

    async fn send_media(
        &self,
        kind: MediaKind,
        artifact: &Path,
        caption: &str,
    ) -> anyhow::Result<()>;
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_follows_precedence() {
        let mut flags = MediaFlags::of(MediaKind::Photo);
        flags.voice = true;
        assert_eq!(flags.classify(), Some(MediaKind::Voice));

        flags.video = true;
        assert_eq!(flags.classify(), Some(MediaKind::Video));

        let mut doc_over_audio = MediaFlags::of(MediaKind::Audio);
        doc_over_audio.document = true;
        assert_eq!(doc_over_audio.classify(), Some(MediaKind::Document));
    }

    #[test]
    fn classify_empty_is_none() {
        assert_eq!(MediaFlags::default().classify(), None);
    }

    #[test]
    fn single_kind_flags_roundtrip() {
        for kind in [
            MediaKind::Video,
            MediaKind::Document,
            MediaKind::Animation,
            MediaKind::Audio,
            MediaKind::Voice,
            MediaKind::Photo,
        ] {
            assert_eq!(MediaFlags::of(kind).classify(), Some(kind));
        }
    }
}

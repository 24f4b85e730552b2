use std::{
    io,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::session::MediaKind;

/// A scoped temporary payload file, private to one pipeline invocation.
///
/// The backing file carries a random per-request suffix so concurrent
/// relays never collide, and is removed when the artifact is dropped, on
/// every exit path of the pipeline, success or failure.
pub struct TempArtifact {
    file: NamedTempFile,
}

impl TempArtifact {
    pub fn create(spool_dir: &Path, kind: MediaKind) -> io::Result<Self> {
        std::fs::create_dir_all(spool_dir)?;
        let file = tempfile::Builder::new()
            .prefix("relay-")
            .suffix(&format!(".{}", kind.file_extension()))
            .tempfile_in(spool_dir)?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_on_drop() {
        let spool = std::env::temp_dir().join("relaygram-artifact-test");
        let path = {
            let artifact = TempArtifact::create(&spool, MediaKind::Video).unwrap();
            assert!(artifact.path().exists());
            artifact.path_buf()
        };
        assert!(!path.exists(), "artifact must be removed on drop");
    }

    #[test]
    fn concurrent_artifacts_never_collide() {
        let spool = std::env::temp_dir().join("relaygram-artifact-test");
        let a = TempArtifact::create(&spool, MediaKind::Photo).unwrap();
        let b = TempArtifact::create(&spool, MediaKind::Photo).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn suffix_matches_media_kind() {
        let spool = std::env::temp_dir().join("relaygram-artifact-test");
        let artifact = TempArtifact::create(&spool, MediaKind::Voice).unwrap();
        assert_eq!(
            artifact.path().extension().and_then(|e| e.to_str()),
            Some("ogg")
        );
    }
}

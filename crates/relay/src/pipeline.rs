use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::{
    artifact::TempArtifact,
    error::ErrorKind,
    identity::Identities,
    link::{self, LinkAddress},
    retry::{self, RetryPolicy},
    session::{OutputSink, RemoteItem, RemoteSession, SessionError},
};

/// How a non-link input is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// The caller expects a link; non-links get a usage hint.
    Required,
    /// Non-links are silently skipped.
    Lenient,
}

/// Pipeline tuning, owned by the surrounding process.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub retry: RetryPolicy,
    /// Directory for per-request payload spool files.
    pub spool_dir: PathBuf,
    /// Fail fast with a configuration error when no delegated session is
    /// available, instead of attempting the fetch through the public one.
    pub require_delegated: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            spool_dir: std::env::temp_dir().join("relaygram"),
            require_delegated: false,
        }
    }
}

/// Result of one relay invocation.
///
/// `local_artifact_path` records the spool file the invocation used; the
/// file itself is always released before the outcome is returned.
#[derive(Debug)]
pub struct TransferOutcome {
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub local_artifact_path: Option<PathBuf>,
}

impl TransferOutcome {
    fn ok(path: PathBuf) -> Self {
        Self {
            success: true,
            error_kind: None,
            local_artifact_path: Some(path),
        }
    }

    fn failed(kind: ErrorKind, path: Option<PathBuf>) -> Self {
        Self {
            success: false,
            error_kind: Some(kind),
            local_artifact_path: path,
        }
    }
}

/// The fetch-download-relay pipeline.
///
/// One invocation per candidate link; never raises past its own boundary.
/// Every failure path ends in at most one user-visible reply on the sink
/// and a released spool file.
pub struct RelayPipeline {
    identities: Identities,
    options: RelayOptions,
}

impl RelayPipeline {
    pub fn new(identities: Identities, options: RelayOptions) -> Self {
        Self {
            identities,
            options,
        }
    }

    /// Resolve `raw`, fetch the referenced item through the selected
    /// identity, and relay it back through `sink`.
    pub async fn relay(
        &self,
        raw: &str,
        sink: &dyn OutputSink,
        mode: LinkMode,
    ) -> TransferOutcome {
        let Some(address) = link::resolve(raw) else {
            match mode {
                LinkMode::Required => self.deliver_error(sink, &ErrorKind::NotALink).await,
                LinkMode::Lenient => debug!("input is not a message link, ignoring"),
            }
            return TransferOutcome::failed(ErrorKind::NotALink, None);
        };

        if self.options.require_delegated && self.identities.delegated.is_none() {
            warn!(
                container = %address.container,
                "no delegated session configured, refusing fetch"
            );
            return self.fail(sink, ErrorKind::ConfigurationError, None).await;
        }

        let (session, identity) = self.identities.select(&address.container);
        info!(
            container = %address.container,
            item_id = address.item_id,
            %identity,
            "relaying message link"
        );

        // Best-effort warm-up of the session's address cache; a failed
        // probe never aborts the relay.
        if let Err(e) = session.touch(&address.container).await {
            debug!(container = %address.container, error = %e, "container touch failed");
        }

        let item = match self.lookup(session.as_ref(), &address).await {
            Ok(Some(item)) => item,
            Ok(None) => return self.fail(sink, ErrorKind::NotFound, None).await,
            Err(err) => return self.fail(sink, ErrorKind::classify(err), None).await,
        };

        let Some(kind) = item.media.classify() else {
            return self.fail(sink, ErrorKind::NoMedia, None).await;
        };

        let artifact = match TempArtifact::create(&self.options.spool_dir, kind) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(error = %e, "failed to create spool artifact");
                return self
                    .fail(sink, ErrorKind::remote_unknown("temporary storage unavailable"), None)
                    .await;
            },
        };
        let artifact_path = artifact.path_buf();

        let item = match self
            .download_with_refresh(session.as_ref(), &address, item, &artifact)
            .await
        {
            Ok(item) => item,
            Err(kind) => return self.fail(sink, kind, Some(artifact_path)).await,
        };

        debug!(
            path = %artifact_path.display(),
            size_hint = ?item.size_hint,
            kind = kind.as_str(),
            "payload downloaded"
        );

        // The reply always leaves through the public identity's sink: the
        // surface the requester is actually addressing. The caption travels
        // through unmodified.
        if let Err(e) = sink.send_media(kind, artifact.path(), &item.caption).await {
            warn!(error = %e, "media send failed");
            let kind = ErrorKind::remote_unknown(e.to_string());
            return self.fail(sink, kind, Some(artifact_path)).await;
        }

        info!(
            container = %address.container,
            item_id = address.item_id,
            kind = kind.as_str(),
            "media relayed"
        );
        TransferOutcome::ok(artifact_path)
    }

    /// Download the payload, refreshing the lookup exactly once when the
    /// download capability has gone stale.
    async fn download_with_refresh(
        &self,
        session: &dyn RemoteSession,
        address: &LinkAddress,
        item: RemoteItem,
        artifact: &TempArtifact,
    ) -> Result<RemoteItem, ErrorKind> {
        match self.download(session, &item, artifact).await {
            Ok(()) => Ok(item),
            Err(SessionError::StaleReference) => {
                info!(
                    container = %address.container,
                    item_id = address.item_id,
                    "download reference expired, refreshing lookup"
                );
                let fresh = match self.lookup(session, address).await {
                    Ok(Some(fresh)) => fresh,
                    Ok(None) => return Err(ErrorKind::NotFound),
                    Err(err) => return Err(ErrorKind::classify(err)),
                };
                match self.download(session, &fresh, artifact).await {
                    Ok(()) => Ok(fresh),
                    Err(SessionError::StaleReference) => Err(ErrorKind::StaleReference),
                    Err(err) => Err(ErrorKind::classify(err)),
                }
            },
            Err(err) => Err(ErrorKind::classify(err)),
        }
    }

    async fn lookup(
        &self,
        session: &dyn RemoteSession,
        address: &LinkAddress,
    ) -> Result<Option<RemoteItem>, SessionError> {
        retry::with_rate_limit_retry(&self.options.retry, "lookup", || {
            session.lookup(&address.container, address.item_id)
        })
        .await
    }

    async fn download(
        &self,
        session: &dyn RemoteSession,
        item: &RemoteItem,
        artifact: &TempArtifact,
    ) -> Result<(), SessionError> {
        retry::with_rate_limit_retry(&self.options.retry, "download", || {
            session.download(item, artifact.path())
        })
        .await
    }

    async fn fail(
        &self,
        sink: &dyn OutputSink,
        kind: ErrorKind,
        artifact_path: Option<PathBuf>,
    ) -> TransferOutcome {
        self.deliver_error(sink, &kind).await;
        TransferOutcome::failed(kind, artifact_path)
    }

    /// A failed reply is logged and swallowed: the pipeline boundary is a
    /// total catch point and must not take down the invoking task.
    async fn deliver_error(&self, sink: &dyn OutputSink, kind: &ErrorKind) {
        if let Err(e) = sink.send_text(&kind.user_message()).await {
            warn!(kind = %kind, error = %e, "failed to deliver reply");
        }
    }
}

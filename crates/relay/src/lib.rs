//! Link resolution and the dual-identity fetch-and-relay pipeline.
//!
//! Given a candidate message link, resolve it to a (container, item)
//! address, fetch the referenced item through whichever configured identity
//! can see it, and relay the payload back out through the public identity,
//! surviving rate limits, stale download references, and partial failures
//! without leaking internal errors into chat output.
//!
//! Transport is injected: identities arrive as [`session::RemoteSession`]
//! capabilities and replies leave through a [`session::OutputSink`], so the
//! pipeline runs unchanged against the real Telegram surface or mocks.

pub mod artifact;
pub mod error;
pub mod identity;
pub mod link;
pub mod pipeline;
pub mod retry;
pub mod session;

pub use {
    error::ErrorKind,
    identity::{Identities, IdentityKind},
    link::{ContainerRef, LinkAddress},
    pipeline::{LinkMode, RelayOptions, RelayPipeline, TransferOutcome},
    retry::RetryPolicy,
    session::{
        DownloadHandle, MediaFlags, MediaKind, OutputSink, RemoteItem, RemoteSession, SessionError,
    },
};

//! Liveness probe server.
//!
//! Hosting platforms ping `GET /health`; keeping the route trivial means
//! the probe never blocks on the bot's work.

pub mod server;

pub use server::serve;

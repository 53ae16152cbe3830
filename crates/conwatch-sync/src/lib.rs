//! Status-synchronization engine for Conwatch.
//!
//! One poller task queries the runtime on a fixed cadence and publishes each
//! snapshot through the [`registry::SessionRegistry`] to every registered
//! [`session::Session`]. Sessions own a bounded drop-oldest outbound queue,
//! so a stalled observer never delays the poller or its peers.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod poller;
pub mod registry;
pub mod session;

pub use poller::Poller;
pub use registry::SessionRegistry;
pub use session::{Session, SessionId, SnapshotSink};

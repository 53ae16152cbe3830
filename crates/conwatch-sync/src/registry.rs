//! Registry of live observer sessions and snapshot fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use conwatch_common::types::Snapshot;
use dashmap::DashMap;

use crate::session::{Session, SessionId};

/// Tracks the set of live sessions and mediates fan-out from the poller.
///
/// A session appears here for exactly the interval between registration and
/// close. All operations are safe to call concurrently; broadcast never
/// blocks on any individual observer.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
    next_id: AtomicU64,
    queue_bound: usize,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions use the given queue bound.
    #[must_use]
    pub fn new(queue_bound: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            queue_bound,
        }
    }

    /// Creates and registers a new session.
    #[must_use]
    pub fn register(&self) -> Arc<Session> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Session::new(id, self.queue_bound);
        let _ = self.sessions.insert(id, Arc::clone(&session));
        tracing::info!(session = id, total = self.sessions.len(), "session registered");
        session
    }

    /// Removes a session. Idempotent; removing an unknown id is a no-op.
    pub fn unregister(&self, id: SessionId) {
        if self.sessions.remove(&id).is_some() {
            tracing::info!(session = id, total = self.sessions.len(), "session unregistered");
        }
    }

    /// Delivers a snapshot to every registered session.
    ///
    /// Enqueueing is non-blocking per session (drop-oldest, see
    /// [`Session::enqueue`]), so one stalled observer never delays another.
    /// Sessions found closed are removed in the same cycle.
    pub fn broadcast(&self, snapshot: &Snapshot) {
        let mut dead: Vec<SessionId> = Vec::new();
        for entry in self.sessions.iter() {
            if !entry.value().enqueue(snapshot.clone()) {
                dead.push(*entry.key());
            }
        }
        for id in dead {
            self.unregister(id);
        }
    }

    /// Closes every session and drains the registry to empty.
    ///
    /// Part of process shutdown; each session's delivery loop observes the
    /// close and exits on its own.
    pub fn close_all(&self) {
        let sessions: Vec<Arc<Session>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for session in sessions {
            let _ = session.close();
        }
        self.sessions.clear();
        tracing::info!("all sessions closed");
    }

    /// Returns the number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns whether no sessions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns whether the given session is currently registered.
    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }
}

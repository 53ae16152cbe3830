//! Per-observer session: bounded outbound queue and delivery loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use conwatch_common::error::Result;
use conwatch_common::types::Snapshot;
use tokio::sync::Notify;

use crate::registry::SessionRegistry;

/// Identifier assigned to a session for its lifetime.
pub type SessionId = u64;

/// Transport seam for pushing serialized snapshots to one observer.
///
/// The server adapts a WebSocket sender; tests inject in-memory sinks.
#[async_trait]
pub trait SnapshotSink: Send {
    /// Writes one self-contained message to the observer.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection is broken; the session treats
    /// any send error as terminal.
    async fn send(&mut self, payload: String) -> Result<()>;
}

/// Server-side representative of one connected observer.
///
/// Holds a bounded queue of pending snapshots. When the observer cannot keep
/// up and the queue is full, the oldest pending snapshot is dropped to make
/// room for the newest: most-recent-state wins, and enqueueing never blocks
/// the broadcaster. Lifecycle is `Active -> Closed`, terminal; a reconnecting
/// observer gets a fresh session.
pub struct Session {
    id: SessionId,
    bound: usize,
    queue: Mutex<VecDeque<Snapshot>>,
    notify: Notify,
    closed: AtomicBool,
}

impl Session {
    /// Creates an active session with the given queue bound.
    #[must_use]
    pub fn new(id: SessionId, bound: usize) -> Arc<Self> {
        Arc::new(Self {
            id,
            bound: bound.max(1),
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns whether the session has reached its terminal state.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Queues a snapshot for delivery without blocking.
    ///
    /// Drops the oldest pending snapshot when the queue is full. Returns
    /// `false` if the session is already closed, in which case the caller
    /// should drop its registration.
    pub fn enqueue(&self, snapshot: Snapshot) -> bool {
        if self.is_closed() {
            return false;
        }
        {
            let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
            if queue.len() >= self.bound {
                let _ = queue.pop_front();
                tracing::debug!(session = self.id, "queue full, dropped oldest snapshot");
            }
            queue.push_back(snapshot);
        }
        self.notify.notify_one();
        true
    }

    /// Transitions the session to `Closed`.
    ///
    /// Idempotent and safe to call from both the delivery path and an
    /// external disconnect detector. Returns `true` on the first call only.
    pub fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        if first {
            // Wake the delivery loop so it observes the closed flag.
            self.notify.notify_one();
            tracing::debug!(session = self.id, "session closed");
        }
        first
    }

    /// Removes and returns the oldest pending snapshot, if any.
    pub(crate) fn take_oldest(&self) -> Option<Snapshot> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Runs a session's delivery loop until it closes.
///
/// Dequeues snapshots in publish order, serializes each as a JSON array of
/// status records, and writes it to the sink. Any write error closes the
/// session. Once the session is closed, from any path, no further write is
/// attempted: pending snapshots are discarded, not flushed. On exit the
/// session is closed and removed from the registry, whichever path got
/// there first.
pub async fn deliver<S: SnapshotSink>(
    registry: Arc<SessionRegistry>,
    session: Arc<Session>,
    mut sink: S,
) {
    loop {
        if session.is_closed() {
            break;
        }
        if let Some(snapshot) = session.take_oldest() {
            let payload = match serde_json::to_string(&snapshot) {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!(session = session.id(), %error, "snapshot failed to serialize");
                    continue;
                }
            };
            if let Err(error) = sink.send(payload).await {
                tracing::info!(session = session.id(), %error, "observer write failed");
                break;
            }
        } else {
            session.notify.notified().await;
        }
    }

    let _ = session.close();
    registry.unregister(session.id());
}

#[cfg(test)]
mod tests {
    use super::*;
    use conwatch_common::error::ConwatchError;
    use conwatch_common::types::ContainerStatus;

    fn snapshot(status: &str) -> Snapshot {
        Snapshot::from(vec![ContainerStatus {
            id: "abc123def456".into(),
            name: "web".into(),
            status: status.into(),
        }])
    }

    /// Sink that records every payload it receives.
    struct RecordingSink {
        payloads: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SnapshotSink for RecordingSink {
        async fn send(&mut self, payload: String) -> Result<()> {
            self.payloads
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(payload);
            Ok(())
        }
    }

    /// Sink whose connection is permanently broken.
    struct BrokenSink;

    #[async_trait]
    impl SnapshotSink for BrokenSink {
        async fn send(&mut self, _payload: String) -> Result<()> {
            Err(ConwatchError::SessionWriteFailed {
                session: 0,
                message: "connection reset".into(),
            })
        }
    }

    #[test]
    fn full_queue_drops_oldest_keeps_newest() {
        let session = Session::new(1, 2);
        assert!(session.enqueue(snapshot("a")));
        assert!(session.enqueue(snapshot("b")));
        assert!(session.enqueue(snapshot("c")));
        assert_eq!(session.pending(), 2);
        assert_eq!(session.take_oldest().unwrap()[0].status, "b");
        assert_eq!(session.take_oldest().unwrap()[0].status, "c");
    }

    #[test]
    fn close_is_idempotent() {
        let session = Session::new(1, 4);
        assert!(session.close());
        assert!(!session.close());
        assert!(session.is_closed());
    }

    #[test]
    fn enqueue_after_close_is_rejected() {
        let session = Session::new(1, 4);
        let _ = session.close();
        assert!(!session.enqueue(snapshot("a")));
    }

    #[tokio::test]
    async fn delivery_preserves_publish_order() {
        let registry = Arc::new(SessionRegistry::new(8));
        let session = registry.register();
        for status in ["a", "b", "c"] {
            assert!(session.enqueue(snapshot(status)));
        }

        let payloads = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            payloads: Arc::clone(&payloads),
        };
        let handle = tokio::spawn(deliver(Arc::clone(&registry), Arc::clone(&session), sink));

        // Let the loop drain, then close it out.
        tokio::task::yield_now().await;
        while session.pending() > 0 {
            tokio::task::yield_now().await;
        }
        let _ = session.close();
        handle.await.unwrap();

        let delivered = payloads.lock().unwrap().clone();
        let statuses: Vec<String> = delivered
            .iter()
            .map(|p| {
                let parsed: Vec<ContainerStatus> = serde_json::from_str(p).unwrap();
                parsed[0].status.clone()
            })
            .collect();
        assert_eq!(statuses, ["a", "b", "c"]);
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn closed_session_performs_no_further_writes() {
        let registry = Arc::new(SessionRegistry::new(8));
        let session = registry.register();
        assert!(session.enqueue(snapshot("a")));
        assert!(session.enqueue(snapshot("b")));
        // External disconnect before the delivery loop runs.
        let _ = session.close();

        let payloads = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            payloads: Arc::clone(&payloads),
        };
        deliver(Arc::clone(&registry), Arc::clone(&session), sink).await;

        // Pending snapshots are discarded, not flushed to the sink.
        assert!(payloads.lock().unwrap().is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn write_failure_closes_and_unregisters() {
        let registry = Arc::new(SessionRegistry::new(8));
        let session = registry.register();
        assert!(session.enqueue(snapshot("a")));

        deliver(Arc::clone(&registry), Arc::clone(&session), BrokenSink).await;

        assert!(session.is_closed());
        assert_eq!(registry.len(), 0);
        // A second close from an external detector is still fine.
        assert!(!session.close());
    }
}

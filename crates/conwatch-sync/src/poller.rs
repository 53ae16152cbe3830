//! Snapshot poller: the strictly sequential poll/publish loop.

use std::sync::Arc;
use std::time::Duration;

use conwatch_runtime::RuntimeClient;
use tokio_util::sync::CancellationToken;

use crate::registry::SessionRegistry;

/// Polls the runtime on a fixed cadence and publishes each snapshot.
///
/// At most one query is in flight at a time. The interval is a minimum
/// spacing guarantee: the delay starts after a cycle's publish, so a slow
/// query extends the gap. A failed query is logged and retried on the next
/// cycle; it is never fatal.
pub struct Poller {
    client: Arc<dyn RuntimeClient>,
    registry: Arc<SessionRegistry>,
    interval: Duration,
    cancel: CancellationToken,
}

impl Poller {
    /// Creates a poller over the given runtime client and registry.
    #[must_use]
    pub fn new(
        client: Arc<dyn RuntimeClient>,
        registry: Arc<SessionRegistry>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            registry,
            interval,
            cancel,
        }
    }

    /// Runs the poll loop until the cancellation token fires.
    ///
    /// Cancellation is observed both while a query is in flight and during
    /// the inter-cycle delay.
    pub async fn run(self) {
        tracing::info!(interval = ?self.interval, "poller started");
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                result = self.client.list_containers() => match result {
                    Ok(snapshot) => {
                        tracing::debug!(%snapshot, sessions = self.registry.len(), "publishing snapshot");
                        self.registry.broadcast(&snapshot);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "runtime query failed, retrying next cycle");
                    }
                },
            }

            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!("poller stopped");
    }
}

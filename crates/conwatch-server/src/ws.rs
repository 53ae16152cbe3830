//! WebSocket upgrade handling and the socket-backed snapshot sink.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use conwatch_common::error::{ConwatchError, Result};
use conwatch_sync::session::deliver;
use conwatch_sync::{SessionId, SessionRegistry, SnapshotSink};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use crate::AppState;

/// WebSocket upgrade handler.
///
/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry))
}

/// [`SnapshotSink`] adapter over the write half of a WebSocket.
struct WsSink {
    session: SessionId,
    sender: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl SnapshotSink for WsSink {
    async fn send(&mut self, payload: String) -> Result<()> {
        self.sender
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| ConwatchError::SessionWriteFailed {
                session: self.session,
                message: e.to_string(),
            })
    }
}

/// Serves one observer connection until either side ends it.
///
/// The write half feeds the session's delivery loop; the read half exists
/// only to observe a peer close or transport error, which closes the
/// session from the outside. Both paths converge on the same idempotent
/// close.
async fn handle_socket(socket: WebSocket, registry: Arc<SessionRegistry>) {
    let (sender, mut receiver) = socket.split();
    let session = registry.register();
    tracing::info!(session = session.id(), "observer connected");

    let sink = WsSink {
        session: session.id(),
        sender,
    };
    let delivery = tokio::spawn(deliver(
        Arc::clone(&registry),
        Arc::clone(&session),
        sink,
    ));

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Close(_)) => {
                tracing::debug!(session = session.id(), "observer sent close");
                break;
            }
            Err(error) => {
                tracing::debug!(session = session.id(), %error, "observer read error");
                break;
            }
            // Inbound content is ignored; this is a push-only protocol.
            Ok(_) => {}
        }
    }

    let _ = session.close();
    registry.unregister(session.id());
    if let Err(error) = delivery.await {
        tracing::warn!(session = session.id(), %error, "delivery task panicked");
    }
    tracing::info!(session = session.id(), "observer disconnected");
}

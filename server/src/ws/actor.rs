//! Per-connection session: registration, liveness read loop, teardown.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use super::registry::{next_connection_id, ClientRegistry};

/// Ping interval: server sends a WebSocket ping every 30 seconds.
/// Detects silently dropped peers that a bare read loop never notices.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Pong timeout: if no pong arrives within 10 seconds after a ping, close.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one live-viewer connection end-to-end.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards messages from the connection's
///   outbound queue (filled by the broadcast delivery task)
/// - Reader loop: liveness detection only — inbound payloads are discarded
///
/// On any exit path the connection is removed from the registry; the
/// broadcast delivery task may have evicted it first, and removal is
/// idempotent either way.
pub async fn run_connection(socket: WebSocket, registry: ClientRegistry) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let connection_id = next_connection_id();
    registry.add(connection_id, tx.clone());
    tracing::debug!(connection_id, viewers = registry.len(), "Viewer connected");

    // Spawn writer task: forwards queued messages to the WebSocket sink
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Track pong reception
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();

    // Spawn keepalive task: periodic pings, close when the pong window lapses
    let ping_tx = tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the first immediate tick
        ping_timer.tick().await;

        loop {
            ping_timer.tick().await;

            if ping_tx.send(Message::Ping(vec![].into())).is_err() {
                // Writer task has died — connection is gone
                break;
            }

            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {
                    // Pong received, continue
                }
                _ => {
                    tracing::debug!("Pong timeout, closing connection");
                    let _ = ping_tx.send(Message::Close(None));
                    break;
                }
            }
        }
    });

    // Reader loop: the sole purpose is detecting disconnect. Viewers have
    // nothing to say to the leaderboard; their payloads are discarded.
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Pong(_) => {
                    // Notify the keepalive task
                    let _ = pong_tx.send(());
                }
                Message::Ping(data) => {
                    // Respond to client pings with pong
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Close(_) => {
                    tracing::debug!(connection_id, "Viewer closed connection");
                    break;
                }
                Message::Text(_) | Message::Binary(_) => {
                    // Discarded: the live channel is one-way in practice
                }
            },
            Some(Err(err)) => {
                // Expected steady-state event (network drop, abrupt exit),
                // not a system error.
                tracing::debug!(connection_id, error = %err, "Viewer read error");
                break;
            }
            None => {
                tracing::debug!(connection_id, "Viewer stream ended");
                break;
            }
        }
    }

    // Cleanup: abort writer and keepalive tasks, then deregister
    writer_handle.abort();
    ping_handle.abort();
    registry.remove(connection_id);

    tracing::debug!(connection_id, viewers = registry.len(), "Viewer disconnected");
}

/// Writer task: receives messages from the outbound queue and forwards
/// them to the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed — connection is broken
            break;
        }
    }
}

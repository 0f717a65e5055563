pub mod actor;
pub mod broadcast;
pub mod handler;
pub mod registry;

use tokio::sync::mpsc;

/// Type alias for the sender half of a WebSocket connection's outbound
/// queue. The broadcast delivery task clones this to push snapshots to a
/// specific viewer without touching the socket itself.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

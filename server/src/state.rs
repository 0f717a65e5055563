use std::sync::Arc;

use crate::store::ScoreStore;
use crate::ws::broadcast::Broadcaster;
use crate::ws::registry::ClientRegistry;

/// Shared application state passed to all handlers via axum State extractor.
///
/// Constructed once in main (or a test harness) and cloned into handlers;
/// there is no ambient global state anywhere in the crate.
#[derive(Clone)]
pub struct AppState {
    /// Ranked score store backend (Redis in production)
    pub store: Arc<dyn ScoreStore>,
    /// Active live-viewer connections
    pub registry: ClientRegistry,
    /// Publisher handle for leaderboard snapshots
    pub broadcast: Broadcaster,
    /// Number of entries in a leaderboard snapshot
    pub top_n: usize,
}

//! Ranked score store boundary.
//!
//! The leaderboard core never names a concrete backend: handlers go
//! through the `ScoreStore` trait. `RedisScoreStore` (sorted sets) is the
//! production implementation; `MemoryScoreStore` backs tests and local
//! development without a Redis instance.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// One ranked member as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub member: String,
    pub score: i64,
}

/// Immutable top-N snapshot, shared by reference across the fan-out.
pub type LeaderboardSnapshot = Arc<Vec<LeaderboardEntry>>;

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(#[from] ::redis::RedisError),

    #[error("store operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote ordered-set store holding (member, score) pairs.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Add `member` at `score` only if it is not already present.
    /// No effect on an existing member.
    async fn create_if_absent(&self, member: &str, score: i64) -> StoreResult<()>;

    /// Atomically add `delta` to `member`'s score, returning the new total.
    async fn increment_by(&self, member: &str, delta: i64) -> StoreResult<i64>;

    /// Up to `n` highest-scoring members, score descending.
    async fn top_n(&self, n: usize) -> StoreResult<Vec<LeaderboardEntry>>;
}

/// Normalize store ordering: score descending, ties by member ascending.
/// Applied after every backend read so snapshots are deterministic
/// regardless of how the backend ranks equal scores.
pub(crate) fn sort_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.member.cmp(&b.member)));
}

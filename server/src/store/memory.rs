//! In-memory score store for tests and Redis-less development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{sort_entries, LeaderboardEntry, ScoreStore, StoreError, StoreResult};

/// Score table behind a plain mutex. Operations are short and never
/// await while holding the lock.
#[derive(Default)]
pub struct MemoryScoreStore {
    scores: Mutex<HashMap<String, i64>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, i64>>> {
        self.scores
            .lock()
            .map_err(|_| StoreError::OperationFailed("score table lock poisoned".to_string()))
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn create_if_absent(&self, member: &str, score: i64) -> StoreResult<()> {
        let mut scores = self.lock()?;
        scores.entry(member.to_string()).or_insert(score);
        Ok(())
    }

    async fn increment_by(&self, member: &str, delta: i64) -> StoreResult<i64> {
        let mut scores = self.lock()?;
        let score = scores.entry(member.to_string()).or_insert(0);
        *score += delta;
        Ok(*score)
    }

    async fn top_n(&self, n: usize) -> StoreResult<Vec<LeaderboardEntry>> {
        let scores = self.lock()?;
        let mut entries: Vec<LeaderboardEntry> = scores
            .iter()
            .map(|(member, score)| LeaderboardEntry {
                member: member.clone(),
                score: *score,
            })
            .collect();
        drop(scores);

        sort_entries(&mut entries);
        entries.truncate(n);
        Ok(entries)
    }
}

//! Redis sorted-set backend for the ranked score store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{sort_entries, LeaderboardEntry, ScoreStore, StoreResult};

/// Redis-backed score store.
///
/// `ConnectionManager` multiplexes requests over one connection and
/// reconnects on failure; it is Clone, so each operation clones the
/// handle to get a mutable connection.
#[derive(Clone)]
pub struct RedisScoreStore {
    pool: ConnectionManager,
    key: String,
}

impl RedisScoreStore {
    /// Connect to Redis and bind the store to one sorted-set key.
    /// Fails fast when the server is unreachable.
    pub async fn connect(url: &str, key: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let pool = ConnectionManager::new(client).await?;
        Ok(Self {
            pool,
            key: key.to_string(),
        })
    }
}

#[async_trait]
impl ScoreStore for RedisScoreStore {
    async fn create_if_absent(&self, member: &str, score: i64) -> StoreResult<()> {
        let mut conn = self.pool.clone();
        // ZADD NX: sets the score only when the member is new.
        redis::cmd("ZADD")
            .arg(&self.key)
            .arg("NX")
            .arg(score)
            .arg(member)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn increment_by(&self, member: &str, delta: i64) -> StoreResult<i64> {
        let mut conn = self.pool.clone();
        let new_score: f64 = conn.zincr(&self.key, member, delta).await?;
        Ok(new_score as i64)
    }

    async fn top_n(&self, n: usize) -> StoreResult<Vec<LeaderboardEntry>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.clone();
        // ZREVRANGE stop index is inclusive.
        let stop = (n - 1) as isize;
        let raw: Vec<(String, f64)> = conn.zrevrange_withscores(&self.key, 0, stop).await?;
        let mut entries: Vec<LeaderboardEntry> = raw
            .into_iter()
            .map(|(member, score)| LeaderboardEntry {
                member,
                // Scores live in Redis as doubles; the wire type is i64.
                score: score as i64,
            })
            .collect();
        sort_entries(&mut entries);
        Ok(entries)
    }
}

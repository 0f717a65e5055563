//! Leaderboard broadcast fan-out.
//!
//! Score-update handlers publish snapshots here; a single delivery task
//! consumes them in publish order and writes each one to every registered
//! viewer's outbound queue. The publish channel is a `watch` channel, so
//! an undelivered snapshot is superseded by a newer one instead of
//! queueing — only the latest leaderboard state matters to a viewer, and
//! memory stays bounded under update bursts.

use axum::extract::ws::Message;
use tokio::sync::watch;

use super::registry::ClientRegistry;
use crate::store::LeaderboardSnapshot;

/// Publisher handle for leaderboard snapshots. Cheap to clone; any number
/// of request handlers may publish concurrently.
#[derive(Clone)]
pub struct Broadcaster {
    tx: watch::Sender<Option<LeaderboardSnapshot>>,
}

impl Broadcaster {
    /// Create the broadcaster and spawn its delivery task against the
    /// given registry.
    pub fn spawn(registry: ClientRegistry) -> Broadcaster {
        let (tx, rx) = watch::channel(None);
        tokio::spawn(deliver_loop(rx, registry));
        Broadcaster { tx }
    }

    /// Queue a snapshot for delivery to all registered viewers and return
    /// immediately. A newer snapshot replaces an unconsumed one.
    pub fn publish(&self, snapshot: LeaderboardSnapshot) {
        // Fails only when the delivery task is gone, i.e. at shutdown.
        let _ = self.tx.send(Some(snapshot));
    }
}

/// Delivery task: consumes published snapshots one at a time, in publish
/// order, and fans each out to a point-in-time copy of the registry.
async fn deliver_loop(
    mut rx: watch::Receiver<Option<LeaderboardSnapshot>>,
    registry: ClientRegistry,
) {
    while rx.changed().await.is_ok() {
        let latest = rx.borrow_and_update().clone();
        let snapshot = match latest {
            Some(snapshot) => snapshot,
            None => continue,
        };
        fan_out(&registry, &snapshot);
    }
}

/// Serialize a snapshot once and send it to every registered connection.
/// A failed send means that connection's writer task is gone: the
/// connection is evicted from the registry and its queue is dropped,
/// while delivery continues for everyone else.
fn fan_out(registry: &ClientRegistry, snapshot: &LeaderboardSnapshot) {
    let payload = match serde_json::to_string(snapshot.as_ref()) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize leaderboard snapshot");
            return;
        }
    };
    let msg = Message::Text(payload.into());

    for (id, sender) in registry.snapshot() {
        if sender.send(msg.clone()).is_err() {
            registry.remove(id);
            tracing::debug!(connection_id = id, "Evicted dead viewer during fan-out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LeaderboardEntry;
    use crate::ws::registry::next_connection_id;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    type Receiver = mpsc::UnboundedReceiver<Message>;

    fn snapshot(pairs: &[(&str, i64)]) -> LeaderboardSnapshot {
        Arc::new(
            pairs
                .iter()
                .map(|(member, score)| LeaderboardEntry {
                    member: member.to_string(),
                    score: *score,
                })
                .collect(),
        )
    }

    fn register_viewer(registry: &ClientRegistry) -> (u64, Receiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = next_connection_id();
        registry.add(id, tx);
        (id, rx)
    }

    async fn recv_snapshot(rx: &mut Receiver) -> Value {
        let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for broadcast")
            .expect("outbound queue closed");
        match msg {
            Message::Text(text) => serde_json::from_str(&text).expect("snapshot should be JSON"),
            other => panic!("expected text frame, got: {:?}", other),
        }
    }

    async fn wait_for_len(registry: &ClientRegistry, len: usize) {
        for _ in 0..100 {
            if registry.len() == len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("registry never converged to {} members", len);
    }

    #[tokio::test]
    async fn every_registered_viewer_receives_the_payload() {
        let registry = ClientRegistry::new();
        let (_a, mut rx_a) = register_viewer(&registry);
        let (_b, mut rx_b) = register_viewer(&registry);
        let (_c, mut rx_c) = register_viewer(&registry);

        let broadcaster = Broadcaster::spawn(registry.clone());
        broadcaster.publish(snapshot(&[("alice", 10), ("bob", 5)]));

        let expected = json!([
            {"member": "alice", "score": 10},
            {"member": "bob", "score": 5},
        ]);
        assert_eq!(recv_snapshot(&mut rx_a).await, expected);
        assert_eq!(recv_snapshot(&mut rx_b).await, expected);
        assert_eq!(recv_snapshot(&mut rx_c).await, expected);
    }

    #[tokio::test]
    async fn delivery_failure_evicts_only_the_dead_viewer() {
        let registry = ClientRegistry::new();
        let (_a, mut rx_a) = register_viewer(&registry);
        let (_b, rx_b) = register_viewer(&registry);
        let (_c, mut rx_c) = register_viewer(&registry);

        let broadcaster = Broadcaster::spawn(registry.clone());
        broadcaster.publish(snapshot(&[("alice", 10), ("bob", 5)]));
        let first = recv_snapshot(&mut rx_a).await;
        let _ = recv_snapshot(&mut rx_c).await;

        // B's writer dies: its queue receiver goes away.
        drop(rx_b);

        broadcaster.publish(snapshot(&[("alice", 12), ("bob", 5)]));
        let expected = json!([
            {"member": "alice", "score": 12},
            {"member": "bob", "score": 5},
        ]);
        // The failure on B must not affect A or C.
        assert_eq!(recv_snapshot(&mut rx_a).await, expected);
        assert_eq!(recv_snapshot(&mut rx_c).await, expected);
        assert_ne!(first, expected);

        // B is gone from the registry for all subsequent snapshots.
        wait_for_len(&registry, 2).await;
    }

    #[tokio::test]
    async fn snapshots_arrive_in_publish_order() {
        let registry = ClientRegistry::new();
        let (_a, mut rx_a) = register_viewer(&registry);

        let broadcaster = Broadcaster::spawn(registry.clone());

        let s1 = json!([{"member": "alice", "score": 1}]);
        let s2 = json!([{"member": "alice", "score": 2}]);

        broadcaster.publish(snapshot(&[("alice", 1)]));
        assert_eq!(recv_snapshot(&mut rx_a).await, s1);

        broadcaster.publish(snapshot(&[("alice", 2)]));
        assert_eq!(recv_snapshot(&mut rx_a).await, s2);
    }

    #[tokio::test]
    async fn rapid_publishes_coalesce_but_never_reorder() {
        let registry = ClientRegistry::new();
        let (_a, mut rx_a) = register_viewer(&registry);

        let broadcaster = Broadcaster::spawn(registry.clone());

        // Publish a burst without waiting for delivery. Intermediate
        // snapshots may be skipped; the last one must arrive, and nothing
        // may arrive out of publish order.
        for score in 1..=20 {
            broadcaster.publish(snapshot(&[("alice", score)]));
        }

        let mut last_seen = 0;
        loop {
            let value = recv_snapshot(&mut rx_a).await;
            let score = value[0]["score"].as_i64().unwrap();
            assert!(score > last_seen, "snapshot for {} arrived after {}", score, last_seen);
            last_seen = score;
            if score == 20 {
                break;
            }
        }
    }

    #[tokio::test]
    async fn late_viewer_receives_only_future_snapshots() {
        let registry = ClientRegistry::new();
        let (_a, mut rx_a) = register_viewer(&registry);

        let broadcaster = Broadcaster::spawn(registry.clone());
        broadcaster.publish(snapshot(&[("alice", 1)]));
        let _ = recv_snapshot(&mut rx_a).await;

        // A viewer registering after delivery sees nothing until the next
        // publish.
        let (_b, mut rx_b) = register_viewer(&registry);
        broadcaster.publish(snapshot(&[("alice", 2)]));
        let value = recv_snapshot(&mut rx_b).await;
        assert_eq!(value[0]["score"].as_i64().unwrap(), 2);
    }
}

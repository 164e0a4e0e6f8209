//! # Reward scheduler
//!
//! Single tokio task driving the engine at a fixed period. Shutdown is a
//! `watch` flag observed both between ticks and, via `tick_until`, between
//! posts inside a tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::engine::RewardEngine;

/// Runs until `shutdown` turns true. The first pass happens one full period
/// after startup.
pub async fn run_scheduler(
    engine: Arc<RewardEngine>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // tokio intervals fire immediately; swallow the first tick
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let summary = engine.tick_until(|| *shutdown.borrow());
                tracing::info!(
                    rewarded = summary.rewarded,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "reward tick complete"
                );
                if *shutdown.borrow() {
                    return;
                }
            }
            changed = shutdown.changed() => {
                // a dropped sender means nobody can ever request shutdown;
                // treat it the same as one
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardConfig;
    use winsome_core::Vote;
    use winsome_state::{PostIds, PostStore, WalletLedger};

    #[tokio::test]
    async fn test_scheduler_ticks_and_stops() {
        let posts = Arc::new(PostStore::new(Arc::new(PostIds::new())));
        let ledger = Arc::new(WalletLedger::new());
        let engine = Arc::new(RewardEngine::new(
            Arc::clone(&posts),
            Arc::clone(&ledger),
            RewardConfig::default(),
        ));

        let id = posts.create_original("alice", "Hi", "World").unwrap();
        posts.vote(id, "bob", Vote::Up).unwrap();

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(run_scheduler(engine, Duration::from_millis(10), rx));

        // wait for at least one tick to land a transaction
        for _ in 0..100 {
            if ledger.transaction_count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(ledger.transaction_count() > 0);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler did not stop on shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_stops_when_sender_is_dropped() {
        let posts = Arc::new(PostStore::new(Arc::new(PostIds::new())));
        let ledger = Arc::new(WalletLedger::new());
        let engine = Arc::new(RewardEngine::new(posts, ledger, RewardConfig::default()));

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(run_scheduler(engine, Duration::from_secs(60), rx));
        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler did not stop after its sender vanished")
            .unwrap();
    }
}

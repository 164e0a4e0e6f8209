//! Daemon-shaped lifecycle: engagement flowing in while the scheduler runs,
//! graceful shutdown, snapshot, restart.

use std::sync::Arc;
use std::time::Duration;

use integration_tests::state_with_users;
use tokio::sync::watch;
use winsome_core::{NoopNotifier, Vote};
use winsome_rewards::{run_scheduler, RewardConfig, RewardEngine};

#[tokio::test(flavor = "multi_thread")]
async fn engagement_is_rewarded_then_survives_restart() {
    let state = Arc::new(state_with_users(&["alice", "bob"]));
    let engine = Arc::new(RewardEngine::new(
        Arc::clone(&state.posts),
        Arc::clone(&state.wallet),
        RewardConfig::new(0.7).unwrap(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(run_scheduler(
        Arc::clone(&engine),
        Duration::from_millis(20),
        shutdown_rx,
    ));

    let id = state.posts.create_original("alice", "Hi", "World").unwrap();
    state.posts.vote(id, "bob", Vote::Up).unwrap();
    state.posts.comment(id, "bob", "nice").unwrap();

    // wait until the scheduler has converted the engagement
    for _ in 0..200 {
        if state.wallet.transaction_count() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(state.wallet.wallet_of("alice").total > 0.0);
    assert!(state.wallet.wallet_of("bob").total > 0.0);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), scheduler)
        .await
        .expect("scheduler did not shut down")
        .unwrap();

    // sweep whatever the scheduler had not seen yet, then snapshot,
    // restart, and make sure nothing is paid twice
    engine.tick();
    let bytes = winsome_persist::encode(&state).unwrap();
    let restored = winsome_persist::decode(&bytes, Box::new(NoopNotifier)).unwrap();

    let restored_engine = RewardEngine::new(
        Arc::clone(&restored.posts),
        Arc::clone(&restored.wallet),
        RewardConfig::new(0.7).unwrap(),
    );
    let before = restored.wallet.transaction_count();
    restored_engine.tick();
    assert_eq!(restored.wallet.transaction_count(), before);
}

//! Snapshot round trips across every component, including reward-engine
//! bookkeeping and one-shot flags.

use integration_tests::{engine_for, state_with_users};
use winsome_core::{AppError, NoopNotifier, Vote};

fn populated() -> winsome_state::SocialState {
    let state = state_with_users(&["alice", "bob", "carol"]);

    let post = state.posts.create_original("alice", "Hi", "World").unwrap();
    state.posts.vote(post, "bob", Vote::Up).unwrap();
    state.posts.vote(post, "carol", Vote::Down).unwrap();
    state.posts.comment(post, "bob", "first").unwrap();
    state.posts.create_rewin(post, "carol").unwrap();
    state.follows.follow("bob", "alice").unwrap();
    state.follows.follow("carol", "alice").unwrap();

    // run one reward tick so counters, consumed flags and wallets are
    // all non-trivial in the snapshot
    engine_for(&state).tick();
    state
}

#[test]
fn full_state_survives_a_round_trip() {
    let state = populated();
    let bytes = winsome_persist::encode(&state).unwrap();
    let restored = winsome_persist::decode(&bytes, Box::new(NoopNotifier)).unwrap();

    // deterministic encoding makes equality checkable at the byte level
    assert_eq!(winsome_persist::encode(&restored).unwrap(), bytes);

    assert_eq!(restored.users.list(), state.users.list());
    assert_eq!(restored.posts.export(), state.posts.export());
    assert_eq!(restored.follows.export(), state.follows.export());
    assert_eq!(restored.wallet.export(), state.wallet.export());
}

#[test]
fn restored_engine_does_not_recount_consumed_engagement() {
    let state = populated();
    let bytes = winsome_persist::encode(&state).unwrap();
    let restored = winsome_persist::decode(&bytes, Box::new(NoopNotifier)).unwrap();

    // everything was rewarded before the snapshot; a tick on the restored
    // state must be a pure no-op
    let before = restored.wallet.transaction_count();
    let summary = engine_for(&restored).tick();
    assert_eq!(summary.rewarded, 0);
    assert_eq!(restored.wallet.transaction_count(), before);
}

#[test]
fn restored_ids_continue_past_snapshot_maximum() {
    let state = populated();
    let bytes = winsome_persist::encode(&state).unwrap();
    let restored = winsome_persist::decode(&bytes, Box::new(NoopNotifier)).unwrap();

    // snapshot contained posts 1 (original) and 2 (rewin)
    let fresh = restored.posts.create_original("bob", "Next", "post").unwrap();
    assert_eq!(fresh, 3);
}

#[test]
fn truncated_snapshot_is_fatal() {
    let state = populated();
    let mut bytes = winsome_persist::encode(&state).unwrap();
    bytes.truncate(bytes.len() / 2);
    let err = winsome_persist::decode(&bytes, Box::new(NoopNotifier)).unwrap_err();
    assert!(matches!(err, AppError::Snapshot(_)));
}

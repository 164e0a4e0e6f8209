//! Shared fixtures for the integration suite.

use std::sync::Arc;

use winsome_core::{FollowNotifier, NoopNotifier};
use winsome_rewards::{RewardConfig, RewardEngine};
use winsome_state::SocialState;

/// Fresh state with the given users registered under a shared "sport" tag.
pub fn state_with_users(names: &[&str]) -> SocialState {
    state_with_users_and_notifier(names, Box::new(NoopNotifier))
}

pub fn state_with_users_and_notifier(
    names: &[&str],
    notifier: Box<dyn FollowNotifier>,
) -> SocialState {
    let state = SocialState::new(notifier);
    for name in names {
        state
            .users
            .register(name, "hash", &["sport".into()])
            .expect("fixture user");
    }
    state
}

/// Engine over the state's stores with the default 0.7 author share.
pub fn engine_for(state: &SocialState) -> RewardEngine {
    RewardEngine::new(
        Arc::clone(&state.posts),
        Arc::clone(&state.wallet),
        RewardConfig::default(),
    )
}

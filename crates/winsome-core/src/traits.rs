//! # Core Traits (Ports)
//!
//! The follow graph talks to the outside world only through these contracts.

use crate::models::FollowEvent;

/// Receives one event per successful follow/unfollow. Implementations must be
/// cheap and non-blocking: the graph calls this outside its critical section
/// but still on the request path. Delivery to remote listeners is the
/// excluded callback layer's job.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait FollowNotifier: Send + Sync {
    fn notify(&self, event: &FollowEvent);
}

/// Default sink for deployments (and tests) that do not care about
/// follower-change callbacks.
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl FollowNotifier for NoopNotifier {
    fn notify(&self, _event: &FollowEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FollowChange;

    #[test]
    fn test_mock_notifier_observes_event() {
        let mut mock = MockFollowNotifier::new();
        mock.expect_notify()
            .withf(|ev| ev.follower == "alice" && ev.change == FollowChange::Added)
            .times(1)
            .return_const(());

        mock.notify(&FollowEvent {
            follower: "alice".into(),
            followee: "bob".into(),
            change: FollowChange::Added,
        });
    }
}

//! winsome/crates/winsome-core/src/lib.rs
//!
//! The central domain types and interface definitions for WINSOME.

pub mod models;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;

#[cfg(test)]
mod tests {
    use super::models::*;

    #[test]
    fn test_follow_event_shape() {
        let ev = FollowEvent {
            follower: "alice".to_string(),
            followee: "bob".to_string(),
            change: FollowChange::Added,
        };
        assert_eq!(ev.change, FollowChange::Added);
        assert_eq!(ev.follower, "alice");
    }
}

//! winsome/crates/winsome-state/src/lib.rs
//!
//! The live, concurrently mutated state of a WINSOME node: the post store,
//! the user directory, the follow graph, the wallet ledger, and the injected
//! post-ID generator. Request handlers call straight into these structures;
//! each one guards only its own invariant, so no operation ever holds a lock
//! spanning more than one post or one follow-edge pair.

pub mod ids;
pub mod users;
pub mod posts;
pub mod follows;
pub mod wallet;
pub mod state;

pub use ids::PostIds;
pub use users::UserDirectory;
pub use posts::{Comment, CommentEntry, OriginalPost, Post, PostRecord, PostStore, VoteEntry, VoteRecord};
pub use follows::{FollowEdge, FollowGraph};
pub use wallet::{WalletLedger, WalletRecord};
pub use state::SocialState;

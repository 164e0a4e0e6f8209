//! # Domain Models
//!
//! These structs represent the core entities of WINSOME: users with their
//! interest tags, read-only views over posts, wallet transactions, and the
//! follow-change event handed to the notification port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post identifiers are monotonically increasing integers handed out by a
/// single injected generator; they are never reused, even across restarts.
pub type PostId = u64;

/// Maximum number of interest tags a user may register with.
pub const MAX_TAGS: usize = 5;
/// Maximum length of a post title, in characters.
pub const MAX_TITLE_LEN: usize = 20;
/// Maximum length of post contents, in characters.
pub const MAX_CONTENTS_LEN: usize = 500;

/// A registered user. Immutable after sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Argon2 PHC string produced by the transport-side hasher;
    /// the core never sees plaintext credentials.
    pub password_hash: String,
    /// 1..=5 lowercase interest tags. Two users may see each other only if
    /// their tag sets intersect.
    pub tags: Vec<String>,
}

impl User {
    /// True if `self` and `other` share at least one interest tag.
    pub fn shares_tag_with(&self, other: &User) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }
}

/// The two possible ratings a user can place on a post. First vote wins;
/// votes are never changed or withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn is_up(self) -> bool {
        matches!(self, Vote::Up)
    }
}

/// Read-only view over a post, detached from the live store. For a rewin the
/// title/contents/author come from the aliased original while `id` stays the
/// rewin's own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub author: String,
    pub title: String,
    pub contents: String,
    pub upvotes: usize,
    pub downvotes: usize,
    pub comments: usize,
}

/// Detached copy of a single comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub author: String,
    pub contents: String,
}

/// One Wincoin credit produced by the reward engine. Append-only; amounts
/// may be fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub username: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Detached copy of a user's wallet: running total plus ordered history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletView {
    pub total: f64,
    pub history: Vec<Transaction>,
}

/// Direction of a follow-graph mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowChange {
    Added,
    Removed,
}

/// Event emitted on every successful follow/unfollow. The excluded callback
/// layer forwards these to interested remote listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEvent {
    pub follower: String,
    pub followee: String,
    pub change: FollowChange,
}

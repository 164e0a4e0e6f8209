//! winsome/crates/winsome-persist/src/lib.rs
//!
//! Snapshot codec: the entire node state (users, posts, follow edges, wallet
//! histories) to and from a versioned, self-describing JSON byte stream. The
//! caller supplies the concrete stream and the timing (startup restore,
//! periodic checkpoint, shutdown); this crate only encodes, decodes, and
//! enforces structural consistency.
//!
//! Decode order matters: users first, then originals, then rewins resolved
//! against them, then follow edges validated against the directory. The post
//! ID generator is seeded one past the maximum restored ID before the state
//! is handed out, so fresh IDs can never collide with snapshotted ones.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use winsome_core::{AppError, FollowNotifier, Result, User};
use winsome_state::{
    FollowEdge, FollowGraph, PostIds, PostRecord, PostStore, SocialState, UserDirectory,
    WalletLedger, WalletRecord,
};

/// Bumped whenever the snapshot layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub users: Vec<User>,
    pub posts: Vec<PostRecord>,
    pub follows: Vec<FollowEdge>,
    pub wallets: Vec<WalletRecord>,
}

/// Serializes the full state. Records are exported sorted, so encoding the
/// same state twice yields identical bytes.
pub fn encode(state: &SocialState) -> Result<Vec<u8>> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        users: state.users.list(),
        posts: state.posts.export(),
        follows: state.follows.export(),
        wallets: state.wallet.export(),
    };
    serde_json::to_vec_pretty(&snapshot)
        .map_err(|err| AppError::Snapshot(format!("encoding failed: {err}")))
}

/// Rebuilds a full state from snapshot bytes. Any structural inconsistency
/// is an error; at startup the caller must treat it as fatal rather than run
/// with a partial state.
pub fn decode(bytes: &[u8], notifier: Box<dyn FollowNotifier>) -> Result<SocialState> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)
        .map_err(|err| AppError::Snapshot(format!("malformed snapshot: {err}")))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(AppError::Snapshot(format!(
            "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
            snapshot.version
        )));
    }

    let users = Arc::new(UserDirectory::new());
    for user in snapshot.users {
        users.restore(user)?;
    }

    let ids = Arc::new(PostIds::new());
    let posts = PostStore::import(snapshot.posts, Arc::clone(&ids))?;

    let follows = FollowGraph::with_notifier(Arc::clone(&users), notifier);
    follows.import(snapshot.follows)?;

    let wallet = WalletLedger::import(snapshot.wallets);

    tracing::info!(
        users = users.list().len(),
        posts = posts.len(),
        next_post_id = ids.peek(),
        "state restored from snapshot"
    );
    Ok(SocialState::from_parts(ids, users, posts, follows, wallet))
}

//! # Assembled node state
//!
//! Thin aggregator the binary and the snapshot codec work with. Components
//! stay independently owned; nothing here adds synchronization.

use std::sync::Arc;

use winsome_core::FollowNotifier;

use crate::follows::FollowGraph;
use crate::ids::PostIds;
use crate::posts::PostStore;
use crate::users::UserDirectory;
use crate::wallet::WalletLedger;

#[derive(Debug)]
pub struct SocialState {
    pub ids: Arc<PostIds>,
    pub users: Arc<UserDirectory>,
    pub posts: Arc<PostStore>,
    pub follows: Arc<FollowGraph>,
    pub wallet: Arc<WalletLedger>,
}

impl SocialState {
    /// Fresh, empty state with IDs starting at 1.
    pub fn new(notifier: Box<dyn FollowNotifier>) -> Self {
        let ids = Arc::new(PostIds::new());
        let users = Arc::new(UserDirectory::new());
        Self {
            posts: Arc::new(PostStore::new(Arc::clone(&ids))),
            follows: Arc::new(FollowGraph::with_notifier(Arc::clone(&users), notifier)),
            wallet: Arc::new(WalletLedger::new()),
            ids,
            users,
        }
    }

    /// Reassembles state from already-imported components (snapshot restore).
    pub fn from_parts(
        ids: Arc<PostIds>,
        users: Arc<UserDirectory>,
        posts: PostStore,
        follows: FollowGraph,
        wallet: WalletLedger,
    ) -> Self {
        Self {
            ids,
            users,
            posts: Arc::new(posts),
            follows: Arc::new(follows),
            wallet: Arc::new(wallet),
        }
    }
}

//! # Post store
//!
//! The concurrent post/engagement state machine. Posts come in two variants
//! sharing one capability set: an `Original` owns all engagement state, a
//! `Rewin` is a pure redirect to its root original (rewins never chain — a
//! rewin of a rewin aliases the same root). Every engagement structure is
//! guarded per post, so request handlers never contend across posts and no
//! lock ordering between posts exists.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};
use winsome_core::{
    AppError, CommentView, PostId, PostSummary, Result, Vote, MAX_CONTENTS_LEN, MAX_TITLE_LEN,
};

use crate::ids::PostIds;

/// A single immutable comment plus its one-shot reward flag.
#[derive(Debug)]
pub struct Comment {
    author: String,
    contents: String,
    consumed: AtomicBool,
}

impl Comment {
    fn new(author: &str, contents: &str) -> Self {
        Self {
            author: author.to_string(),
            contents: contents.to_string(),
            consumed: AtomicBool::new(false),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Claims this comment for reward counting. Returns true for exactly one
    /// caller, ever; the compare-and-set keeps this true even if reward ticks
    /// are ever parallelized.
    pub fn consume(&self) -> bool {
        self.consumed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }

    pub fn view(&self) -> CommentView {
        CommentView {
            author: self.author.clone(),
            contents: self.contents.clone(),
        }
    }
}

/// A recorded vote plus its one-shot curator-attribution flag.
#[derive(Debug)]
pub struct VoteRecord {
    value: Vote,
    counted: AtomicBool,
}

impl VoteRecord {
    fn new(value: Vote) -> Self {
        Self {
            value,
            counted: AtomicBool::new(false),
        }
    }

    pub fn value(&self) -> Vote {
        self.value
    }

    /// One-shot claim, same contract as [`Comment::consume`].
    pub fn consume(&self) -> bool {
        self.counted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// An author-owned post with all of its engagement state.
#[derive(Debug)]
pub struct OriginalPost {
    id: PostId,
    author: String,
    title: String,
    contents: String,
    /// voter → vote; insert-if-absent is the whole concurrency story for
    /// "one vote per user, first vote wins".
    votes: DashMap<String, VoteRecord>,
    /// Append-only; ordering among concurrent appends is whatever the write
    /// lock serializes.
    comments: RwLock<Vec<Arc<Comment>>>,
    /// Users that rewinned this post, deduplicated.
    rewinners: DashSet<String>,
    /// Upvote count already converted into rewards.
    old_upvotes: AtomicU64,
    /// Number of reward ticks that produced a transaction for this post.
    iterations: AtomicU64,
}

impl OriginalPost {
    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn upvotes(&self) -> u64 {
        self.votes.iter().filter(|v| v.value().value.is_up()).count() as u64
    }

    pub fn downvotes(&self) -> u64 {
        self.votes.iter().filter(|v| !v.value().value.is_up()).count() as u64
    }

    pub fn old_upvotes(&self) -> u64 {
        self.old_upvotes.load(Ordering::Acquire)
    }

    pub fn set_old_upvotes(&self, value: u64) {
        self.old_upvotes.store(value, Ordering::Release);
    }

    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Acquire)
    }

    pub fn bump_iterations(&self) {
        self.iterations.fetch_add(1, Ordering::AcqRel);
    }

    /// Claims every not-yet-counted up-vote and returns the voters, for
    /// curator attribution. Down-votes never become curators.
    pub fn consume_fresh_upvoters(&self) -> Vec<String> {
        self.votes
            .iter()
            .filter(|entry| entry.value().value.is_up() && entry.value().consume())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Claims every unconsumed comment and returns the authors.
    pub fn consume_fresh_comment_authors(&self) -> Vec<String> {
        self.comments_snapshot()
            .iter()
            .filter(|c| c.consume())
            .map(|c| c.author().to_string())
            .collect()
    }

    pub fn comments_snapshot(&self) -> Vec<Arc<Comment>> {
        self.read_comments().clone()
    }

    fn read_comments(&self) -> RwLockReadGuard<'_, Vec<Arc<Comment>>> {
        self.comments.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_comments(&self) -> RwLockWriteGuard<'_, Vec<Arc<Comment>>> {
        self.comments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A post: either author-owned engagement state, or a redirect to it.
#[derive(Debug)]
pub enum Post {
    Original(OriginalPost),
    Rewin {
        id: PostId,
        rewinner: String,
        original_id: PostId,
    },
}

impl Post {
    pub fn id(&self) -> PostId {
        match self {
            Post::Original(orig) => orig.id,
            Post::Rewin { id, .. } => *id,
        }
    }

    pub fn as_original(&self) -> Option<&OriginalPost> {
        match self {
            Post::Original(orig) => Some(orig),
            Post::Rewin { .. } => None,
        }
    }
}

/// Serializable form of a post for the snapshot codec. Internally tagged so
/// the format stays self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostRecord {
    Original {
        id: PostId,
        author: String,
        title: String,
        contents: String,
        votes: BTreeMap<String, VoteEntry>,
        comments: Vec<CommentEntry>,
        rewinners: BTreeSet<String>,
        old_upvotes: u64,
        iterations: u64,
    },
    Rewin {
        id: PostId,
        rewinner: String,
        original_id: PostId,
    },
}

impl PostRecord {
    pub fn id(&self) -> PostId {
        match self {
            PostRecord::Original { id, .. } | PostRecord::Rewin { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEntry {
    pub value: Vote,
    pub counted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub author: String,
    pub contents: String,
    pub consumed: bool,
}

/// The store owning every post. Keyed by ID; values are shared so readers and
/// the reward engine can work on a post without pinning the map.
#[derive(Debug)]
pub struct PostStore {
    posts: DashMap<PostId, Arc<Post>>,
    ids: Arc<PostIds>,
}

impl PostStore {
    pub fn new(ids: Arc<PostIds>) -> Self {
        Self {
            posts: DashMap::new(),
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Creates a new original post with empty engagement and returns its ID.
    pub fn create_original(&self, author: &str, title: &str, contents: &str) -> Result<PostId> {
        validate_text("title", title, MAX_TITLE_LEN)?;
        validate_text("contents", contents, MAX_CONTENTS_LEN)?;

        let id = self.ids.next();
        self.posts.insert(
            id,
            Arc::new(Post::Original(OriginalPost {
                id,
                author: author.to_string(),
                title: title.to_string(),
                contents: contents.to_string(),
                votes: DashMap::new(),
                comments: RwLock::new(Vec::new()),
                rewinners: DashSet::new(),
                old_upvotes: AtomicU64::new(0),
                iterations: AtomicU64::new(0),
            })),
        );
        Ok(id)
    }

    /// Rewins the original behind `target` (which may itself be a rewin).
    /// The dedup set insert is the linearization point, so two concurrent
    /// rewins by the same user cannot both win.
    pub fn create_rewin(&self, target: PostId, rewinner: &str) -> Result<PostId> {
        let root = self.root_of(target)?;
        let orig = expect_original(&root)?;
        if orig.author == rewinner {
            return Err(AppError::RewinOwnPost {
                post: orig.id,
                author: rewinner.to_string(),
            });
        }
        if !orig.rewinners.insert(rewinner.to_string()) {
            return Err(AppError::DuplicateRewin {
                post: orig.id,
                rewinner: rewinner.to_string(),
            });
        }

        let id = self.ids.next();
        self.posts.insert(
            id,
            Arc::new(Post::Rewin {
                id,
                rewinner: rewinner.to_string(),
                original_id: orig.id,
            }),
        );
        // delete() may have removed the root between resolution and this
        // insert; its rewin sweep cannot see the new entry, so undo it here
        // rather than leave a dangling record behind.
        if !self.posts.contains_key(&orig.id) {
            self.posts.remove(&id);
            orig.rewinners.remove(rewinner);
            return Err(AppError::UnknownPost(target));
        }
        Ok(id)
    }

    /// Records `voter`'s one and only vote on the post behind `id`.
    /// The map entry insert-if-absent makes concurrent first votes race
    /// safely: exactly one wins, the rest get `AlreadyVoted`.
    pub fn vote(&self, id: PostId, voter: &str, value: Vote) -> Result<()> {
        let root = self.root_of(id)?;
        let orig = expect_original(&root)?;
        match orig.votes.entry(voter.to_string()) {
            Entry::Occupied(_) => {
                return Err(AppError::AlreadyVoted {
                    post: orig.id,
                    voter: voter.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(VoteRecord::new(value));
            }
        }
        Ok(())
    }

    /// Appends a comment to the post behind `id`. Authors cannot comment
    /// their own posts.
    pub fn comment(&self, id: PostId, author: &str, contents: &str) -> Result<()> {
        validate_text("comment", contents, MAX_CONTENTS_LEN)?;
        let root = self.root_of(id)?;
        let orig = expect_original(&root)?;
        if orig.author == author {
            return Err(AppError::CommentOnOwnPost {
                post: orig.id,
                author: author.to_string(),
            });
        }
        orig.write_comments()
            .push(Arc::new(Comment::new(author, contents)));
        Ok(())
    }

    /// The usernames that placed `value` votes on the post behind `id`,
    /// sorted. Independent copy.
    pub fn list_voters(&self, id: PostId, value: Vote) -> Result<Vec<String>> {
        let root = self.root_of(id)?;
        let orig = expect_original(&root)?;
        let mut out: Vec<String> = orig
            .votes
            .iter()
            .filter(|v| v.value().value == value)
            .map(|v| v.key().clone())
            .collect();
        out.sort();
        Ok(out)
    }

    /// The comments of the post behind `id`, in insertion order.
    /// A rewin lists exactly its root's comments.
    pub fn list_comments(&self, id: PostId) -> Result<Vec<CommentView>> {
        let root = self.root_of(id)?;
        let orig = expect_original(&root)?;
        let views: Vec<CommentView> = orig.read_comments().iter().map(|c| c.view()).collect();
        Ok(views)
    }

    /// Detached summary of the post behind `id`. A rewin reports its own ID
    /// over the root's author/title/contents and tallies.
    pub fn summary(&self, id: PostId) -> Result<PostSummary> {
        let root = self.root_of(id)?;
        let orig = expect_original(&root)?;
        let comments = orig.read_comments().len();
        Ok(PostSummary {
            id,
            author: orig.author.clone(),
            title: orig.title.clone(),
            contents: orig.contents.clone(),
            upvotes: orig.upvotes() as usize,
            downvotes: orig.downvotes() as usize,
            comments,
        })
    }

    /// Deletes the original behind `id` (rewin IDs resolve to their root).
    /// Only the root author may delete; every rewin of the root is swept so
    /// later reads of them fail not-found.
    pub fn delete(&self, id: PostId, requester: &str) -> Result<()> {
        let root = self.root_of(id)?;
        let orig = expect_original(&root)?;
        if orig.author != requester {
            return Err(AppError::NotPostOwner(orig.id, requester.to_string()));
        }
        let root_id = orig.id;
        self.posts.remove(&root_id);
        self.posts.retain(|_, post| {
            !matches!(&**post, Post::Rewin { original_id, .. } if *original_id == root_id)
        });
        tracing::debug!(post = root_id, by = requester, "deleted original and swept its rewins");
        Ok(())
    }

    /// Shared handles to every original post, sorted by ID. The reward engine
    /// iterates this without pinning the map.
    pub fn originals(&self) -> Vec<Arc<Post>> {
        let mut out: Vec<Arc<Post>> = self
            .posts
            .iter()
            .filter(|p| matches!(&**p.value(), Post::Original(_)))
            .map(|p| Arc::clone(p.value()))
            .collect();
        out.sort_by_key(|p| p.id());
        out
    }

    /// Resolves `id` to its root original in at most one hop. A rewin whose
    /// root has been deleted is invalidated: the lookup fails with the
    /// requested ID.
    fn root_of(&self, id: PostId) -> Result<Arc<Post>> {
        let post = self.get_arc(id)?;
        match &*post {
            Post::Original(_) => Ok(post),
            Post::Rewin { original_id, .. } => {
                let root = self
                    .get_arc(*original_id)
                    .map_err(|_| AppError::UnknownPost(id))?;
                match &*root {
                    Post::Original(_) => Ok(root),
                    Post::Rewin { .. } => Err(AppError::Internal(format!(
                        "rewin {id} does not resolve to an original"
                    ))),
                }
            }
        }
    }

    fn get_arc(&self, id: PostId) -> Result<Arc<Post>> {
        self.posts
            .get(&id)
            .map(|p| Arc::clone(p.value()))
            .ok_or(AppError::UnknownPost(id))
    }

    /// Serializable records for the snapshot codec, sorted by ID so encoding
    /// is deterministic.
    pub fn export(&self) -> Vec<PostRecord> {
        let mut out: Vec<PostRecord> = self
            .posts
            .iter()
            .map(|entry| match &**entry.value() {
                Post::Original(orig) => PostRecord::Original {
                    id: orig.id,
                    author: orig.author.clone(),
                    title: orig.title.clone(),
                    contents: orig.contents.clone(),
                    votes: orig
                        .votes
                        .iter()
                        .map(|v| {
                            (
                                v.key().clone(),
                                VoteEntry {
                                    value: v.value().value,
                                    counted: v.value().counted.load(Ordering::Acquire),
                                },
                            )
                        })
                        .collect(),
                    comments: orig
                        .read_comments()
                        .iter()
                        .map(|c| CommentEntry {
                            author: c.author.clone(),
                            contents: c.contents.clone(),
                            consumed: c.is_consumed(),
                        })
                        .collect(),
                    rewinners: orig.rewinners.iter().map(|r| r.key().clone()).collect(),
                    old_upvotes: orig.old_upvotes(),
                    iterations: orig.iterations(),
                },
                Post::Rewin {
                    id,
                    rewinner,
                    original_id,
                } => PostRecord::Rewin {
                    id: *id,
                    rewinner: rewinner.clone(),
                    original_id: *original_id,
                },
            })
            .collect();
        out.sort_by_key(|r| r.id());
        out
    }

    /// Rebuilds a store from snapshot records: all originals first, then each
    /// rewin resolved against them. Any dangling or mismatched reference is a
    /// structural error. The ID generator is seeded past the maximum ID seen
    /// before the store is handed out.
    pub fn import(records: Vec<PostRecord>, ids: Arc<PostIds>) -> Result<Self> {
        let store = Self::new(Arc::clone(&ids));
        let mut max_id = 0;

        for record in &records {
            max_id = max_id.max(record.id());
            if let PostRecord::Original {
                id,
                author,
                title,
                contents,
                votes,
                comments,
                rewinners,
                old_upvotes,
                iterations,
            } = record
            {
                let orig = OriginalPost {
                    id: *id,
                    author: author.clone(),
                    title: title.clone(),
                    contents: contents.clone(),
                    votes: votes
                        .iter()
                        .map(|(voter, entry)| {
                            (
                                voter.clone(),
                                VoteRecord {
                                    value: entry.value,
                                    counted: AtomicBool::new(entry.counted),
                                },
                            )
                        })
                        .collect(),
                    comments: RwLock::new(
                        comments
                            .iter()
                            .map(|c| {
                                Arc::new(Comment {
                                    author: c.author.clone(),
                                    contents: c.contents.clone(),
                                    consumed: AtomicBool::new(c.consumed),
                                })
                            })
                            .collect(),
                    ),
                    rewinners: rewinners.iter().cloned().collect(),
                    old_upvotes: AtomicU64::new(*old_upvotes),
                    iterations: AtomicU64::new(*iterations),
                };
                if orig.upvotes() < orig.old_upvotes() {
                    return Err(AppError::Snapshot(format!(
                        "post {id}: rewarded upvote count ahead of recorded votes"
                    )));
                }
                if store
                    .posts
                    .insert(*id, Arc::new(Post::Original(orig)))
                    .is_some()
                {
                    return Err(AppError::Snapshot(format!("duplicate post id {id}")));
                }
            }
        }

        for record in records {
            if let PostRecord::Rewin {
                id,
                rewinner,
                original_id,
            } = record
            {
                let root = store.posts.get(&original_id).map(|p| Arc::clone(p.value()));
                let Some(root) = root else {
                    return Err(AppError::Snapshot(format!(
                        "rewin {id} references missing post {original_id}"
                    )));
                };
                let orig = root.as_original().ok_or_else(|| {
                    AppError::Snapshot(format!(
                        "rewin {id} references non-original post {original_id}"
                    ))
                })?;
                if !orig.rewinners.contains(&rewinner) {
                    return Err(AppError::Snapshot(format!(
                        "rewin {id} by `{rewinner}` is not recorded on post {original_id}"
                    )));
                }
                if store
                    .posts
                    .insert(
                        id,
                        Arc::new(Post::Rewin {
                            id,
                            rewinner,
                            original_id,
                        }),
                    )
                    .is_some()
                {
                    return Err(AppError::Snapshot(format!("duplicate post id {id}")));
                }
            }
        }

        ids.seed_past(max_id);
        Ok(store)
    }
}

fn expect_original(post: &Arc<Post>) -> Result<&OriginalPost> {
    post.as_original()
        .ok_or_else(|| AppError::Internal(format!("post {} is not an original", post.id())))
}

fn validate_text(field: &str, text: &str, max_len: usize) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if text.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{field} exceeds {max_len} characters"
        )));
    }
    Ok(())
}

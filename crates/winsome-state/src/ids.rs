//! # Post ID generator
//!
//! The single process-wide shared counter. Explicitly owned and injected into
//! the [`PostStore`](crate::posts::PostStore) at construction rather than
//! living in a static, so tests can run isolated instances and restore can
//! reseed it before any ID is issued.

use std::sync::atomic::{AtomicU64, Ordering};

use winsome_core::PostId;

/// Monotonically increasing source of post IDs, starting at 1.
#[derive(Debug)]
pub struct PostIds {
    next: AtomicU64,
}

impl PostIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: PostId) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocates a fresh ID. Plain atomic increment; no other synchronization
    /// is needed anywhere in the process for ID uniqueness.
    pub fn next(&self) -> PostId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Repositions the counter to `max_seen + 1`. Called once after snapshot
    /// restore, before any further IDs are issued; moving it backwards would
    /// risk ID collisions and is refused.
    pub fn seed_past(&self, max_seen: PostId) {
        self.next.fetch_max(max_seen + 1, Ordering::Relaxed);
    }

    /// The ID the next call to [`next`](Self::next) would return.
    pub fn peek(&self) -> PostId {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for PostIds {
    fn default() -> Self {
        Self::new()
    }
}

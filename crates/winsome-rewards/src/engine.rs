//! # Reward engine
//!
//! One tick walks every original post and converts its new engagement into
//! transactions. Each post's steps are the unit of atomicity: a fault in one
//! post is logged and skipped, and an interruption request takes effect only
//! between posts, so no post is ever left with transactions partially
//! emitted.

use std::collections::BTreeSet;
use std::sync::Arc;

use winsome_core::{AppError, Result};
use winsome_state::{OriginalPost, PostStore, WalletLedger};

use crate::config::RewardConfig;

/// The reward for one post in one tick. Logarithmic damping keeps repeated
/// engagement sub-linear; the value is zero exactly when there is no new
/// engagement and strictly increases with more distinct engagement.
pub fn reward_value(delta_up: u64, curators: usize) -> f64 {
    (1.0 + delta_up as f64).ln() + (1.0 + curators as f64).ln()
}

/// Outcome counts of one engine pass, for the scheduler's log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub rewarded: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct RewardEngine {
    posts: Arc<PostStore>,
    ledger: Arc<WalletLedger>,
    config: RewardConfig,
}

impl RewardEngine {
    pub fn new(posts: Arc<PostStore>, ledger: Arc<WalletLedger>, config: RewardConfig) -> Self {
        Self {
            posts,
            ledger,
            config,
        }
    }

    /// Runs one full pass over all original posts.
    pub fn tick(&self) -> TickSummary {
        self.tick_until(|| false)
    }

    /// Runs a pass, checking `interrupted` between posts so a shutdown never
    /// cuts a post's reward computation in half.
    pub fn tick_until(&self, mut interrupted: impl FnMut() -> bool) -> TickSummary {
        let mut summary = TickSummary::default();
        for post in self.posts.originals() {
            if interrupted() {
                tracing::info!("reward tick interrupted, remaining posts deferred");
                break;
            }
            let Some(orig) = post.as_original() else {
                continue;
            };
            match self.reward_post(orig) {
                Ok(true) => summary.rewarded += 1,
                Ok(false) => summary.skipped += 1,
                Err(err) => {
                    summary.failed += 1;
                    tracing::warn!(post = orig.id(), %err, "skipping post in reward tick");
                }
            }
        }
        summary
    }

    /// Steps 1-5 for a single post. A vote arriving mid-computation is
    /// counted in this tick or the next, but in exactly one.
    fn reward_post(&self, post: &OriginalPost) -> Result<bool> {
        let current = post.upvotes();
        let old = post.old_upvotes();
        if current < old {
            return Err(AppError::Internal(format!(
                "post {}: rewarded upvote count {old} ahead of current {current}",
                post.id()
            )));
        }
        let delta_up = current - old;

        // Consuming flips each comment's one-shot flag, so a comment can
        // never fund a reward twice even across concurrent ticks.
        let commenters = post.consume_fresh_comment_authors();
        if delta_up == 0 && commenters.is_empty() {
            // No-op tick: no transaction, no bookkeeping mutation.
            return Ok(false);
        }

        let mut curators: BTreeSet<String> = commenters.into_iter().collect();
        curators.extend(post.consume_fresh_upvoters());

        let reward = reward_value(delta_up, curators.len());
        if curators.is_empty() {
            // delta_up > 0 but every fresh voter was already attributed in an
            // earlier tick's race window; nobody is left to split with.
            self.ledger.credit(post.author(), reward);
        } else {
            let author_cut = reward * self.config.author_share;
            self.ledger.credit(post.author(), author_cut);
            let curator_cut = (reward - author_cut) / curators.len() as f64;
            for curator in &curators {
                self.ledger.credit(curator, curator_cut);
            }
        }

        post.set_old_upvotes(current);
        post.bump_iterations();
        tracing::debug!(
            post = post.id(),
            delta_up,
            curators = curators.len(),
            reward,
            "distributed post reward"
        );
        Ok(true)
    }
}

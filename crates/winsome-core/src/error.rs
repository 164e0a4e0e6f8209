//! # AppError
//!
//! Centralized error handling for the WINSOME ecosystem.
//! Every operation-level failure is returned to the caller as a typed value;
//! the transport layer maps [`ErrorKind`] onto wire response codes. Only
//! [`AppError::Snapshot`] during startup restore is fatal to the process.

use crate::models::PostId;
use thiserror::Error;

/// The primary error type for all winsome-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Validation failure (empty/oversized title or contents, bad tag list)
    #[error("validation error: {0}")]
    Validation(String),

    /// No registered user under that name
    #[error("user `{0}` not found")]
    UnknownUser(String),

    /// No post (or an invalidated rewin target) under that ID
    #[error("post {0} not found")]
    UnknownPost(PostId),

    /// Sign-up with a username that is already taken
    #[error("user `{0}` already exists")]
    UserExists(String),

    /// One vote per (voter, post) pair; votes cannot be changed
    #[error("`{voter}` already voted on post {post}")]
    AlreadyVoted { post: PostId, voter: String },

    /// The follow edge is already installed
    #[error("`{follower}` already follows `{followee}`")]
    AlreadyFollowing { follower: String, followee: String },

    /// Unfollow of an edge that does not exist
    #[error("`{follower}` does not follow `{followee}`")]
    NotFollowing { follower: String, followee: String },

    /// Users cannot follow themselves
    #[error("`{0}` cannot follow themselves")]
    SelfFollow(String),

    /// A user may rewin a given original at most once
    #[error("`{rewinner}` already rewinned post {post}")]
    DuplicateRewin { post: PostId, rewinner: String },

    /// Authors cannot comment on their own posts
    #[error("`{author}` cannot comment their own post {post}")]
    CommentOnOwnPost { post: PostId, author: String },

    /// Authors cannot rewin their own posts
    #[error("`{author}` cannot rewin their own post {post}")]
    RewinOwnPost { post: PostId, author: String },

    /// Only the author of the original may delete it
    #[error("post {0} does not belong to `{1}`")]
    NotPostOwner(PostId, String),

    /// Malformed snapshot data or ID-generator consistency violation
    #[error("snapshot is structurally invalid: {0}")]
    Snapshot(String),

    /// Corrupted in-memory state (e.g. reward bookkeeping ran ahead of votes)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse error classes the transport layer translates into response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Structural,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::UnknownUser(_) | AppError::UnknownPost(_) => ErrorKind::NotFound,
            AppError::UserExists(_)
            | AppError::AlreadyVoted { .. }
            | AppError::AlreadyFollowing { .. }
            | AppError::NotFollowing { .. }
            | AppError::SelfFollow(_)
            | AppError::DuplicateRewin { .. }
            | AppError::CommentOnOwnPost { .. }
            | AppError::RewinOwnPost { .. }
            | AppError::NotPostOwner(_, _) => ErrorKind::Conflict,
            AppError::Snapshot(_) => ErrorKind::Structural,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A specialized Result type for WINSOME logic.
pub type Result<T> = std::result::Result<T, AppError>;

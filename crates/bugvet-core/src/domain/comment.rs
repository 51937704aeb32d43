//! Tracker comments.
//!
//! The verifier never posts two comments with identical text authored
//! by one of its own robot identities on the same bug. Existing
//! comments are compared against the freshly composed outcome message
//! before any post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bug::BugId;

/// Tracker-assigned identifier of a posted comment.
pub type CommentId = u64;

/// A comment already present on a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    /// Tracker account that authored the comment.
    pub creator: String,
    pub is_private: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for creating a new comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub bug_id: BugId,
    pub text: String,
    pub is_private: bool,
}

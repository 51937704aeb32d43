//! Client trait definitions.
//!
//! These traits define the two capabilities the verifier consumes:
//! - `DefectTracker`: read/write access to bugs, links and comments
//! - `CodeHost`: read access to review-request labels
//!
//! All traits are async and backend-agnostic. In-memory fakes are
//! provided for testing via the `fakes` module; production REST
//! implementations live in the `bugvet-clients` crate.

use async_trait::async_trait;

use crate::domain::{
    Bug, BugId, BugStatus, CodeHostError, Comment, CommentId, ExternalLink, NewComment,
    ReviewLabel, TrackerError,
};

/// Defect-tracker capability.
///
/// Implementations must classify access denial as
/// `TrackerError::AccessDenied`; the resolver suppresses that case
/// instead of surfacing it.
#[async_trait]
pub trait DefectTracker: Send + Sync {
    /// Fetch a full bug record.
    async fn get_bug(&self, id: BugId) -> Result<Bug, TrackerError>;

    /// Fetch the bug's external links, unfiltered.
    async fn get_external_links(&self, id: BugId) -> Result<Vec<ExternalLink>, TrackerError>;

    /// Fetch all comments currently on the bug.
    async fn get_comments(&self, id: BugId) -> Result<Vec<Comment>, TrackerError>;

    /// Post a new comment and return its tracker-assigned id.
    async fn create_comment(&self, comment: NewComment) -> Result<CommentId, TrackerError>;

    /// Move the bug to `status`.
    async fn update_bug_status(&self, id: BugId, status: BugStatus) -> Result<(), TrackerError>;
}

/// Code-host capability.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Fetch the labels currently attached to a review request.
    async fn get_labels(
        &self,
        org: &str,
        repo: &str,
        number: u32,
    ) -> Result<Vec<ReviewLabel>, CodeHostError>;
}

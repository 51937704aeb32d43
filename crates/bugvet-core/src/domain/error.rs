//! Error taxonomy for bugvet.
//!
//! Three tiers: `TrackerError` and `CodeHostError` are produced by the
//! client implementations; `VerifyError` is what the engine aggregates
//! and returns to the caller. Access denial on the tracker is a
//! distinguished variant because the resolver suppresses it rather than
//! surfacing it.

use super::bug::BugId;
use super::review::ReviewRequestRef;

/// Errors produced by a defect-tracker client.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The tracker refused access to the record. Expected on a handful
    /// of bugs with restricted groups; callers suppress this.
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("bug not found: {0}")]
    NotFound(BugId),

    #[error("malformed tracker response: {0}")]
    Malformed(String),

    #[error("tracker request failed: {0}")]
    Http(String),
}

impl TrackerError {
    /// True when the tracker denied access to the record.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, TrackerError::AccessDenied(_))
    }
}

/// Errors produced by a code-host client.
#[derive(Debug, thiserror::Error)]
pub enum CodeHostError {
    #[error("malformed code host response: {0}")]
    Malformed(String),

    #[error("code host request failed: {0}")]
    Http(String),
}

/// Non-fatal errors collected while verifying a batch of bugs.
///
/// Every variant except `TagParse` is recorded and processing continues
/// with the next bug; `TagParse` aborts the whole batch because no
/// per-bug release comparison is possible without a valid tag.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("failed to parse release tag: {0}")]
    TagParse(#[from] crate::release::ParseVersionError),

    #[error("failed to fetch external links for bug {bug}: {source}")]
    LinkFetch { bug: BugId, source: TrackerError },

    #[error("unable to fetch bug {bug}: {source}")]
    BugFetch { bug: BugId, source: TrackerError },

    #[error("bug {bug}: target release `{value}` has fewer than two `.`-separated components")]
    MalformedTargetRelease { bug: BugId, value: String },

    #[error("unable to fetch labels for review request {request}: {source}")]
    LabelFetch {
        request: ReviewRequestRef,
        source: CodeHostError,
    },

    #[error("failed to fetch comments on bug {bug}: {source}")]
    CommentFetch { bug: BugId, source: TrackerError },

    #[error("failed to comment on bug {bug}: {source}")]
    CommentPost { bug: BugId, source: TrackerError },

    #[error("failed to update status for bug {bug}: {source}")]
    StatusUpdate { bug: BugId, source: TrackerError },
}

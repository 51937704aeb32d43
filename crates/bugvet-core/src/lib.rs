//! bugvet core library
//!
//! Decides, for each bug referenced as fixed in an accepted release,
//! whether every linked review request was approved by the bug's QA
//! contact, and applies the outcome back to the defect tracker: an
//! idempotent explanatory comment, plus the `ON_QA` -> `VERIFIED`
//! transition when the approval policy passes.
//!
//! The defect tracker and the code host are consumed through the
//! [`clients::DefectTracker`] and [`clients::CodeHost`] traits;
//! production REST implementations live in the `bugvet-clients` crate
//! and in-memory fakes in [`fakes`].

pub mod clients;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod release;
pub mod resolver;
pub mod telemetry;
pub mod verifier;

pub use clients::{CodeHost, DefectTracker};
pub use config::VerifierConfig;
pub use domain::{
    Bug, BugId, BugStatus, CodeHostError, Comment, CommentId, ExternalLink, NewComment, QaContact,
    ReviewLabel, ReviewRequestRef, TrackerError, VerifyError,
};
pub use release::{ParseVersionError, ReleaseVersion};
pub use resolver::resolve_links;
pub use telemetry::init_tracing;
pub use verifier::Verifier;

/// bugvet version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

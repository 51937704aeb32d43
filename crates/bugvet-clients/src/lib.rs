//! Production clients for bugvet.
//!
//! `BugzillaTracker` implements the defect-tracker capability against
//! the Bugzilla REST API; `GithubCodeHost` implements the code-host
//! capability against the GitHub REST API. Both satisfy the trait
//! contracts defined in `bugvet-core`.

pub mod bugzilla;
pub mod github;

pub use bugzilla::{BugzillaConfig, BugzillaTracker};
pub use github::{GithubCodeHost, GithubConfig};

//! Review requests and their labels on the code host.

use serde::{Deserialize, Serialize};

/// Coordinates of a review request on the code host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewRequestRef {
    pub org: String,
    pub repo: String,
    pub number: u32,
}

impl ReviewRequestRef {
    pub fn new(org: impl Into<String>, repo: impl Into<String>, number: u32) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl std::fmt::Display for ReviewRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.org, self.repo, self.number)
    }
}

/// A label attached to a review request. The engine only ever tests for
/// the presence of the configured QA approval label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLabel {
    pub name: String,
}

impl ReviewLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An external bug link as returned by the defect tracker, before
/// filtering by code-review host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub org: String,
    pub repo: String,
    pub number: u32,
    /// URL of the external system the link points into.
    pub external_system_url: String,
}

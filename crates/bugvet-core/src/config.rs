//! Verification policy configuration.
//!
//! Everything the engine compares against is injected here rather than
//! hard-coded: the QA approval label, the robot identities whose prior
//! comments suppress re-posting, the external-link URL that identifies
//! the code-review host, and the tracker's unset target-release
//! sentinel.

use serde::{Deserialize, Serialize};

/// Injected policy constants for the resolver and the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Label on a review request that marks QA sign-off.
    pub approval_label: String,
    /// Tracker account names under which this system posts comments.
    /// Trackers render the same account as either a short name or an
    /// email form, so both are accepted.
    pub robot_identities: Vec<String>,
    /// External-link URL that identifies the code-review host of
    /// interest; links into any other system are ignored.
    pub host_link_url: String,
    /// First target-release element meaning "unset".
    pub unset_release_sentinel: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            approval_label: "qe-approved".to_string(),
            robot_identities: vec![
                "bugvet-robot".to_string(),
                "bugvet-robot@stevedores.org".to_string(),
            ],
            host_link_url: "https://github.com/".to_string(),
            unset_release_sentinel: "---".to_string(),
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the QA approval label.
    pub fn with_approval_label(mut self, label: impl Into<String>) -> Self {
        self.approval_label = label.into();
        self
    }

    /// Replace the accepted robot identities.
    pub fn with_robot_identities(mut self, identities: Vec<String>) -> Self {
        self.robot_identities = identities;
        self
    }

    /// Set the external-link URL of the code-review host.
    pub fn with_host_link_url(mut self, url: impl Into<String>) -> Self {
        self.host_link_url = url.into();
        self
    }

    /// True when `creator` is one of this system's own identities.
    pub fn is_robot(&self, creator: &str) -> bool {
        self.robot_identities.iter().any(|id| id == creator)
    }
}

//! Bug records as surfaced by the defect tracker.

use serde::{Deserialize, Serialize};

/// Stable tracker identifier of a bug.
pub type BugId = u32;

/// Lifecycle status of a bug.
///
/// Only `ON_QA` and `VERIFIED` carry meaning for verification; every
/// other status is kept opaque. The engine never issues any transition
/// other than `ON_QA` -> `VERIFIED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BugStatus {
    OnQa,
    Verified,
    Other(String),
}

impl BugStatus {
    /// The tracker's wire string for this status.
    pub fn as_str(&self) -> &str {
        match self {
            BugStatus::OnQa => "ON_QA",
            BugStatus::Verified => "VERIFIED",
            BugStatus::Other(s) => s,
        }
    }
}

impl From<String> for BugStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ON_QA" => BugStatus::OnQa,
            "VERIFIED" => BugStatus::Verified,
            _ => BugStatus::Other(s),
        }
    }
}

impl From<BugStatus> for String {
    fn from(status: BugStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for BugStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The bug's designated quality-assurance reviewer.
///
/// The tracker sometimes has no QA contact on file; callers hold an
/// `Option<QaContact>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaContact {
    /// Display name, used verbatim in outcome messages.
    pub name: String,
    /// Tracker account email, when known.
    pub email: Option<String>,
}

/// A bug record read from the defect tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    pub id: BugId,
    pub status: BugStatus,
    /// Ordered target-release entries. The first element may be the
    /// tracker's unset sentinel.
    pub target_release: Vec<String>,
    pub qa_contact: Option<QaContact>,
}

//! In-memory fakes for the client traits (testing only)
//!
//! Provides `MemoryTracker` and `MemoryCodeHost` that satisfy the trait
//! contracts without any external dependencies. Both carry per-record
//! failure toggles so tests can exercise the engine's error isolation,
//! and `MemoryTracker` counts write calls so tests can assert the
//! "zero writes" properties.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::clients::{CodeHost, DefectTracker};
use crate::domain::{
    Bug, BugId, BugStatus, CodeHostError, Comment, CommentId, ExternalLink, NewComment,
    ReviewLabel, TrackerError,
};

// ---------------------------------------------------------------------------
// MemoryTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TrackerState {
    bugs: HashMap<BugId, Bug>,
    links: HashMap<BugId, Vec<ExternalLink>>,
    comments: HashMap<BugId, Vec<Comment>>,
    status_updates: Vec<(BugId, BugStatus)>,
    next_comment_id: CommentId,
    write_calls: usize,
    deny_links: HashSet<BugId>,
    fail_links: HashSet<BugId>,
    fail_bug_fetch: HashSet<BugId>,
    fail_comment_fetch: HashSet<BugId>,
    fail_comment_post: HashSet<BugId>,
    fail_status_update: HashSet<BugId>,
}

/// In-memory defect tracker backed by `HashMap`s.
#[derive(Debug)]
pub struct MemoryTracker {
    state: Mutex<TrackerState>,
    /// Account name recorded as creator of comments posted through this
    /// fake, mirroring the credentialed account on a real tracker.
    comment_author: String,
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            comment_author: "bugvet-robot".to_string(),
        }
    }
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the account name under which posted comments are recorded.
    pub fn with_comment_author(mut self, author: impl Into<String>) -> Self {
        self.comment_author = author.into();
        self
    }

    pub fn put_bug(&self, bug: Bug) {
        let mut state = self.state.lock().unwrap();
        state.bugs.insert(bug.id, bug);
    }

    pub fn put_links(&self, id: BugId, links: Vec<ExternalLink>) {
        let mut state = self.state.lock().unwrap();
        state.links.insert(id, links);
    }

    pub fn put_comment(&self, id: BugId, comment: Comment) {
        let mut state = self.state.lock().unwrap();
        state.comments.entry(id).or_default().push(comment);
    }

    /// Make `get_external_links` fail with `AccessDenied` for this bug.
    pub fn deny_links(&self, id: BugId) {
        self.state.lock().unwrap().deny_links.insert(id);
    }

    /// Make `get_external_links` fail with a generic error for this bug.
    pub fn fail_links(&self, id: BugId) {
        self.state.lock().unwrap().fail_links.insert(id);
    }

    pub fn fail_bug_fetch(&self, id: BugId) {
        self.state.lock().unwrap().fail_bug_fetch.insert(id);
    }

    pub fn fail_comment_fetch(&self, id: BugId) {
        self.state.lock().unwrap().fail_comment_fetch.insert(id);
    }

    pub fn fail_comment_post(&self, id: BugId) {
        self.state.lock().unwrap().fail_comment_post.insert(id);
    }

    pub fn fail_status_update(&self, id: BugId) {
        self.state.lock().unwrap().fail_status_update.insert(id);
    }

    /// Comments currently on the bug, posted or seeded.
    pub fn comments_for(&self, id: BugId) -> Vec<Comment> {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every status update issued through this fake, in order.
    pub fn status_updates(&self) -> Vec<(BugId, BugStatus)> {
        self.state.lock().unwrap().status_updates.clone()
    }

    /// Total write calls attempted (comment posts + status updates).
    pub fn write_calls(&self) -> usize {
        self.state.lock().unwrap().write_calls
    }
}

#[async_trait]
impl DefectTracker for MemoryTracker {
    async fn get_bug(&self, id: BugId) -> Result<Bug, TrackerError> {
        let state = self.state.lock().unwrap();
        if state.fail_bug_fetch.contains(&id) {
            return Err(TrackerError::Http("bug fetch failed".to_string()));
        }
        state
            .bugs
            .get(&id)
            .cloned()
            .ok_or(TrackerError::NotFound(id))
    }

    async fn get_external_links(&self, id: BugId) -> Result<Vec<ExternalLink>, TrackerError> {
        let state = self.state.lock().unwrap();
        if state.deny_links.contains(&id) {
            return Err(TrackerError::AccessDenied(format!(
                "bug {id} is group restricted"
            )));
        }
        if state.fail_links.contains(&id) {
            return Err(TrackerError::Http("link fetch failed".to_string()));
        }
        Ok(state.links.get(&id).cloned().unwrap_or_default())
    }

    async fn get_comments(&self, id: BugId) -> Result<Vec<Comment>, TrackerError> {
        let state = self.state.lock().unwrap();
        if state.fail_comment_fetch.contains(&id) {
            return Err(TrackerError::Http("comment fetch failed".to_string()));
        }
        Ok(state.comments.get(&id).cloned().unwrap_or_default())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<CommentId, TrackerError> {
        let mut state = self.state.lock().unwrap();
        state.write_calls += 1;
        if state.fail_comment_post.contains(&comment.bug_id) {
            return Err(TrackerError::Http("comment post failed".to_string()));
        }
        state.next_comment_id += 1;
        let id = state.next_comment_id;
        let author = self.comment_author.clone();
        state.comments.entry(comment.bug_id).or_default().push(Comment {
            text: comment.text,
            creator: author,
            is_private: comment.is_private,
            created_at: Some(Utc::now()),
        });
        Ok(id)
    }

    async fn update_bug_status(&self, id: BugId, status: BugStatus) -> Result<(), TrackerError> {
        let mut state = self.state.lock().unwrap();
        state.write_calls += 1;
        if state.fail_status_update.contains(&id) {
            return Err(TrackerError::Http("status update failed".to_string()));
        }
        if let Some(bug) = state.bugs.get_mut(&id) {
            bug.status = status.clone();
        }
        state.status_updates.push((id, status));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryCodeHost
// ---------------------------------------------------------------------------

type RequestKey = (String, String, u32);

/// In-memory code host mapping review requests to label sets.
#[derive(Debug, Default)]
pub struct MemoryCodeHost {
    labels: Mutex<HashMap<RequestKey, Vec<ReviewLabel>>>,
    fail: Mutex<HashSet<RequestKey>>,
}

impl MemoryCodeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_labels(&self, org: &str, repo: &str, number: u32, names: &[&str]) {
        let mut labels = self.labels.lock().unwrap();
        labels.insert(
            (org.to_string(), repo.to_string(), number),
            names.iter().map(|n| ReviewLabel::new(*n)).collect(),
        );
    }

    /// Make `get_labels` fail for this review request.
    pub fn fail_labels(&self, org: &str, repo: &str, number: u32) {
        let mut fail = self.fail.lock().unwrap();
        fail.insert((org.to_string(), repo.to_string(), number));
    }
}

#[async_trait]
impl CodeHost for MemoryCodeHost {
    async fn get_labels(
        &self,
        org: &str,
        repo: &str,
        number: u32,
    ) -> Result<Vec<ReviewLabel>, CodeHostError> {
        let key = (org.to_string(), repo.to_string(), number);
        if self.fail.lock().unwrap().contains(&key) {
            return Err(CodeHostError::Http("label fetch failed".to_string()));
        }
        let labels = self.labels.lock().unwrap();
        Ok(labels.get(&key).cloned().unwrap_or_default())
    }
}

//! Bugzilla REST client
//!
//! Implements the `DefectTracker` capability against the Bugzilla REST
//! API (`/rest/bug/...`). External bug links arrive via the
//! `external_bugs` include field, where review requests are encoded as
//! `org/repo/pull/number` in `ext_bz_bug_id`. HTTP 401/403 responses
//! map to `TrackerError::AccessDenied` so the resolver can suppress
//! them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use bugvet_core::{
    Bug, BugId, BugStatus, Comment, CommentId, DefectTracker, ExternalLink, NewComment, QaContact,
    TrackerError,
};

/// Bugzilla endpoint configuration
#[derive(Debug, Clone)]
pub struct BugzillaConfig {
    /// Bugzilla server base URL
    pub base_url: String,
    /// API key, sent as the `X-BUGZILLA-API-KEY` header when present
    pub api_key: Option<String>,
}

impl Default for BugzillaConfig {
    fn default() -> Self {
        BugzillaConfig {
            base_url: std::env::var("BUGVET_TRACKER_URL")
                .unwrap_or_else(|_| "https://bugzilla.redhat.com".to_string()),
            api_key: std::env::var("BUGVET_TRACKER_API_KEY").ok(),
        }
    }
}

impl BugzillaConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific server
    pub fn new(base_url: impl Into<String>) -> Self {
        BugzillaConfig {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Bugzilla REST client implementing `DefectTracker`
pub struct BugzillaTracker {
    config: BugzillaConfig,
    http_client: reqwest::Client,
}

impl BugzillaTracker {
    /// Create a new client
    pub fn new(config: BugzillaConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("bugvet/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        BugzillaTracker {
            config,
            http_client,
        }
    }

    /// Create a client from environment variables
    pub fn from_env() -> Self {
        Self::new(BugzillaConfig::from_env())
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.header("X-BUGZILLA-API-KEY", key),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, TrackerError> {
        let response = self
            .request(self.http_client.get(&url))
            .send()
            .await
            .map_err(|err| TrackerError::Http(err.to_string()))?;
        parse_json(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(TrackerError::AccessDenied(format!("HTTP {status}")));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TrackerError::Http(format!("HTTP {status}: {body}")));
    }
    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TrackerError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| TrackerError::Malformed(err.to_string()))
}

#[async_trait]
impl DefectTracker for BugzillaTracker {
    async fn get_bug(&self, id: BugId) -> Result<Bug, TrackerError> {
        let url = self.rest_url(&format!(
            "bug/{id}?include_fields=id,status,target_release,qa_contact_detail"
        ));
        let response: BugListResponse = self.get_json(url).await?;
        response
            .bugs
            .into_iter()
            .next()
            .map(Bug::from)
            .ok_or(TrackerError::NotFound(id))
    }

    async fn get_external_links(&self, id: BugId) -> Result<Vec<ExternalLink>, TrackerError> {
        let url = self.rest_url(&format!("bug/{id}?include_fields=id,external_bugs"));
        let response: BugListResponse = self.get_json(url).await?;
        let wire_bug = response
            .bugs
            .into_iter()
            .next()
            .ok_or(TrackerError::NotFound(id))?;

        let mut links = Vec::new();
        for ext in wire_bug.external_bugs {
            match parse_pull_link(&ext.ext_bz_bug_id) {
                Some((org, repo, number)) => links.push(ExternalLink {
                    org,
                    repo,
                    number,
                    external_system_url: ext.link_type.url,
                }),
                None => {
                    debug!(
                        bug = id,
                        ext_id = %ext.ext_bz_bug_id,
                        "external link is not a review request"
                    );
                }
            }
        }
        Ok(links)
    }

    async fn get_comments(&self, id: BugId) -> Result<Vec<Comment>, TrackerError> {
        let url = self.rest_url(&format!("bug/{id}/comment"));
        let response: CommentsResponse = self.get_json(url).await?;
        let entry = response
            .bugs
            .get(&id.to_string())
            .ok_or(TrackerError::NotFound(id))?;
        Ok(entry.comments.iter().cloned().map(Comment::from).collect())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<CommentId, TrackerError> {
        let url = self.rest_url(&format!("bug/{}/comment", comment.bug_id));
        let body = serde_json::json!({
            "comment": comment.text,
            "is_private": comment.is_private,
        });
        let response = self
            .request(self.http_client.post(&url).json(&body))
            .send()
            .await
            .map_err(|err| TrackerError::Http(err.to_string()))?;
        let created: CreatedComment = parse_json(response).await?;
        Ok(created.id)
    }

    async fn update_bug_status(&self, id: BugId, status: BugStatus) -> Result<(), TrackerError> {
        let url = self.rest_url(&format!("bug/{id}"));
        let body = serde_json::json!({ "status": status.as_str() });
        let response = self
            .request(self.http_client.put(&url).json(&body))
            .send()
            .await
            .map_err(|err| TrackerError::Http(err.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

/// Parse a Bugzilla `ext_bz_bug_id` of the form `org/repo/pull/number`.
fn parse_pull_link(ext_id: &str) -> Option<(String, String, u32)> {
    let parts: Vec<&str> = ext_id.split('/').collect();
    match parts.as_slice() {
        [org, repo, "pull", number] if !org.is_empty() && !repo.is_empty() => {
            let number = number.parse::<u32>().ok()?;
            Some((org.to_string(), repo.to_string(), number))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BugListResponse {
    bugs: Vec<WireBug>,
}

#[derive(Debug, Deserialize)]
struct WireBug {
    id: BugId,
    #[serde(default)]
    status: String,
    #[serde(default)]
    target_release: Vec<String>,
    #[serde(default)]
    qa_contact_detail: Option<WireUser>,
    #[serde(default)]
    external_bugs: Vec<WireExternalBug>,
}

impl From<WireBug> for Bug {
    fn from(wire: WireBug) -> Self {
        Bug {
            id: wire.id,
            status: BugStatus::from(wire.status),
            target_release: wire.target_release,
            qa_contact: wire.qa_contact_detail.map(QaContact::from),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(default)]
    name: String,
    #[serde(default)]
    real_name: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<WireUser> for QaContact {
    fn from(wire: WireUser) -> Self {
        // Bugzilla leaves real_name empty for accounts that never set one.
        let name = if wire.real_name.is_empty() {
            wire.name
        } else {
            wire.real_name
        };
        QaContact {
            name,
            email: wire.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireExternalBug {
    #[serde(rename = "type")]
    link_type: WireExternalType,
    #[serde(default)]
    ext_bz_bug_id: String,
}

#[derive(Debug, Deserialize)]
struct WireExternalType {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    bugs: HashMap<String, WireCommentList>,
}

#[derive(Debug, Deserialize)]
struct WireCommentList {
    comments: Vec<WireComment>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireComment {
    #[serde(default)]
    text: String,
    #[serde(default)]
    creator: String,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    creation_time: Option<DateTime<Utc>>,
}

impl From<WireComment> for Comment {
    fn from(wire: WireComment) -> Self {
        Comment {
            text: wire.text,
            creator: wire.creator,
            is_private: wire.is_private,
            created_at: wire.creation_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedComment {
    id: CommentId,
}

//! GitHub REST client
//!
//! Implements the `CodeHost` capability: fetching the labels attached
//! to a review request via the issues API (labels live on the issue
//! side of a pull request).

use async_trait::async_trait;
use serde::Deserialize;

use bugvet_core::{CodeHost, CodeHostError, ReviewLabel};

/// GitHub API configuration
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API base URL (override for GitHub Enterprise)
    pub api_base: String,
    /// Bearer token; unauthenticated requests are heavily rate limited
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_base: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            token: std::env::var("GITHUB_TOKEN").ok(),
        }
    }
}

impl GithubConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API base
    pub fn new(api_base: impl Into<String>) -> Self {
        GithubConfig {
            api_base: api_base.into(),
            token: None,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// GitHub REST client implementing `CodeHost`
pub struct GithubCodeHost {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubCodeHost {
    /// Create a new client
    pub fn new(config: GithubConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("bugvet/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        GithubCodeHost {
            config,
            http_client,
        }
    }

    /// Create a client from environment variables
    pub fn from_env() -> Self {
        Self::new(GithubConfig::from_env())
    }
}

#[async_trait]
impl CodeHost for GithubCodeHost {
    async fn get_labels(
        &self,
        org: &str,
        repo: &str,
        number: u32,
    ) -> Result<Vec<ReviewLabel>, CodeHostError> {
        let url = format!(
            "{}/repos/{org}/{repo}/issues/{number}/labels?per_page=100",
            self.config.api_base.trim_end_matches('/')
        );
        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| CodeHostError::Http(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CodeHostError::Http(format!("HTTP {status}: {body}")));
        }

        let labels: Vec<WireLabel> = response
            .json()
            .await
            .map_err(|err| CodeHostError::Malformed(err.to_string()))?;
        Ok(labels
            .into_iter()
            .map(|label| ReviewLabel::new(label.name))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    name: String,
}

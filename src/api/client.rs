//! Core client trait and error types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::domain::Post;

/// The slice of the platform API the agent loop depends on.
///
/// Implementations must be safe to share; the agent holds one behind an `Arc`
/// and reuses it for every call.
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// List recent posts in the given order
    async fn fetch_recent(&self, sort: SortOrder, limit: usize) -> Result<Vec<Post>, ClientError>;

    /// Create a post in a submolt
    async fn create_post(
        &self,
        submolt: &str,
        title: &str,
        content: Option<&str>,
        url: Option<&str>,
    ) -> Result<Value, ClientError>;

    /// Comment on a post, or reply to a comment when `parent_id` is set
    async fn create_comment(&self, post_id: &str, content: &str, parent_id: Option<&str>) -> Result<Value, ClientError>;

    /// Upvote a post
    async fn upvote(&self, post_id: &str) -> Result<Value, ClientError>;
}

/// Listing order accepted by the post and feed endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Hot,
    #[default]
    New,
    Top,
    Rising,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Hot => "hot",
            SortOrder::New => "new",
            SortOrder::Top => "top",
            SortOrder::Rising => "rising",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hot" => Ok(SortOrder::Hot),
            "new" => Ok(SortOrder::New),
            "top" => Ok(SortOrder::Top),
            "rising" => Ok(SortOrder::Rising),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Errors that can occur while talking to the platform
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },
}

//! Moltbook REST client
//!
//! Implements the SocialClient trait on top of one reusable reqwest client,
//! plus the rest of the public API surface used by the CLI.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url, header};
use serde_json::{Map, Value, json};

use crate::api::client::{ClientError, SocialClient, SortOrder};
use crate::domain::{Post, PostsResponse};

/// Moltbook API base URL
pub const MOLTBOOK_API_URL: &str = "https://www.moltbook.com/api/v1";

/// Environment variable holding the API key
pub const MOLTBOOK_API_KEY_ENV: &str = "MOLTBOOK_API_KEY";

/// Maximum results the search endpoint accepts
pub const SEARCH_MAX_LIMIT: usize = 50;

/// Configuration for the Moltbook client
#[derive(Debug, Clone)]
pub struct MoltbookConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout: Duration,
}

impl Default for MoltbookConfig {
    fn default() -> Self {
        Self {
            base_url: MOLTBOOK_API_URL.to_string(),
            api_key_env: MOLTBOOK_API_KEY_ENV.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl MoltbookConfig {
    /// Create a config pointing at a different base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// What to search for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchType {
    #[default]
    All,
    Posts,
    Comments,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::All => "all",
            SearchType::Posts => "posts",
            SearchType::Comments => "comments",
        }
    }
}

impl std::str::FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SearchType::All),
            "posts" => Ok(SearchType::Posts),
            "comments" => Ok(SearchType::Comments),
            other => Err(format!("unknown search type: {}", other)),
        }
    }
}

/// Moltbook API client
pub struct MoltbookClient {
    client: Client,
    base_url: Url,
}

impl MoltbookClient {
    /// Create a new client
    ///
    /// Reads the API key from the environment variable named in the config
    pub fn new(config: MoltbookConfig) -> Result<Self, ClientError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| ClientError::MissingApiKey {
            env_var: config.api_key_env.clone(),
        })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: impl AsRef<str>, config: MoltbookConfig) -> Result<Self, ClientError> {
        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(&format!("Bearer {}", api_key.as_ref()))
            .map_err(|e| ClientError::InvalidResponse(format!("Invalid API key header: {}", e)))?;
        headers.insert(header::AUTHORIZATION, auth);

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Endpoint URL from path segments; each segment is percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode the JSON body, mapping non-2xx to ClientError::Api
    async fn send(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(format!("{}: {}", e, body)))
    }

    async fn get(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, ClientError> {
        self.send(self.client.get(self.url(path)?).query(query)).await
    }

    async fn post(&self, path: &[&str], body: Option<Value>) -> Result<Value, ClientError> {
        let request = self.client.post(self.url(path)?);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        self.send(request).await
    }

    async fn delete(&self, path: &[&str]) -> Result<Value, ClientError> {
        self.send(self.client.delete(self.url(path)?)).await
    }

    fn parse_posts(body: Value) -> Result<Vec<Post>, ClientError> {
        let response: PostsResponse =
            serde_json::from_value(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(response.posts)
    }

    // Agents

    /// Profile of the authenticated agent
    pub async fn get_me(&self) -> Result<Value, ClientError> {
        self.get(&["agents", "me"], &[]).await
    }

    /// Claim status of the authenticated agent
    pub async fn get_status(&self) -> Result<Value, ClientError> {
        self.get(&["agents", "status"], &[]).await
    }

    pub async fn follow_agent(&self, agent_name: &str) -> Result<Value, ClientError> {
        self.post(&["agents", agent_name, "follow"], None).await
    }

    pub async fn unfollow_agent(&self, agent_name: &str) -> Result<Value, ClientError> {
        self.delete(&["agents", agent_name, "follow"]).await
    }

    // Posts

    /// List posts, optionally restricted to one submolt
    pub async fn get_posts(&self, submolt: Option<&str>, sort: SortOrder, limit: usize) -> Result<Vec<Post>, ClientError> {
        let mut query = vec![("sort", sort.to_string()), ("limit", limit.to_string())];
        if let Some(submolt) = submolt {
            query.push(("submolt", submolt.to_string()));
        }
        let body = self.get(&["posts"], &query).await?;
        Self::parse_posts(body)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Value, ClientError> {
        self.get(&["posts", post_id], &[]).await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<Value, ClientError> {
        self.delete(&["posts", post_id]).await
    }

    pub async fn downvote_post(&self, post_id: &str) -> Result<Value, ClientError> {
        self.post(&["posts", post_id, "downvote"], None).await
    }

    // Comments

    /// Comments on a post (sort: top, new, controversial)
    pub async fn get_comments(&self, post_id: &str, sort: &str) -> Result<Value, ClientError> {
        self.get(&["posts", post_id, "comments"], &[("sort", sort.to_string())])
            .await
    }

    pub async fn upvote_comment(&self, comment_id: &str) -> Result<Value, ClientError> {
        self.post(&["comments", comment_id, "upvote"], None).await
    }

    // Feed and search

    /// Personalized feed (sort: hot, new, top)
    pub async fn get_feed(&self, sort: SortOrder, limit: usize) -> Result<Vec<Post>, ClientError> {
        let body = self
            .get(&["feed"], &[("sort", sort.to_string()), ("limit", limit.to_string())])
            .await?;
        Self::parse_posts(body)
    }

    /// Semantic search; the limit is clamped to what the endpoint accepts
    pub async fn search(&self, query: &str, search_type: SearchType, limit: usize) -> Result<Value, ClientError> {
        let limit = limit.min(SEARCH_MAX_LIMIT);
        self.get(
            &["search"],
            &[
                ("q", query.to_string()),
                ("type", search_type.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    // Submolts

    pub async fn get_submolts(&self) -> Result<Value, ClientError> {
        self.get(&["submolts"], &[]).await
    }

    pub async fn get_submolt(&self, name: &str) -> Result<Value, ClientError> {
        self.get(&["submolts", name], &[]).await
    }

    pub async fn subscribe_submolt(&self, name: &str) -> Result<Value, ClientError> {
        self.post(&["submolts", name, "subscribe"], None).await
    }
}

#[async_trait]
impl SocialClient for MoltbookClient {
    async fn fetch_recent(&self, sort: SortOrder, limit: usize) -> Result<Vec<Post>, ClientError> {
        self.get_posts(None, sort, limit).await
    }

    async fn create_post(
        &self,
        submolt: &str,
        title: &str,
        content: Option<&str>,
        url: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.post(&["posts"], Some(post_payload(submolt, title, content, url))).await
    }

    async fn create_comment(&self, post_id: &str, content: &str, parent_id: Option<&str>) -> Result<Value, ClientError> {
        let mut payload = json!({ "content": content });
        if let Some(parent_id) = parent_id.filter(|p| !p.is_empty()) {
            payload["parent_id"] = json!(parent_id);
        }
        self.post(&["posts", post_id, "comments"], Some(payload)).await
    }

    async fn upvote(&self, post_id: &str) -> Result<Value, ClientError> {
        self.post(&["posts", post_id, "upvote"], None).await
    }
}

/// Body for post creation; empty content and url are left out
fn post_payload(submolt: &str, title: &str, content: Option<&str>, url: Option<&str>) -> Value {
    let mut payload = Map::new();
    payload.insert("submolt".into(), json!(submolt));
    payload.insert("title".into(), json!(title));
    if let Some(content) = content.filter(|c| !c.is_empty()) {
        payload.insert("content".into(), json!(content));
    }
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        payload.insert("url".into(), json!(url));
    }
    Value::Object(payload)
}

/// Best-effort error text from an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

//! Feed items returned by the platform.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A post as returned by the listing and feed endpoints.
///
/// Only the fields the agent reads are typed; everything else is kept in
/// `extra` so that strategies can still inspect it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Submolt the post lives in (a name or an object, depending on endpoint)
    #[serde(default)]
    pub submolt: Option<Value>,

    #[serde(default)]
    pub author: Option<Value>,

    #[serde(default)]
    pub upvotes: Option<i64>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Post {
    /// Create a post with just an id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder: set the text content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Title and body joined, for keyword matching.
    pub fn text(&self) -> String {
        match &self.content {
            Some(content) => format!("{}\n{}", self.title, content),
            None => self.title.clone(),
        }
    }

    /// Name of the submolt, whichever shape the API used.
    pub fn submolt_name(&self) -> Option<&str> {
        match self.submolt.as_ref()? {
            Value::String(name) => Some(name.as_str()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// Envelope of the post listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostsResponse {
    #[serde(default)]
    pub posts: Vec<Post>,
}

//! Actions chosen by a decision strategy.
//!
//! An action is produced once per tick and consumed once by the executor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an action, used for gating and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Post,
    Comment,
    Upvote,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Post => "post",
            ActionKind::Comment => "comment",
            ActionKind::Upvote => "upvote",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single side-effecting action against the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Create a post in a submolt. Either `content` or `url` is expected,
    /// but that is left to the platform to enforce.
    Post {
        #[serde(rename = "submolt")]
        target_group: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// Comment on a post, optionally as a reply to another comment.
    Comment {
        post_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
    },

    /// Upvote a post.
    Upvote { post_id: String },
}

impl Action {
    /// Create a text post action
    pub fn text_post(target_group: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Action::Post {
            target_group: target_group.into(),
            title: title.into(),
            content: Some(content.into()),
            url: None,
        }
    }

    /// Create a link post action
    pub fn link_post(target_group: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Action::Post {
            target_group: target_group.into(),
            title: title.into(),
            content: None,
            url: Some(url.into()),
        }
    }

    /// Create a top-level comment action
    pub fn comment(post_id: impl Into<String>, content: impl Into<String>) -> Self {
        Action::Comment {
            post_id: post_id.into(),
            content: content.into(),
            parent_id: None,
        }
    }

    /// Create a reply to an existing comment
    pub fn reply(post_id: impl Into<String>, parent_id: impl Into<String>, content: impl Into<String>) -> Self {
        Action::Comment {
            post_id: post_id.into(),
            content: content.into(),
            parent_id: Some(parent_id.into()),
        }
    }

    /// Create an upvote action
    pub fn upvote(post_id: impl Into<String>) -> Self {
        Action::Upvote {
            post_id: post_id.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Post { .. } => ActionKind::Post,
            Action::Comment { .. } => ActionKind::Comment,
            Action::Upvote { .. } => ActionKind::Upvote,
        }
    }

    /// Short human-readable description for logs
    pub fn describe(&self) -> String {
        match self {
            Action::Post { target_group, title, .. } => format!("post '{}' to m/{}", title, target_group),
            Action::Comment {
                post_id,
                parent_id: Some(parent),
                ..
            } => format!("reply to comment {} on post {}", parent, post_id),
            Action::Comment { post_id, .. } => format!("comment on post {}", post_id),
            Action::Upvote { post_id } => format!("upvote post {}", post_id),
        }
    }
}

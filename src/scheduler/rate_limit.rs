//! Platform rate limits for posts and comments.
//!
//! Moltbook allows one post every 30 minutes, one comment every 20 seconds and
//! 50 comments per rolling 24 hours. The limiter answers "may I?" before an
//! action and is told about each action that actually went through.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

/// Minimum time between two posts.
pub const POST_COOLDOWN: Duration = Duration::from_secs(30 * 60);
/// Minimum time between two comments.
pub const COMMENT_COOLDOWN: Duration = Duration::from_secs(20);
/// Maximum comments in the rolling window.
pub const DAILY_COMMENT_LIMIT: usize = 50;
/// Length of the rolling comment window.
pub const COMMENT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Rate limit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum seconds between posts.
    #[serde(rename = "post-cooldown-secs")]
    pub post_cooldown_secs: u64,
    /// Minimum seconds between comments.
    #[serde(rename = "comment-cooldown-secs")]
    pub comment_cooldown_secs: u64,
    /// Comments allowed per window.
    #[serde(rename = "daily-comment-limit")]
    pub daily_comment_limit: usize,
    /// Window length for the comment quota (seconds).
    #[serde(rename = "comment-window-secs")]
    pub comment_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            post_cooldown_secs: POST_COOLDOWN.as_secs(),
            comment_cooldown_secs: COMMENT_COOLDOWN.as_secs(),
            daily_comment_limit: DAILY_COMMENT_LIMIT,
            comment_window_secs: COMMENT_WINDOW.as_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Create config with custom values.
    pub fn new(
        post_cooldown_secs: u64,
        comment_cooldown_secs: u64,
        daily_comment_limit: usize,
        comment_window_secs: u64,
    ) -> Self {
        Self {
            post_cooldown_secs,
            comment_cooldown_secs,
            daily_comment_limit,
            comment_window_secs,
        }
    }

    pub fn post_cooldown(&self) -> Duration {
        Duration::from_secs(self.post_cooldown_secs)
    }

    pub fn comment_cooldown(&self) -> Duration {
        Duration::from_secs(self.comment_cooldown_secs)
    }

    pub fn comment_window(&self) -> Duration {
        Duration::from_secs(self.comment_window_secs)
    }
}

/// Post and comment gates for one agent.
///
/// Owned by a single agent; a limiter shared between agents would need the
/// check and the matching record to happen under one lock.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    /// When the last post went through (None = never).
    last_post_at: Option<Instant>,
    /// Comment times, oldest first. Pruned only by the comment checks.
    comment_timestamps: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a limiter with the platform defaults and the system clock.
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default(), Arc::new(SystemClock))
    }

    /// Create a limiter with custom limits and clock.
    pub fn with_config(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            last_post_at: None,
            comment_timestamps: VecDeque::new(),
        }
    }

    /// Whether the post cooldown has elapsed.
    pub fn can_post(&self) -> bool {
        match self.last_post_at {
            Some(at) => self.clock.now().saturating_duration_since(at) >= self.config.post_cooldown(),
            None => true,
        }
    }

    /// Whether a comment is allowed now.
    ///
    /// Drops timestamps that left the window, then checks the quota and the
    /// cooldown since the most recent comment.
    pub fn can_comment(&mut self) -> bool {
        let now = self.clock.now();
        self.prune(now);

        if self.comment_timestamps.len() >= self.config.daily_comment_limit {
            return false;
        }

        match self.comment_timestamps.back() {
            Some(last) => now.saturating_duration_since(*last) >= self.config.comment_cooldown(),
            None => true,
        }
    }

    /// Record a successful post.
    pub fn record_post(&mut self) {
        self.last_post_at = Some(self.clock.now());
    }

    /// Record a successful comment.
    pub fn record_comment(&mut self) {
        self.comment_timestamps.push_back(self.clock.now());
    }

    /// Time left before the next post is allowed (zero if allowed now).
    pub fn time_until_post(&self) -> Duration {
        match self.last_post_at {
            Some(at) => {
                let elapsed = self.clock.now().saturating_duration_since(at);
                self.config.post_cooldown().saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        }
    }

    /// Time left on the comment cooldown (zero if none). Ignores the quota.
    pub fn time_until_comment(&self) -> Duration {
        match self.comment_timestamps.back() {
            Some(last) => {
                let elapsed = self.clock.now().saturating_duration_since(*last);
                self.config.comment_cooldown().saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        }
    }

    /// Comments still allowed in the current window. Does not prune.
    pub fn comments_remaining_today(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.comment_window();
        let in_window = self
            .comment_timestamps
            .iter()
            .filter(|t| now.saturating_duration_since(**t) < window)
            .count();
        self.config.daily_comment_limit.saturating_sub(in_window)
    }

    /// Number of comment timestamps currently held (pruned or not).
    pub fn recorded_comments(&self) -> usize {
        self.comment_timestamps.len()
    }

    fn prune(&mut self, now: Instant) {
        let window = self.config.comment_window();
        self.comment_timestamps
            .retain(|t| now.saturating_duration_since(*t) < window);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("last_post_at", &self.last_post_at)
            .field("comment_timestamps", &self.comment_timestamps.len())
            .finish()
    }
}

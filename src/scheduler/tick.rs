//! Tick types - per-tick configuration, statistics and agent phase
//!
//! A tick is one fetch → decide → execute cycle. The run loop repeats ticks
//! with a fixed pause in between.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::SortOrder;

/// Configuration for the agent tick loop
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Interval between ticks
    pub check_interval: Duration,
    /// Pause after every attempted action
    pub action_pause: Duration,
    /// Pause after a tick-level failure, replacing the normal interval
    pub error_cooldown: Duration,
    /// Number of posts to fetch per tick
    pub fetch_limit: usize,
    /// Listing order for the fetch
    pub sort: SortOrder,
    /// Upper bound on how long the decision strategy may take
    pub decide_timeout: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(300),
            action_pause: Duration::from_secs(2),
            error_cooldown: Duration::from_secs(60),
            fetch_limit: 20,
            sort: SortOrder::New,
            decide_timeout: Duration::from_secs(30),
        }
    }
}

impl TickConfig {
    /// Create a new tick config
    pub fn new(check_interval: Duration, action_pause: Duration) -> Self {
        Self {
            check_interval,
            action_pause,
            ..Default::default()
        }
    }

    /// Set the error cooldown
    pub fn with_error_cooldown(mut self, cooldown: Duration) -> Self {
        self.error_cooldown = cooldown;
        self
    }

    /// Set the fetch size and order
    pub fn with_fetch(mut self, sort: SortOrder, limit: usize) -> Self {
        self.sort = sort;
        self.fetch_limit = limit;
        self
    }

    /// Set the decision timeout
    pub fn with_decide_timeout(mut self, timeout: Duration) -> Self {
        self.decide_timeout = timeout;
        self
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub posts_created: u32,
    pub comments_created: u32,
    pub upvotes: u32,
    pub errors: u32,
}

impl TickStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for a tick that failed before any action ran
    pub fn failed() -> Self {
        Self {
            errors: 1,
            ..Self::default()
        }
    }

    /// Number of actions that went through
    pub fn actions(&self) -> u32 {
        self.posts_created + self.comments_created + self.upvotes
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for TickStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "posts={} comments={} upvotes={} errors={}",
            self.posts_created, self.comments_created, self.upvotes, self.errors
        )
    }
}

/// Where the agent is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    Idle,
    Fetching,
    Deciding,
    Executing,
    Waiting,
    Stopped,
}

/// Sleep for `duration` unless cancelled first. Returns false on cancellation.
pub(crate) async fn wait_or_cancel(cancel: &CancellationToken, duration: Duration) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if duration.is_zero() {
        return true;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

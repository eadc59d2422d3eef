//! Action executor - runs decided actions through the rate limiter gates.
//!
//! Each action makes at most one API call. Posts and comments are only
//! attempted when their gate is open and only consume the gate once the call
//! succeeded. A failed call is counted and the next action still runs.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::SocialClient;
use crate::domain::Action;
use crate::error::{AgentError, Result};
use crate::scheduler::rate_limit::RateLimiter;
use crate::scheduler::tick::{TickStats, wait_or_cancel};

/// What happened to a single action
#[derive(Debug)]
pub enum ActionOutcome {
    /// The API call succeeded
    Performed,
    /// The gate was closed; nothing was sent
    Skipped,
    /// The API call failed
    Failed(AgentError),
}

impl ActionOutcome {
    pub fn is_performed(&self) -> bool {
        matches!(self, ActionOutcome::Performed)
    }
}

/// Executes actions sequentially with a fixed pause between them
pub struct ActionExecutor<C: SocialClient> {
    client: Arc<C>,
    pause: Duration,
}

impl<C: SocialClient> ActionExecutor<C> {
    pub fn new(client: Arc<C>, pause: Duration) -> Self {
        Self { client, pause }
    }

    /// Run every action in order, pausing after each one.
    ///
    /// Returns false if cancellation cut the batch short.
    pub async fn execute_all(
        &self,
        actions: &[Action],
        limiter: &mut RateLimiter,
        stats: &mut TickStats,
        cancel: &CancellationToken,
    ) -> bool {
        let mut performed = 0usize;
        for (index, action) in actions.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(remaining = actions.len() - index, "Cancelled, skipping remaining actions");
                return false;
            }

            if self.execute(action, limiter, stats).await.is_performed() {
                performed += 1;
            }

            if !wait_or_cancel(cancel, self.pause).await {
                tracing::info!(
                    remaining = actions.len() - index - 1,
                    "Cancelled, skipping remaining actions"
                );
                return false;
            }
        }
        tracing::debug!(performed, total = actions.len(), "Actions executed");
        true
    }

    /// Run one action and fold its result into the tick stats.
    pub async fn execute(&self, action: &Action, limiter: &mut RateLimiter, stats: &mut TickStats) -> ActionOutcome {
        match self.perform(action, limiter, stats).await {
            Ok(true) => ActionOutcome::Performed,
            Ok(false) => {
                tracing::debug!(kind = %action.kind(), "Gate closed, dropping action");
                ActionOutcome::Skipped
            }
            Err(e) => {
                tracing::error!(action = %action.describe(), error = %e, "Error executing action");
                stats.errors += 1;
                ActionOutcome::Failed(e)
            }
        }
    }

    /// Ok(false) when the gate was closed and no call was made.
    async fn perform(&self, action: &Action, limiter: &mut RateLimiter, stats: &mut TickStats) -> Result<bool> {
        let kind = action.kind();
        let failed = |source| AgentError::Action { kind, source };

        match action {
            Action::Post {
                target_group,
                title,
                content,
                url,
            } => {
                if !limiter.can_post() {
                    return Ok(false);
                }
                tracing::info!(action = %action.describe(), "Creating post");
                self.client
                    .create_post(target_group, title, content.as_deref(), url.as_deref())
                    .await
                    .map_err(failed)?;
                limiter.record_post();
                stats.posts_created += 1;
            }
            Action::Comment {
                post_id,
                content,
                parent_id,
            } => {
                if !limiter.can_comment() {
                    return Ok(false);
                }
                tracing::info!(action = %action.describe(), "Commenting on post");
                self.client
                    .create_comment(post_id, content, parent_id.as_deref())
                    .await
                    .map_err(failed)?;
                limiter.record_comment();
                stats.comments_created += 1;
            }
            Action::Upvote { post_id } => {
                tracing::info!(action = %action.describe(), "Upvoting post");
                self.client.upvote(post_id).await.map_err(failed)?;
                stats.upvotes += 1;
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClientError, SortOrder};
    use crate::clock::ManualClock;
    use crate::domain::{ActionKind, Post};
    use crate::scheduler::rate_limit::RateLimitConfig;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        fail_kinds: Vec<ActionKind>,
        calls: Mutex<Vec<ActionKind>>,
    }

    impl RecordingClient {
        fn failing(kinds: &[ActionKind]) -> Self {
            Self {
                fail_kinds: kinds.to_vec(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<ActionKind> {
            self.calls.lock().unwrap().clone()
        }

        fn respond(&self, kind: ActionKind) -> std::result::Result<Value, ClientError> {
            self.calls.lock().unwrap().push(kind);
            if self.fail_kinds.contains(&kind) {
                Err(ClientError::Api {
                    status: 500,
                    message: "server error".to_string(),
                })
            } else {
                Ok(json!({"success": true}))
            }
        }
    }

    #[async_trait]
    impl SocialClient for RecordingClient {
        async fn fetch_recent(&self, _sort: SortOrder, _limit: usize) -> std::result::Result<Vec<Post>, ClientError> {
            Ok(Vec::new())
        }

        async fn create_post(
            &self,
            _submolt: &str,
            _title: &str,
            _content: Option<&str>,
            _url: Option<&str>,
        ) -> std::result::Result<Value, ClientError> {
            self.respond(ActionKind::Post)
        }

        async fn create_comment(
            &self,
            _post_id: &str,
            _content: &str,
            _parent_id: Option<&str>,
        ) -> std::result::Result<Value, ClientError> {
            self.respond(ActionKind::Comment)
        }

        async fn upvote(&self, _post_id: &str) -> std::result::Result<Value, ClientError> {
            self.respond(ActionKind::Upvote)
        }
    }

    fn setup(client: RecordingClient) -> (ActionExecutor<RecordingClient>, Arc<RecordingClient>, RateLimiter) {
        let client = Arc::new(client);
        let executor = ActionExecutor::new(client.clone(), Duration::from_secs(2));
        let limiter = RateLimiter::with_config(RateLimitConfig::default(), Arc::new(ManualClock::new()));
        (executor, client, limiter)
    }

    #[tokio::test]
    async fn test_post_success_arms_cooldown() {
        let (executor, client, mut limiter) = setup(RecordingClient::default());
        let mut stats = TickStats::new();

        let outcome = executor
            .execute(&Action::text_post("general", "Hi", "Body"), &mut limiter, &mut stats)
            .await;

        assert!(outcome.is_performed());
        assert_eq!(stats.posts_created, 1);
        assert!(!limiter.can_post());
        assert_eq!(client.calls(), vec![ActionKind::Post]);
    }

    #[tokio::test]
    async fn test_post_dropped_while_cooling_down() {
        let (executor, client, mut limiter) = setup(RecordingClient::default());
        limiter.record_post();
        let mut stats = TickStats::new();

        let outcome = executor
            .execute(&Action::text_post("general", "Hi", "Body"), &mut limiter, &mut stats)
            .await;

        assert!(matches!(outcome, ActionOutcome::Skipped));
        assert!(stats.is_empty());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_comment_dropped_while_cooling_down() {
        let (executor, client, mut limiter) = setup(RecordingClient::default());
        limiter.record_comment();
        let mut stats = TickStats::new();

        let outcome = executor
            .execute(&Action::comment("p1", "Agreed"), &mut limiter, &mut stats)
            .await;

        assert!(matches!(outcome, ActionOutcome::Skipped));
        assert!(stats.is_empty());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_comment_does_not_consume_gate() {
        let (executor, _client, mut limiter) = setup(RecordingClient::failing(&[ActionKind::Comment]));
        let mut stats = TickStats::new();

        let outcome = executor
            .execute(&Action::comment("p1", "Agreed"), &mut limiter, &mut stats)
            .await;

        assert!(matches!(outcome, ActionOutcome::Failed(AgentError::Action { kind: ActionKind::Comment, .. })));
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.comments_created, 0);
        assert_eq!(limiter.recorded_comments(), 0);
        assert!(limiter.can_comment());
    }

    #[tokio::test]
    async fn test_upvotes_are_never_gated() {
        let (executor, client, mut limiter) = setup(RecordingClient::default());
        limiter.record_post();
        limiter.record_comment();
        let mut stats = TickStats::new();

        for _ in 0..3 {
            executor.execute(&Action::upvote("p1"), &mut limiter, &mut stats).await;
        }

        assert_eq!(stats.upvotes, 3);
        assert_eq!(client.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_all_pauses_after_every_action() {
        let (executor, _client, mut limiter) = setup(RecordingClient::default());
        limiter.record_post();
        let mut stats = TickStats::new();
        let cancel = CancellationToken::new();
        let actions = vec![
            Action::upvote("p1"),
            Action::text_post("general", "Dropped", "gate closed"),
            Action::upvote("p2"),
        ];

        let start = tokio::time::Instant::now();
        let completed = executor.execute_all(&actions, &mut limiter, &mut stats, &cancel).await;

        assert!(completed);
        assert_eq!(stats.upvotes, 2);
        assert_eq!(stats.posts_created, 0);
        // Skipped actions are paced too
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6));
        assert!(elapsed < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_all_stops_on_cancellation() {
        let (executor, client, mut limiter) = setup(RecordingClient::default());
        let mut stats = TickStats::new();
        let cancel = CancellationToken::new();
        let actions: Vec<Action> = (0..5).map(|i| Action::upvote(format!("p{}", i))).collect();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let completed = executor.execute_all(&actions, &mut limiter, &mut stats, &cancel).await;

        assert!(!completed);
        assert_eq!(stats.upvotes, 2);
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_the_batch() {
        let (executor, _client, mut limiter) = setup(RecordingClient::failing(&[ActionKind::Upvote]));
        let mut stats = TickStats::new();
        let cancel = CancellationToken::new();
        let actions = vec![
            Action::upvote("p1"),
            Action::comment("p1", "Still runs"),
            Action::upvote("p2"),
        ];

        let completed = executor.execute_all(&actions, &mut limiter, &mut stats, &cancel).await;

        assert!(completed);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.comments_created, 1);
    }
}

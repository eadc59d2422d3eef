//! Agent - the fetch → decide → execute → wait loop.
//!
//! The Agent owns the rate limiter and runs one tick at a time:
//! 1. Fetch recent posts from the platform
//! 2. Ask the decision strategy what to do with them
//! 3. Execute the actions in order through the rate limiter gates
//! 4. Wait for the next tick (or for a cooldown after a failed tick)
//!
//! Failures of a single action stay inside that action. Failures of the fetch
//! or the decision end the tick; the run loop logs them and tries again after
//! the error cooldown. Only cancellation ends the run loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::SocialClient;
use crate::decision::{DecisionError, DecisionStrategy};
use crate::error::{AgentError, Result};
use crate::scheduler::executor::ActionExecutor;
use crate::scheduler::rate_limit::RateLimiter;
use crate::scheduler::tick::{AgentPhase, TickConfig, TickStats, wait_or_cancel};

/// Autonomous agent driving one client with one decision strategy.
pub struct Agent<C: SocialClient, D: DecisionStrategy> {
    /// Platform client, shared with the executor.
    client: Arc<C>,
    /// Strategy choosing the actions.
    strategy: Arc<D>,
    /// Runs actions against the client.
    executor: ActionExecutor<C>,
    /// Post and comment gates. Only mutated from this agent.
    limiter: RateLimiter,
    /// Tick timing and fetch settings.
    config: TickConfig,
    /// Cancels the run loop and any pending wait.
    cancel: CancellationToken,
    phase: AgentPhase,
    tick_count: u64,
}

impl<C: SocialClient, D: DecisionStrategy> Agent<C, D> {
    /// Create an agent with the platform's default rate limits.
    pub fn new(client: Arc<C>, strategy: Arc<D>, config: TickConfig) -> Self {
        let executor = ActionExecutor::new(client.clone(), config.action_pause);

        Self {
            client,
            strategy,
            executor,
            limiter: RateLimiter::new(),
            config,
            cancel: CancellationToken::new(),
            phase: AgentPhase::Idle,
            tick_count: 0,
        }
    }

    /// Use a specific rate limiter (custom limits or clock).
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }


    /// Run one tick and return what it did.
    ///
    /// A failed fetch or decision is logged and reported as a single error.
    pub async fn tick(&mut self) -> TickStats {
        let stats = match self.try_tick().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "Error in tick");
                TickStats::failed()
            }
        };
        self.phase = AgentPhase::Idle;
        stats
    }

    /// Run ticks until the cancellation token fires.
    ///
    /// Waits `check_interval` after a good tick and the error cooldown after a
    /// failed one. Both waits end early on cancellation.
    pub async fn run(&mut self, check_interval: Duration) {
        tracing::info!(
            check_interval_secs = check_interval.as_secs(),
            error_cooldown_secs = self.config.error_cooldown.as_secs(),
            "Starting agent loop"
        );

        while !self.cancel.is_cancelled() {
            tracing::info!(tick = self.tick_count + 1, "Starting new tick");

            let wait = match self.try_tick().await {
                Ok(stats) => {
                    self.report(&stats);
                    check_interval
                }
                Err(e) => {
                    tracing::error!(error = %e, "Unexpected error in tick");
                    self.report(&TickStats::failed());
                    self.config.error_cooldown
                }
            };

            self.phase = AgentPhase::Waiting;
            tracing::info!(wait_secs = wait.as_secs(), "Waiting until next tick");
            if !wait_or_cancel(&self.cancel, wait).await {
                break;
            }
        }

        self.phase = AgentPhase::Stopped;
        tracing::info!(ticks = self.tick_count, "Agent stopped");
    }

    async fn try_tick(&mut self) -> Result<TickStats> {
        self.tick_count += 1;
        let mut stats = TickStats::new();

        self.phase = AgentPhase::Fetching;
        tracing::info!(sort = %self.config.sort, limit = self.config.fetch_limit, "Fetching posts");
        let posts = self
            .client
            .fetch_recent(self.config.sort, self.config.fetch_limit)
            .await
            .map_err(AgentError::Fetch)?;

        if posts.is_empty() {
            tracing::info!("No posts found");
            return Ok(stats);
        }

        self.phase = AgentPhase::Deciding;
        tracing::info!(posts = posts.len(), "Processing posts");
        let timeout = self.config.decide_timeout;
        let actions = tokio::time::timeout(timeout, self.strategy.decide(&posts))
            .await
            .map_err(|_| DecisionError::Timeout(timeout))??;

        self.phase = AgentPhase::Executing;
        tracing::debug!(actions = actions.len(), "Executing actions");
        let completed = self
            .executor
            .execute_all(&actions, &mut self.limiter, &mut stats, &self.cancel)
            .await;
        if !completed {
            tracing::info!(%stats, "Tick interrupted by cancellation");
        }

        Ok(stats)
    }

    fn report(&self, stats: &TickStats) {
        tracing::info!(
            posts_created = stats.posts_created,
            comments_created = stats.comments_created,
            upvotes = stats.upvotes,
            errors = stats.errors,
            "Tick complete"
        );
        tracing::info!(
            next_post_secs = self.limiter.time_until_post().as_secs(),
            next_comment_secs = self.limiter.time_until_comment().as_secs(),
            comments_left_today = self.limiter.comments_remaining_today(),
            "Rate limits"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClientError, SortOrder};
    use crate::clock::ManualClock;
    use crate::domain::{Action, Post};
    use crate::scheduler::rate_limit::RateLimitConfig;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Test helper to reach the owned limiter
    impl<C: SocialClient, D: DecisionStrategy> Agent<C, D> {
        fn rate_limiter_mut(&mut self) -> &mut RateLimiter {
            &mut self.limiter
        }
    }

    #[derive(Default)]
    struct MockClient {
        posts: Vec<Post>,
        fail_fetch: bool,
        fail_comments: bool,
        calls: Mutex<Vec<String>>,
    }

    impl MockClient {
        fn with_posts(count: usize) -> Self {
            Self {
                posts: (0..count).map(|i| Post::new(format!("p{}", i), "Europe")).collect(),
                ..Default::default()
            }
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
        }

        fn action_calls(&self) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| *c != "fetch").count()
        }
    }

    fn server_error() -> ClientError {
        ClientError::Api {
            status: 500,
            message: "server error".to_string(),
        }
    }

    #[async_trait]
    impl SocialClient for MockClient {
        async fn fetch_recent(&self, sort: SortOrder, limit: usize) -> std::result::Result<Vec<Post>, ClientError> {
            assert_eq!(sort, SortOrder::New);
            assert_eq!(limit, 20);
            self.record("fetch");
            if self.fail_fetch {
                return Err(server_error());
            }
            Ok(self.posts.clone())
        }

        async fn create_post(
            &self,
            _submolt: &str,
            _title: &str,
            _content: Option<&str>,
            _url: Option<&str>,
        ) -> std::result::Result<Value, ClientError> {
            self.record("post");
            Ok(json!({"success": true}))
        }

        async fn create_comment(
            &self,
            _post_id: &str,
            _content: &str,
            _parent_id: Option<&str>,
        ) -> std::result::Result<Value, ClientError> {
            self.record("comment");
            if self.fail_comments {
                return Err(server_error());
            }
            Ok(json!({"success": true}))
        }

        async fn upvote(&self, _post_id: &str) -> std::result::Result<Value, ClientError> {
            self.record("upvote");
            Ok(json!({"success": true}))
        }
    }

    #[derive(Default)]
    struct ScriptedStrategy {
        actions: Vec<Action>,
        fail: bool,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl ScriptedStrategy {
        fn returning(actions: Vec<Action>) -> Self {
            Self {
                actions,
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DecisionStrategy for ScriptedStrategy {
        async fn decide(&self, _posts: &[Post]) -> std::result::Result<Vec<Action>, DecisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(DecisionError::Failed("persona crashed".to_string()));
            }
            Ok(self.actions.clone())
        }
    }

    type TestAgent = Agent<MockClient, ScriptedStrategy>;

    fn agent(client: MockClient, strategy: ScriptedStrategy) -> (TestAgent, Arc<MockClient>, Arc<ScriptedStrategy>) {
        let client = Arc::new(client);
        let strategy = Arc::new(strategy);
        let limiter = RateLimiter::with_config(RateLimitConfig::default(), Arc::new(ManualClock::new()));
        let agent = Agent::new(client.clone(), strategy.clone(), TickConfig::default()).with_rate_limiter(limiter);
        (agent, client, strategy)
    }

    fn mixed_actions() -> Vec<Action> {
        vec![
            Action::text_post("europe", "Subsidiarity", "A case for it"),
            Action::comment("p0", "Interesting data"),
            Action::upvote("p1"),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_fetch_skips_decide_and_execute() {
        let (mut agent, client, strategy) = agent(MockClient::default(), ScriptedStrategy::returning(mixed_actions()));

        let stats = agent.tick().await;

        assert_eq!(stats, TickStats::default());
        assert_eq!(strategy.calls(), 0);
        assert_eq!(client.count("fetch"), 1);
        assert_eq!(client.action_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_comment_is_isolated() {
        let client = MockClient {
            fail_comments: true,
            ..MockClient::with_posts(3)
        };
        let (mut agent, client, _strategy) = agent(client, ScriptedStrategy::returning(mixed_actions()));

        let stats = agent.tick().await;

        assert_eq!(
            stats,
            TickStats {
                posts_created: 1,
                comments_created: 0,
                upvotes: 1,
                errors: 1,
            }
        );
        assert_eq!(client.count("comment"), 1);
        // Post cooldown armed, comment gate untouched
        assert!(!agent.rate_limiter().can_post());
        assert_eq!(agent.rate_limiter().recorded_comments(), 0);
        assert_eq!(agent.rate_limiter().time_until_comment(), Duration::ZERO);
        assert!(agent.rate_limiter_mut().can_comment());
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_dropped_while_cooling_down() {
        let strategy = ScriptedStrategy::returning(vec![Action::text_post("europe", "Again", "Too soon")]);
        let (mut agent, client, _strategy) = agent(MockClient::with_posts(1), strategy);
        agent.rate_limiter_mut().record_post();

        let stats = agent.tick().await;

        assert_eq!(stats, TickStats::default());
        assert_eq!(client.count("post"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_tick_respects_cooldowns_from_first() {
        let strategy = ScriptedStrategy::returning(vec![
            Action::text_post("europe", "Once", "Only once"),
            Action::comment("p0", "First"),
        ]);
        let (mut agent, client, _strategy) = agent(MockClient::with_posts(1), strategy);

        let first = agent.tick().await;
        let second = agent.tick().await;

        assert_eq!(first.posts_created, 1);
        assert_eq!(first.comments_created, 1);
        // The manual clock has not moved, so both gates stay closed
        assert!(second.is_empty());
        assert_eq!(client.count("post"), 1);
        assert_eq!(client.count("comment"), 1);
        assert_eq!(agent.tick_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_counts_one_error() {
        let client = MockClient {
            fail_fetch: true,
            ..Default::default()
        };
        let (mut agent, client, strategy) = agent(client, ScriptedStrategy::returning(mixed_actions()));

        let stats = agent.tick().await;

        assert_eq!(stats, TickStats::failed());
        assert_eq!(strategy.calls(), 0);
        assert_eq!(client.action_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_failure_counts_one_error() {
        let strategy = ScriptedStrategy {
            fail: true,
            ..ScriptedStrategy::returning(mixed_actions())
        };
        let (mut agent, client, strategy) = agent(MockClient::with_posts(2), strategy);

        let stats = agent.tick().await;

        assert_eq!(stats, TickStats::failed());
        assert_eq!(strategy.calls(), 1);
        assert_eq!(client.action_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_decision_times_out() {
        let strategy = ScriptedStrategy {
            delay: Some(Duration::from_secs(3600)),
            ..ScriptedStrategy::returning(mixed_actions())
        };
        let (mut agent, client, _strategy) = agent(MockClient::with_posts(2), strategy);

        let start = tokio::time::Instant::now();
        let stats = agent.tick().await;

        assert_eq!(stats, TickStats::failed());
        assert_eq!(client.action_calls(), 0);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_run_in_decided_order() {
        let strategy = ScriptedStrategy::returning(vec![
            Action::upvote("p1"),
            Action::comment("p1", "x"),
            Action::text_post("europe", "t", "c"),
        ]);
        let (mut agent, client, _strategy) = agent(MockClient::with_posts(2), strategy);

        agent.tick().await;

        let calls = client.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["fetch", "upvote", "comment", "post"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval_until_cancelled() {
        let (mut agent, client, _strategy) = agent(MockClient::default(), ScriptedStrategy::default());
        let cancel = agent.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(650)).await;
            cancel.cancel();
        });

        agent.run(Duration::from_secs(300)).await;

        // Ticks at 0s, 300s and 600s
        assert_eq!(client.count("fetch"), 3);
        assert_eq!(agent.phase(), AgentPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_uses_error_cooldown_after_failed_tick() {
        let client = MockClient {
            fail_fetch: true,
            ..Default::default()
        };
        let (mut agent, client, _strategy) = agent(client, ScriptedStrategy::default());
        let cancel = agent.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(130)).await;
            cancel.cancel();
        });

        agent.run(Duration::from_secs(300)).await;

        // Retries at 0s, 60s and 120s despite the 300s interval
        assert_eq!(client.count("fetch"), 3);
        assert_eq!(agent.phase(), AgentPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_immediately_when_already_cancelled() {
        let (mut agent, client, _strategy) = agent(MockClient::default(), ScriptedStrategy::default());
        agent.cancellation_token().cancel();

        agent.run(Duration::from_secs(300)).await;

        assert_eq!(client.count("fetch"), 0);
        assert_eq!(agent.phase(), AgentPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_mid_tick_keeps_committed_effects() {
        let strategy = ScriptedStrategy::returning(vec![
            Action::text_post("europe", "Committed", "before cancel"),
            Action::upvote("p0"),
            Action::upvote("p1"),
        ]);
        let (mut agent, client, _strategy) = agent(MockClient::with_posts(2), strategy);
        let cancel = agent.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        });

        agent.run(Duration::from_secs(300)).await;

        assert_eq!(client.count("post"), 1);
        assert_eq!(client.count("upvote"), 0);
        assert!(!agent.rate_limiter().can_post());
        assert_eq!(agent.phase(), AgentPhase::Stopped);
    }
}

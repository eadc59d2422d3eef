//! Scheduler module - rate-limited action scheduling and the agent loop.
//!
//! This module provides:
//! - **Rate limiting**: post cooldown, comment cooldown and rolling daily
//!   comment quota, checked before every gated action.
//! - **ActionExecutor**: performs decided actions one at a time, consuming a
//!   gate only when the API call succeeds, with a fixed pause between actions.
//! - **Agent**: the tick/run loop that sequences fetch → decide → execute →
//!   wait and isolates failures at the action and tick level.
//!
//! # Example
//!
//! ```ignore
//! use moltbot::api::{MoltbookClient, MoltbookConfig};
//! use moltbot::decision::{Persona, PersonaStrategy};
//! use moltbot::scheduler::{Agent, TickConfig};
//!
//! let client = Arc::new(MoltbookClient::new(MoltbookConfig::default())?);
//! let strategy = Arc::new(PersonaStrategy::new(Persona::default()));
//! let mut agent = Agent::new(client, strategy, TickConfig::default());
//!
//! agent.run(Duration::from_secs(300)).await;
//! ```

mod agent;
mod executor;
mod rate_limit;
mod tick;

pub use agent::Agent;
pub use executor::{ActionExecutor, ActionOutcome};
pub use rate_limit::{
    COMMENT_COOLDOWN, COMMENT_WINDOW, DAILY_COMMENT_LIMIT, POST_COOLDOWN, RateLimitConfig, RateLimiter,
};
pub use tick::{AgentPhase, TickConfig, TickStats};

//! Decision strategy trait
//!
//! A strategy looks at the fetched posts and returns the actions to take, in
//! the order they should run. The agent never reorders them.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Action, Post};

/// Chooses actions for one tick
#[async_trait]
pub trait DecisionStrategy: Send + Sync {
    async fn decide(&self, posts: &[Post]) -> Result<Vec<Action>, DecisionError>;
}

/// Errors a strategy can report
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("Decision failed: {0}")]
    Failed(String),

    #[error("Decision timed out after {0:?}")]
    Timeout(Duration),
}

/// Adapts a plain function into a strategy
pub struct FnStrategy<F> {
    f: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(&[Post]) -> Vec<Action> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> DecisionStrategy for FnStrategy<F>
where
    F: Fn(&[Post]) -> Vec<Action> + Send + Sync,
{
    async fn decide(&self, posts: &[Post]) -> Result<Vec<Action>, DecisionError> {
        Ok((self.f)(posts))
    }
}

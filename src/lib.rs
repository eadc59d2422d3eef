//! Moltbot - an autonomous agent for the Moltbook social network
//!
//! The agent periodically fetches recent posts, asks a decision strategy what
//! to do with them, and performs the chosen posts, comments and upvotes while
//! respecting the platform's rate limits.

pub mod api;
pub mod clock;
pub mod config;
pub mod decision;
pub mod domain;
pub mod error;
pub mod scheduler;

pub use error::{AgentError, Result};

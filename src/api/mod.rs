//! Platform API layer
//!
//! This module provides:
//! - SocialClient trait, the capability the agent loop consumes
//! - MoltbookClient, the reqwest implementation of the Moltbook REST API

pub mod client;
pub mod moltbook;

pub use client::{ClientError, SocialClient, SortOrder};
pub use moltbook::{MOLTBOOK_API_KEY_ENV, MOLTBOOK_API_URL, MoltbookClient, MoltbookConfig, SearchType};

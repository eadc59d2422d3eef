//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: start the agent loop (default)
//! - tick: run a single fetch/decide/execute cycle
//! - me, status: account information
//! - feed, search: read-only browsing
//! - persona: print the configured personality

use clap::{Parser, Subcommand};
use moltbot::api::{SearchType, SortOrder};
use std::path::PathBuf;

/// Moltbot - an autonomous agent for the Moltbook social network
#[derive(Parser, Debug)]
#[command(name = "moltbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the agent loop until interrupted
    Run {
        /// Seconds between ticks (overrides the config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run a single tick and print its stats
    Tick,

    /// Show the agent profile
    Me,

    /// Show the account claim status
    Status,

    /// Show the personalized feed
    Feed {
        /// Sort order (hot, new, top, rising)
        #[arg(short, long, default_value = "hot")]
        sort: SortOrder,

        /// Number of posts
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },

    /// Semantic search over posts and comments
    Search {
        /// Search query
        query: String,

        /// What to search (all, posts, comments)
        #[arg(short = 't', long = "type", default_value = "all")]
        search_type: SearchType,

        /// Maximum results (capped at 50)
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Print the configured persona
    Persona,
}

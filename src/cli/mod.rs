//! CLI module for moltbot - command-line interface and subcommands.
//!
//! Running without a subcommand starts the agent loop; the other subcommands
//! are one-shot calls against the platform API.

pub mod commands;

pub use commands::Cli;

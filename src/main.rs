use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use moltbot::api::{MoltbookClient, SearchType, SortOrder};
use moltbot::clock::SystemClock;
use moltbot::config::Config;
use moltbot::decision::{Persona, PersonaStrategy};
use moltbot::domain::Post;
use moltbot::scheduler::{Agent, RateLimiter};

/// Writes every log line to the log file and to stdout.
struct Tee {
    file: fs::File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stdout().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stdout().flush()
    }
}

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let log_file = config.log_file_path();

    if let Some(log_dir) = log_file.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .context("Failed to open log file")?;

    let level = if verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(Box::new(Tee { file })))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn print_banner(persona: &Persona) {
    let rule = "=".repeat(50);
    info!("{}", rule);
    info!("Starting {}", persona.name);
    info!("Politics: {}", persona.political_orientation.ideology);
    info!("Style: {}", persona.communication_style.tone);
    info!("{}", rule);
    info!("{}", persona.guidelines_text());
    info!("{}", rule);
}

fn build_client(config: &Config) -> Result<Arc<MoltbookClient>> {
    let client = MoltbookClient::new(config.api.to_client_config()).context("Failed to create Moltbook client")?;
    Ok(Arc::new(client))
}

fn build_agent(config: &Config) -> Result<Agent<MoltbookClient, PersonaStrategy>> {
    let client = build_client(config)?;
    let strategy = Arc::new(PersonaStrategy::new(config.persona.clone()));
    let limiter = RateLimiter::with_config(config.limits.clone(), Arc::new(SystemClock));

    Ok(Agent::new(client, strategy, config.agent.to_tick_config()).with_rate_limiter(limiter))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => handle_run_command(None, config).await,
        Some(Commands::Run { interval }) => handle_run_command(*interval, config).await,
        Some(Commands::Tick) => handle_tick_command(config).await,
        Some(Commands::Me) => handle_me_command(config).await,
        Some(Commands::Status) => handle_status_command(config).await,
        Some(Commands::Feed { sort, limit }) => handle_feed_command(*sort, *limit, config).await,
        Some(Commands::Search {
            query,
            search_type,
            limit,
        }) => handle_search_command(query, *search_type, *limit, config).await,
        Some(Commands::Persona) => handle_persona_command(config),
    }
}

async fn handle_run_command(interval: Option<u64>, config: &Config) -> Result<()> {
    let check_interval = interval.map(Duration::from_secs).unwrap_or_else(|| config.agent.check_interval());
    if check_interval.is_zero() {
        eyre::bail!("--interval must be > 0");
    }

    print_banner(&config.persona);

    let cancel = CancellationToken::new();
    let mut agent = build_agent(config)?.with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            cancel.cancel();
        }
    });

    println!("{} every {:?}", "Running:".green(), check_interval);
    agent.run(check_interval).await;

    println!(
        "{} after {} ticks, {} comments left today",
        "Stopped".yellow(),
        agent.tick_count(),
        agent.rate_limiter().comments_remaining_today()
    );
    Ok(())
}

async fn handle_tick_command(config: &Config) -> Result<()> {
    let mut agent = build_agent(config)?;
    let stats = agent.tick().await;

    let label = if stats.errors > 0 { "Tick:".red() } else { "Tick:".green() };
    println!("{} {} ({} actions)", label, stats, stats.actions());
    Ok(())
}

async fn handle_me_command(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let me = client.get_me().await.context("Failed to fetch profile")?;
    print_json(&me)
}

async fn handle_status_command(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let status = client.get_status().await.context("Failed to fetch status")?;
    print_json(&status)
}

async fn handle_feed_command(sort: SortOrder, limit: usize, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let posts = client.get_feed(sort, limit).await.context("Failed to fetch feed")?;

    if posts.is_empty() {
        println!("{}", "Feed is empty".yellow());
    }
    for post in &posts {
        print_post(post);
    }
    Ok(())
}

async fn handle_search_command(query: &str, search_type: SearchType, limit: usize, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let results = client
        .search(query, search_type, limit)
        .await
        .context("Search failed")?;
    print_json(&results)
}

fn handle_persona_command(config: &Config) -> Result<()> {
    let persona = &config.persona;
    println!("{} {}", "Persona:".green(), persona.name.bold());
    println!("  {} {}", "Politics:".cyan(), persona.political_orientation.ideology);
    println!("  {} {}", "Style:".cyan(), persona.communication_style.tone);
    println!("  {} {}", "Keywords:".cyan(), persona.keywords.join(", "));
    println!();
    println!("{}", persona.guidelines_text());
    Ok(())
}

fn print_post(post: &Post) {
    let submolt = post.submolt_name().unwrap_or("?");
    let upvotes = post.upvotes.unwrap_or(0);
    println!("{} {} {}", format!("[{}]", post.id).dimmed(), post.title.bold(), format!("m/{}", submolt).cyan());
    println!("    {} upvotes", upvotes);
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to format response")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the log file location is known
    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}

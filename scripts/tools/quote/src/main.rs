//! Stable pool quoter
//!
//! Usage:
//!   stable-quote --config config/pools.toml --pool staBAL3 invariant
//!   stable-quote --pool staBAL3 swap-exact-in --token-in DAI --token-out USDC --amount 1000
//!   stable-quote --pool staBAL3 --json join --amounts 1000,0,500

use anyhow::Result;
use clap::Parser;
use stable_config::{LoggingConfig, QuoterConfig};
use std::path::PathBuf;
use tracing::{debug, info};

mod quote;

use quote::{run, Command};

#[derive(Parser, Debug)]
#[command(name = "stable-quote")]
#[command(about = "Contract-exact quotes for stable pools")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pool id from the configuration file
    #[arg(short, long)]
    pool: String,

    /// Log level (trace, debug, info, warn, error), overrides the configured level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Print the quote as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // No subscriber is installed until the logging section has been read
    let config = QuoterConfig::load(args.config.as_deref())?;

    let (level, json_logs) = log_settings(&args, &config.logging);
    init_logging(&level, json_logs);
    info!("Loaded {} pool(s) from configuration", config.pools.len());

    let pool_config = config.pool(&args.pool)?;
    let state = pool_config.to_pool_state()?;
    info!(
        "Quoting against pool '{}' ({} tokens)",
        pool_config.id,
        pool_config.tokens.len()
    );
    debug!("Command: {:?}", args.command);

    let quote = run(&args.command, pool_config, &state)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        print!("{}", quote);
    }

    Ok(())
}

/// Command line flags take precedence over the `[logging]` section
fn log_settings(args: &Args, logging: &LoggingConfig) -> (String, bool) {
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| logging.level.clone());
    (level, args.json_logs || logging.json)
}

fn init_logging(level: &str, json: bool) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    // Logs go to stderr so stdout only carries the quote
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

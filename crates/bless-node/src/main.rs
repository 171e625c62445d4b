// ============================================
// File: crates/bless-node/src/main.rs
// ============================================
//! # Bless Node Client Entry Point
//!
//! ## Creation Reason
//! Main entry point for the Bless node client binary.
//! Handles CLI parsing, logging setup, and scheduler startup.
//!
//! ## Main Functionality
//! - CLI argument parsing with clap
//! - Logging initialization with tracing
//! - Configuration loading with command-line overrides
//! - Ctrl-C handling through a cancellation token
//!
//! ## Usage
//! ```bash
//! # Run every node in accounts.json directly
//! bless-node run
//!
//! # Run through proxies listed in proxy.txt
//! bless-node run --proxy-mode private
//!
//! # Other commands
//! bless-node validate                # Validate config file
//! bless-node accounts                # List accounts and nodes (masked)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - `RUST_LOG` takes precedence over `logging.level`
//! - Logging starts at `info` and switches to `logging.level` once the
//!   config is loaded
//! - Exit code 1 on any startup error
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use bless_node::logging::{self, LogHandle};
use bless_node::{run_accounts, AccountStore, JsonAccountStore, NodeConfig, ProxyMode};

// ============================================
// CLI Definition
// ============================================

/// Bless Network Node Client
///
/// Keeps the nodes listed in the account file registered, in session
/// and sending heartbeats.
#[derive(Parser, Debug)]
#[command(name = "bless-node")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every node until interrupted
    Run {
        /// Account file (overrides `accounts.path`)
        #[arg(short, long)]
        accounts: Option<PathBuf>,

        /// Proxy mode (overrides `proxy.mode`)
        #[arg(short, long, value_enum)]
        proxy_mode: Option<ProxyMode>,
    },

    /// Validate configuration file
    Validate,

    /// List accounts and nodes with credentials masked
    Accounts {
        /// Account file (overrides `accounts.path`)
        #[arg(short, long)]
        accounts: Option<PathBuf>,
    },
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log = logging::init("info");

    let result = match cli.command {
        Commands::Run {
            accounts,
            proxy_mode,
        } => cmd_run(cli.config, accounts, proxy_mode, log).await,
        Commands::Validate => cmd_validate(cli.config).await,
        Commands::Accounts { accounts } => cmd_accounts(cli.config, accounts).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Runs the scheduler until Ctrl-C.
async fn cmd_run(
    config_path: PathBuf,
    accounts: Option<PathBuf>,
    proxy_mode: Option<ProxyMode>,
    log: Option<LogHandle>,
) -> anyhow::Result<()> {
    let mut config = NodeConfig::load_or_default(&config_path).await?;
    if let Some(path) = accounts {
        config.accounts.path = path;
    }
    if let Some(mode) = proxy_mode {
        config.proxy.mode = mode;
    }
    config.validate()?;

    if let Some(log) = log {
        log.set_level(&config.logging.level)?;
    }

    info!("════════════════════════════════════════");
    info!("Bless node client v{}", env!("CARGO_PKG_VERSION"));
    info!("Accounts:   {}", config.accounts.path.display());
    info!("Proxy mode: {:?}", config.proxy.mode);
    info!("════════════════════════════════════════");

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C, shutting down"),
        }
        signal_token.cancel();
    });

    run_accounts(&config, cancel).await?;
    info!("Stopped");
    Ok(())
}

/// Validates configuration file.
async fn cmd_validate(config_path: PathBuf) -> anyhow::Result<()> {
    if !tokio::fs::try_exists(&config_path).await.unwrap_or(false) {
        println!("⚠️  Config file not found: {}", config_path.display());
        println!("   Client will use default values.");
        return Ok(());
    }

    let config = NodeConfig::load(&config_path).await?;

    println!("✅ Configuration is valid");
    println!();
    println!("Gateway:");
    println!("   Base URL:   {}", config.gateway.base_url);
    println!("   Timeout:    {}s", config.gateway.request_timeout_secs);
    println!();
    println!("Retry:");
    println!("   Attempts:   {}", config.retry.max_attempts);
    println!("   Delay:      {}s", config.retry.delay_secs);
    println!();
    println!("Lifecycle:");
    println!("   Heartbeat:  {}s", config.lifecycle.heartbeat_interval_secs);
    println!("   Earnings:   {}s", config.lifecycle.earnings_interval_secs);
    println!("   Resync:     {}s", config.lifecycle.resync_interval_secs);
    println!();
    println!("Proxy:");
    println!("   Mode:       {:?}", config.proxy.mode);
    println!();

    Ok(())
}

/// Lists accounts with masked credentials.
async fn cmd_accounts(config_path: PathBuf, accounts: Option<PathBuf>) -> anyhow::Result<()> {
    let config = NodeConfig::load_or_default(&config_path).await?;
    let path = accounts.unwrap_or(config.accounts.path);
    let loaded = JsonAccountStore::new(path.clone()).load().await?;

    println!();
    println!("Accounts in {}", path.display());
    println!("════════════════════════════════════════");
    for account in &loaded {
        let status = if account.validate().is_ok() { "✅" } else { "❌" };
        println!("{status} {}  ({} nodes)", account.masked_token(), account.nodes.len());
        for node in &account.nodes {
            println!("     {}  hw={}", node.pub_key.masked(), node.hardware_id);
        }
    }
    println!("════════════════════════════════════════");
    println!();

    Ok(())
}

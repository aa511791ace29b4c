//! Upsell CLI - preview and configure the checkout upsell widget.
//!
//! Commands:
//! - `upsell preview` - Run a widget session against fixture files
//! - `upsell config` - Show, edit and validate configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use upsell_observability::{LogConfig, LogLevel};

use commands::{ConfigArgs, PreviewArgs};

/// Upsell CLI - Preview the checkout upsell widget offline
#[derive(Parser)]
#[command(name = "upsell")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a widget session against a fixture catalog and cart
    Preview(PreviewArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let log_config = if cli.verbose {
        LogConfig::human(LogLevel::Debug)
    } else {
        ctx.config.logging.clone()
    };
    upsell_observability::init(&log_config);

    let result = match cli.command {
        Commands::Preview(args) => commands::preview::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

//! CLI command implementations.

pub mod config;
pub mod preview;

use clap::{Args, Subcommand};

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Catalog fixture: a product array or a recorded storefront response.
    #[arg(long)]
    pub catalog: String,

    /// Cart fixture: an array of `{"merchandise": {"id": ...}}` lines.
    #[arg(long)]
    pub cart: Option<String>,

    /// Variant to choose before adding.
    #[arg(long)]
    pub choose: Option<String>,

    /// Press the add button.
    #[arg(long)]
    pub add: bool,

    /// Make the cart reject the add with this message.
    #[arg(long)]
    pub fail_add: Option<String>,

    /// Keep running until the error banner clears.
    #[arg(long)]
    pub wait_banner: bool,

    /// How long to wait for each step to show up, in milliseconds.
    #[arg(long, default_value = "2000")]
    pub step_timeout_ms: u64,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Set a config value in the config file.
    Set {
        /// Config key (dot-separated).
        key: String,
        /// Value to set.
        value: String,
    },
    /// Write a default upsell.toml.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}

use crate::updater::DEFAULT_UPDATER_URL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "factorio-updater",
    about = "Fetch and apply incremental updates for a headless Factorio server",
    version
)]
pub struct Cli {
    /// Factorio server binary, used to detect the installed version and apply updates
    #[arg(short, long, global = true)]
    pub binary: Option<PathBuf>,

    /// Factorio username
    #[arg(short, long, global = true, env = "FACTORIO_USERNAME")]
    pub user: Option<String>,

    /// Factorio token
    #[arg(short, long, global = true, env = "FACTORIO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Package to update
    #[arg(short, long, global = true, default_value = "core-linux_headless64")]
    pub package: String,

    /// Resolve updates from this version instead of asking the binary
    #[arg(short, long = "from-version", global = true, value_name = "VERSION")]
    pub from_version: Option<String>,

    /// Follow experimental releases instead of the stable channel
    #[arg(short = 'x', long, global = true)]
    pub experimental: bool,

    /// Base URL of the update service
    #[arg(
        long,
        global = true,
        env = "FACTORIO_UPDATER_URL",
        default_value = DEFAULT_UPDATER_URL
    )]
    pub updater_url: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the packages offered by the update service
    Packages,

    /// Show the latest version and available updates without downloading
    Check,

    /// Download available updates, optionally applying them
    Update {
        /// Directory to store downloaded updates in
        #[arg(short, long, default_value = "/tmp/")]
        output: PathBuf,

        /// Apply each update after download (requires an auto-detected version)
        #[arg(short, long)]
        apply: bool,

        /// Delete each update after it has been applied
        #[arg(short, long, requires = "apply")]
        delete: bool,
    },
}

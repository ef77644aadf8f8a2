mod agents;
mod catalog;
mod cli;
mod error;
mod repository;
mod updater;
mod utils;
mod workflow;

use catalog::ResolutionPolicy;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use repository::Credentials;
use std::process;
use tracing_subscriber::EnvFilter;
use workflow::SessionConfig;

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = SessionConfig {
        binary: cli.binary,
        credentials: Credentials::new(cli.user, cli.token),
        package: cli.package,
        from_version: cli.from_version,
        policy: ResolutionPolicy::from_experimental_flag(cli.experimental),
        updater_url: cli.updater_url,
    };

    let result = match cli.command {
        Commands::Packages => workflow::execute_packages(&config),
        Commands::Check => workflow::execute_check(&config),
        Commands::Update {
            output,
            apply,
            delete,
        } => workflow::execute_update(&config, output, apply, delete),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("factorio_updater=debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

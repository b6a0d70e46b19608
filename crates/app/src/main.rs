//! Runway CLI
//!
//! Usage:
//!   runway scan [DIR]                             Read statements, show the routine filter
//!   runway forecast [DIR] --date D --balance B    One end-of-month forecast
//!   runway chat [DIR]                             Interactive forecasts
//!   runway config                                 Show effective configuration

mod cli;
mod commands;
mod report;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use commands::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so reports and JSON on stdout stay clean.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let settings = Settings::from_cli(&cli);

    match cli.command {
        Commands::Scan { dir } => commands::cmd_scan(&dir, &settings),
        Commands::Forecast {
            dir,
            date,
            balance,
            json,
        } => commands::cmd_forecast(&dir, &settings, &date, &balance, json),
        Commands::Chat { dir } => commands::cmd_chat(&dir, &settings),
        Commands::Config => commands::cmd_config(&settings),
    }
}

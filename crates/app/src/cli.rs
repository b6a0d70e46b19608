//! Command-line arguments. The commands themselves live in `commands`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runway_core::DEFAULT_PERIOD_DAYS;

/// Runway - how long will the balance last this month?
#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "Forecast end-of-month balance from bank e-statements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Leading cover pages to skip in every statement
    #[arg(long, global = true, default_value_t = 2)]
    pub skip_pages: usize,

    /// Assumed period length; the period ends on this day of the month
    #[arg(long, global = true, default_value_t = DEFAULT_PERIOD_DAYS)]
    pub period_days: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read every statement in a folder and show what the routine filter keeps
    Scan {
        /// Folder holding the PDF statements
        #[arg(default_value = "data_pdf")]
        dir: PathBuf,
    },

    /// Run a single forecast
    Forecast {
        #[arg(default_value = "data_pdf")]
        dir: PathBuf,

        /// Today's date, e.g. 2025-10-25 or 25-10-2025
        #[arg(short, long)]
        date: String,

        /// Current balance, e.g. 400000 or Rp400.000
        #[arg(short, long, allow_hyphen_values = true)]
        balance: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: ask for date and balance until told to stop
    Chat {
        #[arg(default_value = "data_pdf")]
        dir: PathBuf,
    },

    /// Print the effective configuration as JSON
    Config,
}

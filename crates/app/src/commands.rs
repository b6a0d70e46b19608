use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use runway_analysis::{ForecastConfig, ForecastInput, Forecaster, RoutineFilter, RoutineFilterConfig};
use runway_statement::{BatchReport, ExtractConfig, PdfTextSource, StatementPipeline};

use crate::cli::Cli;
use crate::report::{ForecastReport, ScanReport};
use crate::session::{parse_balance, Session};

/// Effective configuration: built-in defaults with command-line overrides.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Settings {
    pub extract: ExtractConfig,
    pub routine: RoutineFilterConfig,
    pub forecast: ForecastConfig,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut settings = Settings::default();
        settings.extract.skip_pages = cli.skip_pages;
        settings.forecast.period_days = cli.period_days;
        settings
    }
}

/// Read every statement in `dir`. Statement-level problems end up in the
/// report; only a missing or unlistable folder is an error.
fn load_statements(dir: &Path, settings: &Settings) -> Result<BatchReport> {
    if !dir.is_dir() {
        bail!(
            "Statement folder '{}' not found. Create it and put your PDF e-statements in it.",
            dir.display()
        );
    }
    let pipeline = StatementPipeline::new(PdfTextSource, settings.extract.clone());
    pipeline
        .process_dir(dir)
        .with_context(|| format!("Failed to read statements from {}", dir.display()))
}

fn load_usable_statements(dir: &Path, settings: &Settings) -> Result<BatchReport> {
    let report = load_statements(dir, settings)?;
    report.ensure_usable()?;
    Ok(report)
}

pub fn cmd_scan(dir: &Path, settings: &Settings) -> Result<()> {
    let report = load_statements(dir, settings)?;
    let routine = RoutineFilter::new(settings.routine.clone()).apply(&report.transactions);
    print!("{}", ScanReport::new(&report, &routine));
    Ok(())
}

pub fn cmd_forecast(
    dir: &Path,
    settings: &Settings,
    date: &str,
    balance: &str,
    json: bool,
) -> Result<()> {
    let balance = parse_balance(balance)
        .with_context(|| format!("Invalid balance '{balance}'. Use digits, e.g. 400000"))?;

    let report = load_usable_statements(dir, settings)?;
    let routine = RoutineFilter::new(settings.routine.clone()).apply(&report.transactions);
    let forecaster = Forecaster::new(settings.forecast.clone());
    let result = forecaster.forecast(&ForecastInput::new(balance, date, &routine))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", ForecastReport::new(&result, forecaster.config()));
    }
    Ok(())
}

pub fn cmd_chat(dir: &Path, settings: &Settings) -> Result<()> {
    let report = load_usable_statements(dir, settings)?;
    let session = Session::new(
        &report.transactions,
        &RoutineFilter::new(settings.routine.clone()),
        Forecaster::new(settings.forecast.clone()),
    );
    info!(
        "Session ready: {} routine of {} transactions",
        session.routine().len(),
        report.transactions.len()
    );

    let stdin = std::io::stdin();
    session.run(stdin.lock(), std::io::stdout())?;
    Ok(())
}

pub fn cmd_config(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

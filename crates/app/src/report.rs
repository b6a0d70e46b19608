//! Console rendering of scan and forecast results.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use runway_analysis::{ForecastConfig, ForecastResult, Outlook, RoutineSet, TrajectoryPoint};
use runway_core::Money;
use runway_statement::BatchReport;

const RULE_WIDTH: usize = 70;
const CHART_WIDTH: u32 = 40;

/// Scan summary: documents read, skipped statements and the routine filter band.
pub struct ScanReport<'a> {
    report: &'a BatchReport,
    routine: &'a RoutineSet,
}

impl<'a> ScanReport<'a> {
    pub fn new(report: &'a BatchReport, routine: &'a RoutineSet) -> Self {
        Self { report, routine }
    }
}

impl fmt::Display for ScanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scan(f, self.report, self.routine)
    }
}

/// Forecast figures, verdict and daily balance chart.
pub struct ForecastReport<'a> {
    result: &'a ForecastResult,
    config: &'a ForecastConfig,
}

impl<'a> ForecastReport<'a> {
    pub fn new(result: &'a ForecastResult, config: &'a ForecastConfig) -> Self {
        Self { result, config }
    }
}

impl fmt::Display for ForecastReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_forecast(f, self.result, self.config)
    }
}

// ── Scan ──────────────────────────────────────────────────────────────────────

fn write_scan(out: &mut fmt::Formatter<'_>, report: &BatchReport, routine: &RoutineSet) -> fmt::Result {
    writeln!(out, "Statements in {}", report.dir.display())?;
    writeln!(
        out,
        "  read: {}, skipped: {}",
        report.documents_read,
        report.issues.len()
    )?;
    for issue in &report.issues {
        writeln!(out, "  ! {}", issue.error)?;
    }
    match report.transactions.total() {
        Some(total) => writeln!(
            out,
            "  transactions: {} totalling {total}",
            report.transactions.len()
        )?,
        None => writeln!(
            out,
            "  transactions: {} (total too large to show)",
            report.transactions.len()
        )?,
    }

    let Some(band) = routine.band() else {
        return writeln!(out, "\nNo transactions to filter.");
    };

    writeln!(out, "\nRoutine filter")?;
    writeln!(out, "  median: {}", band.median)?;
    writeln!(out, "  Q1: {}  Q3: {}  IQR: {}", band.q1, band.q3, band.iqr)?;
    writeln!(out, "  fences: {} - {}", band.lower, band.upper)?;
    match (band.band_low, band.band_high) {
        (Some(lo), Some(hi)) => writeln!(out, "  focus band: {lo} - {hi}")?,
        _ => writeln!(out, "  focus band: none (nothing inside the fences)")?,
    }
    writeln!(
        out,
        "  kept {} of {} ({}%), dropped {}",
        band.kept_count,
        band.input_count,
        percent(band.kept_count, band.input_count),
        band.dropped_count()
    )
}

fn percent(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)).round_dp(1)
}

// ── Forecast ──────────────────────────────────────────────────────────────────

fn write_forecast(out: &mut fmt::Formatter<'_>, r: &ForecastResult, config: &ForecastConfig) -> fmt::Result {
    let whole = Money::new(1);
    let today = r.trajectory.first().map_or(0, |p| p.day_of_month);
    let buffer_pct = ((config.buffer - Decimal::ONE) * Decimal::ONE_HUNDRED).normalize();

    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "END-OF-MONTH BALANCE FORECAST")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Today: day {today} ({} days left)", r.remaining_days)?;
    writeln!(out, "Balance now: {}", r.current_balance)?;

    writeln!(out, "\nRoutine spending ({} transactions)", r.stats.count)?;
    writeln!(out, "  mean:      {}", r.stats.mean.round_to_unit(whole))?;
    writeln!(out, "  median:    {}", r.stats.median.round_to_unit(whole))?;
    writeln!(out, "  std dev:   {}", r.stats.stddev.round_to_unit(whole))?;
    if let Some(trend) = r.stats.trend {
        let step = Money::from_decimal(trend.abs()).round_to_unit(whole);
        let direction = match trend.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => "rising",
            std::cmp::Ordering::Less => "falling",
            std::cmp::Ordering::Equal => "flat",
        };
        writeln!(out, "  trend:     {direction}, {step} per transaction")?;
    }
    writeln!(
        out,
        "  estimate:  {}/day (median + {buffer_pct}% buffer)",
        r.daily_estimate
    )?;

    writeln!(out, "\nProjection to day {}", today + r.remaining_days)?;
    writeln!(
        out,
        "  spend over {} days: {}",
        r.remaining_days, r.projected_spend
    )?;
    writeln!(out, "  final balance:     {}", r.final_balance)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    write_verdict(out, r, config)?;

    writeln!(out, "\nDaily balance")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    write_chart(out, &r.trajectory)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn write_verdict(out: &mut fmt::Formatter<'_>, r: &ForecastResult, config: &ForecastConfig) -> fmt::Result {
    let thresholds = &config.thresholds;
    match r.outlook {
        Outlook::Deficit => {
            let shortfall = r.shortfall().unwrap_or_default();
            writeln!(out, "\nWARNING: the balance will most likely NOT last.")?;
            writeln!(out, "Estimated shortfall: {shortfall}")?;
            writeln!(out, "  1. Top up at least {shortfall}")?;
            writeln!(
                out,
                "  2. Or keep daily spend under {}/day",
                r.break_even_daily
            )
        }
        Outlook::Tight => {
            writeln!(out, "\nCAREFUL: the balance lasts, but only just.")?;
            writeln!(
                out,
                "Add {} as a safety buffer.",
                thresholds.adequate_from - r.final_balance
            )
        }
        Outlook::Adequate => {
            writeln!(out, "\nENOUGH: the balance should last until the end of the month.")
        }
        Outlook::Safe => {
            writeln!(out, "\nSAFE: the month is comfortably covered.")?;
            writeln!(
                out,
                "{} is left over beyond the safe margin.",
                r.final_balance - thresholds.safe_from
            )
        }
    }
}

// ── Chart ─────────────────────────────────────────────────────────────────────

/// One row per day. Bars are scaled so the highest balance fills the width and
/// zero (or the lowest balance, when it goes negative) is empty.
fn write_chart(out: &mut impl fmt::Write, trajectory: &[TrajectoryPoint]) -> fmt::Result {
    let balances = trajectory.iter().map(|p| p.balance.as_decimal());
    let Some(max) = balances.clone().max() else {
        return Ok(());
    };
    let min = balances.min().unwrap_or(Decimal::ZERO).min(Decimal::ZERO);
    let range = max.checked_sub(min);

    for point in trajectory {
        let len = bar_len(point.balance.as_decimal(), min, range);
        let (marker, fill) = row_style(point.balance);
        let label = if point.day_offset == 0 {
            format!("Day {:02} (today)", point.day_of_month)
        } else {
            format!("Day {:02}", point.day_of_month)
        };
        let bar = fill.to_string().repeat(len);
        writeln!(
            out,
            "{marker} {label:<16}: {bar:<42} {:>14}",
            point.balance.to_string()
        )?;
    }
    Ok(())
}

/// Columns for `value` on a `[min, min + range]` scale. The ratio is taken
/// before widening so balances near the decimal range still scale; a span
/// too wide to represent draws no bar.
fn bar_len(value: Decimal, min: Decimal, range: Option<Decimal>) -> usize {
    range
        .filter(|r| !r.is_zero())
        .and_then(|r| value.checked_sub(min)?.checked_div(r))
        .and_then(|ratio| ratio.checked_mul(Decimal::from(CHART_WIDTH)))
        .and_then(|cols| cols.floor().to_usize())
        .unwrap_or(0)
        .min(CHART_WIDTH as usize)
}

fn row_style(balance: Money) -> (char, char) {
    if balance.is_negative() {
        ('!', '▓')
    } else if balance > Money::new(200_000) {
        ('+', '█')
    } else if balance > Money::new(100_000) {
        ('~', '█')
    } else {
        ('-', '█')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runway_analysis::{ForecastInput, Forecaster, RoutineFilter};
    use runway_core::{Transaction, TransactionSet};

    fn routine() -> RoutineSet {
        let set: TransactionSet = [10_000, 12_000, 11_000, 15_000, 9_000]
            .iter()
            .map(|a| Transaction::new("QRIS", Money::new(*a)).unwrap())
            .collect();
        RoutineFilter::default().apply(&set)
    }

    fn forecast(balance: i64, date: &str) -> ForecastResult {
        let routine = routine();
        Forecaster::default()
            .forecast(&ForecastInput::new(Money::new(balance), date, &routine))
            .unwrap()
    }

    fn forecast_text(result: &ForecastResult, config: &ForecastConfig) -> String {
        ForecastReport::new(result, config).to_string()
    }

    fn render_chart(trajectory: &[TrajectoryPoint]) -> String {
        let mut out = String::new();
        write_chart(&mut out, trajectory).unwrap();
        out
    }

    fn columns(row: &str, fill: char) -> usize {
        row.chars().filter(|c| *c == fill).count()
    }

    #[test]
    fn forecast_report_shows_figures_and_verdict() {
        let text = forecast_text(&forecast(100_000, "2025-10-25"), &ForecastConfig::default());
        assert!(text.contains("Today: day 25 (5 days left)"));
        assert!(text.contains("Rp13.000/day (median + 15% buffer)"));
        assert!(text.contains("spend over 5 days: Rp65.000"));
        assert!(text.contains("final balance:     Rp35.000"));
        assert!(text.contains("CAREFUL"));
        assert!(text.contains("Add Rp65.000 as a safety buffer."));
    }

    #[test]
    fn deficit_report_gives_shortfall_and_daily_cap() {
        let text = forecast_text(&forecast(50_000, "2025-10-20"), &ForecastConfig::default());
        // 50_000 - 13_000 × 10
        assert!(text.contains("Estimated shortfall: Rp80.000"));
        assert!(text.contains("under Rp5.000/day"));
    }

    #[test]
    fn safe_report_gives_surplus() {
        let text = forecast_text(&forecast(1_000_000, "2025-10-25"), &ForecastConfig::default());
        assert!(text.contains("SAFE"));
        assert!(text.contains("Rp635.000 is left over"));
    }

    #[test]
    fn chart_scales_from_zero_to_full_width() {
        let result = forecast(100_000, "2025-10-25");
        let chart = render_chart(&result.trajectory);
        let rows: Vec<&str> = chart.lines().collect();
        assert_eq!(rows.len(), 6);
        assert!(rows[0].contains("Day 25 (today)"));
        assert_eq!(columns(rows[0], '█'), 40);
        // 35_000 of 100_000 → 14 columns
        assert_eq!(columns(rows[5], '█'), 14);
        assert!(rows[5].starts_with('-'));
        assert!(rows[5].ends_with("Rp35.000"));
    }

    #[test]
    fn chart_of_negative_trajectory_uses_lowest_balance_as_origin() {
        let result = forecast(-50_000, "2025-10-28");
        let rows: Vec<String> = render_chart(&result.trajectory).lines().map(String::from).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.starts_with('!')));
        assert_eq!(columns(&rows[0], '▓'), 40);
        assert_eq!(columns(&rows[2], '▓'), 0);
    }

    #[test]
    fn chart_of_empty_trajectory_is_empty() {
        assert!(render_chart(&[]).is_empty());
    }

    #[test]
    fn scan_report_lists_filter_band() {
        let set: TransactionSet = [10_000, 12_000, 11_000, 15_000, 9_000]
            .iter()
            .map(|a| Transaction::new("QRIS", Money::new(*a)).unwrap())
            .collect();
        let mut report = BatchReport::new(std::path::Path::new("data_pdf"));
        report.documents_read = 1;
        report.transactions = set;
        let text = ScanReport::new(&report, &routine()).to_string();
        assert!(text.contains("read: 1, skipped: 0"));
        assert!(text.contains("transactions: 5 totalling Rp57.000"));
        assert!(text.contains("fences: Rp5.000 - Rp15.000"));
        assert!(text.contains("kept 3 of 5 (60%), dropped 2"));
    }

    #[test]
    fn scan_report_with_total_past_decimal_range() {
        let huge = Money::from_decimal(Decimal::MAX);
        let set: TransactionSet = [huge, huge]
            .into_iter()
            .map(|a| Transaction::new("TRANSFER", a).unwrap())
            .collect();
        let mut report = BatchReport::new(std::path::Path::new("data_pdf"));
        report.transactions = set;
        let text = ScanReport::new(&report, &RoutineSet::default()).to_string();
        assert!(text.contains("transactions: 2 (total too large to show)"));
    }

    #[test]
    fn chart_of_balance_near_decimal_range_scales() {
        let balance: Decimal = "2000000000000000000000000000".parse().unwrap();
        let routine = routine();
        let result = Forecaster::default()
            .forecast(&ForecastInput::new(Money::from_decimal(balance), "2025-10-25", &routine))
            .unwrap();
        let text = forecast_text(&result, &ForecastConfig::default());
        let rows: Vec<&str> = text.lines().filter(|l| l.contains("Day ")).collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(columns(rows[0], '█'), 40);
        // 65_000 of spend is a sliver of the range but still drops below full width.
        assert_eq!(columns(rows[5], '█'), 39);

        let max = Money::from_decimal(Decimal::MAX);
        let result = Forecaster::default()
            .forecast(&ForecastInput::new(max, "2025-10-25", &routine))
            .unwrap();
        assert!(forecast_text(&result, &ForecastConfig::default()).contains("SAFE"));
    }

    #[test]
    fn bar_len_without_representable_span_is_empty() {
        assert_eq!(bar_len(Decimal::MAX, Decimal::MIN, None), 0);
        assert_eq!(bar_len(Decimal::ONE, Decimal::ZERO, Some(Decimal::ZERO)), 0);
        assert_eq!(bar_len(Decimal::ONE, Decimal::ZERO, Some(Decimal::TWO)), 20);
    }

    #[test]
    fn percent_handles_empty() {
        assert_eq!(percent(0, 0), Decimal::ZERO);
        assert_eq!(percent(1, 3), Decimal::new(333, 1));
    }
}

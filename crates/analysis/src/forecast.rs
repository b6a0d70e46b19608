//! End-of-period balance forecast from routine daily spend.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::info;

use runway_core::{parse_as_of, DateParseError, Money, Period, DEFAULT_PERIOD_DAYS};

use crate::routine::RoutineSet;
use crate::stats;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error(transparent)]
    DateUnparseable(#[from] DateParseError),
    #[error("Day {day} is already at the end of the {period_days}-day period")]
    PeriodExhausted { day: u32, period_days: u32 },
    #[error("No routine expenses to base a forecast on")]
    InsufficientData,
    #[error("Amounts are too large to forecast with (balance {balance})")]
    OutOfRange { balance: Money },
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Final-balance thresholds separating the outlooks. Below zero is always a deficit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlookThresholds {
    pub adequate_from: Money,
    pub safe_from: Money,
}

impl Default for OutlookThresholds {
    fn default() -> Self {
        Self {
            adequate_from: Money::new(100_000),
            safe_from: Money::new(300_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub period_days: u32,
    /// Multiplier on the median for spend the routine set does not capture.
    pub buffer: Decimal,
    /// The daily estimate is rounded to a multiple of this, ties to even.
    pub rounding_unit: Money,
    pub thresholds: OutlookThresholds,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            period_days: DEFAULT_PERIOD_DAYS,
            buffer: Decimal::new(115, 2),
            rounding_unit: Money::new(1_000),
            thresholds: OutlookThresholds::default(),
        }
    }
}

// ── Outlook ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    /// Money runs out before the period ends.
    Deficit,
    Tight,
    Adequate,
    Safe,
}

impl Outlook {
    pub fn classify(final_balance: Money, thresholds: &OutlookThresholds) -> Self {
        if final_balance.is_negative() {
            Outlook::Deficit
        } else if final_balance < thresholds.adequate_from {
            Outlook::Tight
        } else if final_balance < thresholds.safe_from {
            Outlook::Adequate
        } else {
            Outlook::Safe
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outlook::Deficit => write!(f, "deficit"),
            Outlook::Tight => write!(f, "tight"),
            Outlook::Adequate => write!(f, "adequate"),
            Outlook::Safe => write!(f, "safe"),
        }
    }
}

// ── Input / output ────────────────────────────────────────────────────────────

/// One forecast request. The date is raw user text and is parsed permissively.
#[derive(Debug, Clone, Copy)]
pub struct ForecastInput<'a> {
    pub current_balance: Money,
    pub as_of: &'a str,
    pub routine: &'a RoutineSet,
}

impl<'a> ForecastInput<'a> {
    pub fn new(current_balance: Money, as_of: &'a str, routine: &'a RoutineSet) -> Self {
        Self { current_balance, as_of, routine }
    }
}

/// Summary of the routine amounts the forecast was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutineStats {
    pub count: usize,
    pub mean: Money,
    pub median: Money,
    /// Population standard deviation.
    pub stddev: Money,
    /// Least-squares change in amount per transaction, in statement order.
    pub trend: Option<Decimal>,
}

impl RoutineStats {
    /// `None` for an empty set or amounts whose spread leaves the decimal range.
    pub fn from_routine(routine: &RoutineSet) -> Option<Self> {
        let in_order: Vec<Decimal> = routine.amounts().map(Money::as_decimal).collect();
        let ascending = stats::sorted(in_order.iter().copied());
        Some(Self {
            count: in_order.len(),
            mean: Money::from_decimal(stats::mean(&in_order)?),
            median: Money::from_decimal(stats::median(&ascending)?),
            stddev: Money::from_decimal(stats::population_stddev(&in_order)?),
            trend: stats::trend_slope(&in_order),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrajectoryPoint {
    pub day_offset: u32,
    /// Calendar day; runs up to the period length, not the real month end.
    pub day_of_month: u32,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastResult {
    pub as_of: NaiveDate,
    pub current_balance: Money,
    pub remaining_days: u32,
    pub daily_estimate: Money,
    /// `daily_estimate × remaining_days`.
    pub projected_spend: Money,
    /// Balance at the period boundary; negative is a shortfall.
    pub final_balance: Money,
    /// Daily spend that would end the period at exactly zero, rounded down.
    pub break_even_daily: Money,
    /// Balance for each day from today (offset 0) to the boundary.
    pub trajectory: Vec<TrajectoryPoint>,
    pub stats: RoutineStats,
    pub outlook: Outlook,
}

impl ForecastResult {
    /// How much is missing at the period boundary, if anything.
    pub fn shortfall(&self) -> Option<Money> {
        self.final_balance.is_negative().then(|| self.final_balance.abs())
    }
}

// ── Forecaster ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Project the balance day by day until the period boundary.
    ///
    /// The daily estimate is the routine median plus the buffer, rounded to
    /// the rounding unit. The routine set is only read. A balance or spend
    /// whose projection leaves the decimal range is an `OutOfRange` error.
    pub fn forecast(&self, input: &ForecastInput<'_>) -> Result<ForecastResult, ForecastError> {
        let cfg = &self.config;
        let as_of = parse_as_of(input.as_of)?;
        let day = as_of.day();

        let remaining_days = u32::try_from(Period::new(cfg.period_days).remaining_days(as_of))
            .ok()
            .filter(|days| *days > 0)
            .ok_or(ForecastError::PeriodExhausted {
                day,
                period_days: cfg.period_days,
            })?;

        let balance = input.current_balance;
        let out_of_range = ForecastError::OutOfRange { balance };
        if input.routine.is_empty() {
            return Err(ForecastError::InsufficientData);
        }
        let stats = RoutineStats::from_routine(input.routine).ok_or(out_of_range.clone())?;

        let daily_estimate = stats
            .median
            .checked_mul(cfg.buffer)
            .ok_or(out_of_range.clone())?
            .round_to_unit(cfg.rounding_unit);

        let trajectory = (0..=remaining_days)
            .map(|offset| {
                let spent = daily_estimate.checked_times(offset)?;
                Some(TrajectoryPoint {
                    day_offset: offset,
                    day_of_month: day + offset,
                    balance: balance.checked_sub(spent)?,
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(out_of_range.clone())?;

        let projected_spend = daily_estimate
            .checked_times(remaining_days)
            .ok_or(out_of_range.clone())?;
        let final_balance = balance.checked_sub(projected_spend).ok_or(out_of_range)?;
        let break_even_daily = Money::from_decimal(balance.as_decimal() / Decimal::from(remaining_days))
            .floor_to_unit(cfg.rounding_unit)
            .max(Money::ZERO);
        let outlook = Outlook::classify(final_balance, &cfg.thresholds);

        info!(
            "Forecast from day {day}: {remaining_days} days at {daily_estimate}/day, final {final_balance} ({outlook})"
        );

        Ok(ForecastResult {
            as_of,
            current_balance: balance,
            remaining_days,
            daily_estimate,
            projected_spend,
            final_balance,
            break_even_daily,
            trajectory,
            stats,
            outlook,
        })
    }
}

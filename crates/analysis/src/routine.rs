//! Routine daily-expense filter.
//!
//! Keeps the small, frequent spend (meals, groceries, transport, top-ups)
//! and drops transfers, big purchases and one-off payments, using only the
//! shape of the amount distribution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use runway_core::{Money, Transaction, TransactionSet};

use crate::stats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineFilterConfig {
    /// Tukey fence multiplier on the IQR above Q3.
    pub iqr_multiplier: Decimal,
    /// No single routine expense is larger than this.
    pub absolute_cap: Money,
    /// Lower bound as a fraction of Q1.
    pub q1_factor: Decimal,
    /// Lower bound never drops below this.
    pub absolute_floor: Money,
    /// Percentile band applied to what survives the fences.
    pub band_low_percent: u32,
    pub band_high_percent: u32,
}

impl Default for RoutineFilterConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: Decimal::new(15, 1),
            absolute_cap: Money::new(100_000),
            q1_factor: Decimal::new(5, 1),
            absolute_floor: Money::new(5_000),
            band_low_percent: 20,
            band_high_percent: 80,
        }
    }
}

/// The cut computed for one filter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterBand {
    pub input_count: usize,
    pub q1: Money,
    pub q3: Money,
    pub iqr: Money,
    pub median: Money,
    pub lower: Money,
    pub upper: Money,
    /// Count inside `[lower, upper]`.
    pub fenced_count: usize,
    /// Percentile band over the fenced subset; `None` when nothing was fenced in.
    pub band_low: Option<Money>,
    pub band_high: Option<Money>,
    pub kept_count: usize,
}

impl FilterBand {
    pub fn dropped_count(&self) -> usize {
        self.input_count - self.kept_count
    }
}

/// Expenses classified as routine, with the band they were cut by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutineSet {
    transactions: TransactionSet,
    band: Option<FilterBand>,
}

impl RoutineSet {
    pub(crate) fn new(transactions: TransactionSet, band: Option<FilterBand>) -> Self {
        Self { transactions, band }
    }

    pub fn transactions(&self) -> &TransactionSet {
        &self.transactions
    }

    /// `None` when the input was empty and no band could be computed.
    pub fn band(&self) -> Option<&FilterBand> {
        self.band.as_ref()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn amounts(&self) -> impl Iterator<Item = Money> + '_ {
        self.transactions.amounts()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoutineFilter {
    config: RoutineFilterConfig,
}

impl RoutineFilter {
    pub fn new(config: RoutineFilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutineFilterConfig {
        &self.config
    }

    /// Two-stage cut:
    /// 1. keep `max(Q1·q1_factor, floor) ≤ amount ≤ min(Q3 + k·IQR, cap)`;
    /// 2. of those, keep the ones inside the `[p_low, p_high]` percentile band.
    ///
    /// Both stages are inclusive at their bounds. The input is left untouched.
    pub fn apply(&self, set: &TransactionSet) -> RoutineSet {
        let all = sorted_amounts(set);
        let (Some(q1), Some(q3), Some(median)) = (
            stats::percentile(&all, 25),
            stats::percentile(&all, 75),
            stats::median(&all),
        ) else {
            debug!("Routine filter: no transactions to filter");
            return RoutineSet::default();
        };

        let cfg = &self.config;
        let iqr = q3 - q1;
        // A fence past the decimal range is no fence; the cap and floor still apply.
        let upper = iqr
            .checked_mul(cfg.iqr_multiplier)
            .and_then(|spread| q3.checked_add(spread))
            .unwrap_or(Decimal::MAX)
            .min(cfg.absolute_cap.as_decimal());
        let lower = q1
            .checked_mul(cfg.q1_factor)
            .unwrap_or(Decimal::MAX)
            .max(cfg.absolute_floor.as_decimal());

        let fenced = set.filtered(|tx| within(tx, lower, upper));
        let fenced_sorted = sorted_amounts(&fenced);
        let band_low = stats::percentile(&fenced_sorted, cfg.band_low_percent);
        let band_high = stats::percentile(&fenced_sorted, cfg.band_high_percent);

        let routine = match (band_low, band_high) {
            (Some(lo), Some(hi)) => fenced.filtered(|tx| within(tx, lo, hi)),
            _ => TransactionSet::new(),
        };

        let band = FilterBand {
            input_count: set.len(),
            q1: Money::from_decimal(q1),
            q3: Money::from_decimal(q3),
            iqr: Money::from_decimal(iqr),
            median: Money::from_decimal(median),
            lower: Money::from_decimal(lower),
            upper: Money::from_decimal(upper),
            fenced_count: fenced.len(),
            band_low: band_low.map(Money::from_decimal),
            band_high: band_high.map(Money::from_decimal),
            kept_count: routine.len(),
        };

        debug!(
            "Routine filter fences {}..{}, band {:?}..{:?}",
            band.lower, band.upper, band.band_low, band.band_high
        );
        info!(
            "Routine filter kept {} of {} transactions",
            band.kept_count, band.input_count
        );

        RoutineSet::new(routine, Some(band))
    }
}

fn sorted_amounts(set: &TransactionSet) -> Vec<Decimal> {
    stats::sorted(set.amounts().map(Money::as_decimal))
}

fn within(tx: &Transaction, lower: Decimal, upper: Decimal) -> bool {
    let amount = tx.amount().as_decimal();
    lower <= amount && amount <= upper
}

//! Descriptive statistics over exact decimals.
//!
//! Every function returns `None` on empty input instead of guessing a value,
//! and on intermediate results that leave the decimal range.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

/// Ascending copy of `values`.
pub fn sorted<I>(values: I) -> Vec<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut v: Vec<Decimal> = values.into_iter().collect();
    v.sort();
    v
}

/// Quantile `q` (0–1) of ascending `sorted`, interpolating linearly between
/// the two nearest ranks.
pub fn quantile(sorted: &[Decimal], q: Decimal) -> Option<Decimal> {
    let last = sorted.len().checked_sub(1)?;
    if last == 0 {
        return Some(sorted[0]);
    }

    let q = q.clamp(Decimal::ZERO, Decimal::ONE);
    let rank = q * Decimal::from(last);
    let lower = rank.floor();
    let idx = lower.to_usize()?.min(last);
    let weight = rank - lower;

    if weight.is_zero() || idx == last {
        return Some(sorted[idx]);
    }
    let step = sorted[idx + 1].checked_sub(sorted[idx])?.checked_mul(weight)?;
    sorted[idx].checked_add(step)
}

/// Percentile `p` (0–100) of ascending `sorted`.
pub fn percentile(sorted: &[Decimal], p: u32) -> Option<Decimal> {
    quantile(sorted, Decimal::from(p) / Decimal::ONE_HUNDRED)
}

pub fn median(sorted: &[Decimal]) -> Option<Decimal> {
    percentile(sorted, 50)
}

pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    sum.checked_div(Decimal::from(values.len()))
}

/// Population standard deviation (divides by n).
pub fn population_stddev(values: &[Decimal]) -> Option<Decimal> {
    let m = mean(values)?;
    let sum_sq = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let dev = v.checked_sub(m)?;
        acc.checked_add(dev.checked_mul(dev)?)
    })?;
    sum_sq.checked_div(Decimal::from(values.len()))?.sqrt()
}

/// Least-squares slope of `values` against their position (1, 2, 3, ...).
/// Needs at least three points.
pub fn trend_slope(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 3 {
        return None;
    }
    let n = Decimal::from(values.len());
    let x_mean = (n + Decimal::ONE) / Decimal::TWO;
    let y_mean = mean(values)?;

    let (sxy, sxx) = values.iter().enumerate().try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(sxy, sxx), (i, y)| {
            let dx = Decimal::from(i + 1) - x_mean;
            let dy = y.checked_sub(y_mean)?;
            Some((sxy.checked_add(dx.checked_mul(dy)?)?, sxx + dx * dx))
        },
    )?;
    sxy.checked_div(sxx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn ds(values: &[i64]) -> Vec<Decimal> {
        sorted(values.iter().copied().map(d))
    }

    #[test]
    fn quantile_interpolates_between_points() {
        let v = ds(&[1, 2, 3, 4]);
        assert_eq!(percentile(&v, 25), Some(Decimal::new(175, 2)));
        assert_eq!(percentile(&v, 0), Some(d(1)));
        assert_eq!(percentile(&v, 100), Some(d(4)));
    }

    #[test]
    fn quantile_of_single_and_empty() {
        assert_eq!(percentile(&ds(&[7]), 80), Some(d(7)));
        assert_eq!(percentile(&[], 50), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&ds(&[10_000, 12_000, 11_000, 15_000, 9_000])), Some(d(11_000)));
        assert_eq!(median(&ds(&[1, 2, 3, 4])), Some(Decimal::new(25, 1)));
    }

    #[test]
    fn mean_and_stddev() {
        let v = ds(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(mean(&v), Some(d(5)));
        assert_eq!(population_stddev(&v), Some(d(2)));
        assert_eq!(mean(&[]), None);
        assert_eq!(population_stddev(&[]), None);
    }

    #[test]
    fn stddev_of_constant_is_zero() {
        assert_eq!(population_stddev(&ds(&[5, 5, 5])), Some(Decimal::ZERO));
    }

    #[test]
    fn trend_slope_follows_direction() {
        let rising = [d(10), d(20), d(30), d(40)];
        assert_eq!(trend_slope(&rising), Some(d(10)));
        let falling = [d(40), d(30), d(20)];
        assert_eq!(trend_slope(&falling), Some(d(-10)));
        assert_eq!(trend_slope(&[d(1), d(2)]), None);
    }

    #[test]
    fn out_of_range_intermediates_are_none() {
        let huge = [Decimal::MAX, Decimal::MAX, d(1)];
        assert_eq!(mean(&huge), None);
        assert_eq!(population_stddev(&huge), None);
        assert_eq!(trend_slope(&huge), None);
        // Deviations of ±MAX/2 square past the range.
        let spread = [Decimal::MAX, d(0)];
        assert!(mean(&spread).is_some());
        assert_eq!(population_stddev(&spread), None);
    }
}

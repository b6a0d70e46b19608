use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// An amount in the statement currency (rupiah), backed by an exact decimal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Whole currency units.
    pub fn new(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money::ZERO
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// `None` when the sum leaves the decimal range.
    pub fn checked_add(self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    pub fn checked_mul(self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Money)
    }

    /// The amount repeated `count` times, e.g. a daily spend over some days.
    pub fn checked_times(self, count: u32) -> Option<Self> {
        self.checked_mul(Decimal::from(count))
    }

    /// Round to the nearest multiple of `unit`, ties to the even multiple.
    ///
    /// `12_650` rounds to `13_000`, `12_500` to `12_000`, `13_500` to `14_000`.
    /// A non-positive unit, or a result outside the decimal range, leaves the
    /// amount untouched.
    pub fn round_to_unit(self, unit: Money) -> Self {
        self.snap_to_unit(unit, |steps| {
            steps.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        })
    }

    /// Largest multiple of `unit` not above the amount.
    pub fn floor_to_unit(self, unit: Money) -> Self {
        self.snap_to_unit(unit, Decimal::floor)
    }

    fn snap_to_unit(self, unit: Money, whole: impl Fn(&Decimal) -> Decimal) -> Self {
        if !unit.is_positive() {
            return self;
        }
        self.0
            .checked_div(unit.0)
            .and_then(|steps| whole(&steps).checked_mul(unit.0))
            .map_or(self, Money)
    }
}

impl fmt::Display for Money {
    /// Indonesian grouping: `Rp1.250.000`, with `,` before any non-zero cents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        let abs = rounded.abs();
        let whole = abs.trunc();
        let cents = ((abs - whole) * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);

        let digits = whole.to_u128().unwrap_or(0).to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}Rp{grouped}")?;
        if cents > 0 {
            write!(f, ",{cents:02}")?;
        }
        Ok(())
    }
}

// The operators panic on overflow the way `Decimal`'s do. Amounts that come
// from user input go through the `checked_*` methods instead.

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;
    fn mul(self, rhs: u32) -> Self {
        Money(self.0 * Decimal::from(rhs))
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;
    fn mul(self, rhs: Decimal) -> Self {
        Money(self.0 * rhs)
    }
}

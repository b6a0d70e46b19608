use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use runway_core::{Money, Transaction};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// A debit numeral in Indonesian notation: `-21.500`, `- 1.250.000,00`.
re!(re_negative_amount, r"-\s?[0-9.,]+");

// ── Amount candidates ─────────────────────────────────────────────────────────

/// A raw numeral matched in statement text, still in locale notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountToken<'a> {
    text: &'a str,
    start: usize,
}

impl<'a> AmountToken<'a> {
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the token within its line.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn normalize(&self) -> Option<Decimal> {
        normalize_amount(self.text)
    }
}

/// Every negative-numeral candidate on a line, left to right.
pub fn extract_amount_candidates(line: &str) -> Vec<AmountToken<'_>> {
    re_negative_amount()
        .find_iter(line)
        .map(|m| AmountToken { text: m.as_str(), start: m.start() })
        .collect()
}

/// Turn an Indonesian-format numeral into a decimal.
///
/// Signs and whitespace are dropped, `.` is a thousands separator and `,`
/// the decimal separator: `-21.500` is 21500 and `1.250.000,00` is 1250000.
/// Returns `None` when what is left is not a number, or is a number past
/// the decimal range (just under 7.93 × 10^28), so such a line reads as no
/// expense at all.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | '.') && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&cleaned).ok()
}

// ── Line parsing ──────────────────────────────────────────────────────────────

/// Read one statement line as an expense.
///
/// The rightmost candidate is taken as the amount. On layouts that print a
/// negative running balance after the amount this picks the balance instead.
/// Lines whose amount does not normalise, or normalises to zero, are skipped.
pub fn parse_line(line: &str) -> Option<Transaction> {
    let token = extract_amount_candidates(line).pop()?;
    let value = token.normalize()?;
    if value <= Decimal::ZERO {
        return None;
    }
    Transaction::new(line.trim(), Money::from_decimal(value.abs())).ok()
}

/// Expenses found on one page of text, in line order.
pub fn parse_page(text: &str) -> impl Iterator<Item = Transaction> + '_ {
    text.lines().filter_map(parse_line)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

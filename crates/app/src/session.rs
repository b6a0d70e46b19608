//! Interactive forecasting session.
//!
//! The routine set is computed once when the session starts and handed to
//! every forecast; nothing is kept between questions.

use std::io::{self, BufRead, Write};

use rust_decimal::Decimal;

use runway_analysis::{ForecastError, ForecastInput, ForecastResult, Forecaster, RoutineFilter, RoutineSet};
use runway_core::{Money, TransactionSet};

use crate::report::ForecastReport;

const QUIT_WORDS: &[&str] = &["keluar", "exit", "quit"];

pub struct Session {
    routine: RoutineSet,
    forecaster: Forecaster,
}

impl Session {
    pub fn new(transactions: &TransactionSet, filter: &RoutineFilter, forecaster: Forecaster) -> Self {
        Self {
            routine: filter.apply(transactions),
            forecaster,
        }
    }

    pub fn routine(&self) -> &RoutineSet {
        &self.routine
    }

    pub fn forecast(&self, balance: Money, as_of: &str) -> Result<ForecastResult, ForecastError> {
        self.forecaster
            .forecast(&ForecastInput::new(balance, as_of, &self.routine))
    }

    /// Ask for a date and a balance, answer with a report, repeat. Bad input and
    /// failed forecasts are reported and the loop carries on. Ends on a quit
    /// word or end of input.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(70))?;
        writeln!(out, "Runway: will the money last the month?")?;
        writeln!(
            out,
            "Working from {} routine expenses. Type 'exit' to stop.",
            self.routine.len()
        )?;
        writeln!(out, "{}", "=".repeat(70))?;

        loop {
            write!(out, "\nToday's date (e.g. 2025-10-25) or 'exit': ")?;
            out.flush()?;
            let Some(date) = read_line(&mut input)? else {
                break;
            };
            if QUIT_WORDS.iter().any(|w| date.eq_ignore_ascii_case(w)) {
                writeln!(out, "\nBye. Keep tracking those expenses!")?;
                break;
            }

            write!(out, "Current balance (Rp): ")?;
            out.flush()?;
            let Some(raw_balance) = read_line(&mut input)? else {
                break;
            };
            let Some(balance) = parse_balance(&raw_balance) else {
                writeln!(out, "Invalid balance. Use digits, e.g. 400000")?;
                continue;
            };

            match self.forecast(balance, &date) {
                Ok(result) => {
                    let report = ForecastReport::new(&result, self.forecaster.config());
                    write!(out, "\n{report}")?
                }
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        Ok(())
    }
}

/// Trimmed next line, or `None` at end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Parse a typed balance such as `400000`, `Rp400.000` or `-50.000`.
///
/// The `Rp` prefix and every `.` and `,` are dropped before parsing, so a
/// typed fraction is read as whole rupiah digits. The sign is kept.
pub fn parse_balance(input: &str) -> Option<Money> {
    let digits: String = input
        .replace("Rp", "")
        .chars()
        .filter(|c| !matches!(c, '.' | ',') && !c.is_whitespace())
        .collect();
    digits.parse::<Decimal>().ok().map(Money::from_decimal)
}

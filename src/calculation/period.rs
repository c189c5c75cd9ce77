//! Pay period normalization.
//!
//! This module derives the calculation context from a payment date: the
//! tax year it falls in, the 1-based period number within that year and
//! the scaling factors used to turn annual thresholds into cumulative or
//! single-period equivalents.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{PeriodType, TaxYear};

/// The calculation context derived from a payment date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPeriod {
    /// The tax year the date falls in.
    pub tax_year: TaxYear,
    /// The 1-based period number within the tax year, clamped to the
    /// valid range for the period type.
    pub period_number: u32,
    /// The number of periods in a standard year for the period type.
    pub periods_per_year: u32,
}

impl NormalizedPeriod {
    /// The fraction of the year elapsed at this period number.
    ///
    /// Cumulative thresholds scale linearly: period 3 of 12 entitles the
    /// employee to 3/12 of every annual figure. Week 53 of a weekly year
    /// scales by 53/52, consistent with the linear model.
    pub fn fraction(&self) -> Decimal {
        Decimal::from(self.period_number) / Decimal::from(self.periods_per_year)
    }

    /// One period's share of an annual figure.
    ///
    /// Used by the non-cumulative calculators, which treat every period
    /// as 1/Nth of a standalone year. The quotient keeps full precision;
    /// only final monetary outputs are rounded.
    pub fn share(&self, annual: Decimal) -> Decimal {
        annual / Decimal::from(self.periods_per_year)
    }
}

/// Derives the tax year and period number for a payment date.
///
/// Week-based period numbers count whole periods elapsed since 6 April;
/// the leftover one or two days at the end of a year fall into the extra
/// period (week 53, fortnight 27, four-week period 14). Monthly periods
/// follow the calendar: period 1 runs 6 April to 5 May. Out-of-range
/// results clamp rather than fail.
///
/// # Example
///
/// ```
/// use paye_engine::calculation::normalize;
/// use paye_engine::models::PeriodType;
/// use chrono::NaiveDate;
///
/// let period = normalize(
///     NaiveDate::from_ymd_opt(2025, 4, 6).unwrap(),
///     PeriodType::Weekly,
/// );
/// assert_eq!(period.tax_year.to_string(), "2025-26");
/// assert_eq!(period.period_number, 1);
/// assert_eq!(period.periods_per_year, 52);
/// ```
pub fn normalize(date: NaiveDate, period_type: PeriodType) -> NormalizedPeriod {
    let tax_year = TaxYear::containing(date);
    let raw_number = match period_type.period_length_days() {
        Some(length) => {
            let elapsed = (date - tax_year.start_date()).num_days().max(0) as u32;
            elapsed / length + 1
        }
        None => {
            let months = (date.year() - tax_year.start_year()) * 12 + date.month() as i32 - 4;
            let completed = if date.day() < 6 { months - 1 } else { months };
            (completed + 1).max(1) as u32
        }
    };

    NormalizedPeriod {
        tax_year,
        period_number: raw_number.clamp(1, period_type.max_period_number()),
        periods_per_year: period_type.periods_per_year(),
    }
}

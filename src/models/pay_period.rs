//! Pay period models and the UK tax-year calendar.
//!
//! This module contains the [`TaxYear`], [`PeriodType`] and [`PayPeriod`]
//! types that define the calculation context for payroll calculations.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A UK tax year, running from 6 April to the following 5 April.
///
/// Tax years are identified by their start year and rendered in the
/// conventional `YYYY-YY` form, e.g. `2025-26` for the year starting
/// 6 April 2025.
///
/// # Example
///
/// ```
/// use paye_engine::models::TaxYear;
/// use chrono::NaiveDate;
///
/// let year = TaxYear::containing(NaiveDate::from_ymd_opt(2025, 4, 6).unwrap());
/// assert_eq!(year.to_string(), "2025-26");
///
/// // 5 April still belongs to the previous tax year.
/// let year = TaxYear::containing(NaiveDate::from_ymd_opt(2025, 4, 5).unwrap());
/// assert_eq!(year.to_string(), "2024-25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxYear {
    start_year: i32,
}

impl TaxYear {
    /// Creates a tax year from its starting calendar year.
    pub fn starting(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Returns the tax year containing the given date.
    ///
    /// The boundary is 6 April: dates on or after 6 April belong to the tax
    /// year starting that calendar year, earlier dates to the previous one.
    pub fn containing(date: NaiveDate) -> Self {
        let start_year = if (date.month(), date.day()) >= (4, 6) {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start_year }
    }

    /// The calendar year in which this tax year starts.
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// The first day of the tax year (6 April).
    pub fn start_date(&self) -> NaiveDate {
        // 6 April exists in every calendar year.
        NaiveDate::from_ymd_opt(self.start_year, 4, 6).unwrap_or_default()
    }

    /// The last day of the tax year (5 April of the following year).
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year + 1, 4, 5).unwrap_or_default()
    }

    /// The tax year that follows this one.
    pub fn next(&self) -> Self {
        Self {
            start_year: self.start_year + 1,
        }
    }

    /// Returns `true` if the given date falls within this tax year.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

impl FromStr for TaxYear {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidTaxYear {
            value: s.to_string(),
        };

        let (start, suffix) = s.split_once('-').ok_or_else(invalid)?;
        if start.len() != 4 || suffix.len() != 2 {
            return Err(invalid());
        }
        let start_year: i32 = start.parse().map_err(|_| invalid())?;
        let suffix: i32 = suffix.parse().map_err(|_| invalid())?;
        if (start_year + 1).rem_euclid(100) != suffix {
            return Err(invalid());
        }
        Ok(Self { start_year })
    }
}

impl TryFrom<String> for TaxYear {
    type Error = EngineError;

    fn try_from(value: String) -> EngineResult<Self> {
        value.parse()
    }
}

impl From<TaxYear> for String {
    fn from(value: TaxYear) -> Self {
        value.to_string()
    }
}

/// The payment frequency of a pay period.
///
/// The frequency determines both the period-equivalent divisor used to
/// scale annual thresholds and the highest period number a tax year can
/// hold (week-based frequencies get one extra period in years where the
/// final short week spills past period 52).
///
/// # Example
///
/// ```
/// use paye_engine::models::PeriodType;
///
/// assert_eq!(PeriodType::Weekly.periods_per_year(), 52);
/// assert_eq!(PeriodType::Weekly.max_period_number(), 53);
/// assert_eq!(PeriodType::Monthly.max_period_number(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// Paid every week.
    Weekly,
    /// Paid every two weeks.
    Fortnightly,
    /// Paid every four weeks.
    FourWeekly,
    /// Paid once per calendar month.
    Monthly,
}

impl PeriodType {
    /// The number of periods that make up a standard tax year.
    ///
    /// This is the divisor used to derive period-equivalent values from
    /// annual thresholds, even in years that contain an extra short week.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PeriodType::Weekly => 52,
            PeriodType::Fortnightly => 26,
            PeriodType::FourWeekly => 13,
            PeriodType::Monthly => 12,
        }
    }

    /// The highest valid period number for this frequency.
    pub fn max_period_number(&self) -> u32 {
        match self {
            PeriodType::Weekly => 53,
            PeriodType::Fortnightly => 27,
            PeriodType::FourWeekly => 14,
            PeriodType::Monthly => 12,
        }
    }

    /// The fixed length of one period in days, or `None` for calendar
    /// months.
    pub fn period_length_days(&self) -> Option<u32> {
        match self {
            PeriodType::Weekly => Some(7),
            PeriodType::Fortnightly => Some(14),
            PeriodType::FourWeekly => Some(28),
            PeriodType::Monthly => None,
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodType::Weekly => "weekly",
            PeriodType::Fortnightly => "fortnightly",
            PeriodType::FourWeekly => "four_weekly",
            PeriodType::Monthly => "monthly",
        };
        write!(f, "{}", name)
    }
}

/// A single pay period within a tax year.
///
/// The period number is 1-based within the tax year and must lie in
/// `1..=max_period_number()` for the period type.
///
/// # Example
///
/// ```
/// use paye_engine::models::{PayPeriod, PeriodType};
/// use chrono::NaiveDate;
///
/// let period = PayPeriod {
///     period_type: PeriodType::Weekly,
///     number: 1,
///     start_date: NaiveDate::from_ymd_opt(2025, 4, 6).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 4, 12).unwrap(),
/// };
/// assert_eq!(period.tax_year().to_string(), "2025-26");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The payment frequency.
    pub period_type: PeriodType,
    /// The 1-based period number within the tax year.
    pub number: u32,
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// The tax year this period is paid in, derived from the end date.
    pub fn tax_year(&self) -> TaxYear {
        TaxYear::containing(self.end_date)
    }
}

//! Calculation input models.
//!
//! This module contains the [`PayrollInput`] aggregate handed to the
//! engine: the employee snapshot, the pay figures, the period, the tax
//! year configuration and the prior year-to-date record. The engine reads
//! this and nothing else.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TaxYearConfig;

use super::{Employee, EmployeeYtd, PayPeriod};

/// Supplemental pay components paid on top of basic gross pay.
///
/// Every component is taxable, NI-able and pensionable in the same way as
/// basic pay; they are itemised so payslips and audits can attribute them.
/// Absent components default to zero.
///
/// # Example
///
/// ```
/// use paye_engine::models::PayComponents;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let components = PayComponents {
///     bonus: Decimal::from_str("150.00").unwrap(),
///     ..PayComponents::default()
/// };
/// assert_eq!(components.total(), Decimal::from_str("150.00").unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayComponents {
    /// One-off or contractual bonus.
    #[serde(default)]
    pub bonus: Decimal,
    /// Sales or performance commission.
    #[serde(default)]
    pub commission: Decimal,
    /// Tronc (pooled tips distributed through payroll).
    #[serde(default)]
    pub tronc: Decimal,
    /// Holiday pay for the period.
    #[serde(default)]
    pub holiday_pay: Decimal,
    /// Anything else not covered by the named components.
    #[serde(default)]
    pub other: Decimal,
}

impl PayComponents {
    /// The sum of all supplemental components.
    pub fn total(&self) -> Decimal {
        self.bonus + self.commission + self.tronc + self.holiday_pay + self.other
    }
}

/// Everything the engine needs to calculate one employee's pay for one
/// period.
///
/// The input is a self-contained snapshot; the engine performs no lookups
/// of its own, so two calls with equal inputs produce equal figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollInput {
    /// The employee being paid.
    pub employee: Employee,
    /// Basic gross pay for the period, before supplemental components.
    pub gross_pay: Decimal,
    /// The pay period being calculated.
    pub period: PayPeriod,
    /// The tax year configuration to calculate against.
    pub config: TaxYearConfig,
    /// The employee's year-to-date record before this period.
    pub prior_ytd: EmployeeYtd,
    /// Supplemental pay components for the period.
    #[serde(default)]
    pub components: PayComponents,
}

impl PayrollInput {
    /// Gross pay for the period including all supplemental components.
    ///
    /// This is the figure every calculator works from.
    pub fn gross_for_period(&self) -> Decimal {
        self.gross_pay + self.components.total()
    }
}

//! Year-to-date accumulation records.
//!
//! This module contains the [`EmployeeYtd`] type holding one employee's
//! running totals for a single tax year. Records are append-only from the
//! engine's point of view: each accepted calculation produces a new
//! snapshot with strictly larger (or equal) totals and a bumped version.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StudentLoanPlan, TaxYear};

/// One employee's running totals within a single tax year.
///
/// All monetary fields are monotonically non-decreasing over the life of a
/// record and always equal the sum of the per-period figures that produced
/// them. The `version` field is the optimistic-concurrency token: stores
/// accept a new snapshot only when its version is exactly one ahead of the
/// version they currently hold.
///
/// # Example
///
/// ```
/// use paye_engine::models::{EmployeeYtd, TaxYear};
/// use rust_decimal::Decimal;
///
/// let opening = EmployeeYtd::opening(TaxYear::starting(2025));
/// assert_eq!(opening.gross_pay, Decimal::ZERO);
/// assert_eq!(opening.version, 0);
/// assert!(opening.last_run_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeYtd {
    /// The tax year these totals belong to.
    pub tax_year: TaxYear,
    /// Total gross pay received.
    pub gross_pay: Decimal,
    /// Total pay subject to income tax.
    pub taxable_pay: Decimal,
    /// Total income tax deducted.
    pub tax_paid: Decimal,
    /// Total pay subject to National Insurance.
    pub niable_pay: Decimal,
    /// Total employee National Insurance deducted.
    pub employee_ni: Decimal,
    /// Total employer National Insurance due.
    pub employer_ni: Decimal,
    /// Total qualifying earnings on which pension contributions were
    /// calculated.
    pub pensionable_pay: Decimal,
    /// Total employee pension contributions deducted.
    pub employee_pension: Decimal,
    /// Total employer pension contributions due.
    pub employer_pension: Decimal,
    /// Student loan deductions per standard plan.
    #[serde(default)]
    pub student_loans: BTreeMap<StudentLoanPlan, Decimal>,
    /// Postgraduate loan deductions.
    #[serde(default)]
    pub postgraduate_loan: Decimal,
    /// The calculation run that produced this snapshot, if any.
    #[serde(default)]
    pub last_run_id: Option<Uuid>,
    /// Monotonic write counter used for optimistic concurrency control.
    #[serde(default)]
    pub version: u64,
}

impl EmployeeYtd {
    /// Creates the all-zero opening record for a tax year.
    ///
    /// This is what a store hands out for an employee with no payroll
    /// history yet; nothing is persisted until a calculation is accepted.
    pub fn opening(tax_year: TaxYear) -> Self {
        Self {
            tax_year,
            gross_pay: Decimal::ZERO,
            taxable_pay: Decimal::ZERO,
            tax_paid: Decimal::ZERO,
            niable_pay: Decimal::ZERO,
            employee_ni: Decimal::ZERO,
            employer_ni: Decimal::ZERO,
            pensionable_pay: Decimal::ZERO,
            employee_pension: Decimal::ZERO,
            employer_pension: Decimal::ZERO,
            student_loans: BTreeMap::new(),
            postgraduate_loan: Decimal::ZERO,
            last_run_id: None,
            version: 0,
        }
    }

    /// The deductions taken so far in the year for one standard plan.
    ///
    /// Plans with no deductions yet report zero rather than being absent.
    pub fn plan_total(&self, plan: StudentLoanPlan) -> Decimal {
        self.student_loans.get(&plan).copied().unwrap_or(Decimal::ZERO)
    }

    /// The total student loan deductions across all standard plans and
    /// the postgraduate loan.
    pub fn student_loan_total(&self) -> Decimal {
        let plans: Decimal = self.student_loans.values().copied().sum();
        plans + self.postgraduate_loan
    }
}

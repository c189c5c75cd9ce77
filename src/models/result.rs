//! Calculation result models for the PAYE calculation engine.
//!
//! This module contains the [`PayrollResult`] type and its associated
//! structures that capture all outputs from a payroll calculation: the
//! per-calculator breakdowns, the deduction totals, the new year-to-date
//! snapshot and the ordered calculation log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EmployeeYtd, PayPeriod, StudentLoanPlan, TaxBasis, TaxYear};

/// The pipeline stage a log step belongs to.
///
/// Stages appear in the log in this fixed order; a rejected calculation
/// stops at the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStage {
    /// Structural input validation.
    Validate,
    /// Tax year and period derivation.
    Normalize,
    /// Income tax calculation.
    ComputeTax,
    /// National Insurance calculation.
    ComputeNi,
    /// Pension contribution calculation.
    ComputePension,
    /// Student loan deduction calculation.
    ComputeStudentLoan,
    /// Year-to-date accumulation.
    Accumulate,
    /// Final result assembly.
    Assemble,
}

/// A single step in the calculation log.
///
/// Each step captures the input, output and a human-readable explanation
/// for one rule application, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStep {
    /// The sequential step number, starting at 1.
    pub step_number: u32,
    /// The pipeline stage this step belongs to.
    pub stage: EngineStage,
    /// The identifier of the rule that was applied.
    pub rule_id: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the figures.
    pub detail: String,
}

/// The complete ordered log for a calculation.
///
/// # Example
///
/// ```
/// use paye_engine::models::CalculationLog;
///
/// let log = CalculationLog {
///     steps: vec![],
///     duration_us: 1234,
/// };
/// assert!(log.steps.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationLog {
    /// The sequence of calculation steps in execution order.
    pub steps: Vec<LogStep>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The amount of taxable pay that fell into one tax band, and the tax it
/// attracted.
///
/// Band lines are rounded for presentation; the authoritative period total
/// in [`TaxBreakdown::tax_due`] is rounded once from the unrounded sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandAmount {
    /// The name of the band, e.g. "basic".
    pub band: String,
    /// The applicable rate as a fraction.
    pub rate: Decimal,
    /// The pay allocated to this band.
    pub amount_in_band: Decimal,
    /// The tax due on that allocation.
    pub tax: Decimal,
}

/// The income tax portion of a payroll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// The tax code the calculation used, as issued.
    pub tax_code: String,
    /// The basis the calculation ran on.
    pub basis: TaxBasis,
    /// The tax-free pay applied in this calculation. On the cumulative
    /// basis this is the year-to-date allowance; on week1/month1 it is a
    /// single period's share.
    pub free_pay: Decimal,
    /// The pay that remained taxable after free pay.
    pub taxable_pay: Decimal,
    /// The allocation of taxable pay across bands. Only bands that
    /// received pay appear.
    pub band_amounts: Vec<BandAmount>,
    /// The tax due this period, floored at zero.
    pub tax_due: Decimal,
    /// True when a cumulative recalculation produced a negative figure
    /// that was floored to zero instead of being refunded.
    pub refund_withheld: bool,
}

/// The National Insurance portion of a payroll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NiBreakdown {
    /// The category letter the rates were taken from.
    pub category: char,
    /// Earnings between the primary threshold and the upper earnings
    /// limit, charged at the main rate.
    pub earnings_at_main_rate: Decimal,
    /// Earnings above the upper earnings limit, charged at the upper rate.
    pub earnings_above_uel: Decimal,
    /// Employee National Insurance due this period.
    pub employee_ni: Decimal,
    /// Employer National Insurance due this period.
    pub employer_ni: Decimal,
}

/// The pension portion of a payroll result.
///
/// Always present: a result for an unenrolled employee carries zeros, not
/// an absent section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionBreakdown {
    /// Whether the employee was enrolled for this calculation.
    pub enrolled: bool,
    /// Earnings within the qualifying band that contributions were
    /// calculated on.
    pub qualifying_earnings: Decimal,
    /// Employee contribution deducted this period.
    pub employee_contribution: Decimal,
    /// Employer contribution due this period.
    pub employer_contribution: Decimal,
}

/// One standard student loan plan's deduction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDeduction {
    /// The plan this line belongs to.
    pub plan: StudentLoanPlan,
    /// The plan threshold scaled to this pay period.
    pub threshold: Decimal,
    /// The deduction taken this period.
    pub deduction: Decimal,
    /// The plan's year-to-date deductions including this period.
    pub ytd_after: Decimal,
}

/// The postgraduate loan deduction line.
///
/// Present on every result, zero-valued when no postgraduate loan is
/// active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgraduateDeduction {
    /// The postgraduate threshold scaled to this pay period.
    pub threshold: Decimal,
    /// The deduction taken this period.
    pub deduction: Decimal,
    /// Year-to-date postgraduate deductions including this period.
    pub ytd_after: Decimal,
}

/// The student loan portion of a payroll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLoanBreakdown {
    /// One line per active standard plan, each computed independently.
    pub plans: Vec<PlanDeduction>,
    /// The postgraduate line, always present.
    pub postgraduate: PostgraduateDeduction,
    /// The sum of all loan deductions this period.
    pub total: Decimal,
}

/// The employee-side deduction totals for one period.
///
/// `total` is the plain sum of the already-rounded components; nothing is
/// re-rounded at this level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Income tax deducted.
    pub tax: Decimal,
    /// Employee National Insurance deducted.
    pub employee_ni: Decimal,
    /// Employee pension contribution deducted.
    pub employee_pension: Decimal,
    /// All student loan deductions.
    pub student_loans: Decimal,
    /// The sum of the above.
    pub total: Decimal,
}

/// The complete result of one payroll calculation.
///
/// A result is only ever produced for a fully successful run: every
/// calculator completed, every invariant held, and the new year-to-date
/// snapshot is ready to persist. Rejected runs return an error and produce
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// Unique identifier for this calculation run.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The employee the calculation is for.
    pub employee_id: String,
    /// The tax year the period falls in.
    pub tax_year: TaxYear,
    /// The pay period that was calculated.
    pub period: PayPeriod,
    /// Gross pay for the period including all supplemental components.
    pub gross_pay: Decimal,
    /// Income tax breakdown.
    pub tax: TaxBreakdown,
    /// National Insurance breakdown.
    pub national_insurance: NiBreakdown,
    /// Pension contribution breakdown.
    pub pension: PensionBreakdown,
    /// Student loan breakdown.
    pub student_loans: StudentLoanBreakdown,
    /// Employee-side deduction totals.
    pub deductions: Deductions,
    /// Net pay: gross pay less total deductions.
    pub net_pay: Decimal,
    /// The year-to-date snapshot including this period.
    pub new_ytd: EmployeeYtd,
    /// The ordered calculation log.
    pub log: CalculationLog,
}

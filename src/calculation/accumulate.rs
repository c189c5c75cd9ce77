//! Year-to-date accumulation.
//!
//! The accumulator is a pure merge of one period's figures into the
//! prior year-to-date record. Every figure it adds has already been
//! rounded by its calculator, so totals accumulate rounded period values
//! rather than being re-rounded after summation. It performs no I/O;
//! persisting the merged record is the caller's job, exactly once per
//! accepted calculation.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    EmployeeYtd, EngineStage, LogStep, NiBreakdown, PensionBreakdown, StudentLoanBreakdown,
    TaxBreakdown,
};

/// The result of a year-to-date merge, including the log step.
#[derive(Debug, Clone)]
pub struct AccumulationResult {
    /// The new year-to-date snapshot.
    pub ytd: EmployeeYtd,
    /// The log step recording the merge.
    pub log_step: LogStep,
}

/// Merges one period's calculated figures into the prior year-to-date
/// record.
///
/// `gross_pay` is the rounded gross for the period; gross, taxable and
/// NI-able pay all advance by it. Running the same merge twice
/// double-counts, so callers must apply it exactly once per accepted
/// calculation; the version counter advances by one to let the store
/// reject a stale snapshot.
pub fn accumulate(
    prior: &EmployeeYtd,
    gross_pay: Decimal,
    tax: &TaxBreakdown,
    ni: &NiBreakdown,
    pension: &PensionBreakdown,
    loans: &StudentLoanBreakdown,
    run_id: Uuid,
    step_number: u32,
) -> AccumulationResult {
    let mut ytd = prior.clone();
    ytd.gross_pay += gross_pay;
    ytd.taxable_pay += gross_pay;
    ytd.niable_pay += gross_pay;
    ytd.tax_paid += tax.tax_due;
    ytd.employee_ni += ni.employee_ni;
    ytd.employer_ni += ni.employer_ni;
    ytd.pensionable_pay += pension.qualifying_earnings;
    ytd.employee_pension += pension.employee_contribution;
    ytd.employer_pension += pension.employer_contribution;
    for line in &loans.plans {
        *ytd.student_loans.entry(line.plan).or_insert(Decimal::ZERO) += line.deduction;
    }
    ytd.postgraduate_loan += loans.postgraduate.deduction;
    ytd.last_run_id = Some(run_id);
    ytd.version = prior.version + 1;

    let log_step = LogStep {
        step_number,
        stage: EngineStage::Accumulate,
        rule_id: "ytd_accumulation".to_string(),
        input: serde_json::json!({
            "prior_gross_pay": prior.gross_pay.normalize().to_string(),
            "prior_tax_paid": prior.tax_paid.normalize().to_string(),
            "prior_version": prior.version,
            "period_gross_pay": gross_pay.normalize().to_string(),
        }),
        output: serde_json::json!({
            "gross_pay": ytd.gross_pay.normalize().to_string(),
            "tax_paid": ytd.tax_paid.normalize().to_string(),
            "employee_ni": ytd.employee_ni.normalize().to_string(),
            "employee_pension": ytd.employee_pension.normalize().to_string(),
            "student_loan_total": ytd.student_loan_total().normalize().to_string(),
            "version": ytd.version,
        }),
        detail: format!(
            "Year-to-date for {} now £{} gross, £{} tax, £{} employee NI (version {})",
            ytd.tax_year,
            ytd.gross_pay.normalize(),
            ytd.tax_paid.normalize(),
            ytd.employee_ni.normalize(),
            ytd.version
        ),
    };

    AccumulationResult { ytd, log_step }
}

//! Student loan deduction calculation.
//!
//! An employee may repay several plans at once; each active plan deducts
//! independently against its own period-equivalent threshold and the
//! deductions are summed. The postgraduate loan is a separate line that
//! runs alongside the standard plans, and it appears on every result so
//! the shape of the breakdown never depends on the employee.

use rust_decimal::Decimal;

use crate::config::TaxYearConfig;
use crate::error::EngineResult;
use crate::models::{
    Employee, EmployeeYtd, EngineStage, LogStep, PlanDeduction, PostgraduateDeduction,
    StudentLoanBreakdown,
};

use super::period::NormalizedPeriod;
use super::rounding::{portion_above, round_money};

/// The result of a student loan calculation, including the breakdown and
/// one log step per deduction line.
#[derive(Debug, Clone)]
pub struct StudentLoanResult {
    /// The student loan breakdown for the payroll result.
    pub breakdown: StudentLoanBreakdown,
    /// The log steps recording each deduction line, consecutively
    /// numbered from the step number given to the calculator.
    pub log_steps: Vec<LogStep>,
}

/// Calculates student loan deductions for one period.
///
/// Each of the employee's plans deducts `rate × pay above threshold`,
/// rounded per plan, where the threshold is one period's share of the
/// plan's annual threshold. Plans are reported in plan order. The
/// postgraduate line is always produced; without an active postgraduate
/// loan it carries the threshold and a zero deduction.
///
/// # Errors
///
/// Fails if an active plan has no entry in the configuration.
pub fn calculate_student_loans(
    employee: &Employee,
    pay: Decimal,
    period: &NormalizedPeriod,
    prior_ytd: &EmployeeYtd,
    config: &TaxYearConfig,
    first_step_number: u32,
) -> EngineResult<StudentLoanResult> {
    let mut active_plans = employee.student_loan_plans.clone();
    active_plans.sort();
    active_plans.dedup();

    let mut plans = Vec::with_capacity(active_plans.len());
    let mut log_steps = Vec::with_capacity(active_plans.len() + 1);
    let mut total = Decimal::ZERO;
    let mut step_number = first_step_number;

    for plan in active_plans {
        let rates = config.student_loan(plan)?;
        let threshold = period.share(rates.annual_threshold);
        let deduction = round_money(portion_above(pay, threshold) * rates.rate);
        let ytd_after = prior_ytd.plan_total(plan) + deduction;
        total += deduction;

        let line = PlanDeduction {
            plan,
            threshold: round_money(threshold),
            deduction,
            ytd_after,
        };
        log_steps.push(LogStep {
            step_number,
            stage: EngineStage::ComputeStudentLoan,
            rule_id: "student_loan".to_string(),
            input: serde_json::json!({
                "plan": plan.to_string(),
                "pay": pay.normalize().to_string(),
                "threshold": line.threshold.normalize().to_string(),
                "rate": rates.rate.normalize().to_string(),
            }),
            output: serde_json::json!({
                "deduction": deduction.normalize().to_string(),
                "ytd_after": ytd_after.normalize().to_string(),
            }),
            detail: format!(
                "{}: £{} above the £{} threshold at {} = £{}",
                plan,
                round_money(portion_above(pay, threshold)).normalize(),
                line.threshold.normalize(),
                rates.rate.normalize(),
                deduction.normalize()
            ),
        });
        plans.push(line);
        step_number += 1;
    }

    let pg_rates = &config.postgraduate_loan;
    let pg_threshold = period.share(pg_rates.annual_threshold);
    let pg_deduction = if employee.postgraduate_loan {
        round_money(portion_above(pay, pg_threshold) * pg_rates.rate)
    } else {
        Decimal::ZERO
    };
    let postgraduate = PostgraduateDeduction {
        threshold: round_money(pg_threshold),
        deduction: pg_deduction,
        ytd_after: prior_ytd.postgraduate_loan + pg_deduction,
    };
    total += pg_deduction;

    log_steps.push(LogStep {
        step_number,
        stage: EngineStage::ComputeStudentLoan,
        rule_id: "postgraduate_loan".to_string(),
        input: serde_json::json!({
            "active": employee.postgraduate_loan,
            "pay": pay.normalize().to_string(),
            "threshold": postgraduate.threshold.normalize().to_string(),
            "rate": pg_rates.rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "deduction": pg_deduction.normalize().to_string(),
            "ytd_after": postgraduate.ytd_after.normalize().to_string(),
        }),
        detail: if employee.postgraduate_loan {
            format!(
                "Postgraduate loan: £{} above the £{} threshold at {} = £{}",
                round_money(portion_above(pay, pg_threshold)).normalize(),
                postgraduate.threshold.normalize(),
                pg_rates.rate.normalize(),
                pg_deduction.normalize()
            )
        } else {
            "Postgraduate loan: none on record, no deduction".to_string()
        },
    });

    Ok(StudentLoanResult {
        breakdown: StudentLoanBreakdown {
            plans,
            postgraduate,
            total,
        },
        log_steps,
    })
}

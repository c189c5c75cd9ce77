//! The payroll calculation engine.
//!
//! [`PayrollEngine`] runs the full pipeline for one employee and one pay
//! period: validate, normalize, the four calculators, the year-to-date
//! merge, and result assembly. The engine is a pure function of its
//! input: it holds no state, performs no I/O, and is safe to call
//! concurrently. Fetching records and persisting the new year-to-date
//! snapshot belong to the caller (see [`crate::runner`]).

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculation::{
    accumulate, calculate_income_tax, calculate_ni, calculate_pension, calculate_student_loans,
    normalize, round_money,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationLog, Deductions, EngineStage, LogStep, PayrollInput, PayrollResult,
};

/// Orchestrates one payroll calculation from validated input to result.
///
/// # Example
///
/// ```no_run
/// use paye_engine::engine::PayrollEngine;
/// use paye_engine::models::PayrollInput;
///
/// fn run(input: &PayrollInput) {
///     let engine = PayrollEngine::new();
///     match engine.calculate(input) {
///         Ok(result) => println!("net pay {}", result.net_pay),
///         Err(err) => eprintln!("rejected: {}", err),
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PayrollEngine;

impl PayrollEngine {
    /// Creates a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Runs one payroll calculation.
    ///
    /// The pipeline is validate, normalize, compute tax, NI, pension and
    /// student loans, merge the year-to-date record, then assemble the
    /// result. Any failure anywhere rejects the whole run: no partial
    /// result is ever produced and the prior year-to-date record is
    /// untouched. The period number used for threshold scaling is
    /// derived from the payment date (the period end date); the stated
    /// period is carried through to the result for display.
    ///
    /// # Errors
    ///
    /// * [`EngineError::InvalidConfiguration`] when the configuration
    ///   fails its structural checks
    /// * [`EngineError::InvalidInput`] with the full violation list when
    ///   any input check fails
    /// * configuration lookup or arithmetic invariant errors from the
    ///   individual calculators
    pub fn calculate(&self, input: &PayrollInput) -> EngineResult<PayrollResult> {
        let start_time = Instant::now();

        input.config.validate()?;

        if let Err(violations) = crate::calculation::validate(input) {
            warn!(
                employee_id = %input.employee.id,
                violations = violations.len(),
                "Input rejected"
            );
            return Err(EngineError::InvalidInput { violations });
        }

        let mut steps: Vec<LogStep> = Vec::new();
        let mut step_number: u32 = 1;

        steps.push(LogStep {
            step_number,
            stage: EngineStage::Validate,
            rule_id: "input_validation".to_string(),
            input: serde_json::json!({
                "employee_id": input.employee.id,
                "gross_pay": input.gross_pay.normalize().to_string(),
                "period_type": input.period.period_type.to_string(),
                "period_number": input.period.number,
            }),
            output: serde_json::json!({ "violations": 0 }),
            detail: "All input checks passed".to_string(),
        });
        step_number += 1;

        let period = normalize(input.period.end_date, input.period.period_type);
        let mut normalize_detail = format!(
            "Payment date {} resolves to period {} of {} ({} periods per year)",
            input.period.end_date, period.period_number, period.tax_year, period.periods_per_year
        );
        if period.period_number != input.period.number {
            normalize_detail.push_str(&format!(
                "; input stated period {}",
                input.period.number
            ));
        }
        steps.push(LogStep {
            step_number,
            stage: EngineStage::Normalize,
            rule_id: "period_normalization".to_string(),
            input: serde_json::json!({
                "payment_date": input.period.end_date.to_string(),
                "period_type": input.period.period_type.to_string(),
            }),
            output: serde_json::json!({
                "tax_year": period.tax_year.to_string(),
                "period_number": period.period_number,
                "periods_per_year": period.periods_per_year,
            }),
            detail: normalize_detail,
        });
        step_number += 1;

        let gross_pay = round_money(input.gross_for_period());

        let tax = calculate_income_tax(
            &input.employee,
            gross_pay,
            &period,
            &input.prior_ytd,
            &input.config,
            step_number,
        )?;
        steps.push(tax.log_step);
        step_number += 1;

        if tax.breakdown.refund_withheld {
            warn!(
                employee_id = %input.employee.id,
                tax_year = %period.tax_year,
                period_number = period.period_number,
                "Cumulative recalculation implied a refund; withheld as zero tax"
            );
        }

        let ni = calculate_ni(&input.employee, gross_pay, &period, &input.config, step_number)?;
        steps.push(ni.log_step);
        step_number += 1;

        let pension =
            calculate_pension(&input.employee, gross_pay, &period, &input.config, step_number);
        steps.push(pension.log_step);
        step_number += 1;

        let loans = calculate_student_loans(
            &input.employee,
            gross_pay,
            &period,
            &input.prior_ytd,
            &input.config,
            step_number,
        )?;
        step_number += loans.log_steps.len() as u32;
        steps.extend(loans.log_steps);

        let deductions = Deductions {
            tax: tax.breakdown.tax_due,
            employee_ni: ni.breakdown.employee_ni,
            employee_pension: pension.breakdown.employee_contribution,
            student_loans: loans.breakdown.total,
            total: tax.breakdown.tax_due
                + ni.breakdown.employee_ni
                + pension.breakdown.employee_contribution
                + loans.breakdown.total,
        };
        let net_pay = gross_pay - deductions.total;
        self.check_invariants(input, gross_pay, &deductions, net_pay)?;

        let calculation_id = Uuid::new_v4();
        let merged = accumulate(
            &input.prior_ytd,
            gross_pay,
            &tax.breakdown,
            &ni.breakdown,
            &pension.breakdown,
            &loans.breakdown,
            calculation_id,
            step_number,
        );
        steps.push(merged.log_step);
        step_number += 1;

        steps.push(LogStep {
            step_number,
            stage: EngineStage::Assemble,
            rule_id: "result_assembly".to_string(),
            input: serde_json::json!({
                "gross_pay": gross_pay.normalize().to_string(),
                "total_deductions": deductions.total.normalize().to_string(),
            }),
            output: serde_json::json!({
                "net_pay": net_pay.normalize().to_string(),
            }),
            detail: format!(
                "Gross £{} less £{} deductions leaves £{} net",
                gross_pay.normalize(),
                deductions.total.normalize(),
                net_pay.normalize()
            ),
        });

        let duration_us = start_time.elapsed().as_micros() as u64;
        info!(
            employee_id = %input.employee.id,
            tax_year = %period.tax_year,
            period_number = period.period_number,
            gross_pay = %gross_pay,
            net_pay = %net_pay,
            duration_us,
            "Calculation completed"
        );

        Ok(PayrollResult {
            calculation_id,
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            employee_id: input.employee.id.clone(),
            tax_year: period.tax_year,
            period: input.period.clone(),
            gross_pay,
            tax: tax.breakdown,
            national_insurance: ni.breakdown,
            pension: pension.breakdown,
            student_loans: loans.breakdown,
            deductions,
            net_pay,
            new_ytd: merged.ytd,
            log: CalculationLog { steps, duration_us },
        })
    }

    /// Rejects results that breach the arithmetic invariants.
    ///
    /// Every deduction component is floored at zero by its calculator and
    /// total rates are fractions, so a negative component or a negative
    /// net here means a defect or broken configuration, not a legitimate
    /// payslip. Such a run must never reach the year-to-date merge.
    fn check_invariants(
        &self,
        input: &PayrollInput,
        gross_pay: Decimal,
        deductions: &Deductions,
        net_pay: Decimal,
    ) -> EngineResult<()> {
        let components = [
            ("tax", deductions.tax),
            ("employee_ni", deductions.employee_ni),
            ("employee_pension", deductions.employee_pension),
            ("student_loans", deductions.student_loans),
        ];
        for (name, amount) in components {
            if amount < Decimal::ZERO {
                error!(
                    employee_id = %input.employee.id,
                    component = name,
                    amount = %amount,
                    "Negative deduction component"
                );
                return Err(EngineError::ArithmeticInvariant {
                    message: format!("{} deduction is negative: {}", name, amount),
                });
            }
        }

        if net_pay < Decimal::ZERO {
            error!(
                employee_id = %input.employee.id,
                gross_pay = %gross_pay,
                total_deductions = %deductions.total,
                "Deductions exceed gross pay"
            );
            return Err(EngineError::ArithmeticInvariant {
                message: format!(
                    "deductions {} exceed gross pay {}",
                    deductions.total, gross_pay
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::statutory_defaults;
    use crate::models::{
        Employee, EmployeeYtd, PayComponents, PayPeriod, PeriodType, StudentLoanPlan, TaxBasis,
        TaxYear,
    };
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week_1_input() -> PayrollInput {
        let tax_year = TaxYear::starting(2025);
        PayrollInput {
            employee: Employee {
                id: "emp-001".to_string(),
                tax_code: "1257L".to_string(),
                tax_basis: TaxBasis::Cumulative,
                ni_category: 'A',
                pension_enrolled: false,
                employee_pension_rate: None,
                student_loan_plans: vec![],
                postgraduate_loan: false,
            },
            gross_pay: dec("500.00"),
            period: PayPeriod {
                period_type: PeriodType::Weekly,
                number: 1,
                start_date: ymd(2025, 4, 6),
                end_date: ymd(2025, 4, 12),
            },
            config: statutory_defaults(tax_year),
            prior_ytd: EmployeeYtd::opening(tax_year),
            components: PayComponents::default(),
        }
    }

    // ==========================================================================
    // ENG-001: basic weekly calculation end to end
    // ==========================================================================
    #[test]
    fn test_eng_001_week_1_complete_run() {
        let engine = PayrollEngine::new();
        let result = engine.calculate(&week_1_input()).unwrap();

        assert_eq!(result.gross_pay, dec("500.00"));
        assert_eq!(result.tax.tax_due, dec("51.65"));
        assert_eq!(result.national_insurance.employee_ni, dec("20.66"));
        assert_eq!(result.pension.employee_contribution, Decimal::ZERO);
        assert_eq!(result.student_loans.total, Decimal::ZERO);
        assert_eq!(result.deductions.total, dec("72.31"));
        assert_eq!(result.net_pay, dec("427.69"));
        assert_eq!(result.tax_year, TaxYear::starting(2025));
        assert_eq!(result.employee_id, "emp-001");
        assert_eq!(result.engine_version, env!("CARGO_PKG_VERSION"));

        // First period's YTD is exactly this period's figures.
        assert_eq!(result.new_ytd.gross_pay, dec("500.00"));
        assert_eq!(result.new_ytd.tax_paid, dec("51.65"));
        assert_eq!(result.new_ytd.employee_ni, dec("20.66"));
        assert_eq!(result.new_ytd.version, 1);
        assert_eq!(result.new_ytd.last_run_id, Some(result.calculation_id));
    }

    // ==========================================================================
    // ENG-002: pipeline stages appear in order with consecutive steps
    // ==========================================================================
    #[test]
    fn test_eng_002_log_stages_in_pipeline_order() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        input.employee.student_loan_plans = vec![StudentLoanPlan::Plan2];
        let result = engine.calculate(&input).unwrap();

        let stages: Vec<EngineStage> = result.log.steps.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![
                EngineStage::Validate,
                EngineStage::Normalize,
                EngineStage::ComputeTax,
                EngineStage::ComputeNi,
                EngineStage::ComputePension,
                EngineStage::ComputeStudentLoan,
                EngineStage::ComputeStudentLoan,
                EngineStage::Accumulate,
                EngineStage::Assemble,
            ]
        );
        let numbers: Vec<u32> = result.log.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, (1..=9).collect::<Vec<u32>>());
    }

    // ==========================================================================
    // ENG-003: invalid input rejects the run before any computation
    // ==========================================================================
    #[test]
    fn test_eng_003_invalid_input_rejected() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        input.gross_pay = dec("-500.00");

        let err = engine.calculate(&input).unwrap_err();
        match err {
            EngineError::InvalidInput { violations } => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "gross_pay");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    // ==========================================================================
    // ENG-004: broken configuration is a hard failure
    // ==========================================================================
    #[test]
    fn test_eng_004_invalid_configuration_rejected() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        input.config.tax_bands.clear();

        let err = engine.calculate(&input).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }

    // ==========================================================================
    // ENG-005: supplemental components are part of gross pay
    // ==========================================================================
    #[test]
    fn test_eng_005_components_add_to_gross() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        input.components.bonus = dec("100.00");

        let result = engine.calculate(&input).unwrap();
        assert_eq!(result.gross_pay, dec("600.00"));
        // Tax on 600: (600 - 241.73) * 20% = 71.65.
        assert_eq!(result.tax.tax_due, dec("71.65"));
    }

    // ==========================================================================
    // ENG-006: conservation with every deduction active
    // ==========================================================================
    #[test]
    fn test_eng_006_conservation_with_all_deductions() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        input.employee.pension_enrolled = true;
        input.employee.student_loan_plans = vec![StudentLoanPlan::Plan2];
        input.employee.postgraduate_loan = true;
        input.gross_pay = dec("800.00");

        let result = engine.calculate(&input).unwrap();

        assert_eq!(
            result.deductions.total,
            result.deductions.tax
                + result.deductions.employee_ni
                + result.deductions.employee_pension
                + result.deductions.student_loans
        );
        assert_eq!(result.net_pay + result.deductions.total, result.gross_pay);
        assert!(result.net_pay > Decimal::ZERO);
    }

    // ==========================================================================
    // ENG-007: refund scenarios complete with zero tax
    // ==========================================================================
    #[test]
    fn test_eng_007_refund_withheld_run_completes() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        input.gross_pay = Decimal::ZERO;
        input.prior_ytd.gross_pay = dec("500.00");
        input.prior_ytd.taxable_pay = dec("500.00");
        input.prior_ytd.niable_pay = dec("500.00");
        input.prior_ytd.tax_paid = dec("200.00");
        input.period.number = 2;
        input.period.start_date = ymd(2025, 4, 13);
        input.period.end_date = ymd(2025, 4, 19);

        let result = engine.calculate(&input).unwrap();
        assert_eq!(result.tax.tax_due, Decimal::ZERO);
        assert!(result.tax.refund_withheld);
        assert_eq!(result.net_pay, Decimal::ZERO);
        // Tax paid to date never decreases.
        assert_eq!(result.new_ytd.tax_paid, dec("200.00"));
    }

    // ==========================================================================
    // ENG-008: period values derive from the payment date
    // ==========================================================================
    #[test]
    fn test_eng_008_period_derived_from_payment_date() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        // Dates are week 2 of the year; the stated number still says 1.
        input.period.start_date = ymd(2025, 4, 13);
        input.period.end_date = ymd(2025, 4, 19);

        let result = engine.calculate(&input).unwrap();
        let normalize_step = &result.log.steps[1];
        assert_eq!(normalize_step.output["period_number"].as_u64().unwrap(), 2);
        assert!(normalize_step.detail.contains("input stated period 1"));
        // Free pay reflects the derived period 2.
        assert_eq!(result.tax.free_pay, dec("483.46"));
    }

    // ==========================================================================
    // ENG-009: deductions exceeding gross pay abort the run
    // ==========================================================================
    #[test]
    fn test_eng_009_excess_deductions_abort() {
        let engine = PayrollEngine::new();
        let mut input = week_1_input();
        // A flat 45% code plus NI, a maxed pension override and three
        // loan plans push total deductions past gross pay.
        input.employee.tax_code = "D1".to_string();
        input.employee.pension_enrolled = true;
        input.employee.employee_pension_rate = Some(dec("1.00"));
        input.employee.student_loan_plans = vec![
            StudentLoanPlan::Plan1,
            StudentLoanPlan::Plan2,
            StudentLoanPlan::Plan4,
        ];
        input.employee.postgraduate_loan = true;
        input.gross_pay = dec("2000.00");

        let err = engine.calculate(&input).unwrap_err();
        assert!(matches!(err, EngineError::ArithmeticInvariant { .. }));
    }
}

//! Input validation.
//!
//! Inputs are checked before any calculation runs. Every check is
//! applied and every failure collected, so a caller fixing a rejected
//! request sees the complete list in one pass rather than one failure
//! per attempt.

use crate::error::Violation;
use crate::models::{PayrollInput, TaxCode};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Validates a payroll input, collecting every violation.
///
/// Checks run in a fixed order and the returned violations preserve it:
///
/// 1. gross pay is non-negative
/// 2. every supplemental pay component is non-negative
/// 3. the period start date is not after its end date
/// 4. the period number is within range for the period type
/// 5. the tax code is recognised
/// 6. the NI category letter is configured
/// 7. any pension rate override is a fraction in `[0, 1]`
/// 8. every student loan plan is configured
/// 9. no student loan plan is listed twice
/// 10. the prior year-to-date record belongs to the period's tax year
///
/// Returns `Ok(())` when every check passes.
pub fn validate(input: &PayrollInput) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if input.gross_pay < Decimal::ZERO {
        violations.push(Violation {
            field: "gross_pay".to_string(),
            message: format!("must not be negative, was {}", input.gross_pay),
        });
    }

    let components = [
        ("components.bonus", input.components.bonus),
        ("components.commission", input.components.commission),
        ("components.tronc", input.components.tronc),
        ("components.holiday_pay", input.components.holiday_pay),
        ("components.other", input.components.other),
    ];
    for (field, amount) in components {
        if amount < Decimal::ZERO {
            violations.push(Violation {
                field: field.to_string(),
                message: format!("must not be negative, was {}", amount),
            });
        }
    }

    if input.period.start_date > input.period.end_date {
        violations.push(Violation {
            field: "period.start_date".to_string(),
            message: format!(
                "start date {} is after end date {}",
                input.period.start_date, input.period.end_date
            ),
        });
    }

    let max_number = input.period.period_type.max_period_number();
    if input.period.number < 1 || input.period.number > max_number {
        violations.push(Violation {
            field: "period.number".to_string(),
            message: format!(
                "must be between 1 and {} for {} pay, was {}",
                max_number, input.period.period_type, input.period.number
            ),
        });
    }

    if let Err(err) = TaxCode::parse(&input.employee.tax_code) {
        violations.push(Violation {
            field: "employee.tax_code".to_string(),
            message: err.to_string(),
        });
    }

    if !input
        .config
        .ni_categories
        .contains_key(&input.employee.ni_category)
    {
        violations.push(Violation {
            field: "employee.ni_category".to_string(),
            message: format!(
                "category {} is not configured for tax year {}",
                input.employee.ni_category, input.config.tax_year
            ),
        });
    }

    if let Some(rate) = input.employee.employee_pension_rate {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            violations.push(Violation {
                field: "employee.employee_pension_rate".to_string(),
                message: format!("must be a fraction between 0 and 1, was {}", rate),
            });
        }
    }

    for plan in &input.employee.student_loan_plans {
        if !input.config.student_loans.contains_key(plan) {
            violations.push(Violation {
                field: "employee.student_loan_plans".to_string(),
                message: format!(
                    "{} is not configured for tax year {}",
                    plan, input.config.tax_year
                ),
            });
        }
    }

    let mut seen = BTreeSet::new();
    for plan in &input.employee.student_loan_plans {
        if !seen.insert(plan) {
            violations.push(Violation {
                field: "employee.student_loan_plans".to_string(),
                message: format!("{} listed more than once", plan),
            });
        }
    }

    let period_year = input.period.tax_year();
    if input.prior_ytd.tax_year != period_year {
        violations.push(Violation {
            field: "prior_ytd.tax_year".to_string(),
            message: format!(
                "belongs to tax year {}, period is in {}",
                input.prior_ytd.tax_year, period_year
            ),
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

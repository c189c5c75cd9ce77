//! Auto-enrolment pension contribution calculation.
//!
//! Contributions are charged on qualifying earnings: the slice of pay
//! between the scheme's lower and upper bounds, converted to this
//! period's share. An unenrolled employee still gets a breakdown, with
//! zeros, so the result shape does not change with enrolment.

use rust_decimal::Decimal;

use crate::config::TaxYearConfig;
use crate::models::{Employee, EngineStage, LogStep, PensionBreakdown};

use super::period::NormalizedPeriod;
use super::rounding::{portion_between, round_money};

/// The result of a pension calculation, including the breakdown and log
/// step.
#[derive(Debug, Clone)]
pub struct PensionResult {
    /// The pension breakdown for the payroll result.
    pub breakdown: PensionBreakdown,
    /// The log step recording this calculation.
    pub log_step: LogStep,
}

/// Calculates pension contributions for one period.
///
/// Qualifying earnings clamp pay to the period-equivalent qualifying
/// band: pay below the lower bound contributes nothing and pay above the
/// upper bound is capped. The employee contribution uses the employee's
/// rate override when present, otherwise the scheme default; the employer
/// contribution always uses the scheme default. Each side is rounded
/// once.
pub fn calculate_pension(
    employee: &Employee,
    pensionable_pay: Decimal,
    period: &NormalizedPeriod,
    config: &TaxYearConfig,
    step_number: u32,
) -> PensionResult {
    let bands = &config.pension;
    let lower_bound = period.share(bands.lower_qualifying_bound);
    let upper_bound = period.share(bands.upper_qualifying_bound);

    let (qualifying_earnings, employee_rate, employee_contribution, employer_contribution) =
        if employee.pension_enrolled {
            let qualifying = portion_between(pensionable_pay, lower_bound, upper_bound);
            let employee_rate = employee
                .employee_pension_rate
                .unwrap_or(bands.default_employee_rate);
            (
                qualifying,
                employee_rate,
                round_money(qualifying * employee_rate),
                round_money(qualifying * bands.default_employer_rate),
            )
        } else {
            (
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
            )
        };

    let breakdown = PensionBreakdown {
        enrolled: employee.pension_enrolled,
        qualifying_earnings: round_money(qualifying_earnings),
        employee_contribution,
        employer_contribution,
    };

    let detail = if employee.pension_enrolled {
        format!(
            "Qualifying earnings £{} (pay clamped to £{}..£{}): employee £{} at {}, employer £{} at {}",
            breakdown.qualifying_earnings.normalize(),
            round_money(lower_bound).normalize(),
            round_money(upper_bound).normalize(),
            employee_contribution.normalize(),
            employee_rate.normalize(),
            employer_contribution.normalize(),
            bands.default_employer_rate.normalize()
        )
    } else {
        "Not enrolled in a pension scheme: no contributions".to_string()
    };

    let log_step = LogStep {
        step_number,
        stage: EngineStage::ComputePension,
        rule_id: "pension_contributions".to_string(),
        input: serde_json::json!({
            "enrolled": employee.pension_enrolled,
            "pensionable_pay": pensionable_pay.normalize().to_string(),
            "lower_qualifying_bound": round_money(lower_bound).normalize().to_string(),
            "upper_qualifying_bound": round_money(upper_bound).normalize().to_string(),
            "rate_override": employee.employee_pension_rate.map(|r| r.normalize().to_string()),
        }),
        output: serde_json::json!({
            "qualifying_earnings": breakdown.qualifying_earnings.normalize().to_string(),
            "employee_contribution": employee_contribution.normalize().to_string(),
            "employer_contribution": employer_contribution.normalize().to_string(),
        }),
        detail,
    };

    PensionResult {
        breakdown,
        log_step,
    }
}

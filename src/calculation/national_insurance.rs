//! National Insurance calculation.
//!
//! NI is always non-cumulative: each period is charged on its own pay
//! against period-equivalent thresholds, with no carry between periods.
//! Category letters with statutory exemptions are expressed as zero rates
//! in configuration, so every category takes the same path here.

use rust_decimal::Decimal;

use crate::config::TaxYearConfig;
use crate::error::EngineResult;
use crate::models::{Employee, EngineStage, LogStep, NiBreakdown};

use super::period::NormalizedPeriod;
use super::rounding::{portion_above, portion_between, round_money};

/// The result of a National Insurance calculation, including the
/// breakdown and log step.
#[derive(Debug, Clone)]
pub struct NiResult {
    /// The NI breakdown for the payroll result.
    pub breakdown: NiBreakdown,
    /// The log step recording this calculation.
    pub log_step: LogStep,
}

/// Calculates employee and employer National Insurance for one period.
///
/// Employee NI charges the band between the primary threshold and the
/// upper earnings limit at the main rate, and earnings above the limit at
/// the upper rate. Employer NI charges everything above the secondary
/// threshold at a single rate with no upper step-down. All thresholds are
/// one period's share of the configured annual figures; each side is
/// rounded once from its unrounded sum.
///
/// # Errors
///
/// Fails if the employee's category letter has no entry in the
/// configuration.
pub fn calculate_ni(
    employee: &Employee,
    niable_pay: Decimal,
    period: &NormalizedPeriod,
    config: &TaxYearConfig,
    step_number: u32,
) -> EngineResult<NiResult> {
    let rates = config.ni_category(employee.ni_category)?;

    let primary_threshold = period.share(rates.primary_threshold);
    let upper_earnings_limit = period.share(rates.upper_earnings_limit);
    let secondary_threshold = period.share(rates.secondary_threshold);

    let earnings_at_main_rate = portion_between(niable_pay, primary_threshold, upper_earnings_limit);
    let earnings_above_uel = portion_above(niable_pay, upper_earnings_limit);
    let employee_ni = round_money(
        earnings_at_main_rate * rates.employee_rate_below_uel
            + earnings_above_uel * rates.employee_rate_above_uel,
    );

    let earnings_above_secondary = portion_above(niable_pay, secondary_threshold);
    let employer_ni = round_money(earnings_above_secondary * rates.employer_rate);

    let breakdown = NiBreakdown {
        category: employee.ni_category,
        earnings_at_main_rate: round_money(earnings_at_main_rate),
        earnings_above_uel: round_money(earnings_above_uel),
        employee_ni,
        employer_ni,
    };

    let log_step = LogStep {
        step_number,
        stage: EngineStage::ComputeNi,
        rule_id: "national_insurance".to_string(),
        input: serde_json::json!({
            "category": employee.ni_category.to_string(),
            "niable_pay": niable_pay.normalize().to_string(),
            "primary_threshold": round_money(primary_threshold).normalize().to_string(),
            "upper_earnings_limit": round_money(upper_earnings_limit).normalize().to_string(),
            "secondary_threshold": round_money(secondary_threshold).normalize().to_string(),
        }),
        output: serde_json::json!({
            "earnings_at_main_rate": breakdown.earnings_at_main_rate.normalize().to_string(),
            "earnings_above_uel": breakdown.earnings_above_uel.normalize().to_string(),
            "employee_ni": employee_ni.normalize().to_string(),
            "employer_ni": employer_ni.normalize().to_string(),
        }),
        detail: format!(
            "Category {}: employee £{} × {} + £{} × {} = £{}, employer £{} × {} = £{}",
            employee.ni_category,
            breakdown.earnings_at_main_rate.normalize(),
            rates.employee_rate_below_uel.normalize(),
            breakdown.earnings_above_uel.normalize(),
            rates.employee_rate_above_uel.normalize(),
            employee_ni.normalize(),
            round_money(earnings_above_secondary).normalize(),
            rates.employer_rate.normalize(),
            employer_ni.normalize()
        ),
    };

    Ok(NiResult {
        breakdown,
        log_step,
    })
}

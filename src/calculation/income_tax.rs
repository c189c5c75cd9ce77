//! Income tax calculation.
//!
//! This module computes the PAYE income tax due for one period, on either
//! the cumulative basis (pay and tax to date across the whole year) or
//! the week1/month1 basis (each period in isolation).

use rust_decimal::Decimal;

use crate::config::{TaxBand, TaxYearConfig};
use crate::error::EngineResult;
use crate::models::{
    BandAmount, Employee, EmployeeYtd, EngineStage, LogStep, TaxBasis, TaxBreakdown, TaxCode,
};

use super::period::NormalizedPeriod;
use super::rounding::{floor_zero, portion_above, portion_between, round_money};

/// The result of an income tax calculation, including the breakdown and
/// log step.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// The tax breakdown for the payroll result.
    pub breakdown: TaxBreakdown,
    /// The log step recording this calculation.
    pub log_step: LogStep,
}

/// Calculates income tax due for one period.
///
/// On the cumulative basis the allowance and every band bound are scaled
/// by `period_number / periods_per_year`, the band walk runs over taxable
/// pay to date, and the period's tax is the cumulative figure less tax
/// already paid. A negative difference is floored at zero and flagged as
/// a withheld refund rather than repaid. On week1/month1 the same walk
/// runs over this period's pay alone against one period's share of every
/// threshold, so nothing can go negative.
///
/// Taxable pay is allocated to bands in ascending order; each band taxes
/// only the portion between its scaled bounds and the unbounded top band
/// absorbs the remainder. Rounding is applied once, to the period figure.
///
/// # Arguments
///
/// * `employee` - The employee, providing the tax code and basis
/// * `taxable_pay` - This period's taxable pay
/// * `period` - The normalized period being calculated
/// * `prior_ytd` - The year-to-date record before this period
/// * `config` - The tax year configuration
/// * `step_number` - The step number for log sequencing
///
/// # Errors
///
/// Fails if the tax code does not parse or the configuration lacks a band
/// a flat-rate code refers to.
pub fn calculate_income_tax(
    employee: &Employee,
    taxable_pay: Decimal,
    period: &NormalizedPeriod,
    prior_ytd: &EmployeeYtd,
    config: &TaxYearConfig,
    step_number: u32,
) -> EngineResult<IncomeTaxResult> {
    let tax_code = TaxCode::parse(&employee.tax_code)?;
    let basis = employee.tax_basis;

    let breakdown = match tax_code.annual_allowance() {
        None => no_tax_breakdown(employee, taxable_pay),
        Some(annual_allowance) => {
            let bands = effective_bands(tax_code, config)?;

            // The cumulative basis walks pay to date against thresholds
            // accrued to date; week1/month1 walks this period's pay
            // against a single period's share of each threshold.
            let (scale, pay_in_scope, already_paid) = match basis {
                TaxBasis::Cumulative => (
                    period.fraction(),
                    prior_ytd.taxable_pay + taxable_pay,
                    prior_ytd.tax_paid,
                ),
                TaxBasis::Week1Month1 => (
                    Decimal::ONE / Decimal::from(period.periods_per_year),
                    taxable_pay,
                    Decimal::ZERO,
                ),
            };

            let free_pay = annual_allowance * scale;
            let taxable = floor_zero(pay_in_scope - free_pay);
            let (band_amounts, due_in_scope) = walk_bands(taxable, &bands, scale);

            let rounded = round_money(due_in_scope - already_paid);
            let refund_withheld = rounded < Decimal::ZERO;
            let tax_due = floor_zero(rounded);

            TaxBreakdown {
                tax_code: employee.tax_code.clone(),
                basis,
                free_pay: round_money(free_pay),
                taxable_pay: round_money(taxable),
                band_amounts,
                tax_due,
                refund_withheld,
            }
        }
    };

    let log_step = LogStep {
        step_number,
        stage: EngineStage::ComputeTax,
        rule_id: "income_tax".to_string(),
        input: serde_json::json!({
            "tax_code": employee.tax_code,
            "basis": basis.to_string(),
            "taxable_pay": taxable_pay.normalize().to_string(),
            "prior_taxable_pay_ytd": prior_ytd.taxable_pay.normalize().to_string(),
            "prior_tax_paid_ytd": prior_ytd.tax_paid.normalize().to_string(),
            "period_number": period.period_number,
            "periods_per_year": period.periods_per_year,
        }),
        output: serde_json::json!({
            "free_pay": breakdown.free_pay.normalize().to_string(),
            "taxable_pay": breakdown.taxable_pay.normalize().to_string(),
            "tax_due": breakdown.tax_due.normalize().to_string(),
            "refund_withheld": breakdown.refund_withheld,
        }),
        detail: format!(
            "Tax code {} ({}): £{} - £{} free pay = £{} taxable, tax due £{}{}",
            employee.tax_code,
            basis,
            round_money(taxable_pay).normalize(),
            breakdown.free_pay.normalize(),
            breakdown.taxable_pay.normalize(),
            breakdown.tax_due.normalize(),
            if breakdown.refund_withheld {
                " (refund withheld)"
            } else {
                ""
            }
        ),
    };

    Ok(IncomeTaxResult {
        breakdown,
        log_step,
    })
}

/// The band table a tax code calculates against.
///
/// Standard codes use the configured bands unchanged. Flat-rate codes
/// replace the table with a single unbounded band at the rate of the
/// configured band they name.
fn effective_bands(tax_code: TaxCode, config: &TaxYearConfig) -> EngineResult<Vec<TaxBand>> {
    let flat = |index: usize| -> EngineResult<Vec<TaxBand>> {
        let band = config.band_at(index)?;
        Ok(vec![TaxBand {
            name: band.name.clone(),
            lower: Decimal::ZERO,
            upper: None,
            rate: band.rate,
        }])
    };

    match tax_code {
        TaxCode::Standard { .. } => Ok(config.tax_bands.clone()),
        TaxCode::BasicRate => flat(0),
        TaxCode::HigherRate => flat(1),
        TaxCode::AdditionalRate => flat(2),
        TaxCode::NoTax => Ok(Vec::new()),
    }
}

/// Allocates taxable pay to bands and sums the unrounded tax.
///
/// Band bounds are scaled before allocation. Bands that receive no pay
/// produce no line; line amounts are rounded for presentation while the
/// returned total keeps full precision for the single period rounding.
fn walk_bands(taxable: Decimal, bands: &[TaxBand], scale: Decimal) -> (Vec<BandAmount>, Decimal) {
    let mut band_amounts = Vec::new();
    let mut total = Decimal::ZERO;

    for band in bands {
        let lower = band.lower * scale;
        let amount = match band.upper {
            Some(upper) => portion_between(taxable, lower, upper * scale),
            None => portion_above(taxable, lower),
        };
        if amount <= Decimal::ZERO {
            continue;
        }

        let tax = amount * band.rate;
        total += tax;
        band_amounts.push(BandAmount {
            band: band.name.clone(),
            rate: band.rate,
            amount_in_band: round_money(amount),
            tax: round_money(tax),
        });
    }

    (band_amounts, total)
}

/// An NT code deducts nothing: every pound of pay is free pay.
fn no_tax_breakdown(employee: &Employee, taxable_pay: Decimal) -> TaxBreakdown {
    TaxBreakdown {
        tax_code: employee.tax_code.clone(),
        basis: employee.tax_basis,
        free_pay: round_money(taxable_pay),
        taxable_pay: Decimal::ZERO,
        band_amounts: Vec::new(),
        tax_due: Decimal::ZERO,
        refund_withheld: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::statutory_defaults;
    use crate::models::TaxYear;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn weekly_period(number: u32) -> NormalizedPeriod {
        NormalizedPeriod {
            tax_year: TaxYear::starting(2025),
            period_number: number,
            periods_per_year: 52,
        }
    }

    fn monthly_period(number: u32) -> NormalizedPeriod {
        NormalizedPeriod {
            tax_year: TaxYear::starting(2025),
            period_number: number,
            periods_per_year: 12,
        }
    }

    fn test_employee(tax_code: &str, basis: TaxBasis) -> Employee {
        Employee {
            id: "emp_001".to_string(),
            tax_code: tax_code.to_string(),
            tax_basis: basis,
            ni_category: 'A',
            pension_enrolled: false,
            employee_pension_rate: None,
            student_loan_plans: vec![],
            postgraduate_loan: false,
        }
    }

    fn config() -> TaxYearConfig {
        statutory_defaults(TaxYear::starting(2025))
    }

    fn opening_ytd() -> EmployeeYtd {
        EmployeeYtd::opening(TaxYear::starting(2025))
    }

    // ==========================================================================
    // IT-001: 1257L cumulative, £500 gross, week 1
    // ==========================================================================
    #[test]
    fn test_it_001_standard_code_week_1() {
        let employee = test_employee("1257L", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &employee,
            dec("500.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();

        // Free pay 12570/52 = 241.73, taxable 258.27, all at 20% = 51.65
        assert_eq!(result.breakdown.tax_due, dec("51.65"));
        assert_eq!(result.breakdown.free_pay, dec("241.73"));
        assert_eq!(result.breakdown.taxable_pay, dec("258.27"));
        assert!(!result.breakdown.refund_withheld);
        assert_eq!(result.breakdown.band_amounts.len(), 1);
        assert_eq!(result.breakdown.band_amounts[0].band, "basic");
        assert_eq!(result.breakdown.band_amounts[0].rate, dec("0.20"));
        assert_eq!(result.log_step.step_number, 3);
        assert_eq!(result.log_step.stage, EngineStage::ComputeTax);
    }

    // ==========================================================================
    // IT-002: 1257L cumulative, week 2 on steady pay
    // ==========================================================================
    #[test]
    fn test_it_002_cumulative_week_2_steady_pay() {
        let employee = test_employee("1257L", TaxBasis::Cumulative);
        let mut prior = opening_ytd();
        prior.gross_pay = dec("500.00");
        prior.taxable_pay = dec("500.00");
        prior.tax_paid = dec("51.65");

        let result = calculate_income_tax(
            &employee,
            dec("500.00"),
            &weekly_period(2),
            &prior,
            &config(),
            3,
        )
        .unwrap();

        // Cumulative due 1000 - 483.46 free = 516.54 at 20% = 103.31,
        // less 51.65 already paid = 51.66 this period.
        assert_eq!(result.breakdown.tax_due, dec("51.66"));
        assert!(!result.breakdown.refund_withheld);
    }

    // ==========================================================================
    // IT-003: higher-rate pay crosses two bands
    // ==========================================================================
    #[test]
    fn test_it_003_pay_spans_basic_and_higher_bands() {
        let employee = test_employee("1257L", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &employee,
            dec("2000.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();

        // Taxable 2000 - 241.73 = 1758.27. Basic band holds 725.00
        // (37700/52) at 20% = 145.00; higher takes 1033.27 at 40% = 413.31.
        // Total from unrounded parts = 558.31.
        assert_eq!(result.breakdown.tax_due, dec("558.31"));
        assert_eq!(result.breakdown.band_amounts.len(), 2);
        assert_eq!(result.breakdown.band_amounts[0].band, "basic");
        assert_eq!(result.breakdown.band_amounts[0].amount_in_band, dec("725.00"));
        assert_eq!(result.breakdown.band_amounts[0].tax, dec("145.00"));
        assert_eq!(result.breakdown.band_amounts[1].band, "higher");
        assert_eq!(result.breakdown.band_amounts[1].amount_in_band, dec("1033.27"));
    }

    // ==========================================================================
    // IT-004: flat-rate codes
    // ==========================================================================
    #[test]
    fn test_it_004_br_taxes_everything_at_basic_rate() {
        let employee = test_employee("BR", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &employee,
            dec("500.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();

        assert_eq!(result.breakdown.tax_due, dec("100.00"));
        assert_eq!(result.breakdown.free_pay, Decimal::ZERO);
        assert_eq!(result.breakdown.band_amounts.len(), 1);
        assert_eq!(result.breakdown.band_amounts[0].band, "basic");
    }

    #[test]
    fn test_it_004_d0_and_d1_flat_rates() {
        let d0 = test_employee("D0", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &d0,
            dec("500.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();
        assert_eq!(result.breakdown.tax_due, dec("200.00"));

        let d1 = test_employee("D1", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &d1,
            dec("500.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();
        assert_eq!(result.breakdown.tax_due, dec("225.00"));
    }

    // ==========================================================================
    // IT-005: NT deducts nothing
    // ==========================================================================
    #[test]
    fn test_it_005_nt_deducts_nothing() {
        let employee = test_employee("NT", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &employee,
            dec("5000.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();

        assert_eq!(result.breakdown.tax_due, Decimal::ZERO);
        assert_eq!(result.breakdown.taxable_pay, Decimal::ZERO);
        assert_eq!(result.breakdown.free_pay, dec("5000.00"));
        assert!(result.breakdown.band_amounts.is_empty());
    }

    // ==========================================================================
    // IT-006: refund floored at zero and flagged
    // ==========================================================================
    #[test]
    fn test_it_006_refund_withheld_at_zero() {
        let employee = test_employee("1257L", TaxBasis::Cumulative);
        let mut prior = opening_ytd();
        prior.gross_pay = dec("500.00");
        prior.taxable_pay = dec("500.00");
        // More tax on record than the cumulative recalculation implies.
        prior.tax_paid = dec("200.00");

        let result = calculate_income_tax(
            &employee,
            Decimal::ZERO,
            &weekly_period(2),
            &prior,
            &config(),
            3,
        )
        .unwrap();

        // Due to date = (500 - 483.46) * 20% = 3.31, far below 200 paid.
        assert_eq!(result.breakdown.tax_due, Decimal::ZERO);
        assert!(result.breakdown.refund_withheld);
    }

    // ==========================================================================
    // IT-007: week1/month1 ignores year-to-date figures
    // ==========================================================================
    #[test]
    fn test_it_007_week1_month1_ignores_ytd() {
        let employee = test_employee("1257L", TaxBasis::Week1Month1);
        let mut prior = opening_ytd();
        prior.taxable_pay = dec("40000.00");
        prior.tax_paid = dec("9000.00");

        let result = calculate_income_tax(
            &employee,
            dec("500.00"),
            &weekly_period(30),
            &prior,
            &config(),
            3,
        )
        .unwrap();

        // Identical to week 1 on the same pay.
        assert_eq!(result.breakdown.tax_due, dec("51.65"));
        assert_eq!(result.breakdown.free_pay, dec("241.73"));
        assert!(!result.breakdown.refund_withheld);
    }

    // ==========================================================================
    // IT-008: pay at the allowance produces no tax
    // ==========================================================================
    #[test]
    fn test_it_008_monthly_pay_at_allowance() {
        let employee = test_employee("1257L", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &employee,
            dec("1047.50"),
            &monthly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();

        assert_eq!(result.breakdown.tax_due, Decimal::ZERO);
        assert_eq!(result.breakdown.taxable_pay, Decimal::ZERO);
        assert!(result.breakdown.band_amounts.is_empty());
        assert!(!result.breakdown.refund_withheld);
    }

    // ==========================================================================
    // IT-009: band boundary continuity
    // ==========================================================================
    #[test]
    fn test_it_009_pay_at_band_boundary() {
        // 0T gives no free pay, so gross lands on band bounds exactly.
        let employee = test_employee("0T", TaxBasis::Cumulative);
        let at_boundary = calculate_income_tax(
            &employee,
            dec("725.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();

        // Exactly fills the basic band; no higher-band line appears.
        assert_eq!(at_boundary.breakdown.tax_due, dec("145.00"));
        assert_eq!(at_boundary.breakdown.band_amounts.len(), 1);

        let just_over = calculate_income_tax(
            &employee,
            dec("725.01"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        )
        .unwrap();

        // One extra penny at 40% rounds away; the total is continuous.
        assert_eq!(just_over.breakdown.tax_due, dec("145.00"));
        assert_eq!(just_over.breakdown.band_amounts.len(), 2);
        assert_eq!(just_over.breakdown.band_amounts[1].amount_in_band, dec("0.01"));
    }

    // ==========================================================================
    // IT-010: unparseable code is an error
    // ==========================================================================
    #[test]
    fn test_it_010_k_code_is_rejected() {
        let employee = test_employee("K475", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &employee,
            dec("500.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            3,
        );
        assert!(result.is_err());
    }

    // ==========================================================================
    // Log step content
    // ==========================================================================
    #[test]
    fn test_log_step_records_inputs_and_outputs() {
        let employee = test_employee("1257L", TaxBasis::Cumulative);
        let result = calculate_income_tax(
            &employee,
            dec("500.00"),
            &weekly_period(1),
            &opening_ytd(),
            &config(),
            7,
        )
        .unwrap();

        let step = &result.log_step;
        assert_eq!(step.step_number, 7);
        assert_eq!(step.rule_id, "income_tax");
        assert_eq!(step.input["tax_code"].as_str().unwrap(), "1257L");
        assert_eq!(step.input["basis"].as_str().unwrap(), "cumulative");
        assert_eq!(step.input["taxable_pay"].as_str().unwrap(), "500");
        assert_eq!(step.output["tax_due"].as_str().unwrap(), "51.65");
        assert!(step.detail.contains("1257L"));
        assert!(step.detail.contains("51.65"));
    }
}

//! Configuration types for PAYE calculation.
//!
//! This module contains the strongly-typed tax year configuration that is
//! deserialized from YAML configuration files or built from the statutory
//! defaults. A configuration is immutable for the life of a tax year; all
//! amounts are annual figures unless a field says otherwise.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{StudentLoanPlan, TaxYear};

/// A single income tax band.
///
/// Band bounds are expressed over taxable pay in excess of the personal
/// allowance, so the first band always starts at zero. Exactly the final
/// band is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBand {
    /// Short name for the band, e.g. "basic".
    pub name: String,
    /// The lower bound of the band (inclusive).
    pub lower: Decimal,
    /// The upper bound of the band (exclusive), or `None` for the
    /// unbounded top band.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// The tax rate for this band as a fraction (0.20 for 20%).
    pub rate: Decimal,
}

/// National Insurance rates and thresholds for one category letter.
///
/// Zero-rate categories (exempt employees, employer-only reliefs) are
/// expressed as zero rates here rather than being special-cased anywhere
/// in the calculators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NiCategoryRates {
    /// Annual primary threshold below which no employee NI is due.
    pub primary_threshold: Decimal,
    /// Annual upper earnings limit where the employee rate steps down.
    pub upper_earnings_limit: Decimal,
    /// Employee rate between the primary threshold and the upper earnings
    /// limit.
    pub employee_rate_below_uel: Decimal,
    /// Employee rate above the upper earnings limit.
    pub employee_rate_above_uel: Decimal,
    /// Annual secondary threshold above which employer NI is due.
    pub secondary_threshold: Decimal,
    /// Employer rate on all earnings above the secondary threshold.
    pub employer_rate: Decimal,
}

/// The qualifying earnings band and default rates for auto-enrolment
/// pensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionBands {
    /// Annual lower bound of the qualifying earnings band.
    pub lower_qualifying_bound: Decimal,
    /// Annual upper bound of the qualifying earnings band.
    pub upper_qualifying_bound: Decimal,
    /// Default employee contribution rate as a fraction.
    pub default_employee_rate: Decimal,
    /// Default employer contribution rate as a fraction.
    pub default_employer_rate: Decimal,
}

/// The threshold and rate for one student loan plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLoanRates {
    /// Annual earnings threshold below which nothing is deducted.
    pub annual_threshold: Decimal,
    /// Deduction rate on earnings above the threshold, as a fraction.
    pub rate: Decimal,
}

/// The complete configuration for one tax year.
///
/// # Example
///
/// ```
/// use paye_engine::config::statutory_defaults;
/// use paye_engine::models::TaxYear;
///
/// let config = statutory_defaults(TaxYear::starting(2025));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.tax_bands.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    /// The tax year this configuration applies to.
    pub tax_year: TaxYear,
    /// The default annual personal allowance. An employee's tax code
    /// overrides this for the tax calculation itself.
    pub personal_allowance: Decimal,
    /// Income tax bands in ascending order.
    pub tax_bands: Vec<TaxBand>,
    /// National Insurance rates keyed by category letter.
    pub ni_categories: BTreeMap<char, NiCategoryRates>,
    /// Pension qualifying band and default contribution rates.
    pub pension: PensionBands,
    /// Student loan thresholds and rates keyed by standard plan.
    pub student_loans: BTreeMap<StudentLoanPlan, StudentLoanRates>,
    /// Postgraduate loan threshold and rate.
    pub postgraduate_loan: StudentLoanRates,
}

fn is_fraction(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

impl TaxYearConfig {
    /// Checks the configuration for structural problems.
    ///
    /// A calculation must never start from a partially valid
    /// configuration, so the engine rejects the whole run when any check
    /// fails:
    /// - there is at least one tax band, starting at zero
    /// - bands are ascending and contiguous, and only the last is
    ///   unbounded
    /// - every rate is a fraction in `[0, 1]`
    /// - thresholds and bounds are non-negative and correctly ordered
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidConfiguration { message };

        if self.personal_allowance < Decimal::ZERO {
            return Err(invalid("personal allowance is negative".to_string()));
        }

        if self.tax_bands.is_empty() {
            return Err(invalid("no tax bands configured".to_string()));
        }
        if self.tax_bands[0].lower != Decimal::ZERO {
            return Err(invalid(format!(
                "first tax band '{}' must start at zero",
                self.tax_bands[0].name
            )));
        }
        for (i, band) in self.tax_bands.iter().enumerate() {
            if !is_fraction(band.rate) {
                return Err(invalid(format!(
                    "tax band '{}' rate {} is not a fraction",
                    band.name, band.rate
                )));
            }
            let is_last = i == self.tax_bands.len() - 1;
            match band.upper {
                Some(upper) => {
                    if is_last {
                        return Err(invalid(format!(
                            "final tax band '{}' must be unbounded",
                            band.name
                        )));
                    }
                    if upper <= band.lower {
                        return Err(invalid(format!(
                            "tax band '{}' upper bound {} does not exceed lower bound {}",
                            band.name, upper, band.lower
                        )));
                    }
                    if self.tax_bands[i + 1].lower != upper {
                        return Err(invalid(format!(
                            "tax band '{}' does not start where '{}' ends",
                            self.tax_bands[i + 1].name, band.name
                        )));
                    }
                }
                None => {
                    if !is_last {
                        return Err(invalid(format!(
                            "tax band '{}' is unbounded but not last",
                            band.name
                        )));
                    }
                }
            }
        }

        for (letter, rates) in &self.ni_categories {
            if rates.primary_threshold < Decimal::ZERO
                || rates.secondary_threshold < Decimal::ZERO
            {
                return Err(invalid(format!(
                    "NI category '{}' has a negative threshold",
                    letter
                )));
            }
            if rates.upper_earnings_limit < rates.primary_threshold {
                return Err(invalid(format!(
                    "NI category '{}' upper earnings limit is below its primary threshold",
                    letter
                )));
            }
            if !is_fraction(rates.employee_rate_below_uel)
                || !is_fraction(rates.employee_rate_above_uel)
                || !is_fraction(rates.employer_rate)
            {
                return Err(invalid(format!(
                    "NI category '{}' has a rate outside [0, 1]",
                    letter
                )));
            }
        }

        if self.pension.lower_qualifying_bound < Decimal::ZERO
            || self.pension.upper_qualifying_bound < self.pension.lower_qualifying_bound
        {
            return Err(invalid(
                "pension qualifying band bounds are misordered".to_string(),
            ));
        }
        if !is_fraction(self.pension.default_employee_rate)
            || !is_fraction(self.pension.default_employer_rate)
        {
            return Err(invalid(
                "pension contribution rate outside [0, 1]".to_string(),
            ));
        }

        for (plan, rates) in &self.student_loans {
            if rates.annual_threshold < Decimal::ZERO || !is_fraction(rates.rate) {
                return Err(invalid(format!("student loan {} is misconfigured", plan)));
            }
        }
        if self.postgraduate_loan.annual_threshold < Decimal::ZERO
            || !is_fraction(self.postgraduate_loan.rate)
        {
            return Err(invalid("postgraduate loan is misconfigured".to_string()));
        }

        Ok(())
    }

    /// Looks up the rates for a National Insurance category letter.
    ///
    /// A missing category is a hard configuration error; the engine never
    /// substitutes another category's rates.
    pub fn ni_category(&self, category: char) -> EngineResult<&NiCategoryRates> {
        self.ni_categories
            .get(&category)
            .ok_or(EngineError::NiCategoryNotFound { category })
    }

    /// Looks up the rates for a standard student loan plan.
    pub fn student_loan(&self, plan: StudentLoanPlan) -> EngineResult<&StudentLoanRates> {
        self.student_loans
            .get(&plan)
            .ok_or_else(|| EngineError::StudentLoanPlanNotFound {
                plan: plan.to_string(),
            })
    }

    /// Returns the tax band at the given index.
    ///
    /// Flat-rate tax codes are pinned to band positions: BR to the first
    /// band, D0 to the second, D1 to the third.
    pub fn band_at(&self, index: usize) -> EngineResult<&TaxBand> {
        self.tax_bands
            .get(index)
            .ok_or(EngineError::TaxBandNotFound { index })
    }
}

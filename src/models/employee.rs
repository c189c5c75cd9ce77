//! Employee models for the PAYE calculation engine.
//!
//! This module contains the calculation-relevant view of an employee,
//! together with the [`TaxCode`], [`TaxBasis`] and [`StudentLoanPlan`]
//! types that drive the individual calculators.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Multiplier applied to the numeric part of a tax code to obtain the
/// annual personal allowance (code 1257 means an allowance of 12,570).
const TAX_CODE_MULTIPLIER: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// The basis on which income tax is calculated.
///
/// # Example
///
/// ```
/// use paye_engine::models::TaxBasis;
///
/// let basis: TaxBasis = serde_json::from_str("\"cumulative\"").unwrap();
/// assert_eq!(basis, TaxBasis::Cumulative);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    /// Tax is computed on pay to date across the whole tax year, less tax
    /// already paid. Over- and under-payments self-correct over the year.
    Cumulative,
    /// Each period is taxed in isolation against one period's worth of
    /// allowance and bands. Nothing carries between periods.
    Week1Month1,
}

impl fmt::Display for TaxBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaxBasis::Cumulative => "cumulative",
            TaxBasis::Week1Month1 => "week1_month1",
        };
        write!(f, "{}", name)
    }
}

/// A repayable student loan plan.
///
/// Each plan has its own threshold and rate in the tax year configuration.
/// Postgraduate loans are handled separately because they deduct alongside
/// the standard plans rather than instead of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentLoanPlan {
    /// Plan 1 (pre-2012 loans in England and Wales, and Northern Ireland).
    Plan1,
    /// Plan 2 (post-2012 loans in England and Wales).
    Plan2,
    /// Plan 4 (Scottish loans).
    Plan4,
}

impl fmt::Display for StudentLoanPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StudentLoanPlan::Plan1 => "Plan 1",
            StudentLoanPlan::Plan2 => "Plan 2",
            StudentLoanPlan::Plan4 => "Plan 4",
        };
        write!(f, "{}", name)
    }
}

/// A parsed PAYE tax code.
///
/// Standard codes carry a numeric allowance and a suffix letter; the
/// recognised special codes replace the band walk with a fixed treatment.
/// K codes (negative allowances) are not supported and fail to parse.
///
/// # Example
///
/// ```
/// use paye_engine::models::TaxCode;
/// use rust_decimal::Decimal;
///
/// let code = TaxCode::parse("1257L").unwrap();
/// assert_eq!(code.annual_allowance(), Some(Decimal::from(12570)));
///
/// let code = TaxCode::parse("BR").unwrap();
/// assert_eq!(code, TaxCode::BasicRate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCode {
    /// A numeric code with a suffix letter, e.g. `1257L`. The annual
    /// allowance is the numeric part multiplied by ten, so `0T` parses
    /// here as a zero allowance.
    Standard {
        /// The numeric part of the code (1257 in `1257L`).
        allowance_units: u32,
        /// The suffix letter (L, M, N or T).
        suffix: char,
    },
    /// `BR`: all taxable pay taxed at the basic rate with no allowance.
    BasicRate,
    /// `D0`: all taxable pay taxed at the higher rate with no allowance.
    HigherRate,
    /// `D1`: all taxable pay taxed at the additional rate with no allowance.
    AdditionalRate,
    /// `NT`: no tax is deducted.
    NoTax,
}

impl TaxCode {
    /// Parses a tax code string.
    ///
    /// Parsing is case-insensitive and ignores surrounding whitespace.
    /// Returns `InvalidTaxCode` for anything that is neither a recognised
    /// special code nor digits followed by a single suffix letter.
    pub fn parse(code: &str) -> EngineResult<Self> {
        let normalized = code.trim().to_uppercase();
        match normalized.as_str() {
            "BR" => return Ok(TaxCode::BasicRate),
            "D0" => return Ok(TaxCode::HigherRate),
            "D1" => return Ok(TaxCode::AdditionalRate),
            "NT" => return Ok(TaxCode::NoTax),
            _ => {}
        }

        let invalid = || EngineError::InvalidTaxCode {
            code: code.to_string(),
        };

        let mut chars = normalized.chars();
        let suffix = chars.next_back().ok_or_else(invalid)?;
        if !matches!(suffix, 'L' | 'M' | 'N' | 'T') {
            return Err(invalid());
        }

        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let allowance_units: u32 = digits.parse().map_err(|_| invalid())?;

        Ok(TaxCode::Standard {
            allowance_units,
            suffix,
        })
    }

    /// The annual personal allowance implied by this code.
    ///
    /// Returns `None` for `NT`, where no tax arises at all. Flat-rate
    /// codes have a zero allowance because every pound is taxed at a
    /// single rate.
    pub fn annual_allowance(&self) -> Option<Decimal> {
        match self {
            TaxCode::Standard {
                allowance_units, ..
            } => Some(Decimal::from(*allowance_units) * TAX_CODE_MULTIPLIER),
            TaxCode::BasicRate | TaxCode::HigherRate | TaxCode::AdditionalRate => {
                Some(Decimal::ZERO)
            }
            TaxCode::NoTax => None,
        }
    }
}

/// The calculation-relevant view of an employee.
///
/// This struct carries only the fields the engine reads. It is a snapshot:
/// the engine never mutates it and never looks anything else up about the
/// employee.
///
/// # Example
///
/// ```
/// use paye_engine::models::{Employee, TaxBasis};
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     tax_code: "1257L".to_string(),
///     tax_basis: TaxBasis::Cumulative,
///     ni_category: 'A',
///     pension_enrolled: true,
///     employee_pension_rate: None,
///     student_loan_plans: vec![],
///     postgraduate_loan: false,
/// };
/// assert_eq!(employee.ni_category, 'A');
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The PAYE tax code as issued, e.g. "1257L" or "BR".
    pub tax_code: String,
    /// Whether tax is calculated cumulatively or per period.
    pub tax_basis: TaxBasis,
    /// The National Insurance category letter, e.g. 'A'.
    pub ni_category: char,
    /// Whether the employee is enrolled in the workplace pension scheme.
    pub pension_enrolled: bool,
    /// Employee contribution rate overriding the scheme default, as a
    /// fraction (0.05 for 5%).
    #[serde(default)]
    pub employee_pension_rate: Option<Decimal>,
    /// The standard student loan plans with active repayments.
    #[serde(default)]
    pub student_loan_plans: Vec<StudentLoanPlan>,
    /// Whether a postgraduate loan repayment is also active.
    #[serde(default)]
    pub postgraduate_loan: bool,
}

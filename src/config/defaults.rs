//! Built-in statutory configuration.
//!
//! This module provides the fully-populated default [`TaxYearConfig`] used
//! when no configuration file has been loaded for a tax year. The table
//! carries the 2025-26 statutory figures; requests for other years reuse
//! them stamped with the requested year, so a calculation never starts
//! from a partial configuration.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{StudentLoanPlan, TaxYear};

use super::types::{NiCategoryRates, PensionBands, StudentLoanRates, TaxBand, TaxYearConfig};

fn pounds(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn rate_pct(percent: i64) -> Decimal {
    Decimal::new(percent, 2)
}

fn rate_bp(basis_points: i64) -> Decimal {
    Decimal::new(basis_points, 4)
}

fn ni_category(
    primary_threshold: i64,
    upper_earnings_limit: i64,
    employee_below: Decimal,
    employee_above: Decimal,
    secondary_threshold: i64,
    employer: Decimal,
) -> NiCategoryRates {
    NiCategoryRates {
        primary_threshold: pounds(primary_threshold),
        upper_earnings_limit: pounds(upper_earnings_limit),
        employee_rate_below_uel: employee_below,
        employee_rate_above_uel: employee_above,
        secondary_threshold: pounds(secondary_threshold),
        employer_rate: employer,
    }
}

/// Builds the statutory default configuration for a tax year.
///
/// The figures are the 2025-26 UK rates. Category letters with reduced or
/// zero liability are plain table entries with the appropriate rates set
/// to zero; the calculators treat them like any other category.
///
/// # Example
///
/// ```
/// use paye_engine::config::statutory_defaults;
/// use paye_engine::models::TaxYear;
/// use rust_decimal::Decimal;
///
/// let config = statutory_defaults(TaxYear::starting(2025));
/// assert_eq!(config.personal_allowance, Decimal::from(12570));
/// assert!(config.ni_categories.contains_key(&'A'));
/// ```
pub fn statutory_defaults(tax_year: TaxYear) -> TaxYearConfig {
    let tax_bands = vec![
        TaxBand {
            name: "basic".to_string(),
            lower: Decimal::ZERO,
            upper: Some(pounds(37_700)),
            rate: rate_pct(20),
        },
        TaxBand {
            name: "higher".to_string(),
            lower: pounds(37_700),
            upper: Some(pounds(125_140)),
            rate: rate_pct(40),
        },
        TaxBand {
            name: "additional".to_string(),
            lower: pounds(125_140),
            upper: None,
            rate: rate_pct(45),
        },
    ];

    let mut ni_categories = BTreeMap::new();
    // Standard employees.
    ni_categories.insert(
        'A',
        ni_category(12_570, 50_270, rate_pct(8), rate_pct(2), 5_000, rate_pct(15)),
    );
    // Married women and widows with a valid reduced-rate election.
    ni_categories.insert(
        'B',
        ni_category(12_570, 50_270, rate_bp(185), rate_pct(2), 5_000, rate_pct(15)),
    );
    // Over state pension age: no employee contributions.
    ni_categories.insert(
        'C',
        ni_category(12_570, 50_270, Decimal::ZERO, Decimal::ZERO, 5_000, rate_pct(15)),
    );
    // Apprentices under 25: employer relief up to the upper limit.
    ni_categories.insert(
        'H',
        ni_category(12_570, 50_270, rate_pct(8), rate_pct(2), 5_000, Decimal::ZERO),
    );
    // Deferred employee contributions (multiple employments).
    ni_categories.insert(
        'J',
        ni_category(12_570, 50_270, rate_pct(2), rate_pct(2), 5_000, rate_pct(15)),
    );
    // Under 21: employer relief up to the upper limit.
    ni_categories.insert(
        'M',
        ni_category(12_570, 50_270, rate_pct(8), rate_pct(2), 5_000, Decimal::ZERO),
    );
    // No liability either side.
    ni_categories.insert(
        'X',
        ni_category(12_570, 50_270, Decimal::ZERO, Decimal::ZERO, 5_000, Decimal::ZERO),
    );
    // Under 21 with deferred employee contributions.
    ni_categories.insert(
        'Z',
        ni_category(12_570, 50_270, rate_pct(2), rate_pct(2), 5_000, Decimal::ZERO),
    );

    let mut student_loans = BTreeMap::new();
    student_loans.insert(
        StudentLoanPlan::Plan1,
        StudentLoanRates {
            annual_threshold: pounds(26_065),
            rate: rate_pct(9),
        },
    );
    student_loans.insert(
        StudentLoanPlan::Plan2,
        StudentLoanRates {
            annual_threshold: pounds(28_470),
            rate: rate_pct(9),
        },
    );
    student_loans.insert(
        StudentLoanPlan::Plan4,
        StudentLoanRates {
            annual_threshold: pounds(32_745),
            rate: rate_pct(9),
        },
    );

    TaxYearConfig {
        tax_year,
        personal_allowance: pounds(12_570),
        tax_bands,
        ni_categories,
        pension: PensionBands {
            lower_qualifying_bound: pounds(6_240),
            upper_qualifying_bound: pounds(50_270),
            default_employee_rate: rate_pct(5),
            default_employer_rate: rate_pct(3),
        },
        student_loans,
        postgraduate_loan: StudentLoanRates {
            annual_threshold: pounds(21_000),
            rate: rate_pct(6),
        },
    }
}

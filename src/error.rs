//! Error types for the PAYE calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during a payroll calculation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single validation failure for one input field.
///
/// Violations are collected in input order so callers can report every
/// problem with a submission at once rather than fixing them one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The input field that failed validation.
    pub field: String,
    /// A description of what was wrong with the field.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The main error type for the PAYE calculation engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use paye_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input validation failed; the calculation was rejected before any
    /// figures were computed.
    #[error("Input validation failed with {} violation(s)", .violations.len())]
    InvalidInput {
        /// Every violation found, in input order.
        violations: Vec<Violation>,
    },

    /// An employee record was not found in the backing store.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee identifier that was looked up.
        employee_id: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A tax year configuration was structurally invalid.
    #[error("Invalid tax year configuration: {message}")]
    InvalidConfiguration {
        /// A description of the structural problem.
        message: String,
    },

    /// A tax year string did not match the `YYYY-YY` format.
    #[error("Invalid tax year '{value}': expected format YYYY-YY")]
    InvalidTaxYear {
        /// The string that failed to parse.
        value: String,
    },

    /// A tax code string was not recognised.
    #[error("Unrecognised tax code: {code}")]
    InvalidTaxCode {
        /// The tax code that failed to parse.
        code: String,
    },

    /// A National Insurance category letter had no entry in the
    /// configuration's category table.
    #[error("National Insurance category not configured: {category}")]
    NiCategoryNotFound {
        /// The category letter that was looked up.
        category: char,
    },

    /// A student loan plan had no entry in the configuration's plan table.
    #[error("Student loan plan not configured: {plan}")]
    StudentLoanPlanNotFound {
        /// The display name of the plan that was looked up.
        plan: String,
    },

    /// A tax band referenced by a flat-rate tax code does not exist.
    #[error("Tax band {index} not present in configuration")]
    TaxBandNotFound {
        /// The zero-based band index that was looked up.
        index: usize,
    },

    /// An internal arithmetic invariant was breached during calculation.
    ///
    /// This is always a defect or a corrupt input, never a normal outcome;
    /// the run is aborted and no year-to-date figures are written.
    #[error("Arithmetic invariant violated: {message}")]
    ArithmeticInvariant {
        /// A description of the breached invariant.
        message: String,
    },

    /// A year-to-date record changed between read and write.
    ///
    /// The caller must re-read the record and re-run the calculation;
    /// nothing was persisted.
    #[error("Concurrent update rejected for employee '{employee_id}' in tax year {tax_year}")]
    VersionConflict {
        /// The employee whose record was contested.
        employee_id: String,
        /// The tax year of the contested record.
        tax_year: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

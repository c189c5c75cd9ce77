//! Configuration loading and management for the PAYE calculation engine.
//!
//! This module provides the per-tax-year configuration: bands, thresholds
//! and rates for income tax, National Insurance, pensions and student
//! loans. Configurations come from YAML files or from the built-in
//! statutory defaults.
//!
//! # Example
//!
//! ```no_run
//! use paye_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/uk/2025-26.yaml").unwrap();
//! println!("Loaded tax year: {}", config.tax_year);
//! ```

mod defaults;
mod loader;
mod types;

pub use defaults::statutory_defaults;
pub use loader::ConfigLoader;
pub use types::{NiCategoryRates, PensionBands, StudentLoanRates, TaxBand, TaxYearConfig};

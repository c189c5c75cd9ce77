//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading tax year
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::TaxYearConfig;

/// Loads tax year configurations from YAML files.
///
/// One file holds one complete tax year: allowance, bands, National
/// Insurance categories, pension bands and student loan plans. A file
/// that parses but fails structural validation is rejected the same way
/// as one that does not parse; a calculation never sees half a
/// configuration.
///
/// # File layout
///
/// ```text
/// config/uk/
/// └── 2025-26.yaml    # One complete tax year
/// ```
///
/// # Example
///
/// ```no_run
/// use paye_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load("./config/uk/2025-26.yaml")?;
/// println!("Loaded tax year {}", config.tax_year);
/// # Ok::<(), paye_engine::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads and validates a tax year configuration file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file (e.g., "./config/uk/2025-26.yaml")
    ///
    /// # Returns
    ///
    /// Returns the validated configuration on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML (`ConfigParseError`)
    /// - The parsed configuration fails validation (`InvalidConfiguration`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<TaxYearConfig> {
        let config: TaxYearConfig = Self::load_yaml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}

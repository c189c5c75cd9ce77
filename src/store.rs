//! Record store collaborators for the PAYE calculation engine.
//!
//! The engine itself performs no I/O: everything it reads arrives in its
//! input and the new year-to-date snapshot it produces is handed back to
//! the caller. These traits are the collaborator surface the surrounding
//! record layer implements, and [`InMemoryStore`] is the reference
//! implementation used by the runner and the tests.
//!
//! Concurrency discipline lives at this boundary. Two calculations for
//! the same employee and tax year that both read the same prior snapshot
//! would double-count if both were persisted; the store accepts a new
//! snapshot only when its version advances the stored one by exactly
//! one, so the second writer gets a [`EngineError::VersionConflict`] and
//! must re-fetch before retrying.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::config::{TaxYearConfig, statutory_defaults};
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, EmployeeYtd, TaxYear};

/// Read access to employee records.
pub trait EmployeeStore {
    /// Fetches an employee by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmployeeNotFound`] if no such employee
    /// exists.
    fn employee(&self, employee_id: &str) -> EngineResult<Employee>;
}

/// Access to per-tax-year configuration.
pub trait ConfigStore {
    /// Fetches the configuration for a tax year, creating and persisting
    /// the statutory defaults if none has been stored yet.
    fn tax_year_config(&self, tax_year: TaxYear) -> EngineResult<TaxYearConfig>;
}

/// Access to year-to-date records.
pub trait YtdStore {
    /// Fetches an employee's year-to-date record for a tax year.
    ///
    /// Returns an all-zero opening record when none exists; the record is
    /// not persisted until the first successful calculation is.
    fn employee_ytd(&self, employee_id: &str, tax_year: TaxYear) -> EngineResult<EmployeeYtd>;

    /// Persists the year-to-date snapshot produced by a calculation.
    ///
    /// Must be called exactly once per accepted calculation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::VersionConflict`] when the snapshot was not
    /// built from the currently stored record, i.e. its version is not
    /// exactly one ahead. An absent record counts as version zero.
    fn persist_ytd(&self, employee_id: &str, new_ytd: &EmployeeYtd) -> EngineResult<()>;
}

#[derive(Default)]
struct StoreInner {
    employees: HashMap<String, Employee>,
    configs: HashMap<TaxYear, TaxYearConfig>,
    ytd: HashMap<(String, TaxYear), EmployeeYtd>,
}

/// A thread-safe in-memory implementation of all three store traits.
///
/// # Example
///
/// ```
/// use paye_engine::store::{InMemoryStore, YtdStore};
/// use paye_engine::models::TaxYear;
///
/// let store = InMemoryStore::new();
/// let ytd = store.employee_ytd("emp-001", TaxYear::starting(2025)).unwrap();
/// assert_eq!(ytd.version, 0);
/// ```
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee record.
    pub fn insert_employee(&self, employee: Employee) {
        self.lock().employees.insert(employee.id.clone(), employee);
    }

    /// Adds or replaces the configuration for its tax year.
    pub fn insert_config(&self, config: TaxYearConfig) {
        self.lock().configs.insert(config.tax_year, config);
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A poisoned mutex only means another thread panicked mid-write;
        // the maps themselves are always in a usable state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EmployeeStore for InMemoryStore {
    fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.lock()
            .employees
            .get(employee_id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }
}

impl ConfigStore for InMemoryStore {
    fn tax_year_config(&self, tax_year: TaxYear) -> EngineResult<TaxYearConfig> {
        let mut inner = self.lock();
        let config = inner
            .configs
            .entry(tax_year)
            .or_insert_with(|| statutory_defaults(tax_year));
        Ok(config.clone())
    }
}

impl YtdStore for InMemoryStore {
    fn employee_ytd(&self, employee_id: &str, tax_year: TaxYear) -> EngineResult<EmployeeYtd> {
        let inner = self.lock();
        Ok(inner
            .ytd
            .get(&(employee_id.to_string(), tax_year))
            .cloned()
            .unwrap_or_else(|| EmployeeYtd::opening(tax_year)))
    }

    fn persist_ytd(&self, employee_id: &str, new_ytd: &EmployeeYtd) -> EngineResult<()> {
        let mut inner = self.lock();
        let key = (employee_id.to_string(), new_ytd.tax_year);
        let stored_version = inner.ytd.get(&key).map(|record| record.version).unwrap_or(0);
        if new_ytd.version != stored_version + 1 {
            return Err(EngineError::VersionConflict {
                employee_id: employee_id.to_string(),
                tax_year: new_ytd.tax_year.to_string(),
            });
        }
        inner.ytd.insert(key, new_ytd.clone());
        Ok(())
    }
}

//! Pay run orchestration over a record store.
//!
//! [`PayrollRunner`] is the calling layer the engine expects to sit
//! inside: it fetches the employee, configuration and prior year-to-date
//! snapshot from the store, invokes the engine, and persists the new
//! snapshot exactly once per accepted calculation. Batch runs keep
//! per-employee isolation: one employee's failure never aborts the
//! others, and every failure is collected rather than dropped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::PayrollEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayComponents, PayPeriod, PayrollInput, PayrollResult};
use crate::store::{ConfigStore, EmployeeStore, YtdStore};

/// One employee's pay instruction for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayRunRequest {
    /// The employee to pay.
    pub employee_id: String,
    /// Basic gross pay for the period.
    pub gross_pay: Decimal,
    /// Supplemental pay components.
    #[serde(default)]
    pub components: PayComponents,
    /// The pay period being paid.
    pub period: PayPeriod,
}

/// The outcome of a batch pay run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Results for the employees whose calculations were accepted.
    pub completed: Vec<PayrollResult>,
    /// The employees whose calculations failed, with the failure.
    pub failed: Vec<(String, EngineError)>,
}

/// Runs payroll calculations against a record store.
///
/// The store provides employees, configuration and year-to-date records;
/// the runner wires them into engine inputs and persists accepted
/// results. A [`EngineError::VersionConflict`] from the store means a
/// concurrent run updated the same record first; retrying the request
/// re-fetches a fresh snapshot, so a plain retry is safe.
pub struct PayrollRunner<S> {
    store: S,
    engine: PayrollEngine,
}

impl<S> PayrollRunner<S>
where
    S: EmployeeStore + ConfigStore + YtdStore,
{
    /// Creates a runner over a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            engine: PayrollEngine::new(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Calculates and persists one employee's pay for one period.
    ///
    /// On success the new year-to-date snapshot has been persisted and
    /// the full result is returned. On any failure nothing is persisted.
    ///
    /// # Errors
    ///
    /// Store lookup failures, engine rejections and persistence
    /// conflicts are all returned unchanged.
    pub fn run(&self, request: &PayRunRequest) -> EngineResult<PayrollResult> {
        let employee = self.store.employee(&request.employee_id)?;
        let tax_year = request.period.tax_year();
        let config = self.store.tax_year_config(tax_year)?;
        let prior_ytd = self.store.employee_ytd(&request.employee_id, tax_year)?;

        let input = PayrollInput {
            employee,
            gross_pay: request.gross_pay,
            period: request.period.clone(),
            config,
            prior_ytd,
            components: request.components.clone(),
        };

        let result = self.engine.calculate(&input)?;
        self.store.persist_ytd(&request.employee_id, &result.new_ytd)?;
        Ok(result)
    }

    /// Runs a batch of pay instructions, one employee at a time.
    ///
    /// Failures are collected per employee and never abort the rest of
    /// the batch.
    pub fn run_batch(&self, requests: &[PayRunRequest]) -> BatchOutcome {
        let mut completed = Vec::new();
        let mut failed = Vec::new();

        for request in requests {
            match self.run(request) {
                Ok(result) => completed.push(result),
                Err(err) => {
                    warn!(
                        employee_id = %request.employee_id,
                        error = %err,
                        "Pay run failed for employee"
                    );
                    failed.push((request.employee_id.clone(), err));
                }
            }
        }

        info!(
            completed = completed.len(),
            failed = failed.len(),
            "Pay run batch finished"
        );
        BatchOutcome { completed, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, PeriodType, TaxBasis};
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly_period(number: u32) -> PayPeriod {
        let start = ymd(2025, 4, 6) + chrono::Days::new(7 * (number as u64 - 1));
        PayPeriod {
            period_type: PeriodType::Weekly,
            number,
            start_date: start,
            end_date: start + chrono::Days::new(6),
        }
    }

    fn test_employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            tax_code: "1257L".to_string(),
            tax_basis: TaxBasis::Cumulative,
            ni_category: 'A',
            pension_enrolled: false,
            employee_pension_rate: None,
            student_loan_plans: vec![],
            postgraduate_loan: false,
        }
    }

    fn request(employee_id: &str, gross: &str, number: u32) -> PayRunRequest {
        PayRunRequest {
            employee_id: employee_id.to_string(),
            gross_pay: dec(gross),
            components: PayComponents::default(),
            period: weekly_period(number),
        }
    }

    fn runner_with_employee(id: &str) -> PayrollRunner<InMemoryStore> {
        let store = InMemoryStore::new();
        store.insert_employee(test_employee(id));
        PayrollRunner::new(store)
    }

    // ==========================================================================
    // RUN-001: accepted run persists the new snapshot
    // ==========================================================================
    #[test]
    fn test_run_001_persists_accepted_result() {
        let runner = runner_with_employee("emp-001");
        let result = runner.run(&request("emp-001", "500.00", 1)).unwrap();

        let stored = runner
            .store()
            .employee_ytd("emp-001", result.tax_year)
            .unwrap();
        assert_eq!(stored, result.new_ytd);
        assert_eq!(stored.version, 1);
        assert_eq!(stored.gross_pay, dec("500.00"));
    }

    // ==========================================================================
    // RUN-002: consecutive periods accumulate through the store
    // ==========================================================================
    #[test]
    fn test_run_002_consecutive_periods_accumulate() {
        let runner = runner_with_employee("emp-001");
        let first = runner.run(&request("emp-001", "500.00", 1)).unwrap();
        let second = runner.run(&request("emp-001", "500.00", 2)).unwrap();

        // Steady pay: the second period's tax differs only by rounding.
        assert_eq!(first.tax.tax_due, dec("51.65"));
        assert_eq!(second.tax.tax_due, dec("51.66"));

        let stored = runner
            .store()
            .employee_ytd("emp-001", first.tax_year)
            .unwrap();
        assert_eq!(stored.gross_pay, dec("1000.00"));
        assert_eq!(stored.tax_paid, dec("103.31"));
        assert_eq!(stored.version, 2);
    }

    // ==========================================================================
    // RUN-003: unknown employees fail before any calculation
    // ==========================================================================
    #[test]
    fn test_run_003_unknown_employee() {
        let runner = PayrollRunner::new(InMemoryStore::new());
        let err = runner.run(&request("ghost", "500.00", 1)).unwrap_err();
        assert!(matches!(err, EngineError::EmployeeNotFound { .. }));
    }

    // ==========================================================================
    // RUN-004: rejected input leaves the store untouched
    // ==========================================================================
    #[test]
    fn test_run_004_rejection_leaves_ytd_untouched() {
        let runner = runner_with_employee("emp-001");
        runner.run(&request("emp-001", "500.00", 1)).unwrap();

        let err = runner.run(&request("emp-001", "-100.00", 2)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));

        let stored = runner
            .store()
            .employee_ytd("emp-001", weekly_period(1).tax_year())
            .unwrap();
        assert_eq!(stored.gross_pay, dec("500.00"));
        assert_eq!(stored.version, 1);
    }

    // ==========================================================================
    // RUN-005: batch runs isolate failures per employee
    // ==========================================================================
    #[test]
    fn test_run_005_batch_isolates_failures() {
        let runner = runner_with_employee("emp-001");
        runner.store().insert_employee(test_employee("emp-002"));

        let outcome = runner.run_batch(&[
            request("emp-001", "500.00", 1),
            request("ghost", "500.00", 1),
            request("emp-002", "800.00", 1),
        ]);

        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "ghost");
        assert!(matches!(
            outcome.failed[0].1,
            EngineError::EmployeeNotFound { .. }
        ));

        // Both good employees were persisted despite the failure between them.
        let year = weekly_period(1).tax_year();
        assert_eq!(
            runner.store().employee_ytd("emp-001", year).unwrap().version,
            1
        );
        assert_eq!(
            runner.store().employee_ytd("emp-002", year).unwrap().version,
            1
        );
    }
}

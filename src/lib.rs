//! Payroll Calculation Engine for UK PAYE
//!
//! This crate calculates one employee's pay for one period under the UK
//! PAYE scheme: income tax, National Insurance, workplace pension
//! contributions and student loan deductions, with an auditable log of
//! every step and an updated year-to-date snapshot.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod runner;
pub mod store;

pub use engine::PayrollEngine;
pub use error::{EngineError, EngineResult};
pub use runner::{BatchOutcome, PayRunRequest, PayrollRunner};
pub use store::{ConfigStore, EmployeeStore, InMemoryStore, YtdStore};

//! Core data models for the PAYE calculation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod input;
mod pay_period;
mod result;
mod ytd;

pub use employee::{Employee, StudentLoanPlan, TaxBasis, TaxCode};
pub use input::{PayComponents, PayrollInput};
pub use pay_period::{PayPeriod, PeriodType, TaxYear};
pub use result::{
    BandAmount, CalculationLog, Deductions, EngineStage, LogStep, NiBreakdown, PayrollResult,
    PensionBreakdown, PlanDeduction, PostgraduateDeduction, StudentLoanBreakdown, TaxBreakdown,
};
pub use ytd::EmployeeYtd;

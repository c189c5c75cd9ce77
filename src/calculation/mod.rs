//! Calculation logic for the PAYE calculation engine.
//!
//! This module contains the pure calculators the engine orchestrates:
//! pay period normalization, input validation, income tax on both bases,
//! National Insurance, pension contributions, student loan deductions and
//! the year-to-date merge, plus the shared rounding helpers they are all
//! built on.

mod accumulate;
mod income_tax;
mod national_insurance;
mod pension;
mod period;
mod rounding;
mod student_loan;
mod validation;

pub use accumulate::{AccumulationResult, accumulate};
pub use income_tax::{IncomeTaxResult, calculate_income_tax};
pub use national_insurance::{NiResult, calculate_ni};
pub use pension::{PensionResult, calculate_pension};
pub use period::{NormalizedPeriod, normalize};
pub use rounding::{floor_zero, portion_above, portion_between, round_money};
pub use student_loan::{StudentLoanResult, calculate_student_loans};
pub use validation::validate;

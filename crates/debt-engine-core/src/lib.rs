//! Loan amortization and debt simulation.
//!
//! The engine builds equal-installment (French system) schedules with
//! unscheduled extra principal payments, derives debt summaries against a
//! no-extra baseline, and runs what-if comparisons. Every entry point is a
//! pure function of its inputs.

pub mod debt;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::DebtEngineError;
pub use types::*;

/// Standard result type for all debt-engine operations
pub type DebtEngineResult<T> = Result<T, DebtEngineError>;

//! Debt records and the amortization engine built on them.

pub mod calendar;
pub mod model;
pub mod schedule;
pub mod simulation;
pub mod summary;

pub use model::{Debt, DebtDraft, ExtraPayment, ExtraPaymentMode};
pub use schedule::{
    build_schedule, generate, generate_schedule, schedule_for, AmortizationEntry, EntryStatus,
    ScheduleTerms,
};
pub use simulation::{compare_what_if, run_what_if, simulate, WhatIfComparison};
pub use summary::{analyze_debt, summarize, DebtSummary};

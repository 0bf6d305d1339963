//! Installment dates.
//!
//! Dates are always derived from the start date, never chained from the
//! previous installment, so a start on the 31st keeps landing on month-end.

use chrono::{Months, NaiveDate};

use crate::types::InstallmentPeriod;

/// Date of the installment `offset` periods after `start` (offset 0 is the
/// first installment).
///
/// Day-of-month is preserved when the target month has it and clamped to the
/// month's last day otherwise. Returns `None` only when the date leaves
/// chrono's representable range.
pub fn installment_date(
    start: NaiveDate,
    offset: u32,
    period: InstallmentPeriod,
) -> Option<NaiveDate> {
    let months = offset.checked_mul(period.months())?;
    start.checked_add_months(Months::new(months))
}

/// Date of the 1-based installment `index`.
pub fn date_for_index(start: NaiveDate, index: u32, period: InstallmentPeriod) -> Option<NaiveDate> {
    installment_date(start, index.saturating_sub(1), period)
}

//! Future debt expenses bucketed by calendar month, for cash-flow projections.

use std::time::Instant;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debt::{schedule_for, Debt, EntryStatus};
use crate::error::DebtEngineError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DebtEngineResult;

/// A (month, year) cash-flow bucket. Months are 1 to 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketExpense {
    pub month: u32,
    pub year: i32,
    pub amount: Money,
    /// Installment indices that fall in this bucket.
    pub installments: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub debt: Debt,
    pub buckets: Vec<PeriodBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub buckets: Vec<BucketExpense>,
    pub total_projected: Money,
    /// Non-paid installments that fell outside every bucket.
    pub unbucketed_installments: u32,
}

/// `count` consecutive monthly buckets starting at `month`/`year`.
pub fn month_buckets(month: u32, year: i32, count: u32) -> Vec<PeriodBucket> {
    let first = year * 12 + month as i32 - 1;
    (0..count as i32)
        .map(|i| {
            let n = first + i;
            PeriodBucket {
                month: (n.rem_euclid(12) + 1) as u32,
                year: n.div_euclid(12),
            }
        })
        .collect()
}

/// Payment plus extra of every non-paid installment, summed per bucket.
///
/// Output order follows `buckets`. Paid installments never appear in a
/// projection.
pub fn project_expenses(debt: &Debt, buckets: &[PeriodBucket]) -> Vec<BucketExpense> {
    let mut out: Vec<BucketExpense> = buckets
        .iter()
        .map(|b| BucketExpense {
            month: b.month,
            year: b.year,
            amount: Decimal::ZERO,
            installments: Vec::new(),
        })
        .collect();

    for entry in schedule_for(debt)
        .iter()
        .filter(|e| e.status != EntryStatus::Paid)
    {
        if let Some(slot) = out
            .iter_mut()
            .find(|b| b.month == entry.date.month() && b.year == entry.date.year())
        {
            slot.amount += entry.payment + entry.extra_payment;
            slot.installments.push(entry.installment);
        }
    }

    out
}

/// Validate inputs and project a debt into cash-flow buckets.
pub fn project_debt_expenses(
    input: &ProjectionInput,
) -> DebtEngineResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    input.debt.validate()?;
    if input.buckets.is_empty() {
        return Err(DebtEngineError::InsufficientData(
            "Projection requires at least one period bucket".into(),
        ));
    }
    if let Some(bad) = input.buckets.iter().find(|b| !(1..=12).contains(&b.month)) {
        return Err(DebtEngineError::DateError(format!(
            "Bucket month {} of {} is not between 1 and 12",
            bad.month, bad.year
        )));
    }

    let buckets = project_expenses(&input.debt, &input.buckets);
    let bucketed: usize = buckets.iter().map(|b| b.installments.len()).sum();
    let outstanding = schedule_for(&input.debt)
        .iter()
        .filter(|e| e.status != EntryStatus::Paid)
        .count();
    let unbucketed_installments = outstanding.saturating_sub(bucketed) as u32;

    let mut warnings = Vec::new();
    if unbucketed_installments > 0 {
        warnings.push(format!(
            "{unbucketed_installments} outstanding installments fall outside the requested buckets"
        ));
    }

    let output = ProjectionOutput {
        total_projected: buckets.iter().map(|b| b.amount).sum(),
        buckets,
        unbucketed_installments,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Outstanding installments plus extra payments bucketed by calendar month",
        &serde_json::json!({
            "name": input.debt.name,
            "buckets": input.buckets.len(),
            "current_installment": input.debt.current_installment,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InstallmentPeriod;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn reference_debt() -> Debt {
        Debt::new(
            "Working capital loan",
            dec!(10_000_000),
            dec!(12),
            12,
            InstallmentPeriod::Monthly,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_month_buckets_roll_over_year() {
        let b = month_buckets(11, 2025, 3);
        assert_eq!(
            b,
            vec![
                PeriodBucket { month: 11, year: 2025 },
                PeriodBucket { month: 12, year: 2025 },
                PeriodBucket { month: 1, year: 2026 },
            ]
        );
    }

    #[test]
    fn test_paid_entries_excluded() {
        let debt = reference_debt().with_current_installment(2);
        let out = project_expenses(&debt, &month_buckets(1, 2025, 4));
        assert_eq!(out[0].amount, Decimal::ZERO);
        assert_eq!(out[1].amount, Decimal::ZERO);
        assert_eq!(out[2].amount, dec!(888487.89));
        assert_eq!(out[2].installments, vec![3]);
    }

    #[test]
    fn test_extra_payment_counted_in_bucket() {
        let debt = reference_debt().with_extra_payment(3, dec!(2_000_000));
        let out = project_expenses(&debt, &[PeriodBucket { month: 3, year: 2025 }]);
        assert_eq!(out[0].amount, dec!(888487.89) + dec!(2_000_000));
    }

    #[test]
    fn test_quarterly_debt_leaves_gaps() {
        let mut debt = reference_debt();
        debt.period = InstallmentPeriod::Quarterly;
        debt.total_installments = 4;
        let out = project_expenses(&debt, &month_buckets(1, 2025, 3));
        assert!(out[0].amount > Decimal::ZERO);
        assert_eq!(out[1].amount, Decimal::ZERO);
        assert_eq!(out[2].amount, Decimal::ZERO);
    }

    #[test]
    fn test_envelope_counts_unbucketed() {
        let input = ProjectionInput {
            debt: reference_debt(),
            buckets: month_buckets(1, 2025, 6),
        };
        let out = project_debt_expenses(&input).unwrap();
        assert_eq!(out.result.unbucketed_installments, 6);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_envelope_rejects_bad_buckets() {
        let empty = ProjectionInput {
            debt: reference_debt(),
            buckets: vec![],
        };
        assert!(project_debt_expenses(&empty).is_err());

        let bad = ProjectionInput {
            debt: reference_debt(),
            buckets: vec![PeriodBucket { month: 13, year: 2025 }],
        };
        assert!(matches!(
            project_debt_expenses(&bad),
            Err(DebtEngineError::DateError(_))
        ));
    }
}

//! Equal-installment (French system) amortization with extra payments.
//!
//! The installment is recalculated whenever an extra payment lowers the
//! balance. Figures are rounded to cents as each entry is finalized and the
//! rounded balance is carried forward, so principal components always sum to
//! the original amount.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::calendar::date_for_index;
use super::model::{Debt, ExtraPayment, ExtraPaymentMode};
use crate::time_value::{annuity_payment, periods_to_clear};
use crate::types::{with_metadata, ComputationOutput, InstallmentPeriod, Money, Rate};
use crate::DebtEngineResult;

const MONEY_DP: u32 = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Paid,
    Current,
    Future,
}

impl EntryStatus {
    /// Status of installment `index` when `paid` installments are settled.
    pub fn for_index(index: u32, paid: u32) -> Self {
        if index <= paid {
            EntryStatus::Paid
        } else if index - paid == 1 {
            EntryStatus::Current
        } else {
            EntryStatus::Future
        }
    }
}

/// One row of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub installment: u32,
    pub date: NaiveDate,
    /// Principal plus interest, excluding any extra payment.
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Extra payment applied after this installment (0 if none).
    pub extra_payment: Money,
    /// Balance after the installment and its extra payment.
    pub remaining_balance: Money,
    pub status: EntryStatus,
}

/// Loan terms the generator runs on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTerms {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub total_installments: u32,
    pub start_date: NaiveDate,
    pub period: InstallmentPeriod,
    pub current_installment: u32,
    #[serde(default)]
    pub mode: ExtraPaymentMode,
}

impl ScheduleTerms {
    pub fn from_debt(debt: &Debt) -> Self {
        ScheduleTerms {
            principal: debt.original_amount,
            periodic_rate: debt.periodic_rate(),
            total_installments: debt.total_installments,
            start_date: debt.start_date,
            period: debt.period,
            current_installment: debt.current_installment,
            mode: debt.extra_payment_mode,
        }
    }
}

/// Output of `build_schedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub installment_amount: Money,
    pub periodic_rate: Rate,
    pub installments: usize,
    pub total_payments: Money,
    pub total_interest: Money,
    pub total_extra_payments: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub entries: Vec<AmortizationEntry>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Amortization schedule with the default reduce-term recalculation.
///
/// Returns an empty schedule when the principal or rate is not positive or
/// there are no installments.
pub fn generate(
    principal: Money,
    periodic_rate: Rate,
    total_installments: u32,
    start_date: NaiveDate,
    period: InstallmentPeriod,
    current_installment: u32,
    extra_payments: &[ExtraPayment],
) -> Vec<AmortizationEntry> {
    let terms = ScheduleTerms {
        principal,
        periodic_rate,
        total_installments,
        start_date,
        period,
        current_installment,
        mode: ExtraPaymentMode::default(),
    };
    generate_schedule(&terms, extra_payments)
}

/// Schedule for a debt with its recorded extra payments.
pub fn schedule_for(debt: &Debt) -> Vec<AmortizationEntry> {
    generate_schedule(&ScheduleTerms::from_debt(debt), &debt.extra_payments)
}

/// Core recurrence.
///
/// Extra payments are not validated here; non-positive amounts are ignored
/// and indices past the end of the schedule never match.
pub fn generate_schedule(
    terms: &ScheduleTerms,
    extra_payments: &[ExtraPayment],
) -> Vec<AmortizationEntry> {
    let rate = terms.periodic_rate;
    if terms.principal <= Decimal::ZERO || rate <= Decimal::ZERO || terms.total_installments == 0
    {
        return Vec::new();
    }

    let extras = extras_by_installment(extra_payments);
    let mut balance = round_money(terms.principal);
    let mut installment = round_money(annuity_payment(balance, rate, terms.total_installments));
    // Last installment of the current plan; absorbs any rounding residual.
    let mut final_index = terms.total_installments;
    let mut schedule = Vec::with_capacity(terms.total_installments as usize);

    for index in 1..=terms.total_installments {
        let Some(date) = date_for_index(terms.start_date, index, terms.period) else {
            warn!(installment = index, "installment date out of range; schedule truncated");
            break;
        };

        let interest = round_money(balance * rate);
        let principal = if index >= final_index {
            balance
        } else {
            (installment - interest).max(Decimal::ZERO).min(balance)
        };

        let after_installment = balance - principal;
        let scheduled_extra = extras.get(&index).copied().unwrap_or(Decimal::ZERO);
        let extra = round_money(scheduled_extra)
            .min(after_installment)
            .max(Decimal::ZERO);
        balance = after_installment - extra;

        trace!(
            installment = index,
            %interest,
            %principal,
            %extra,
            %balance,
            "amortization entry"
        );

        schedule.push(AmortizationEntry {
            installment: index,
            date,
            payment: principal + interest,
            principal,
            interest,
            extra_payment: extra,
            remaining_balance: balance,
            status: EntryStatus::for_index(index, terms.current_installment),
        });

        if balance <= Decimal::ZERO {
            break;
        }

        if !extra.is_zero() {
            let nominal_remaining = final_index - index;
            let remaining = match terms.mode {
                ExtraPaymentMode::ReduceTerm => {
                    periods_to_clear(balance, rate, installment, nominal_remaining)
                }
                ExtraPaymentMode::ReduceInstallment => nominal_remaining,
            };
            installment = round_money(annuity_payment(balance, rate, remaining));
            final_index = index + remaining;
            debug!(
                after_installment = index,
                %balance,
                remaining,
                %installment,
                "installment recalculated after extra payment"
            );
        }
    }

    schedule
}

/// Summed extra amount per installment index.
fn extras_by_installment(extra_payments: &[ExtraPayment]) -> BTreeMap<u32, Money> {
    let mut map = BTreeMap::new();
    for extra in extra_payments {
        if extra.amount <= Decimal::ZERO {
            if !extra.amount.is_zero() {
                warn!(
                    installment = extra.installment,
                    amount = %extra.amount,
                    "negative extra payment ignored"
                );
            }
            continue;
        }
        *map.entry(extra.installment).or_insert(Decimal::ZERO) += extra.amount;
    }
    map
}

/// Warnings for extra payments the schedule applied only in part or not at
/// all: past the payoff installment, or larger than the balance left after
/// their installment.
pub(crate) fn unapplied_extra_warnings(
    extra_payments: &[ExtraPayment],
    schedule: &[AmortizationEntry],
) -> Vec<String> {
    let Some(last) = schedule.last() else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    for (index, requested) in extras_by_installment(extra_payments) {
        match schedule.iter().find(|e| e.installment == index) {
            None => warnings.push(format!(
                "Extra payment of {} after installment {} falls after payoff at installment {} and was not applied",
                requested, index, last.installment
            )),
            Some(entry) if entry.extra_payment < round_money(requested) => warnings.push(format!(
                "Extra payment of {} after installment {} exceeds the remaining balance; only {} was applied",
                requested, index, entry.extra_payment
            )),
            Some(_) => {}
        }
    }
    warnings
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP)
}

// ---------------------------------------------------------------------------
// Schedule totals
// ---------------------------------------------------------------------------

pub fn total_interest(schedule: &[AmortizationEntry]) -> Money {
    schedule.iter().map(|e| e.interest).sum()
}

pub fn total_principal(schedule: &[AmortizationEntry]) -> Money {
    schedule.iter().map(|e| e.principal + e.extra_payment).sum()
}

/// Installments plus extra payments.
pub fn total_payments(schedule: &[AmortizationEntry]) -> Money {
    schedule.iter().map(|e| e.payment + e.extra_payment).sum()
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Validate a debt and build its schedule with totals.
pub fn build_schedule(debt: &Debt) -> DebtEngineResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    debt.validate()?;

    let entries = schedule_for(debt);
    let warnings = unapplied_extra_warnings(&debt.extra_payments, &entries);

    let output = ScheduleOutput {
        installment_amount: entries.first().map(|e| e.payment).unwrap_or_default(),
        periodic_rate: debt.periodic_rate(),
        installments: entries.len(),
        total_payments: total_payments(&entries),
        total_interest: total_interest(&entries),
        total_extra_payments: entries.iter().map(|e| e.extra_payment).sum(),
        payoff_date: entries.last().map(|e| e.date),
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French (equal-installment) amortization with extra-payment recalculation",
        &serde_json::json!({
            "name": debt.name,
            "original_amount": debt.original_amount.to_string(),
            "annual_rate_pct": debt.annual_rate.to_string(),
            "period": debt.period,
            "total_installments": debt.total_installments,
            "extra_payment_mode": debt.extra_payment_mode,
            "recorded_extra_payments": debt.total_extra_payments().to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    /// Helper: 10M at 12% a year over 12 monthly installments.
    fn reference_debt() -> Debt {
        Debt::new(
            "Working capital loan",
            dec!(10_000_000),
            dec!(12),
            12,
            InstallmentPeriod::Monthly,
            start(),
        )
    }

    // -----------------------------------------------------------------------
    // 1. Plain schedule
    // -----------------------------------------------------------------------
    #[test]
    fn test_reference_schedule_shape() {
        let schedule = schedule_for(&reference_debt());
        assert_eq!(schedule.len(), 12);

        let first = &schedule[0];
        assert_eq!(first.interest, dec!(100000.00));
        assert_eq!(first.payment, dec!(888487.89));
        assert_eq!(first.principal, dec!(788487.89));
        assert_eq!(first.remaining_balance, dec!(9211512.11));
        assert_eq!(first.date, start());

        let last = schedule.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn test_principal_sums_to_original_amount() {
        let schedule = schedule_for(&reference_debt());
        let principal: Money = schedule.iter().map(|e| e.principal).sum();
        assert_eq!(principal, dec!(10_000_000));
    }

    #[test]
    fn test_interest_declines_each_period() {
        let schedule = schedule_for(&reference_debt());
        for pair in schedule.windows(2) {
            assert!(pair[1].interest < pair[0].interest);
            assert!(pair[1].principal >= pair[0].principal || pair[1].installment == 12);
        }
    }

    // -----------------------------------------------------------------------
    // 2. Last installment absorbs the rounding residual
    // -----------------------------------------------------------------------
    #[test]
    fn test_final_installment_clears_residual_cents() {
        let schedule = schedule_for(&reference_debt());
        let before_last = &schedule[10];
        let last = &schedule[11];

        // Final principal is exactly the balance left after installment 11
        assert_eq!(last.principal, before_last.remaining_balance);
        assert_eq!(last.payment, last.principal + last.interest);
        // and differs from the regular installment by a few cents at most
        let diff = (last.payment - dec!(888487.89)).abs();
        assert!(diff <= dec!(0.12), "final payment drifted by {diff}");
    }

    // -----------------------------------------------------------------------
    // 3. Extra payments
    // -----------------------------------------------------------------------
    #[test]
    fn test_extra_payment_shortens_schedule_and_cuts_interest() {
        let base = schedule_for(&reference_debt());
        let with_extra = schedule_for(&reference_debt().with_extra_payment(3, dec!(2_000_000)));

        assert_eq!(with_extra.len(), 10);
        assert!(total_interest(&with_extra) < total_interest(&base));
        assert_eq!(with_extra.last().unwrap().remaining_balance, Decimal::ZERO);

        let third = &with_extra[2];
        assert_eq!(third.extra_payment, dec!(2_000_000));
        let principal_paid: Money = with_extra[..3].iter().map(|e| e.principal).sum();
        assert_eq!(
            third.remaining_balance,
            dec!(10_000_000) - principal_paid - dec!(2_000_000)
        );
    }

    #[test]
    fn test_reduce_term_recalculates_smaller_installment() {
        let schedule = schedule_for(&reference_debt().with_extra_payment(3, dec!(2_000_000)));
        assert_eq!(schedule[2].payment, dec!(888487.89));
        assert!(schedule[3].payment < dec!(888487.89));
    }

    #[test]
    fn test_reduce_installment_keeps_length() {
        let debt = reference_debt()
            .with_extra_payment(3, dec!(2_000_000))
            .with_mode(ExtraPaymentMode::ReduceInstallment);
        let schedule = schedule_for(&debt);

        assert_eq!(schedule.len(), 12);
        assert!(schedule[3].payment < schedule[2].payment);
        assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);

        let expected = annuity_payment(schedule[2].remaining_balance, dec!(0.01), 9).round_dp(2);
        assert_eq!(schedule[3].payment, expected);
    }

    #[test]
    fn test_extras_on_same_installment_accumulate() {
        let split = reference_debt()
            .with_extra_payment(5, dec!(300_000))
            .with_extra_payment(5, dec!(200_000));
        let single = reference_debt().with_extra_payment(5, dec!(500_000));
        assert_eq!(schedule_for(&split), schedule_for(&single));
        assert_eq!(schedule_for(&split)[4].extra_payment, dec!(500_000));
    }

    #[test]
    fn test_extra_larger_than_balance_pays_off() {
        let schedule = schedule_for(&reference_debt().with_extra_payment(2, dec!(50_000_000)));
        assert_eq!(schedule.len(), 2);
        let last = &schedule[1];
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        // Only the outstanding balance is recorded as applied
        assert_eq!(
            last.extra_payment,
            schedule[0].remaining_balance - last.principal
        );
    }

    #[test]
    fn test_non_positive_extra_is_ignored() {
        let schedule = schedule_for(&reference_debt().with_extra_payment(4, dec!(-100)));
        assert_eq!(schedule, schedule_for(&reference_debt()));
    }

    // -----------------------------------------------------------------------
    // 4. Status tagging
    // -----------------------------------------------------------------------
    #[test]
    fn test_status_tags() {
        let schedule = schedule_for(&reference_debt().with_current_installment(3));
        assert!(schedule[..3].iter().all(|e| e.status == EntryStatus::Paid));
        assert_eq!(schedule[3].status, EntryStatus::Current);
        assert!(schedule[4..].iter().all(|e| e.status == EntryStatus::Future));
    }

    #[test]
    fn test_status_for_index() {
        assert_eq!(EntryStatus::for_index(1, 0), EntryStatus::Current);
        assert_eq!(EntryStatus::for_index(2, 0), EntryStatus::Future);
        assert_eq!(EntryStatus::for_index(4, 4), EntryStatus::Paid);
        assert_eq!(EntryStatus::for_index(12, u32::MAX), EntryStatus::Paid);
    }

    // -----------------------------------------------------------------------
    // 5. Degenerate terms
    // -----------------------------------------------------------------------
    #[test]
    fn test_invalid_terms_give_empty_schedule() {
        let empty = |p: Money, r: Rate, n: u32| {
            generate(p, r, n, start(), InstallmentPeriod::Monthly, 0, &[]).is_empty()
        };
        assert!(empty(Decimal::ZERO, dec!(0.01), 12));
        assert!(empty(dec!(-5), dec!(0.01), 12));
        assert!(empty(dec!(1000), Decimal::ZERO, 12));
        assert!(empty(dec!(1000), dec!(0.01), 0));
    }

    #[test]
    fn test_quarterly_dates() {
        let mut debt = reference_debt();
        debt.period = InstallmentPeriod::Quarterly;
        debt.total_installments = 4;
        let schedule = schedule_for(&debt);
        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule[0].interest, dec!(300000.00));
        assert_eq!(schedule[3].date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }

    // -----------------------------------------------------------------------
    // 6. Envelope
    // -----------------------------------------------------------------------
    #[test]
    fn test_build_schedule_envelope() {
        let out = build_schedule(&reference_debt()).unwrap();
        assert_eq!(out.result.installments, 12);
        assert_eq!(out.result.installment_amount, dec!(888487.89));
        assert_eq!(
            out.result.payoff_date,
            NaiveDate::from_ymd_opt(2025, 12, 1)
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_build_schedule_warns_on_extra_after_payoff() {
        let debt = reference_debt()
            .with_extra_payment(1, dec!(9_000_000))
            .with_extra_payment(11, dec!(1_000));
        let out = build_schedule(&debt).unwrap();
        assert!(out.result.installments < 11);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_build_schedule_warns_on_final_installment_extra() {
        let out = build_schedule(&reference_debt().with_extra_payment(12, dec!(5_000))).unwrap();
        assert_eq!(out.result.installments, 12);
        assert_eq!(out.result.total_extra_payments, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("after installment 12"));
    }

    #[test]
    fn test_build_schedule_warns_on_capped_extra() {
        let debt = reference_debt()
            .with_extra_payment(2, dec!(30_000_000))
            .with_extra_payment(2, dec!(20_000_000));
        let out = build_schedule(&debt).unwrap();
        assert_eq!(out.result.installments, 2);
        // Both recorded payments are reported as one request
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("50000000"));
    }

    #[test]
    fn test_fully_applied_extras_do_not_warn() {
        let extras = [ExtraPayment::new(3, dec!(2_000_000))];
        let schedule = schedule_for(&reference_debt().with_extra_payment(3, dec!(2_000_000)));
        assert!(unapplied_extra_warnings(&extras, &schedule).is_empty());
        assert!(unapplied_extra_warnings(&extras, &[]).is_empty());
    }

    #[test]
    fn test_build_schedule_records_extra_total_in_assumptions() {
        let debt = reference_debt()
            .with_extra_payment(3, dec!(200_000))
            .with_extra_payment(5, dec!(300_000));
        let out = build_schedule(&debt).unwrap();
        assert_eq!(out.assumptions["recorded_extra_payments"], "500000");
    }

    #[test]
    fn test_build_schedule_rejects_invalid_debt() {
        let mut debt = reference_debt();
        debt.annual_rate = Decimal::ZERO;
        assert!(build_schedule(&debt).is_err());
    }
}

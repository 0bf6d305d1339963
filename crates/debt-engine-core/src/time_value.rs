use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{InstallmentPeriod, Money, Rate};

const PERCENT: Decimal = dec!(100);

/// Periodic rate for an annual nominal rate given in percent.
///
/// `periodic = (annual / 100) / periods_per_year`. No compounding adjustment
/// is applied: 12% a year paid monthly is exactly 1% a month. Callers reject
/// non-positive rates before calling.
pub fn periodic_rate(annual_rate_pct: Decimal, period: InstallmentPeriod) -> Rate {
    annual_rate_pct / PERCENT / Decimal::from(period.periods_per_year())
}

/// Fixed installment that amortizes `balance` over `periods` payments.
///
/// Standard annuity formula `B * r / (1 - (1 + r)^-n)`. A zero rate splits the
/// balance evenly; zero periods means the whole balance is due now. When
/// `(1 + r)^n` overflows the discount factor is treated as zero, which leaves
/// the interest-only payment `B * r`.
pub fn annuity_payment(balance: Money, rate: Rate, periods: u32) -> Money {
    if periods == 0 {
        return balance;
    }
    if rate.is_zero() {
        return balance / Decimal::from(periods);
    }

    let growth = Decimal::ONE + rate;
    let discount = match growth.checked_powu(u64::from(periods)) {
        Some(g) if !g.is_zero() => Decimal::ONE / g,
        _ => Decimal::ZERO,
    };

    let denominator = Decimal::ONE - discount;
    if denominator <= Decimal::ZERO {
        return balance / Decimal::from(periods);
    }
    balance * rate / denominator
}

/// Number of periods a fixed `installment` needs to pay off `balance`,
/// never more than `cap`.
///
/// Walks the balance forward one period at a time rather than using the
/// closed-form logarithm, so the count agrees with how the schedule itself
/// accrues interest. An installment that does not cover the first period's
/// interest can never clear the balance and returns `cap`.
pub fn periods_to_clear(balance: Money, rate: Rate, installment: Money, cap: u32) -> u32 {
    if balance <= Decimal::ZERO {
        return 0;
    }
    if installment <= balance * rate {
        return cap;
    }

    let mut remaining = balance;
    let mut periods = 0;
    while remaining > Decimal::ZERO && periods < cap {
        remaining = remaining + remaining * rate - installment;
        periods += 1;
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_periodic_rate_monthly() {
        assert_eq!(periodic_rate(dec!(12), InstallmentPeriod::Monthly), dec!(0.01));
    }

    #[test]
    fn test_periodic_rate_other_frequencies() {
        assert_eq!(periodic_rate(dec!(12), InstallmentPeriod::Quarterly), dec!(0.03));
        assert_eq!(periodic_rate(dec!(12), InstallmentPeriod::Semiannual), dec!(0.06));
        assert_eq!(periodic_rate(dec!(12), InstallmentPeriod::Annual), dec!(0.12));
    }

    #[test]
    fn test_annuity_payment_reference_loan() {
        // 10M at 1% a month over 12 months
        let pmt = annuity_payment(dec!(10_000_000), dec!(0.01), 12);
        assert_eq!(pmt.round_dp(2), dec!(888487.89));
    }

    #[test]
    fn test_annuity_payment_single_period() {
        // One period: balance plus one period of interest
        let pmt = annuity_payment(dec!(1000), dec!(0.05), 1);
        assert_eq!(pmt.round_dp(2), dec!(1050.00));
    }

    #[test]
    fn test_annuity_payment_zero_rate_and_zero_periods() {
        assert_eq!(annuity_payment(dec!(1200), Decimal::ZERO, 12), dec!(100));
        assert_eq!(annuity_payment(dec!(1200), dec!(0.01), 0), dec!(1200));
    }

    #[test]
    fn test_annuity_payment_overflow_falls_back_to_interest_only() {
        let pmt = annuity_payment(dec!(1000), dec!(1), 400);
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_periods_to_clear_matches_annuity_term() {
        let pmt = annuity_payment(dec!(10_000_000), dec!(0.01), 12);
        assert_eq!(periods_to_clear(dec!(10_000_000), dec!(0.01), pmt, 12), 12);
    }

    #[test]
    fn test_periods_to_clear_smaller_balance() {
        let pmt = annuity_payment(dec!(10_000_000), dec!(0.01), 12);
        let periods = periods_to_clear(dec!(5_000_000), dec!(0.01), pmt, 12);
        assert!(periods < 12);
        assert!(periods >= 5);
    }

    #[test]
    fn test_periods_to_clear_installment_below_interest() {
        assert_eq!(periods_to_clear(dec!(1000), dec!(0.10), dec!(50), 24), 24);
        assert_eq!(periods_to_clear(Decimal::ZERO, dec!(0.10), dec!(50), 24), 0);
    }
}

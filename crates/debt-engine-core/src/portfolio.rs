//! Aggregate view across several debts.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debt::{summarize, Debt, DebtSummary};
use crate::error::DebtEngineError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DebtEngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtOverview {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creditor: Option<String>,
    pub original_amount: Money,
    pub current_balance: Money,
    pub remaining_installments: u32,
    pub monthly_equivalent_payment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub debt_count: usize,
    pub total_original_amount: Money,
    pub total_current_balance: Money,
    pub total_paid: Money,
    pub total_interest_paid: Money,
    pub total_interest_saved: Money,
    /// Combined monthly outflow of debts that still have installments due.
    pub monthly_outflow: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_payoff_date: Option<NaiveDate>,
    pub debts: Vec<DebtOverview>,
}

/// Sum per-debt summaries. Settled debts contribute to the paid totals but
/// not to the outstanding balance or monthly outflow.
pub fn summarize_portfolio(debts: &[Debt]) -> PortfolioSummary {
    let summaries: Vec<(&Debt, DebtSummary)> = debts.iter().map(|d| (d, summarize(d))).collect();

    let mut portfolio = PortfolioSummary {
        debt_count: debts.len(),
        total_original_amount: Decimal::ZERO,
        total_current_balance: Decimal::ZERO,
        total_paid: Decimal::ZERO,
        total_interest_paid: Decimal::ZERO,
        total_interest_saved: Decimal::ZERO,
        monthly_outflow: Decimal::ZERO,
        latest_payoff_date: None,
        debts: Vec::with_capacity(debts.len()),
    };

    for (debt, s) in &summaries {
        let outstanding = s.remaining_installments > 0;
        let balance = if s.settled_early {
            Decimal::ZERO
        } else {
            s.current_balance
        };

        portfolio.total_original_amount += debt.original_amount;
        portfolio.total_current_balance += balance;
        portfolio.total_paid += s.total_paid;
        portfolio.total_interest_paid += s.total_interest_paid;
        portfolio.total_interest_saved += s.interest_saved;
        if outstanding {
            portfolio.monthly_outflow += s.monthly_equivalent_payment;
        }
        portfolio.latest_payoff_date = portfolio.latest_payoff_date.max(s.projected_end_date);

        portfolio.debts.push(DebtOverview {
            name: debt.name.clone(),
            id: debt.id.clone(),
            creditor: debt.creditor.clone(),
            original_amount: debt.original_amount,
            current_balance: balance,
            remaining_installments: s.remaining_installments,
            monthly_equivalent_payment: if outstanding {
                s.monthly_equivalent_payment
            } else {
                Decimal::ZERO
            },
            projected_end_date: s.projected_end_date,
        });
    }

    portfolio
}

/// Validate every debt and build the portfolio overview.
pub fn analyze_portfolio(debts: &[Debt]) -> DebtEngineResult<ComputationOutput<PortfolioSummary>> {
    let start = Instant::now();
    if debts.is_empty() {
        return Err(DebtEngineError::InsufficientData(
            "Portfolio requires at least one debt".into(),
        ));
    }
    for debt in debts {
        debt.validate().map_err(|e| match e {
            DebtEngineError::InvalidInput { field, reason } => DebtEngineError::InvalidInput {
                field: format!("{}.{}", debt.name, field),
                reason,
            },
            other => other,
        })?;
    }

    let summary = summarize_portfolio(debts);
    let warnings: Vec<String> = debts
        .iter()
        .zip(&summary.debts)
        .filter(|(d, o)| d.current_installment > 0 && o.remaining_installments == 0)
        .map(|(d, _)| format!("'{}' is fully repaid", d.name))
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio totals from per-debt summaries",
        &serde_json::json!({
            "debts": debts.len(),
        }),
        warnings,
        elapsed,
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InstallmentPeriod;
    use rust_decimal_macros::dec;

    fn loan(name: &str, amount: Money, installments: u32) -> Debt {
        Debt::new(
            name,
            amount,
            dec!(12),
            installments,
            InstallmentPeriod::Monthly,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_totals_add_up() {
        let debts = vec![
            loan("Truck", dec!(120_000), 24).with_current_installment(6),
            loan("Line of credit", dec!(50_000), 12),
        ];
        let p = summarize_portfolio(&debts);
        let a = summarize(&debts[0]);
        let b = summarize(&debts[1]);

        assert_eq!(p.debt_count, 2);
        assert_eq!(p.total_original_amount, dec!(170_000));
        assert_eq!(p.total_current_balance, a.current_balance + b.current_balance);
        assert_eq!(
            p.monthly_outflow,
            a.monthly_equivalent_payment + b.monthly_equivalent_payment
        );
        assert_eq!(p.latest_payoff_date, NaiveDate::from_ymd_opt(2026, 12, 1));
    }

    #[test]
    fn test_repaid_debt_adds_no_outflow() {
        let debts = vec![
            loan("Done", dec!(10_000), 12).with_current_installment(12),
            loan("Open", dec!(10_000), 12),
        ];
        let p = summarize_portfolio(&debts);
        assert_eq!(p.debts[0].monthly_equivalent_payment, Decimal::ZERO);
        assert_eq!(p.monthly_outflow, p.debts[1].monthly_equivalent_payment);
        assert_eq!(p.total_current_balance, dec!(10_000));
    }

    #[test]
    fn test_settled_early_counts_zero_balance() {
        let debts = vec![loan("Paid early", dec!(10_000), 12)
            .with_extra_payment(2, dec!(9_000))
            .with_current_installment(12)];
        let p = summarize_portfolio(&debts);
        assert_eq!(p.total_current_balance, Decimal::ZERO);
    }

    #[test]
    fn test_analyze_portfolio_prefixes_invalid_field() {
        let mut bad = loan("Broken", dec!(10_000), 12);
        bad.total_installments = 0;
        match analyze_portfolio(&[bad]) {
            Err(DebtEngineError::InvalidInput { field, .. }) => {
                assert_eq!(field, "Broken.total_installments")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        assert!(analyze_portfolio(&[]).is_err());
    }
}

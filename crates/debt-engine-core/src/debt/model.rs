use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DebtEngineError;
use crate::time_value::periodic_rate;
use crate::types::{InstallmentPeriod, Money, Rate};
use crate::DebtEngineResult;

// ---------------------------------------------------------------------------
// Extra payments
// ---------------------------------------------------------------------------

/// How the schedule absorbs an extra payment when the installment is
/// recalculated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPaymentMode {
    /// Re-derive the installment over the number of periods the current
    /// installment needs to clear the new balance. The schedule shortens.
    #[default]
    ReduceTerm,
    /// Re-derive the installment over the nominal remaining periods. The
    /// schedule keeps its length and later installments shrink.
    ReduceInstallment,
}

/// An unscheduled principal payment made after installment `installment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPayment {
    /// 1-based installment index the amount is applied after.
    pub installment: u32,
    pub amount: Money,
    /// Informational only; never used in the calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ExtraPayment {
    pub fn new(installment: u32, amount: Money) -> Self {
        ExtraPayment {
            installment,
            amount,
            date: None,
        }
    }

    pub fn validate(&self) -> DebtEngineResult<()> {
        if self.installment == 0 {
            return Err(DebtEngineError::invalid(
                "extra_payments.installment",
                "Extra payments are applied after an installment; index must be at least 1",
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(DebtEngineError::invalid(
                "extra_payments.amount",
                format!(
                    "Extra payment after installment {} must be positive",
                    self.installment
                ),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Debt
// ---------------------------------------------------------------------------

/// A loan and its repayment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditor: Option<String>,
    /// Original principal.
    pub original_amount: Money,
    /// Annual nominal rate in percent (12 = 12% a year).
    pub annual_rate: Decimal,
    pub total_installments: u32,
    #[serde(default)]
    pub period: InstallmentPeriod,
    /// Date of installment #1.
    pub start_date: NaiveDate,
    /// Installments already paid.
    #[serde(default)]
    pub current_installment: u32,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
    #[serde(default)]
    pub extra_payment_mode: ExtraPaymentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Link to an external cash-flow record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_flow_id: Option<String>,
}

impl Debt {
    pub fn new(
        name: impl Into<String>,
        original_amount: Money,
        annual_rate: Decimal,
        total_installments: u32,
        period: InstallmentPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Debt {
            id: None,
            name: name.into(),
            creditor: None,
            original_amount,
            annual_rate,
            total_installments,
            period,
            start_date,
            current_installment: 0,
            extra_payments: Vec::new(),
            extra_payment_mode: ExtraPaymentMode::default(),
            notes: None,
            cash_flow_id: None,
        }
    }

    pub fn with_current_installment(mut self, paid: u32) -> Self {
        self.current_installment = paid;
        self
    }

    pub fn with_extra_payment(mut self, installment: u32, amount: Money) -> Self {
        self.extra_payments.push(ExtraPayment::new(installment, amount));
        self
    }

    pub fn with_mode(mut self, mode: ExtraPaymentMode) -> Self {
        self.extra_payment_mode = mode;
        self
    }

    /// Periodic rate matching the installment frequency.
    pub fn periodic_rate(&self) -> Rate {
        periodic_rate(self.annual_rate, self.period)
    }

    /// Copy of this debt with the extra-payment history cleared.
    pub fn without_extra_payments(&self) -> Debt {
        Debt {
            extra_payments: Vec::new(),
            ..self.clone()
        }
    }

    /// Sum of all recorded extra payments.
    pub fn total_extra_payments(&self) -> Money {
        self.extra_payments.iter().map(|e| e.amount).sum()
    }

    /// Reject terms the schedule cannot be computed from.
    pub fn validate(&self) -> DebtEngineResult<()> {
        if self.name.trim().is_empty() {
            return Err(DebtEngineError::invalid("name", "Debt name cannot be empty"));
        }
        if self.original_amount <= Decimal::ZERO {
            return Err(DebtEngineError::invalid(
                "original_amount",
                "Original amount must be positive",
            ));
        }
        if self.annual_rate <= Decimal::ZERO {
            return Err(DebtEngineError::invalid(
                "annual_rate",
                "Annual rate must be positive",
            ));
        }
        if self.total_installments == 0 {
            return Err(DebtEngineError::invalid(
                "total_installments",
                "Total installments must be at least 1",
            ));
        }
        if self.current_installment > self.total_installments {
            return Err(DebtEngineError::invalid(
                "current_installment",
                format!(
                    "Current installment {} exceeds total installments {}",
                    self.current_installment, self.total_installments
                ),
            ));
        }
        for extra in &self.extra_payments {
            extra.validate()?;
            if extra.installment > self.total_installments {
                return Err(DebtEngineError::invalid(
                    "extra_payments.installment",
                    format!(
                        "Extra payment after installment {} is beyond the {} scheduled installments",
                        extra.installment, self.total_installments
                    ),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// Partially filled debt terms, e.g. from a form still being edited.
///
/// Carries no identity and is never persisted. `preview` degrades to an empty
/// schedule until the terms are complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub creditor: Option<String>,
    #[serde(default)]
    pub original_amount: Option<Money>,
    #[serde(default)]
    pub annual_rate: Option<Decimal>,
    #[serde(default)]
    pub total_installments: Option<u32>,
    #[serde(default)]
    pub period: Option<InstallmentPeriod>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub current_installment: Option<u32>,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
    #[serde(default)]
    pub extra_payment_mode: ExtraPaymentMode,
}

impl DebtDraft {
    /// Validated debt built from the draft.
    pub fn build(&self) -> DebtEngineResult<Debt> {
        let debt = Debt {
            id: None,
            name: self.name.clone().unwrap_or_default(),
            creditor: self.creditor.clone(),
            original_amount: self
                .original_amount
                .ok_or_else(|| DebtEngineError::invalid("original_amount", "Required"))?,
            annual_rate: self
                .annual_rate
                .ok_or_else(|| DebtEngineError::invalid("annual_rate", "Required"))?,
            total_installments: self
                .total_installments
                .ok_or_else(|| DebtEngineError::invalid("total_installments", "Required"))?,
            period: self.period.unwrap_or_default(),
            start_date: self
                .start_date
                .ok_or_else(|| DebtEngineError::invalid("start_date", "Required"))?,
            current_installment: self.current_installment.unwrap_or(0),
            extra_payments: self.extra_payments.clone(),
            extra_payment_mode: self.extra_payment_mode,
            notes: None,
            cash_flow_id: None,
        };
        debt.validate()?;
        Ok(debt)
    }

    /// Schedule for the draft, or an empty one while terms are incomplete.
    ///
    /// The name is not needed to preview a schedule.
    pub fn preview(&self) -> Vec<super::schedule::AmortizationEntry> {
        let mut draft = self.clone();
        if draft.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            draft.name = Some("preview".into());
        }
        match draft.build() {
            Ok(debt) => super::schedule::schedule_for(&debt),
            Err(_) => Vec::new(),
        }
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DebtEngineError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Periodic rates expressed as decimals (0.01 = 1%). Annual nominal rates on
/// a `Debt` are the one exception and are stored as percentages.
pub type Rate = Decimal;

/// Length of one installment period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentPeriod {
    #[default]
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl InstallmentPeriod {
    /// Calendar months covered by one installment.
    pub fn months(self) -> u32 {
        match self {
            InstallmentPeriod::Monthly => 1,
            InstallmentPeriod::Quarterly => 3,
            InstallmentPeriod::Semiannual => 6,
            InstallmentPeriod::Annual => 12,
        }
    }

    /// Installments per year (12 / months).
    pub fn periods_per_year(self) -> u32 {
        12 / self.months()
    }
}

impl fmt::Display for InstallmentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallmentPeriod::Monthly => "monthly",
            InstallmentPeriod::Quarterly => "quarterly",
            InstallmentPeriod::Semiannual => "semiannual",
            InstallmentPeriod::Annual => "annual",
        };
        f.write_str(label)
    }
}

impl FromStr for InstallmentPeriod {
    type Err = DebtEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(InstallmentPeriod::Monthly),
            "quarterly" | "quarter" => Ok(InstallmentPeriod::Quarterly),
            "semiannual" | "semi-annual" | "semiannually" => Ok(InstallmentPeriod::Semiannual),
            "annual" | "annually" | "yearly" => Ok(InstallmentPeriod::Annual),
            other => Err(DebtEngineError::InvalidInput {
                field: "period".into(),
                reason: format!(
                    "Unknown installment period '{other}'. Use: monthly, quarterly, semiannual, annual"
                ),
            }),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

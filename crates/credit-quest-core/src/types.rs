use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Annual interest rates expressed as percentages (5.0 = 5% p.a.).
pub type RatePercent = Decimal;

/// Fixed-rate installment loan as entered by the user.
///
/// Replaced wholesale on re-setup; never edited field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanProfile {
    /// Amount borrowed.
    #[serde(with = "rust_decimal::serde::float")]
    pub principal: Money,
    /// Nominal annual interest rate in percent.
    #[serde(with = "rust_decimal::serde::float")]
    pub interest_rate: RatePercent,
    /// Fixed installment paid every month.
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_payment: Money,
    /// Date of the first installment. The day anchors every later installment.
    #[serde(with = "dates::calendar_date")]
    pub start_date: NaiveDate,
}

/// An unscheduled repayment that goes 100% to principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub id: String,
    #[serde(with = "dates::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Money,
}

impl ExtraPayment {
    pub fn new(id: impl Into<String>, date: DateTime<Utc>, amount: Money) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
        }
    }

    /// Calendar year the payment counts towards.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// `(year, month)` used to attribute the payment to a schedule month.
    pub fn month_key(&self) -> (i32, u32) {
        dates::month_key(self.date.date_naive())
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

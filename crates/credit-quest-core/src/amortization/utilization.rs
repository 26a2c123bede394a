//! Calendar-year special-repayment allowance.
//!
//! Fixed-rate loans commonly allow unscheduled repayments of up to 5% of the
//! original principal per calendar year. Usage is measured on the raw extra
//! payments as entered, not on what the schedule managed to apply: money
//! committed counts even when the loan was already settled.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CreditQuestError;
use crate::types::{ExtraPayment, Money, Rate};
use crate::CreditQuestResult;

/// Share of the initial principal that may be repaid early each year.
pub const ANNUAL_SPECIAL_REPAYMENT_CAP: Rate = dec!(0.05);

/// Special-repayment usage for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyUtilization {
    pub year: i32,
    /// Sum of extra payments dated in `year`.
    pub paid: Money,
    /// Annual allowance.
    pub max: Money,
    /// Allowance still open this year, never negative.
    pub remaining_allowance: Money,
    /// 0-100.
    pub percentage: Decimal,
    pub is_maxed: bool,
}

/// Request shape for callers that send one JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationInput {
    pub year: i32,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
    pub initial_principal: Money,
}

/// Compute the allowance usage for `year`.
pub fn yearly_utilization(
    year: i32,
    extra_payments: &[ExtraPayment],
    initial_principal: Money,
) -> CreditQuestResult<YearlyUtilization> {
    if initial_principal <= Decimal::ZERO {
        return Err(CreditQuestError::InvalidInput {
            field: "initial_principal".into(),
            reason: "Initial principal must be positive to derive the annual allowance".into(),
        });
    }

    let max = initial_principal * ANNUAL_SPECIAL_REPAYMENT_CAP;
    let paid: Money = extra_payments
        .iter()
        .filter(|p| p.year() == year)
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.amount));

    // A principal too small to yield a representable allowance reads as used up.
    let percentage = paid
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or(dec!(100))
        .clamp(Decimal::ZERO, dec!(100));

    Ok(YearlyUtilization {
        year,
        paid,
        max,
        remaining_allowance: max.saturating_sub(paid).max(Decimal::ZERO),
        percentage,
        is_maxed: paid >= max,
    })
}

//! Progress statistics over a generated schedule.
//!
//! "Paid" for a regular installment is whatever the user has acknowledged in
//! the checked-id set, independent of its date: a future installment can be
//! ticked off early and a past one can stay open. Extra payments always count
//! as settled.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use super::schedule::{run_for_profile, PaymentEvent, PaymentKind};
use super::utilization::{yearly_utilization, YearlyUtilization};
use super::validation;
use crate::dates;
use crate::error::CreditQuestError;
use crate::types::{with_metadata, ComputationOutput, ExtraPayment, LoanProfile, Money};
use crate::CreditQuestResult;

/// Progress snapshot for the loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanStats {
    /// Principal repaid through extras and acknowledged installments.
    pub paid_principal: Money,
    pub remaining_principal: Money,
    /// 0-100.
    pub progress_percent: Decimal,
    /// Date of the last scheduled event.
    pub projected_end_date: NaiveDate,
    /// Next multiple of ten the progress bar is heading for.
    pub next_milestone_percent: Decimal,
    /// Interest covered by acknowledged installments.
    pub paid_interest: Money,
    pub checked_regular_count: u32,
    pub regular_payment_count: u32,
    pub extra_payment_count: u32,
}

/// Schedule divided at the first day of the current month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSplit {
    /// Events dated before the current month.
    pub archive: Vec<PaymentEvent>,
    /// Events in the current month or later.
    pub active: Vec<PaymentEvent>,
}

/// Compute progress statistics; an empty schedule ends today.
pub fn compute_stats(
    initial_principal: Money,
    schedule: &[PaymentEvent],
    checked_ids: &HashSet<String>,
) -> CreditQuestResult<LoanStats> {
    compute_stats_as_of(initial_principal, schedule, checked_ids, Utc::now().date_naive())
}

/// [`compute_stats`] with an explicit "today" for empty schedules.
pub fn compute_stats_as_of(
    initial_principal: Money,
    schedule: &[PaymentEvent],
    checked_ids: &HashSet<String>,
    today: NaiveDate,
) -> CreditQuestResult<LoanStats> {
    if initial_principal <= Decimal::ZERO {
        return Err(CreditQuestError::InvalidInput {
            field: "initial_principal".into(),
            reason: "Initial principal must be positive to measure progress".into(),
        });
    }

    let mut paid_principal = Decimal::ZERO;
    let mut paid_interest = Decimal::ZERO;
    let mut checked_regular_count = 0u32;
    let mut regular_payment_count = 0u32;
    let mut extra_payment_count = 0u32;

    for event in schedule {
        match event.kind {
            PaymentKind::Regular => {
                regular_payment_count += 1;
                if checked_ids.contains(&event.id) {
                    checked_regular_count += 1;
                    paid_principal = paid_principal.saturating_add(event.principal_part);
                    paid_interest = paid_interest.saturating_add(event.interest_part);
                }
            }
            PaymentKind::Extra => {
                extra_payment_count += 1;
                paid_principal = paid_principal.saturating_add(event.principal_part);
            }
        }
    }

    // Over-acknowledgment or rounding drift must not push progress past 100%,
    // and negative principal parts of a non-amortizing schedule not below 0%.
    paid_principal = paid_principal.clamp(Decimal::ZERO, initial_principal);

    let progress_percent = paid_principal / initial_principal * dec!(100);
    let projected_end_date = schedule.last().map(|e| e.date).unwrap_or(today);

    Ok(LoanStats {
        paid_principal,
        remaining_principal: initial_principal - paid_principal,
        progress_percent,
        projected_end_date,
        next_milestone_percent: next_milestone(progress_percent),
        paid_interest,
        checked_regular_count,
        regular_payment_count,
        extra_payment_count,
    })
}

/// Next ten-percent step strictly above `progress_percent`, capped at 100.
pub fn next_milestone(progress_percent: Decimal) -> Decimal {
    let step = ((progress_percent + dec!(0.1)) / dec!(10)).ceil() * dec!(10);
    step.min(dec!(100))
}

/// Split events into archive (before the current month) and active.
pub fn split_schedule(schedule: &[PaymentEvent], today: NaiveDate) -> ScheduleSplit {
    let cutoff = dates::first_of_month(today);
    let (archive, active): (Vec<_>, Vec<_>) =
        schedule.iter().cloned().partition(|e| e.date < cutoff);
    ScheduleSplit { archive, active }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Everything stored for a loan, plus the reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInput {
    pub profile: LoanProfile,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
    #[serde(default)]
    pub checked_ids: Vec<String>,
    /// Reference date; defaults to today (UTC).
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Year for the utilization figure; defaults to the year of `as_of`.
    #[serde(default)]
    pub year: Option<i32>,
}

/// Progress statistics plus the special-repayment utilization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressOutput {
    pub stats: LoanStats,
    pub utilization: YearlyUtilization,
}

/// Generate the schedule and derive stats and utilization in one call.
pub fn analyze_progress(
    input: &ProgressInput,
) -> CreditQuestResult<ComputationOutput<ProgressOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::validate_profile(&input.profile)?;
    validation::validate_extra_payments(&input.extra_payments)?;

    let today = input.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let year = input.year.unwrap_or_else(|| today.year());

    let schedule = run_for_profile(&input.profile, &input.extra_payments);
    let regular_ids: HashSet<&str> = schedule
        .iter()
        .filter(|e| e.is_regular())
        .map(|e| e.id.as_str())
        .collect();

    let stale: Vec<&str> = input
        .checked_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !regular_ids.contains(id))
        .collect();
    if !stale.is_empty() {
        warnings.push(format!(
            "{} checked id(s) do not match any installment and were ignored: {}",
            stale.len(),
            stale.join(", ")
        ));
    }

    let checked: HashSet<String> = input.checked_ids.iter().cloned().collect();
    let stats = compute_stats_as_of(input.profile.principal, &schedule, &checked, today)?;
    let utilization = yearly_utilization(year, &input.extra_payments, input.profile.principal)?;

    if utilization.is_maxed {
        warnings.push(format!(
            "Special repayments in {} reached the annual limit of {}",
            year,
            utilization.max.round_dp(2)
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Acknowledged installments plus extra repayments against initial principal",
        input,
        warnings,
        elapsed,
        ProgressOutput { stats, utilization },
    ))
}

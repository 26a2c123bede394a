//! Monthly amortization schedule with interleaved extra repayments.
//!
//! Regular installments and ad-hoc extra payments are merged into one
//! chronological ledger. Interest is recomputed every month on the balance
//! left after that month's extra payments, so an extra payment in month M
//! lowers the interest charged in month M+1. All math in `rust_decimal::Decimal`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::validation;
use crate::dates;
use crate::types::{with_metadata, ComputationOutput, ExtraPayment, LoanProfile, Money, RatePercent};
use crate::CreditQuestResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Balance at or below which the loan is considered fully paid.
pub const BALANCE_EPSILON: Decimal = dec!(0.01);

/// Hard ceiling on schedule length: 100 years of monthly installments.
pub const MAX_SCHEDULE_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Schedule types
// ---------------------------------------------------------------------------

/// Whether an event is a scheduled installment or an extra repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Regular,
    Extra,
}

/// One entry of the amortization ledger. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Zero-based index of the schedule month this event belongs to.
    pub sequence: u32,
    /// `m-{year}-{month0}` for installments, the caller's id for extras.
    pub id: String,
    pub date: NaiveDate,
    pub kind: PaymentKind,
    /// Total cash paid.
    pub payment: Money,
    pub interest_part: Money,
    pub principal_part: Money,
    /// Principal balance after this event, floored at zero.
    pub remaining_after: Money,
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl PaymentEvent {
    pub fn is_regular(&self) -> bool {
        self.kind == PaymentKind::Regular
    }

    pub fn is_extra(&self) -> bool {
        self.kind == PaymentKind::Extra
    }
}

/// Id of the regular installment due in `(year, month)`.
///
/// The month index in the id is zero-based so that checked-id ledgers
/// written by the web frontend stay valid.
pub fn regular_payment_id(year: i32, month: u32) -> String {
    format!("m-{}-{}", year, month.saturating_sub(1))
}

// ---------------------------------------------------------------------------
// Envelope input / output
// ---------------------------------------------------------------------------

/// Loan profile plus the recorded extra payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub profile: LoanProfile,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
}

/// Schedule plus summary totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub events: Vec<PaymentEvent>,
    pub regular_payment_count: u32,
    pub extra_payment_count: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    /// Principal repaid through extra payments.
    pub total_extra: Money,
    pub total_paid: Money,
    pub final_balance: Money,
    /// Date of the last event, if any.
    pub payoff_date: Option<NaiveDate>,
    pub paid_off: bool,
    pub ceiling_reached: bool,
    /// Extra payments never consumed, usually because the loan was settled first.
    pub unapplied_extra_payment_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the merged schedule of regular and extra payments.
///
/// Never fails. Inputs that cannot amortize run into the
/// [`MAX_SCHEDULE_MONTHS`] ceiling, or stop early once the growing balance
/// overflows `Decimal`, and yield an incomplete schedule; use
/// [`validation::validate_profile`] before calling to reject them.
pub fn generate_schedule(
    principal: Money,
    annual_rate_percent: RatePercent,
    monthly_payment: Money,
    start_date: NaiveDate,
    extra_payments: &[ExtraPayment],
) -> Vec<PaymentEvent> {
    run_schedule(
        principal,
        annual_rate_percent,
        monthly_payment,
        start_date,
        extra_payments,
    )
    .events
}

/// Validate the profile and extras, generate the schedule and summarise it.
pub fn build_schedule(
    input: &ScheduleInput,
) -> CreditQuestResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validation::validate_profile(&input.profile)?;
    validation::validate_extra_payments(&input.extra_payments)?;

    let profile = &input.profile;
    let run = run_schedule(
        profile.principal,
        profile.interest_rate,
        profile.monthly_payment,
        profile.start_date,
        &input.extra_payments,
    );

    if run.ceiling_reached {
        warnings.push(format!(
            "Schedule stopped at the {MAX_SCHEDULE_MONTHS}-month ceiling with {} still outstanding",
            run.final_balance.round_dp(2)
        ));
    }
    if !run.unapplied.is_empty() {
        warnings.push(format!(
            "{} extra payment(s) not applied before the schedule ended: {}",
            run.unapplied.len(),
            run.unapplied.join(", ")
        ));
    }

    let output = summarise(run);
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly annuity amortization with merged extra repayments",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Schedule for a stored profile and its extras.
pub(crate) fn run_for_profile(
    profile: &LoanProfile,
    extra_payments: &[ExtraPayment],
) -> Vec<PaymentEvent> {
    generate_schedule(
        profile.principal,
        profile.interest_rate,
        profile.monthly_payment,
        profile.start_date,
        extra_payments,
    )
}

struct ScheduleRun {
    events: Vec<PaymentEvent>,
    unapplied: Vec<String>,
    final_balance: Money,
    ceiling_reached: bool,
}

fn run_schedule(
    principal: Money,
    annual_rate_percent: RatePercent,
    monthly_payment: Money,
    start_date: NaiveDate,
    extra_payments: &[ExtraPayment],
) -> ScheduleRun {
    let monthly_rate = annual_rate_percent / dec!(100) / dec!(12);

    // Stable sort: extras on the same instant keep their recorded order.
    let mut extras: Vec<&ExtraPayment> = extra_payments.iter().collect();
    extras.sort_by_key(|e| e.date);
    let mut cursor = 0usize;

    let mut remaining = principal;
    let mut events = Vec::new();
    let mut sequence = 0u32;
    let mut overflowed = false;

    while remaining > BALANCE_EPSILON && sequence < MAX_SCHEDULE_MONTHS {
        let Some(current) = dates::add_months(start_date, sequence) else {
            tracing::warn!(%start_date, sequence, "installment date out of calendar range");
            break;
        };
        let (year, month) = dates::month_key(current);

        let Some(step) = installment(remaining, monthly_rate, monthly_payment) else {
            tracing::warn!(sequence, remaining = %remaining, "balance left the decimal range");
            overflowed = true;
            break;
        };
        remaining = step.remaining_after;

        events.push(PaymentEvent {
            sequence,
            id: regular_payment_id(year, month),
            date: current,
            kind: PaymentKind::Regular,
            payment: step.payment,
            interest_part: step.interest,
            principal_part: step.principal,
            remaining_after: remaining.max(Decimal::ZERO),
            year,
            month,
        });

        // Drain every extra dated in or before this month.
        while let Some(extra) = extras.get(cursor) {
            if extra.month_key() > (year, month) || remaining < BALANCE_EPSILON {
                break;
            }
            let amount = extra.amount.min(remaining);
            remaining -= amount;

            let date = extra.date.date_naive();
            let (extra_year, extra_month) = dates::month_key(date);
            events.push(PaymentEvent {
                sequence,
                id: extra.id.clone(),
                date,
                kind: PaymentKind::Extra,
                payment: amount,
                interest_part: Decimal::ZERO,
                principal_part: amount,
                remaining_after: remaining.max(Decimal::ZERO),
                year: extra_year,
                month: extra_month,
            });
            cursor += 1;
        }

        sequence += 1;
    }

    let paid_off = remaining <= BALANCE_EPSILON;
    let ceiling_reached = !paid_off && (overflowed || sequence >= MAX_SCHEDULE_MONTHS);
    let unapplied: Vec<String> = extras[cursor..].iter().map(|e| e.id.clone()).collect();

    if ceiling_reached {
        tracing::warn!(
            months = sequence,
            remaining = %remaining,
            "schedule hit the month ceiling without paying off"
        );
    }
    if !unapplied.is_empty() {
        tracing::warn!(count = unapplied.len(), "extra payments left unapplied");
    }
    tracing::debug!(events = events.len(), months = sequence, paid_off, "schedule generated");

    ScheduleRun {
        events,
        unapplied,
        final_balance: remaining.max(Decimal::ZERO),
        ceiling_reached,
    }
}

struct Installment {
    interest: Money,
    principal: Money,
    payment: Money,
    remaining_after: Money,
}

/// Split of one regular installment, or `None` once the balance no longer
/// fits in a `Decimal`.
///
/// A payment that would leave at most [`BALANCE_EPSILON`] outstanding
/// settles the whole balance, so the ledger closes at exactly zero.
fn installment(
    remaining: Money,
    monthly_rate: Decimal,
    monthly_payment: Money,
) -> Option<Installment> {
    let interest = remaining.checked_mul(monthly_rate)?;
    let mut principal = monthly_payment.checked_sub(interest)?;
    if remaining.checked_sub(principal)? <= BALANCE_EPSILON {
        principal = remaining;
    }
    Some(Installment {
        interest,
        principal,
        payment: principal.checked_add(interest)?,
        remaining_after: remaining.checked_sub(principal)?,
    })
}

fn summarise(run: ScheduleRun) -> ScheduleOutput {
    let mut regular_payment_count = 0u32;
    let mut extra_payment_count = 0u32;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_extra = Decimal::ZERO;

    for event in &run.events {
        total_interest = total_interest.saturating_add(event.interest_part);
        total_principal = total_principal.saturating_add(event.principal_part);
        match event.kind {
            PaymentKind::Regular => regular_payment_count += 1,
            PaymentKind::Extra => {
                extra_payment_count += 1;
                total_extra = total_extra.saturating_add(event.principal_part);
            }
        }
    }

    let payoff_date = run.events.last().map(|e| e.date);
    let paid_off = run.final_balance <= BALANCE_EPSILON;

    ScheduleOutput {
        events: run.events,
        regular_payment_count,
        extra_payment_count,
        total_interest,
        total_principal,
        total_extra,
        total_paid: total_interest.saturating_add(total_principal),
        final_balance: run.final_balance,
        payoff_date,
        paid_off,
        ceiling_reached: run.ceiling_reached,
        unapplied_extra_payment_ids: run.unapplied,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

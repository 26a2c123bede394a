use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use credit_quest_core::amortization::validation;
use credit_quest_core::ledger::LedgerStore;
use credit_quest_core::{dates, LoanProfile};

use crate::input;

/// Arguments for configuring the loan
#[derive(Args)]
pub struct SetupArgs {
    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 5.0 for 5%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Fixed monthly installment
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,

    /// Date of the first installment (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Path to JSON or YAML profile (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_setup(args: SetupArgs, store: &dyn LedgerStore) -> Result<Value, Box<dyn std::error::Error>> {
    let from_flags = args.principal.is_some()
        || args.interest_rate.is_some()
        || args.monthly_payment.is_some();

    let profile: LoanProfile = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if from_flags {
        LoanProfile {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            interest_rate: args
                .interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            monthly_payment: args
                .monthly_payment
                .ok_or("--monthly-payment is required (or provide --input)")?,
            start_date: match args.start_date {
                Some(ref raw) => dates::parse_calendar_date(raw)?,
                None => today(),
            },
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--principal/--interest-rate/--monthly-payment, --input <file> or stdin required for setup".into());
    };

    let mut doc = store.load()?;
    doc.set_profile(profile.clone())?;
    store.save(&doc)?;

    let minimum = validation::first_month_interest(profile.principal, profile.interest_rate)?;
    Ok(json!({
        "profile": profile,
        "minimum_monthly_payment": minimum.round_dp(2),
        "checked_ids_kept": doc.checked_ids.len(),
        "extra_payments_kept": doc.extra_payments.len(),
    }))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_quest_core::ledger::MemoryStore;

    fn args(payment: &str) -> SetupArgs {
        SetupArgs {
            principal: Some(Decimal::from(10000)),
            interest_rate: Some(Decimal::from(5)),
            monthly_payment: Some(payment.parse().unwrap()),
            start_date: Some("2024-01-01".into()),
            input: None,
        }
    }

    #[test]
    fn test_setup_from_flags_saves_profile() {
        let store = MemoryStore::default();
        let out = run_setup(args("200"), &store).unwrap();
        assert_eq!(out["profile"]["startDate"], "2024-01-01");
        assert_eq!(out["minimum_monthly_payment"], "41.67");
        assert!(store.load().unwrap().is_configured());
    }

    #[test]
    fn test_setup_rejects_low_payment() {
        let store = MemoryStore::default();
        let err = run_setup(args("41"), &store).unwrap_err();
        assert!(err.to_string().contains("does not cover"));
        assert!(!store.load().unwrap().is_configured());
    }
}

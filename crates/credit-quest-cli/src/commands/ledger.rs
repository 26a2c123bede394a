use chrono::Utc;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use credit_quest_core::amortization::utilization::yearly_utilization;
use credit_quest_core::dates;
use credit_quest_core::ledger::LedgerStore;
use credit_quest_core::ExtraPayment;

/// Arguments for acknowledging an installment
#[derive(Args)]
pub struct CheckArgs {
    /// Installment id, e.g. m-2024-0 for January 2024
    pub id: String,
}

#[derive(Subcommand)]
pub enum ExtraCommand {
    /// Record a special repayment
    Add(ExtraAddArgs),
    /// List recorded special repayments in date order
    List,
}

/// Arguments for recording a special repayment
#[derive(Args)]
pub struct ExtraAddArgs {
    /// Amount paid towards principal
    #[arg(long)]
    pub amount: Decimal,

    /// Payment date (RFC 3339 or YYYY-MM-DD, defaults to now)
    #[arg(long)]
    pub date: Option<String>,

    /// Unique id (defaults to extra-<unix millis>)
    #[arg(long)]
    pub id: Option<String>,
}

/// Arguments for wiping the ledger
#[derive(Args)]
pub struct ResetArgs {
    /// Confirm deleting the profile and all progress
    #[arg(long)]
    pub yes: bool,
}

pub fn run_check(args: CheckArgs, store: &dyn LedgerStore) -> Result<Value, Box<dyn std::error::Error>> {
    let mut doc = store.load()?;
    let changed = doc.check(&args.id)?;
    if changed {
        store.save(&doc)?;
    }
    Ok(json!({ "id": args.id, "checked": true, "changed": changed }))
}

pub fn run_uncheck(args: CheckArgs, store: &dyn LedgerStore) -> Result<Value, Box<dyn std::error::Error>> {
    let mut doc = store.load()?;
    let changed = doc.uncheck(&args.id);
    if changed {
        store.save(&doc)?;
    }
    Ok(json!({ "id": args.id, "checked": false, "changed": changed }))
}

pub fn run_extra(command: ExtraCommand, store: &dyn LedgerStore) -> Result<Value, Box<dyn std::error::Error>> {
    match command {
        ExtraCommand::Add(args) => run_extra_add(args, store),
        ExtraCommand::List => {
            let doc = store.load()?;
            Ok(serde_json::to_value(doc.sorted_extra_payments())?)
        }
    }
}

fn run_extra_add(args: ExtraAddArgs, store: &dyn LedgerStore) -> Result<Value, Box<dyn std::error::Error>> {
    let now = Utc::now();
    let date = match args.date {
        Some(ref raw) => dates::parse_timestamp(raw)?,
        None => now,
    };
    let id = args
        .id
        .unwrap_or_else(|| format!("extra-{}", now.timestamp_millis()));
    let extra = ExtraPayment::new(id, date, args.amount);

    let mut doc = store.load()?;
    let principal = doc.require_profile()?.principal;
    doc.add_extra_payment(extra.clone())?;
    store.save(&doc)?;

    let utilization = yearly_utilization(extra.year(), &doc.extra_payments, principal)?;
    let mut warnings = Vec::new();
    if utilization.paid > utilization.max {
        warnings.push(format!(
            "Special repayments in {} now exceed the annual limit of {} by {}",
            utilization.year,
            utilization.max.round_dp(2),
            (utilization.paid - utilization.max).round_dp(2)
        ));
    }

    Ok(json!({
        "result": { "extra_payment": extra, "utilization": utilization },
        "warnings": warnings,
    }))
}

pub fn run_reset(args: ResetArgs, store: &dyn LedgerStore) -> Result<Value, Box<dyn std::error::Error>> {
    if !args.yes {
        return Err("reset deletes the profile and all progress; pass --yes to confirm".into());
    }
    let mut doc = store.load()?;
    doc.reset();
    store.save(&doc)?;
    tracing::info!("ledger reset");
    Ok(json!({ "reset": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use credit_quest_core::ledger::{LedgerDocument, MemoryStore};
    use credit_quest_core::LoanProfile;

    fn store() -> MemoryStore {
        let mut doc = LedgerDocument::default();
        doc.set_profile(LoanProfile {
            principal: Decimal::from(10000),
            interest_rate: Decimal::from(5),
            monthly_payment: Decimal::from(200),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })
        .unwrap();
        MemoryStore::new(doc)
    }

    fn add(amount: i64, id: &str) -> ExtraAddArgs {
        ExtraAddArgs {
            amount: Decimal::from(amount),
            date: Some("2024-05-02".into()),
            id: Some(id.into()),
        }
    }

    #[test]
    fn test_check_then_uncheck_persists() {
        let store = store();
        let out = run_check(CheckArgs { id: "m-2024-2".into() }, &store).unwrap();
        assert_eq!(out["changed"], true);
        assert!(store.load().unwrap().is_checked("m-2024-2"));

        let out = run_uncheck(CheckArgs { id: "m-2024-2".into() }, &store).unwrap();
        assert_eq!(out["changed"], true);
        assert!(!store.load().unwrap().is_checked("m-2024-2"));
    }

    #[test]
    fn test_check_unknown_id_fails() {
        let store = store();
        assert!(run_check(CheckArgs { id: "m-1990-0".into() }, &store).is_err());
    }

    #[test]
    fn test_extra_add_warns_over_limit() {
        let store = store();
        let out = run_extra_add(add(300, "a"), &store).unwrap();
        assert!(out["warnings"].as_array().unwrap().is_empty());

        let out = run_extra_add(add(300, "b"), &store).unwrap();
        assert_eq!(out["result"]["utilization"]["is_maxed"], true);
        assert_eq!(out["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(store.load().unwrap().extra_payments.len(), 2);
    }

    #[test]
    fn test_extra_add_duplicate_id_fails() {
        let store = store();
        run_extra_add(add(100, "dup"), &store).unwrap();
        assert!(run_extra_add(add(100, "dup"), &store).is_err());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let store = store();
        assert!(run_reset(ResetArgs { yes: false }, &store).is_err());
        assert!(store.load().unwrap().is_configured());

        run_reset(ResetArgs { yes: true }, &store).unwrap();
        assert!(!store.load().unwrap().is_configured());
    }
}

use chrono::{Datelike, NaiveDate};
use clap::{Args, ValueEnum};
use serde_json::Value;

use credit_quest_core::amortization::schedule::build_schedule;
use credit_quest_core::amortization::stats::{analyze_progress, split_schedule};
use credit_quest_core::amortization::utilization::yearly_utilization;
use credit_quest_core::dates;
use credit_quest_core::ledger::LedgerStore;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScheduleView {
    /// Full schedule with summary totals
    All,
    /// Current month onwards
    Active,
    /// Months before the current one
    Archive,
}

/// Arguments for printing the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Which part of the schedule to show
    #[arg(long, value_enum, default_value = "all")]
    pub view: ScheduleView,

    /// Reference date for the active/archive split (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for progress statistics
#[derive(Args)]
pub struct StatsArgs {
    /// Calendar year for the special-repayment figure (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Reference date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for the yearly special-repayment allowance
#[derive(Args)]
pub struct UtilizationArgs {
    /// Calendar year (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run_schedule(
    args: ScheduleArgs,
    store: &dyn LedgerStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    let doc = store.load()?;
    match args.view {
        ScheduleView::All => {
            let result = build_schedule(&doc.schedule_input()?)?;
            Ok(serde_json::to_value(result)?)
        }
        view => {
            let today = resolve_as_of(args.as_of.as_deref())?;
            let split = split_schedule(&doc.schedule()?, today);
            let events = match view {
                ScheduleView::Archive => split.archive,
                _ => split.active,
            };
            Ok(serde_json::to_value(events)?)
        }
    }
}

pub fn run_stats(args: StatsArgs, store: &dyn LedgerStore) -> Result<Value, Box<dyn std::error::Error>> {
    let doc = store.load()?;
    let as_of = resolve_as_of(args.as_of.as_deref())?;
    let result = analyze_progress(&doc.progress_input(Some(as_of), args.year)?)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_utilization(
    args: UtilizationArgs,
    store: &dyn LedgerStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    let doc = store.load()?;
    let profile = doc.require_profile()?;
    let year = args.year.unwrap_or_else(|| local_today().year());
    let result = yearly_utilization(year, &doc.extra_payments, profile.principal)?;
    Ok(serde_json::to_value(result)?)
}

fn resolve_as_of(raw: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => Ok(dates::parse_calendar_date(raw)?),
        None => Ok(local_today()),
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_quest_core::ledger::{LedgerDocument, MemoryStore};
    use credit_quest_core::{ExtraPayment, LoanProfile};
    use rust_decimal::Decimal;

    fn store() -> MemoryStore {
        let mut doc = LedgerDocument::default();
        doc.set_profile(LoanProfile {
            principal: Decimal::from(10000),
            interest_rate: Decimal::from(5),
            monthly_payment: Decimal::from(200),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })
        .unwrap();
        doc.add_extra_payment(ExtraPayment::new(
            "x1",
            dates::parse_timestamp("2024-03-15").unwrap(),
            Decimal::from(300),
        ))
        .unwrap();
        doc.check("m-2024-0").unwrap();
        MemoryStore::new(doc)
    }

    #[test]
    fn test_schedule_all_returns_envelope() {
        let out = run_schedule(
            ScheduleArgs {
                view: ScheduleView::All,
                as_of: None,
            },
            &store(),
        )
        .unwrap();
        assert_eq!(out["result"]["extra_payment_count"], 1);
        assert_eq!(out["result"]["events"][0]["id"], "m-2024-0");
    }

    #[test]
    fn test_schedule_archive_view() {
        let out = run_schedule(
            ScheduleArgs {
                view: ScheduleView::Archive,
                as_of: Some("2024-03-20".into()),
            },
            &store(),
        )
        .unwrap();
        let ids: Vec<&str> = out
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["m-2024-0", "m-2024-1"]);
    }

    #[test]
    fn test_stats_reports_year_utilization() {
        let out = run_stats(
            StatsArgs {
                year: Some(2024),
                as_of: Some("2024-06-01".into()),
            },
            &store(),
        )
        .unwrap();
        assert_eq!(out["result"]["utilization"]["paid"], "300");
        assert_eq!(out["result"]["stats"]["checked_regular_count"], 1);
    }

    #[test]
    fn test_utilization_without_profile_fails() {
        let empty = MemoryStore::default();
        assert!(run_utilization(UtilizationArgs { year: Some(2024) }, &empty).is_err());
    }
}

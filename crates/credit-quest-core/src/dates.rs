//! Calendar helpers shared by the schedule engine and the ledger.
//!
//! The engine works at month granularity: installments are dated by adding
//! whole months to the start date, and extra payments are attributed to a
//! schedule month by their `(year, month)` key alone.

use chrono::{DateTime, Datelike, Months, NaiveDate, SecondsFormat, Utc};

use crate::error::CreditQuestError;
use crate::CreditQuestResult;

/// `(year, month)` of a date, month 1-12. Orders chronologically.
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Installment date `offset` months after `anchor`.
///
/// Always computed from the anchor so that a start on the 31st lands on the
/// last day of shorter months and returns to the 31st afterwards.
pub fn add_months(anchor: NaiveDate, offset: u32) -> Option<NaiveDate> {
    anchor.checked_add_months(Months::new(offset))
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_calendar_date(raw: &str) -> CreditQuestResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|e| CreditQuestError::DateError(format!("invalid date '{raw}': {e}")))
}

/// Parse an RFC 3339 timestamp; a bare `YYYY-MM-DD` means midnight UTC.
pub fn parse_timestamp(raw: &str) -> CreditQuestResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
        .ok_or_else(|| CreditQuestError::DateError(format!("invalid timestamp '{raw}'")))
}

/// Millisecond-precision `Z` timestamp, e.g. `2024-03-15T00:00:00.000Z`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for [`NaiveDate`] fields stored as `YYYY-MM-DD`.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for UTC timestamps stored as RFC 3339 strings.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

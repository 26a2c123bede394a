//! The persisted loan ledger: profile, acknowledged installments and extras.
//!
//! Stored as one JSON document `{profile, checkedIds, extraPayments}` that is
//! read and written wholesale. Keys this crate does not know about are kept
//! so that a round trip never strips data written by another client.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::amortization::schedule::{run_for_profile, PaymentEvent, ScheduleInput};
use crate::amortization::stats::ProgressInput;
use crate::amortization::validation;
use crate::error::CreditQuestError;
use crate::types::{ExtraPayment, LoanProfile};
use crate::CreditQuestResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<LoanProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checked_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_payments: Vec<ExtraPayment>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl LedgerDocument {
    pub fn is_configured(&self) -> bool {
        self.profile.is_some()
    }

    pub fn require_profile(&self) -> CreditQuestResult<&LoanProfile> {
        self.profile.as_ref().ok_or_else(|| CreditQuestError::InvalidInput {
            field: "profile".into(),
            reason: "No loan profile configured; run setup first".into(),
        })
    }

    /// Replace the profile, keeping acknowledged installments and extras.
    pub fn set_profile(&mut self, profile: LoanProfile) -> CreditQuestResult<()> {
        validation::validate_profile(&profile)?;
        self.profile = Some(profile);
        Ok(())
    }

    /// Current schedule for the stored profile and extras.
    pub fn schedule(&self) -> CreditQuestResult<Vec<PaymentEvent>> {
        let profile = self.require_profile()?;
        Ok(run_for_profile(profile, &self.extra_payments))
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked_ids.iter().any(|c| c == id)
    }

    /// Acknowledge an installment. Returns `false` if it already was.
    ///
    /// Only ids of regular installments in the current schedule are accepted.
    pub fn check(&mut self, id: &str) -> CreditQuestResult<bool> {
        let schedule = self.schedule()?;
        let known = schedule.iter().any(|e| e.is_regular() && e.id == id);
        if !known {
            return Err(CreditQuestError::UnknownPaymentId(id.to_string()));
        }
        if self.is_checked(id) {
            return Ok(false);
        }
        self.checked_ids.push(id.to_string());
        Ok(true)
    }

    /// Withdraw an acknowledgment. Returns `false` if the id was not checked.
    pub fn uncheck(&mut self, id: &str) -> bool {
        let before = self.checked_ids.len();
        self.checked_ids.retain(|c| c != id);
        self.checked_ids.len() != before
    }

    /// Flip an installment's acknowledgment. Returns the new state.
    pub fn toggle_checked(&mut self, id: &str) -> CreditQuestResult<bool> {
        if self.uncheck(id) {
            return Ok(false);
        }
        self.check(id)
    }

    /// Record an extra payment. Ids must be unique within the ledger.
    pub fn add_extra_payment(&mut self, extra: ExtraPayment) -> CreditQuestResult<()> {
        validation::validate_extra_payment(&extra)?;
        if self.extra_payments.iter().any(|e| e.id == extra.id) {
            return Err(CreditQuestError::DuplicateId(extra.id));
        }
        self.extra_payments.push(extra);
        Ok(())
    }

    /// Extra payments in date order.
    pub fn sorted_extra_payments(&self) -> Vec<ExtraPayment> {
        let mut extras = self.extra_payments.clone();
        extras.sort_by_key(|e| e.date);
        extras
    }

    /// Forget everything, including fields owned by other clients.
    pub fn reset(&mut self) {
        *self = LedgerDocument::default();
    }

    pub fn schedule_input(&self) -> CreditQuestResult<ScheduleInput> {
        Ok(ScheduleInput {
            profile: self.require_profile()?.clone(),
            extra_payments: self.extra_payments.clone(),
        })
    }

    pub fn progress_input(
        &self,
        as_of: Option<NaiveDate>,
        year: Option<i32>,
    ) -> CreditQuestResult<ProgressInput> {
        Ok(ProgressInput {
            profile: self.require_profile()?.clone(),
            extra_payments: self.extra_payments.clone(),
            checked_ids: self.checked_ids.clone(),
            as_of: Some(as_of.unwrap_or_else(|| Utc::now().date_naive())),
            year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn profile() -> LoanProfile {
        LoanProfile {
            principal: dec!(10000),
            interest_rate: dec!(5.0),
            monthly_payment: dec!(200),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn configured() -> LedgerDocument {
        let mut doc = LedgerDocument::default();
        doc.set_profile(profile()).unwrap();
        doc
    }

    fn extra(id: &str, m: u32, amount: rust_decimal::Decimal) -> ExtraPayment {
        ExtraPayment::new(id, Utc.with_ymd_and_hms(2024, m, 1, 0, 0, 0).unwrap(), amount)
    }

    #[test]
    fn test_empty_document_parses() {
        let doc: LedgerDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, LedgerDocument::default());
        assert!(!doc.is_configured());
        assert_eq!(serde_json::to_string(&doc).unwrap(), "{}");
    }

    #[test]
    fn test_frontend_document_round_trip_keeps_unknown_keys() {
        let raw = r#"{
            "profile": {"principal": 10000, "interestRate": 5, "monthlyPayment": 200, "startDate": "2024-01-01"},
            "checkedIds": ["m-2024-0"],
            "extraPayments": [{"id": "extra-1", "date": "2024-03-15T10:00:00.000Z", "amount": 2000}],
            "theme": "dark"
        }"#;
        let doc: LedgerDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.checked_ids, vec!["m-2024-0".to_string()]);
        assert_eq!(doc.extra_payments[0].amount, dec!(2000));
        assert_eq!(doc.other.get("theme"), Some(&serde_json::json!("dark")));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["theme"], "dark");
        assert_eq!(back["extraPayments"][0]["date"], "2024-03-15T10:00:00.000Z");
        assert_eq!(back["profile"]["startDate"], "2024-01-01");
    }

    #[test]
    fn test_set_profile_keeps_progress() {
        let mut doc = configured();
        doc.check("m-2024-0").unwrap();
        doc.add_extra_payment(extra("x", 3, dec!(100))).unwrap();

        let mut replacement = profile();
        replacement.monthly_payment = dec!(250);
        doc.set_profile(replacement).unwrap();

        assert_eq!(doc.checked_ids.len(), 1);
        assert_eq!(doc.extra_payments.len(), 1);
        assert_eq!(doc.profile.as_ref().unwrap().monthly_payment, dec!(250));
    }

    #[test]
    fn test_set_profile_rejects_insufficient_payment() {
        let mut doc = LedgerDocument::default();
        let mut bad = profile();
        bad.monthly_payment = dec!(40);
        assert!(matches!(
            doc.set_profile(bad),
            Err(CreditQuestError::InsufficientPayment { .. })
        ));
        assert!(!doc.is_configured());
    }

    #[test]
    fn test_check_and_uncheck() {
        let mut doc = configured();
        assert!(doc.check("m-2024-5").unwrap());
        assert!(!doc.check("m-2024-5").unwrap());
        assert!(doc.is_checked("m-2024-5"));
        assert!(doc.uncheck("m-2024-5"));
        assert!(!doc.uncheck("m-2024-5"));
    }

    #[test]
    fn test_check_rejects_unknown_and_extra_ids() {
        let mut doc = configured();
        doc.add_extra_payment(extra("x", 3, dec!(100))).unwrap();
        assert!(matches!(
            doc.check("m-2099-0"),
            Err(CreditQuestError::UnknownPaymentId(_))
        ));
        assert!(matches!(
            doc.check("x"),
            Err(CreditQuestError::UnknownPaymentId(_))
        ));
    }

    #[test]
    fn test_check_without_profile_fails() {
        let mut doc = LedgerDocument::default();
        assert!(matches!(
            doc.check("m-2024-0"),
            Err(CreditQuestError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_toggle_checked() {
        let mut doc = configured();
        assert!(doc.toggle_checked("m-2024-1").unwrap());
        assert!(!doc.toggle_checked("m-2024-1").unwrap());
        assert!(doc.checked_ids.is_empty());
    }

    #[test]
    fn test_duplicate_extra_rejected() {
        let mut doc = configured();
        doc.add_extra_payment(extra("x", 3, dec!(100))).unwrap();
        assert!(matches!(
            doc.add_extra_payment(extra("x", 4, dec!(50))),
            Err(CreditQuestError::DuplicateId(_))
        ));
        assert!(doc.add_extra_payment(extra("y", 4, dec!(-5))).is_err());
        assert_eq!(doc.extra_payments.len(), 1);
    }

    #[test]
    fn test_sorted_extra_payments() {
        let mut doc = configured();
        doc.add_extra_payment(extra("late", 9, dec!(10))).unwrap();
        doc.add_extra_payment(extra("early", 2, dec!(10))).unwrap();
        let ids: Vec<String> = doc.sorted_extra_payments().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["early".to_string(), "late".to_string()]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut doc = configured();
        doc.other.insert("theme".into(), serde_json::json!("dark"));
        doc.check("m-2024-0").unwrap();
        doc.reset();
        assert_eq!(doc, LedgerDocument::default());
    }
}

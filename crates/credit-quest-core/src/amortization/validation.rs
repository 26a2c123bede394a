//! Boundary checks run before a profile is stored or scheduled.
//!
//! The schedule engine itself never rejects input; these rules keep
//! non-converging loans out of the ledger in the first place.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::CreditQuestError;
use crate::types::{ExtraPayment, LoanProfile, Money, RatePercent};
use crate::CreditQuestResult;

/// Interest charged in the first month; the payment must exceed it.
pub fn first_month_interest(
    principal: Money,
    annual_rate_percent: RatePercent,
) -> CreditQuestResult<Money> {
    principal
        .checked_mul(annual_rate_percent / dec!(100) / dec!(12))
        .ok_or_else(|| CreditQuestError::InvalidInput {
            field: "principal".into(),
            reason: "Principal and interest rate are too large to compute interest".into(),
        })
}

/// Validate a loan profile.
pub fn validate_profile(profile: &LoanProfile) -> CreditQuestResult<()> {
    if profile.principal <= Decimal::ZERO {
        return Err(CreditQuestError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if profile.interest_rate < Decimal::ZERO {
        return Err(CreditQuestError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if profile.monthly_payment <= Decimal::ZERO {
        return Err(CreditQuestError::InvalidInput {
            field: "monthly_payment".into(),
            reason: "Monthly payment must be positive".into(),
        });
    }

    let minimum = first_month_interest(profile.principal, profile.interest_rate)?;
    if profile.monthly_payment <= minimum {
        return Err(CreditQuestError::InsufficientPayment {
            monthly_payment: profile.monthly_payment,
            minimum: minimum.round_dp(2),
        });
    }
    Ok(())
}

/// Verdict on a profile, reported instead of raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCheck {
    pub valid: bool,
    /// First month's interest, rounded to cents; the payment must exceed it.
    pub minimum_monthly_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Run [`validate_profile`] and describe the outcome.
///
/// Only fails when the first month's interest cannot be computed at all.
pub fn check_profile(profile: &LoanProfile) -> CreditQuestResult<ProfileCheck> {
    let minimum = first_month_interest(profile.principal, profile.interest_rate)?;
    let reason = validate_profile(profile).err().map(|e| e.to_string());
    Ok(ProfileCheck {
        valid: reason.is_none(),
        minimum_monthly_payment: minimum.round_dp(2),
        reason,
    })
}

/// Validate one extra payment on its own.
pub fn validate_extra_payment(extra: &ExtraPayment) -> CreditQuestResult<()> {
    if extra.id.trim().is_empty() {
        return Err(CreditQuestError::InvalidInput {
            field: "id".into(),
            reason: "Extra payment id must not be empty".into(),
        });
    }
    if extra.amount <= Decimal::ZERO {
        return Err(CreditQuestError::InvalidInput {
            field: "amount".into(),
            reason: format!("Extra payment '{}' must have a positive amount", extra.id),
        });
    }
    Ok(())
}

/// Validate a set of extra payments, including id uniqueness.
pub fn validate_extra_payments(extras: &[ExtraPayment]) -> CreditQuestResult<()> {
    let mut seen = HashSet::with_capacity(extras.len());
    for extra in extras {
        validate_extra_payment(extra)?;
        if !seen.insert(extra.id.as_str()) {
            return Err(CreditQuestError::DuplicateId(extra.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn profile(principal: Decimal, rate: Decimal, payment: Decimal) -> LoanProfile {
        LoanProfile {
            principal,
            interest_rate: rate,
            monthly_payment: payment,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn extra(id: &str, amount: Decimal) -> ExtraPayment {
        ExtraPayment::new(id, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(), amount)
    }

    #[test]
    fn test_valid_profile_passes() {
        assert!(validate_profile(&profile(dec!(10000), dec!(5.0), dec!(200))).is_ok());
        assert!(validate_profile(&profile(dec!(10000), dec!(0), dec!(1))).is_ok());
    }

    #[test]
    fn test_non_positive_principal_rejected() {
        let err = validate_profile(&profile(dec!(0), dec!(5.0), dec!(200))).unwrap_err();
        match err {
            CreditQuestError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            validate_profile(&profile(dec!(10000), dec!(-1), dec!(200))),
            Err(CreditQuestError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_payment_below_interest_rejected() {
        let err = validate_profile(&profile(dec!(10000), dec!(5.0), dec!(41))).unwrap_err();
        match err {
            CreditQuestError::InsufficientPayment { monthly_payment, minimum } => {
                assert_eq!(monthly_payment, dec!(41));
                assert_eq!(minimum, dec!(41.67));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_payment_equal_to_interest_rejected() {
        assert!(matches!(
            validate_profile(&profile(dec!(12000), dec!(6.0), dec!(60))),
            Err(CreditQuestError::InsufficientPayment { .. })
        ));
    }

    #[test]
    fn test_first_month_interest() {
        assert_eq!(first_month_interest(dec!(12000), dec!(6.0)).unwrap(), dec!(60));
    }

    #[test]
    fn test_out_of_range_interest_is_invalid_input() {
        let result = validate_profile(&profile(Decimal::MAX, Decimal::MAX, dec!(100)));
        match result {
            Err(CreditQuestError::InvalidInput { field, .. }) => assert_eq!(field, "principal"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_check_profile_reports_minimum_and_reason() {
        let ok = check_profile(&profile(dec!(12000), dec!(6.0), dec!(200))).unwrap();
        assert!(ok.valid);
        assert_eq!(ok.minimum_monthly_payment, dec!(60));
        assert_eq!(ok.reason, None);

        let short = check_profile(&profile(dec!(12000), dec!(6.0), dec!(60))).unwrap();
        assert!(!short.valid);
        assert!(short.reason.as_deref().unwrap().contains("does not cover"));

        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["valid"], serde_json::json!(true));
        assert!(json.get("minimumMonthlyPayment").is_some());
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_duplicate_extra_ids_rejected() {
        let extras = vec![extra("a", dec!(10)), extra("b", dec!(10)), extra("a", dec!(5))];
        match validate_extra_payments(&extras) {
            Err(CreditQuestError::DuplicateId(id)) => assert_eq!(id, "a"),
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_extra_rejected() {
        assert!(validate_extra_payment(&extra("z", dec!(0))).is_err());
        assert!(validate_extra_payment(&extra("  ", dec!(10))).is_err());
    }
}

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditQuestError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Monthly payment {monthly_payment} does not cover the first month's interest (minimum: {minimum})")]
    InsufficientPayment {
        monthly_payment: Decimal,
        minimum: Decimal,
    },

    #[error("Duplicate payment id: {0}")]
    DuplicateId(String),

    #[error("Unknown payment id: {0}")]
    UnknownPaymentId(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CreditQuestError {
    fn from(e: serde_json::Error) -> Self {
        CreditQuestError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for CreditQuestError {
    fn from(e: std::io::Error) -> Self {
        CreditQuestError::Storage(e.to_string())
    }
}

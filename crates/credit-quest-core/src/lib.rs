pub mod dates;
pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "ledger")]
pub mod ledger;

pub use error::CreditQuestError;
pub use types::*;

/// Standard result type for all credit-quest operations
pub type CreditQuestResult<T> = Result<T, CreditQuestError>;

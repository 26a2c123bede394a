pub mod ledger;
pub mod progress;
pub mod setup;

pub mod document;
pub mod store;

pub use document::LedgerDocument;
pub use store::{JsonFileStore, LedgerStore, MemoryStore};

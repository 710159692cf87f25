//! Search history for Skycast
//!
//! Keeps the list of previously searched cities in a single JSON document on
//! disk. Every mutation rewrites the whole document.

pub mod entry;
pub mod error;
pub mod store;

pub use entry::HistoryEntry;
pub use error::{HistoryError, HistoryResult};
pub use store::HistoryStore;

//! Storage backends
//!
//! Analyzer output is expensive to produce, so parses are memoized through
//! the `ParseCache` trait. `SqliteParseCache` is the persistent
//! implementation.

mod sqlite;
mod traits;

pub use sqlite::SqliteParseCache;
pub use traits::{cache_key, OpenStore, ParseCache, StorageError, StorageResult};

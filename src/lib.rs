pub mod analytics;
pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod tally;

// Conditional compilation for db module since it depends on WASM-only rexie
#[cfg(target_arch = "wasm32")]
pub mod db;

pub use analytics::compute_stats;
pub use cache::{CacheEntry, CacheStore, CollectionCache};
pub use compare::compare;
pub use models::{CatalogItem, CollectionStats, ComparisonResult};

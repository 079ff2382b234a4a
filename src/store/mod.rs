//! Statistics store
//!
//! This module holds the single source of truth for URL statistics:
//! - `UrlRecord`, the per-URL counters and timestamps
//! - `OrderKey`, the sort criteria used by listings
//! - `StatsStore`, the trait every store implements
//! - `MemoryStore`, the process-lifetime implementation

mod memory;
mod order;
mod record;
mod traits;

pub use memory::MemoryStore;
pub use order::{sort_records, OrderKey};
pub use record::{StoreSummary, UrlRecord};
pub use traits::{StatsStore, StoreError, StoreResult};

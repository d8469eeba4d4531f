//! Association hydration for parents with several to-many collections.
//!
//! Fetch-joining more than one independent to-many association in a single
//! query multiplies parent rows and corrupts pagination totals. Instead, each
//! association registered for a parent type is loaded with exactly one batch
//! query covering every parent in the call, then merged back onto the
//! parents in their original order.
//!
//! # Modules
//!
//! - `types` - `Hydratable` parents and association `Slot`s
//! - `error` - Hydration error types
//! - `registry` - Per-parent-type association declarations
//! - `fetcher` - Batch fetch seam and identity collection
//! - `merger` - Order-preserving regrouping of fetched children
//! - `metrics` - Injected fetch/orphan counters
//! - `resolver` - `Hydrator` entry points for single, list and page inputs

pub mod error;
pub mod fetcher;
pub mod merger;
pub mod metrics;
pub mod registry;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod resolver_props;
#[cfg(test)]
mod tests;

pub use error::{FetchError, HydrationError};
pub use fetcher::{BatchFetch, UniqueIds, fetch_batch, parent_ids};
pub use merger::{MergeOutcome, merge};
pub use metrics::{CountingMetrics, HydrationMetrics, NoopMetrics};
pub use registry::AssociationRegistry;
pub use resolver::{HydrationOptions, Hydrator};
pub use types::{Hydratable, Slot};

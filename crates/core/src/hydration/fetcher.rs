//! Batch fetch seam.
//!
//! A batch fetcher retrieves the children of an association for a whole set
//! of parent identities in one round-trip against the backing store.

use std::collections::HashSet;
use std::hash::Hash;

use async_trait::async_trait;

use super::error::FetchError;
use super::types::Hydratable;

/// Retrieves `(parent identity, child)` pairs for a set of parent identities.
///
/// Implementations must filter strictly by membership in `ids` and perform a
/// single read. A parent identity may appear any number of times in the
/// output; only child rows may repeat, never parent rows.
#[async_trait]
pub trait BatchFetch<Ctx, K, C>: Send + Sync {
    /// Fetches all children whose parent identity is in `ids`.
    ///
    /// `ids` is never empty and never contains duplicates.
    async fn fetch(&self, ctx: &Ctx, ids: &[K]) -> Result<Vec<(K, C)>, FetchError>;
}

/// Parent identities with duplicates collapsed, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIds<K>(Vec<K>);

impl<K: Clone + Eq + Hash> UniqueIds<K> {
    /// Collects identities, keeping the first occurrence of each.
    pub fn collect(ids: impl IntoIterator<Item = K>) -> Self {
        let mut seen = HashSet::new();
        Self(
            ids.into_iter()
                .filter(|id| seen.insert(id.clone()))
                .collect(),
        )
    }
}

impl<K> UniqueIds<K> {
    /// Returns the identities as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[K] {
        &self.0
    }

    /// Returns the number of unique identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no identities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Collects the unique identities of `parents`.
pub fn parent_ids<P: Hydratable>(parents: &[P]) -> UniqueIds<P::Id> {
    UniqueIds::collect(parents.iter().map(Hydratable::id))
}

/// Runs `fetcher` for `ids`, skipping the store entirely when `ids` is empty.
///
/// An empty identity set would otherwise turn into a degenerate `IN ()`
/// query.
pub async fn fetch_batch<Ctx, K, C, F>(
    fetcher: &F,
    ctx: &Ctx,
    ids: &UniqueIds<K>,
) -> Result<Vec<(K, C)>, FetchError>
where
    F: BatchFetch<Ctx, K, C> + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    fetcher.fetch(ctx, ids.as_slice()).await
}

//! Hydration entry points for single, list and paged parents.

use std::sync::Arc;

use futures::future::try_join_all;
use roster_shared::config::HydrationConfig;
use roster_shared::types::PageResponse;
use tracing::debug;

use super::error::HydrationError;
use super::fetcher::parent_ids;
use super::metrics::{HydrationMetrics, NoopMetrics};
use super::registry::{AssociationRegistry, FetchedAssociation};
use super::types::Hydratable;

/// Tunables for a [`Hydrator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationOptions {
    /// Issue all association fetches concurrently, then merge in registry
    /// order. The context must support concurrent reads within one snapshot.
    pub concurrent_fetches: bool,
}

impl From<&HydrationConfig> for HydrationOptions {
    fn from(config: &HydrationConfig) -> Self {
        Self {
            concurrent_fetches: config.concurrent_fetches,
        }
    }
}

/// Hydrates parents of type `P` with every association in its registry.
///
/// Each association is fetched at most once per call, for all parents at
/// once, and parents always come back in their input order. The hydrator
/// keeps no state between calls; `ctx` should be a single read snapshot so
/// that all fetches of one call observe the same data.
pub struct Hydrator<P: Hydratable, Ctx> {
    registry: Arc<AssociationRegistry<P, Ctx>>,
    metrics: Arc<dyn HydrationMetrics>,
    options: HydrationOptions,
}

impl<P: Hydratable, Ctx> Clone for Hydrator<P, Ctx> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            metrics: Arc::clone(&self.metrics),
            options: self.options,
        }
    }
}

impl<P: Hydratable, Ctx> std::fmt::Debug for Hydrator<P, Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydrator")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<P: Hydratable, Ctx: Sync> Hydrator<P, Ctx> {
    /// Creates a sequential hydrator with no metrics.
    #[must_use]
    pub fn new(registry: Arc<AssociationRegistry<P, Ctx>>) -> Self {
        Self {
            registry,
            metrics: Arc::new(NoopMetrics),
            options: HydrationOptions::default(),
        }
    }

    /// Reports fetch and orphan counts to `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn HydrationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replaces the hydration options.
    #[must_use]
    pub const fn with_options(mut self, options: HydrationOptions) -> Self {
        self.options = options;
        self
    }

    /// The association registry this hydrator applies.
    #[must_use]
    pub fn registry(&self) -> &AssociationRegistry<P, Ctx> {
        &self.registry
    }

    /// Hydrates a point-lookup result. `None` stays `None` without any fetch.
    pub async fn hydrate_one(&self, ctx: &Ctx, parent: Option<P>) -> Result<Option<P>, HydrationError> {
        let Some(parent) = parent else {
            return Ok(None);
        };
        let mut parents = vec![parent];
        self.hydrate_in_place(ctx, &mut parents).await?;
        Ok(parents.pop())
    }

    /// Hydrates a list, preserving its length and order.
    pub async fn hydrate_list(&self, ctx: &Ctx, mut parents: Vec<P>) -> Result<Vec<P>, HydrationError> {
        self.hydrate_in_place(ctx, &mut parents).await?;
        Ok(parents)
    }

    /// Hydrates the items of a page. Page metadata is returned verbatim.
    pub async fn hydrate_page(
        &self,
        ctx: &Ctx,
        page: PageResponse<P>,
    ) -> Result<PageResponse<P>, HydrationError> {
        let (mut data, meta) = page.into_parts();
        self.hydrate_in_place(ctx, &mut data).await?;
        Ok(PageResponse::from_parts(data, meta))
    }

    /// Hydrates `parents` in place, one batch fetch per association.
    pub async fn hydrate_in_place(&self, ctx: &Ctx, parents: &mut [P]) -> Result<(), HydrationError> {
        if parents.is_empty() || self.registry.is_empty() {
            return Ok(());
        }

        let ids = parent_ids(parents);
        debug!(
            parent_type = P::TYPE_NAME,
            parents = parents.len(),
            unique = ids.len(),
            associations = self.registry.len(),
            concurrent = self.options.concurrent_fetches,
            "Hydrating associations"
        );

        if self.options.concurrent_fetches {
            let fetched = try_join_all(
                self.registry
                    .associations()
                    .iter()
                    .map(|association| association.load(ctx, &ids)),
            )
            .await?;

            for (association, batch) in self.registry.associations().iter().zip(fetched) {
                self.attach(association.name(), ids.len(), batch, parents);
            }
        } else {
            for association in self.registry.associations() {
                let batch = association.load(ctx, &ids).await?;
                self.attach(association.name(), ids.len(), batch, parents);
            }
        }

        Ok(())
    }

    fn attach(
        &self,
        association: &'static str,
        unique_parents: usize,
        batch: Box<dyn FetchedAssociation<P>>,
        parents: &mut [P],
    ) {
        let children = batch.len();
        let outcome = batch.attach_to(parents);

        self.metrics
            .record_fetch(P::TYPE_NAME, association, unique_parents, children);
        debug!(
            parent_type = P::TYPE_NAME,
            association,
            parents = unique_parents,
            children,
            "Fetched association"
        );

        if outcome.orphaned > 0 {
            self.metrics
                .record_orphans(P::TYPE_NAME, association, outcome.orphaned);
            debug!(
                parent_type = P::TYPE_NAME,
                association,
                dropped = outcome.orphaned,
                "Dropped children of unknown parents"
            );
        }
    }
}

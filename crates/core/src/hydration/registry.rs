//! Association declarations per parent type.
//!
//! A registry is built once at startup, then shared read-only (typically
//! behind an `Arc`) by every hydration call.

use std::fmt;

use async_trait::async_trait;

use super::error::HydrationError;
use super::fetcher::{BatchFetch, UniqueIds, fetch_batch};
use super::merger::{MergeOutcome, merge};
use super::types::Hydratable;

/// Children fetched for one association, ready to be merged.
pub(crate) trait FetchedAssociation<P: Hydratable>: Send {
    /// Number of fetched pairs.
    fn len(&self) -> usize;

    /// Merges the fetched children onto `parents`.
    fn attach_to(self: Box<Self>, parents: &mut [P]) -> MergeOutcome;
}

/// A registered association with its child type erased.
#[async_trait]
pub(crate) trait Association<P: Hydratable, Ctx>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load(
        &self,
        ctx: &Ctx,
        ids: &UniqueIds<P::Id>,
    ) -> Result<Box<dyn FetchedAssociation<P>>, HydrationError>;
}

struct AssociationSpec<P: Hydratable, C, F> {
    name: &'static str,
    fetcher: F,
    attach: fn(&mut P, Vec<C>),
}

struct Fetched<P: Hydratable, C> {
    pairs: Vec<(P::Id, C)>,
    attach: fn(&mut P, Vec<C>),
}

impl<P, C> FetchedAssociation<P> for Fetched<P, C>
where
    P: Hydratable,
    C: Clone + Send + 'static,
{
    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn attach_to(self: Box<Self>, parents: &mut [P]) -> MergeOutcome {
        merge(parents, self.pairs, self.attach)
    }
}

#[async_trait]
impl<P, Ctx, C, F> Association<P, Ctx> for AssociationSpec<P, C, F>
where
    P: Hydratable,
    Ctx: Sync,
    C: Clone + Send + 'static,
    F: BatchFetch<Ctx, P::Id, C>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn load(
        &self,
        ctx: &Ctx,
        ids: &UniqueIds<P::Id>,
    ) -> Result<Box<dyn FetchedAssociation<P>>, HydrationError> {
        let pairs = fetch_batch(&self.fetcher, ctx, ids)
            .await
            .map_err(|source| HydrationError::DataAccess {
                parent_type: P::TYPE_NAME,
                association: self.name,
                source,
            })?;

        Ok(Box::new(Fetched {
            pairs,
            attach: self.attach,
        }))
    }
}

/// Ordered, duplicate-free set of associations declared for parent type `P`.
///
/// `Ctx` is whatever the fetchers read through, e.g. a database transaction.
pub struct AssociationRegistry<P: Hydratable, Ctx> {
    associations: Vec<Box<dyn Association<P, Ctx>>>,
}

impl<P: Hydratable, Ctx> Default for AssociationRegistry<P, Ctx> {
    fn default() -> Self {
        Self {
            associations: Vec::new(),
        }
    }
}

impl<P: Hydratable, Ctx: Sync> AssociationRegistry<P, Ctx> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares association `name`, fetched by `fetcher` and stored on each
    /// parent by `attach`.
    ///
    /// # Errors
    ///
    /// Returns `HydrationError::DuplicateAssociation` if `name` is already
    /// registered for `P`. Registrations are never overwritten.
    pub fn register<C, F>(
        &mut self,
        name: &'static str,
        fetcher: F,
        attach: fn(&mut P, Vec<C>),
    ) -> Result<&mut Self, HydrationError>
    where
        C: Clone + Send + 'static,
        F: BatchFetch<Ctx, P::Id, C> + 'static,
    {
        if self.contains(name) {
            return Err(HydrationError::DuplicateAssociation {
                parent_type: P::TYPE_NAME,
                association: name,
            });
        }

        self.associations.push(Box::new(AssociationSpec {
            name,
            fetcher,
            attach,
        }));
        Ok(self)
    }

    /// Builder form of [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// Returns `HydrationError::DuplicateAssociation` on a repeated name.
    pub fn with<C, F>(
        mut self,
        name: &'static str,
        fetcher: F,
        attach: fn(&mut P, Vec<C>),
    ) -> Result<Self, HydrationError>
    where
        C: Clone + Send + 'static,
        F: BatchFetch<Ctx, P::Id, C> + 'static,
    {
        self.register(name, fetcher, attach)?;
        Ok(self)
    }
}

impl<P: Hydratable, Ctx> AssociationRegistry<P, Ctx> {
    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.associations.iter().any(|a| a.name() == name)
    }

    /// Association names in registration order.
    pub fn association_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.associations.iter().map(|a| a.name())
    }

    /// Number of registered associations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.associations.len()
    }

    /// Returns true if no association is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    pub(crate) fn associations(&self) -> &[Box<dyn Association<P, Ctx>>] {
        &self.associations
    }
}

impl<P: Hydratable, Ctx> fmt::Debug for AssociationRegistry<P, Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationRegistry")
            .field("parent_type", &P::TYPE_NAME)
            .field("associations", &self.association_names().collect::<Vec<_>>())
            .finish()
    }
}

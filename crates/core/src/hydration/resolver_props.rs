//! Property-based tests for the Hydrator.
//!
//! Parents and fetched pairs are generated at random, including repeated
//! parents and pairs that reference parents outside the input.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::executor::block_on;
use proptest::prelude::*;
use roster_shared::types::PageResponse;

use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Parent {
    id: u8,
    tag: usize,
    children: Slot<u16>,
}

impl Hydratable for Parent {
    type Id = u8;
    const TYPE_NAME: &'static str = "parent";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Returns every stored pair, member or not.
struct AllPairs;

#[async_trait]
impl BatchFetch<Vec<(u8, u16)>, u8, u16> for AllPairs {
    async fn fetch(
        &self,
        pairs: &Vec<(u8, u16)>,
        _ids: &[u8],
    ) -> Result<Vec<(u8, u16)>, FetchError> {
        Ok(pairs.clone())
    }
}

fn hydrator() -> Hydrator<Parent, Vec<(u8, u16)>> {
    let registry = AssociationRegistry::new()
        .with("children", AllPairs, |p: &mut Parent, c| p.children.set(c))
        .unwrap();
    Hydrator::new(Arc::new(registry))
}

/// Strategy for parent lists; small ids force repeats.
fn arb_parents() -> impl Strategy<Value = Vec<Parent>> {
    prop::collection::vec(0u8..20, 0..30).prop_map(|ids| {
        ids.into_iter()
            .enumerate()
            .map(|(tag, id)| Parent {
                id,
                tag,
                children: Slot::Unloaded,
            })
            .collect()
    })
}

/// Strategy for fetched pairs, some pointing at ids never generated as parents.
fn arb_pairs() -> impl Strategy<Value = Vec<(u8, u16)>> {
    prop::collection::vec((0u8..30, any::<u16>()), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Output has the same parents, in the same order.
    #[test]
    fn prop_length_and_order_preserved(parents in arb_parents(), pairs in arb_pairs()) {
        let hydrated = block_on(hydrator().hydrate_list(&pairs, parents.clone())).unwrap();

        prop_assert_eq!(hydrated.len(), parents.len());
        for (before, after) in parents.iter().zip(&hydrated) {
            prop_assert_eq!(before.id, after.id);
            prop_assert_eq!(before.tag, after.tag);
        }
    }

    /// Every parent gets exactly its own children, in fetch order, and
    /// parents without children get a loaded empty slot.
    #[test]
    fn prop_children_match_fetch(parents in arb_parents(), pairs in arb_pairs()) {
        let hydrated = block_on(hydrator().hydrate_list(&pairs, parents)).unwrap();

        let mut expected: HashMap<u8, Vec<u16>> = HashMap::new();
        for (id, child) in &pairs {
            expected.entry(*id).or_default().push(*child);
        }
        for parent in &hydrated {
            let children = parent.children.get();
            prop_assert!(children.is_some());
            let want = expected.get(&parent.id).cloned().unwrap_or_default();
            prop_assert_eq!(children.unwrap(), want.as_slice());
        }
    }

    /// Hydrating twice gives the same result as hydrating once.
    #[test]
    fn prop_idempotent(parents in arb_parents(), pairs in arb_pairs()) {
        let h = hydrator();
        let once = block_on(h.hydrate_list(&pairs, parents)).unwrap();
        let twice = block_on(h.hydrate_list(&pairs, once.clone())).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Page metadata and item count are untouched.
    #[test]
    fn prop_page_meta_invariant(
        parents in arb_parents(),
        pairs in arb_pairs(),
        page in 1u32..50,
        per_page in 1u32..100,
        extra in 0u64..1000,
    ) {
        let total = parents.len() as u64 + extra;
        let input = PageResponse::new(parents, page, per_page, total);
        let meta = input.meta;
        let len = input.data.len();

        let hydrated = block_on(hydrator().hydrate_page(&pairs, input)).unwrap();

        prop_assert_eq!(hydrated.meta, meta);
        prop_assert_eq!(hydrated.meta.total, total);
        prop_assert_eq!(hydrated.data.len(), len);
    }
}

//! Order-preserving merge of fetched children onto parents.
//!
//! Parents keep their positions; children are grouped by parent identity in
//! the order the fetch returned them. Both passes are linear and no total
//! order on identities is required.

use std::collections::HashMap;

use super::types::Hydratable;

/// Summary of one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Pairs attached to at least one parent.
    pub matched: usize,
    /// Pairs whose parent identity was not in the input and were dropped.
    pub orphaned: usize,
}

/// Attaches `pairs` to `parents` through `attach`, one call per parent.
///
/// Every parent is visited exactly once, in input order, and receives its
/// children or an empty collection. A parent appearing more than once gets
/// the same children at each position. Pairs referencing an identity that
/// is not among `parents` are ignored.
pub fn merge<P, C, A>(parents: &mut [P], pairs: Vec<(P::Id, C)>, mut attach: A) -> MergeOutcome
where
    P: Hydratable,
    C: Clone,
    A: FnMut(&mut P, Vec<C>),
{
    // identity -> group, and how many parents share each group
    let mut index: HashMap<P::Id, usize> = HashMap::with_capacity(parents.len());
    let mut remaining: Vec<usize> = Vec::with_capacity(parents.len());
    let mut group_of: Vec<usize> = Vec::with_capacity(parents.len());
    for parent in parents.iter() {
        let next = remaining.len();
        let group = *index.entry(parent.id()).or_insert(next);
        if group == next {
            remaining.push(0);
        }
        remaining[group] += 1;
        group_of.push(group);
    }

    let mut groups: Vec<Vec<C>> = std::iter::repeat_with(Vec::new)
        .take(remaining.len())
        .collect();
    let mut outcome = MergeOutcome::default();
    for (id, child) in pairs {
        if let Some(&group) = index.get(&id) {
            groups[group].push(child);
            outcome.matched += 1;
        } else {
            outcome.orphaned += 1;
        }
    }

    for (parent, group) in parents.iter_mut().zip(group_of) {
        remaining[group] -= 1;
        let children = if remaining[group] == 0 {
            std::mem::take(&mut groups[group])
        } else {
            groups[group].clone()
        };
        attach(parent, children);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: &'static str,
        children: Option<Vec<&'static str>>,
    }

    impl Hydratable for Node {
        type Id = &'static str;
        const TYPE_NAME: &'static str = "node";

        fn id(&self) -> Self::Id {
            self.id
        }
    }

    fn nodes(ids: &[&'static str]) -> Vec<Node> {
        ids.iter()
            .map(|&id| Node {
                id,
                children: None,
            })
            .collect()
    }

    fn attach(node: &mut Node, children: Vec<&'static str>) {
        node.children = Some(children);
    }

    #[test]
    fn test_children_grouped_in_fetch_order() {
        let mut parents = nodes(&["p1", "p2", "p3"]);
        let outcome = merge(
            &mut parents,
            vec![("p2", "c1"), ("p1", "c2"), ("p1", "c3")],
            attach,
        );

        assert_eq!(parents[0].children, Some(vec!["c2", "c3"]));
        assert_eq!(parents[1].children, Some(vec!["c1"]));
        assert_eq!(parents[2].children, Some(vec![]));
        assert_eq!(
            outcome,
            MergeOutcome {
                matched: 3,
                orphaned: 0
            }
        );
    }

    #[test]
    fn test_unknown_parent_dropped() {
        let mut parents = nodes(&["p1"]);
        let outcome = merge(&mut parents, vec![("ghost", "c9"), ("p1", "c1")], attach);

        assert_eq!(parents[0].children, Some(vec!["c1"]));
        assert_eq!(outcome.orphaned, 1);
    }

    #[test]
    fn test_repeated_parent_receives_same_children() {
        let mut parents = nodes(&["p1", "p2", "p1"]);
        merge(&mut parents, vec![("p1", "a"), ("p1", "b")], attach);

        assert_eq!(parents.len(), 3);
        assert_eq!(parents[0].children, Some(vec!["a", "b"]));
        assert_eq!(parents[1].children, Some(vec![]));
        assert_eq!(parents[2].children, Some(vec!["a", "b"]));
    }

    #[test]
    fn test_duplicate_children_are_kept() {
        let mut parents = nodes(&["p1"]);
        merge(&mut parents, vec![("p1", "same"), ("p1", "same")], attach);

        assert_eq!(parents[0].children, Some(vec!["same", "same"]));
    }

    #[test]
    fn test_empty_parents() {
        let mut parents: Vec<Node> = Vec::new();
        let outcome = merge(&mut parents, vec![("p1", "c1")], attach);

        assert_eq!(outcome.orphaned, 1);
        assert!(parents.is_empty());
    }
}

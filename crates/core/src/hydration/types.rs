//! Parent and association slot types.

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

/// A parent record whose to-many associations can be hydrated.
pub trait Hydratable: Send + 'static {
    /// Stable, comparable identity of the parent.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Parent type name used in registry errors and logs.
    const TYPE_NAME: &'static str;

    /// Returns the parent's identity.
    fn id(&self) -> Self::Id;
}

/// A to-many association slot on a parent record.
///
/// Slots start out `Unloaded`. Hydration always leaves a declared slot
/// `Loaded`, with an empty collection when the parent has no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Slot<C> {
    /// Not populated yet.
    Unloaded,
    /// Populated by hydration, possibly empty.
    Loaded(Vec<C>),
}

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self::Unloaded
    }
}

impl<C> Slot<C> {
    /// Replaces the slot content with `children`.
    pub fn set(&mut self, children: Vec<C>) {
        *self = Self::Loaded(children);
    }

    /// Returns true once the slot has been hydrated.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Returns the children if the slot has been hydrated.
    #[must_use]
    pub fn get(&self) -> Option<&[C]> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(children) => Some(children),
        }
    }

    /// Returns the children, treating an unloaded slot as empty.
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        self.get().unwrap_or_default()
    }

    /// Consumes the slot, returning the children if hydrated.
    #[must_use]
    pub fn into_loaded(self) -> Option<Vec<C>> {
        match self {
            Self::Unloaded => None,
            Self::Loaded(children) => Some(children),
        }
    }
}

impl<C> From<Vec<C>> for Slot<C> {
    fn from(children: Vec<C>) -> Self {
        Self::Loaded(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_unloaded() {
        let slot: Slot<u8> = Slot::default();
        assert!(!slot.is_loaded());
        assert_eq!(slot.get(), None);
        assert!(slot.as_slice().is_empty());
    }

    #[test]
    fn test_set_replaces_content() {
        let mut slot = Slot::from(vec![1, 2]);
        slot.set(vec![3]);
        assert_eq!(slot.get(), Some(&[3][..]));

        slot.set(Vec::new());
        assert!(slot.is_loaded());
        assert_eq!(slot.into_loaded(), Some(Vec::new()));
    }

    #[test]
    fn test_slot_serialization() {
        let unloaded: Slot<u8> = Slot::Unloaded;
        assert_eq!(serde_json::to_string(&unloaded).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Slot::from(vec![1, 2])).unwrap(), "[1,2]");
        assert_eq!(serde_json::to_string(&Slot::<u8>::from(vec![])).unwrap(), "[]");
    }
}

//! Hydration counters.
//!
//! Counters are an injected capability so the resolver stays free of
//! process-wide state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives counts from hydration calls.
pub trait HydrationMetrics: Send + Sync {
    /// Records one batch fetch for an association.
    fn record_fetch(
        &self,
        parent_type: &'static str,
        association: &'static str,
        parents: usize,
        children: usize,
    );

    /// Records pairs dropped because their parent was not in the input.
    fn record_orphans(&self, parent_type: &'static str, association: &'static str, dropped: usize);
}

/// Discards all counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl HydrationMetrics for NoopMetrics {
    fn record_fetch(&self, _: &'static str, _: &'static str, _: usize, _: usize) {}

    fn record_orphans(&self, _: &'static str, _: &'static str, _: usize) {}
}

/// In-memory counters, per association and in total.
#[derive(Debug, Default)]
pub struct CountingMetrics {
    fetches: AtomicU64,
    children: AtomicU64,
    orphans: AtomicU64,
    per_association: Mutex<HashMap<(&'static str, &'static str), u64>>,
}

impl CountingMetrics {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn per_association(&self) -> MutexGuard<'_, HashMap<(&'static str, &'static str), u64>> {
        // Counts stay valid after a panic in another holder.
        self.per_association
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Total batch fetches issued.
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Total children fetched.
    pub fn children(&self) -> u64 {
        self.children.load(Ordering::Relaxed)
    }

    /// Total pairs dropped for unknown parents.
    pub fn orphans(&self) -> u64 {
        self.orphans.load(Ordering::Relaxed)
    }

    /// Batch fetches issued for one association of one parent type.
    pub fn fetches_for(&self, parent_type: &'static str, association: &'static str) -> u64 {
        self.per_association()
            .get(&(parent_type, association))
            .copied()
            .unwrap_or(0)
    }
}

impl HydrationMetrics for CountingMetrics {
    fn record_fetch(
        &self,
        parent_type: &'static str,
        association: &'static str,
        _parents: usize,
        children: usize,
    ) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.children
            .fetch_add(u64::try_from(children).unwrap_or(u64::MAX), Ordering::Relaxed);
        *self
            .per_association()
            .entry((parent_type, association))
            .or_insert(0) += 1;
    }

    fn record_orphans(&self, _: &'static str, _: &'static str, dropped: usize) {
        self.orphans
            .fetch_add(u64::try_from(dropped).unwrap_or(u64::MAX), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_counting_metrics() {
        let metrics = CountingMetrics::new();
        metrics.record_fetch("employee", "trainings", 3, 5);
        metrics.record_fetch("employee", "trainings", 1, 0);
        metrics.record_fetch("employee", "safety_instructions", 1, 2);
        metrics.record_orphans("employee", "trainings", 4);

        assert_eq!(metrics.fetches(), 3);
        assert_eq!(metrics.children(), 7);
        assert_eq!(metrics.orphans(), 4);
        assert_eq!(metrics.fetches_for("employee", "trainings"), 2);
        assert_eq!(metrics.fetches_for("employee", "safety_instructions"), 1);
        assert_eq!(metrics.fetches_for("team", "members"), 0);
    }

    #[test]
    fn test_counts_survive_poisoned_lock() {
        let metrics = Arc::new(CountingMetrics::new());
        metrics.record_fetch("team", "members", 2, 3);

        let poisoner = Arc::clone(&metrics);
        let panicked = std::thread::spawn(move || {
            let _guard = poisoner.per_association.lock().unwrap();
            panic!("holder panicked");
        })
        .join();
        assert!(panicked.is_err());
        assert!(metrics.per_association.is_poisoned());

        metrics.record_fetch("team", "members", 1, 0);
        assert_eq!(metrics.fetches_for("team", "members"), 2);
        assert_eq!(metrics.fetches(), 2);
    }
}

//! Memoized entry point for the accounting pipeline.
//!
//! # Thread Safety
//!
//! [`TotalsCache`] is `Send + Sync` and meant to be shared (e.g. in an `Arc`)
//! between concurrent callers. Lookups and inserts take one `Mutex`; the
//! computation itself runs outside the lock. Two callers missing on the same
//! batch at once both compute, and the first insert wins. Results are
//! deterministic, so either value is correct.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::accounting::{TimeTotals, calculate_time_totals};
use crate::event::ClockEvent;
use crate::policy::AccountingPolicy;

/// Default number of batches kept.
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(128) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded LRU cache over [`calculate_time_totals`].
///
/// Keys are whole batches in input order. Order matters because events with
/// equal timestamps are paired in input order.
#[derive(Debug)]
pub struct TotalsCache {
    policy: AccountingPolicy,
    entries: Mutex<LruCache<Vec<ClockEvent>, Arc<TimeTotals>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TotalsCache {
    /// Creates a cache holding up to `capacity` batches.
    pub fn new(policy: AccountingPolicy, capacity: NonZeroUsize) -> Self {
        Self {
            policy,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache with the default capacity.
    pub fn with_policy(policy: AccountingPolicy) -> Self {
        Self::new(policy, DEFAULT_CAPACITY)
    }

    /// The policy every cached result was computed with.
    pub const fn policy(&self) -> &AccountingPolicy {
        &self.policy
    }

    /// Returns the totals for `events`, computing them on a miss.
    pub fn totals(&self, events: &[ClockEvent]) -> Arc<TimeTotals> {
        if let Some(cached) = self.lock().get(events) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(events = events.len(), "totals cache hit");
            return Arc::clone(cached);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(events = events.len(), "totals cache miss");
        let computed = Arc::new(calculate_time_totals(events, &self.policy));

        let mut entries = self.lock();
        // Another caller may have filled the slot while we computed.
        if let Some(existing) = entries.get(events) {
            return Arc::clone(existing);
        }
        entries.put(events.to_vec(), Arc::clone(&computed));
        computed
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock().len(),
        }
    }

    /// Drops every cached batch.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<Vec<ClockEvent>, Arc<TimeTotals>>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TotalsCache {
    fn default() -> Self {
        Self::with_policy(AccountingPolicy::default())
    }
}

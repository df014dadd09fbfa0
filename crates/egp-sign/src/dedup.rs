//! Bounded, content-addressed interning of immutable values. Every core object that is shared by value across a `GeneticCode`
//! (type tuples, ref lists, endpoint refs, frozen graphs, signatures, small
//! integers, UUIDs, `TypeDef`s) is passed through its own
//! `ObjectDeduplicator` instance so equal values collapse to one allocation.
use std::hash::Hash;
use std::sync::Mutex;

use egp_error::CoreError;
use lru::LruCache;

use crate::error::{Result, SignError};

/// Marker for mutable-until-frozen values.
/// A type implements this once its invariants make it safe to intern and
/// share; [`ObjectDeduplicator::get_frozen`] refuses anything that reports
/// itself as not yet frozen.
pub trait Freezable {
    fn is_frozen(&self) -> bool;
}

/// Running hit/miss counters for one deduplicator instance, plus a
/// one-line `info()` report.
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupStats {
    pub hits: u64,
    pub misses: u64,
}

impl DedupStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl std::fmt::Display for DedupStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits={} misses={} hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )
    }
}

/// A bounded LRU cache keyed by the value's own hash and equality.
/// `capacity == 0` means pass-through: every `get` is a miss and nothing is
/// retained.
pub struct ObjectDeduplicator<T: Eq + Hash + Clone> {
    capacity: usize,
    cache: Mutex<Option<LruCache<T, T>>>,
    stats: Mutex<DedupStats>,
    label: &'static str,
}

impl<T: Eq + Hash + Clone> ObjectDeduplicator<T> {
    pub fn new(label: &'static str, capacity: usize) -> Self {
        let cache = std::num::NonZeroUsize::new(capacity).map(LruCache::new);
        ObjectDeduplicator {
            capacity,
            cache: Mutex::new(cache),
            stats: Mutex::new(DedupStats::default()),
            label,
        }
    }

    /// Returns the canonical stored instance equal to `value`, inserting it
    /// if this is the first time it has been seen.
    pub fn get(&self, value: T) -> T {
        if self.capacity == 0 {
            self.stats.lock().unwrap().misses += 1;
            return value;
        }
        let mut guard = self.cache.lock().unwrap();
        let cache = guard.as_mut().expect("capacity > 0 implies Some cache");
        if let Some(existing) = cache.get(&value) {
            self.stats.lock().unwrap().hits += 1;
            return existing.clone();
        }
        cache.put(value.clone(), value.clone());
        self.stats.lock().unwrap().misses += 1;
        value
    }

    pub fn stats(&self) -> DedupStats {
        *self.stats.lock().unwrap()
    }

    /// One-line hit-rate summary.
    pub fn info(&self) -> String {
        format!(
            "dedup[{}] capacity={} len={} {}",
            self.label,
            self.capacity,
            self.len(),
            self.stats()
        )
    }

    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .unwrap()
            .as_ref()
            .map(|c| c.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Eq + Hash + Clone + Freezable> ObjectDeduplicator<T> {
    /// Like [`Self::get`] but rejects a value that is not yet frozen: the
    /// caller handed a still-mutable value to a store meant only for
    /// immutable content.
    pub fn get_frozen(&self, value: T) -> Result<T> {
        if !value.is_frozen() {
            return Err(SignError::Core(CoreError::InvariantViolation(format!(
                "dedup[{}] received an unfrozen freezable value",
                self.label
            ))));
        }
        Ok(self.get(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_when_capacity_zero() {
        let dedup = ObjectDeduplicator::new("test", 0);
        assert_eq!(dedup.get(5), 5);
        assert_eq!(dedup.stats().hits, 0);
        assert_eq!(dedup.stats().misses, 1);
        assert!(dedup.is_empty());
    }

    #[test]
    fn repeated_get_is_a_hit_and_returns_canonical_value() {
        let dedup = ObjectDeduplicator::new("test", 16);
        let a = dedup.get(String::from("hello"));
        let b = dedup.get(String::from("hello"));
        assert_eq!(a, b);
        assert_eq!(dedup.stats().misses, 1);
        assert_eq!(dedup.stats().hits, 1);
    }

    #[test]
    fn idempotent_on_repeated_get_of_get() {
        let dedup = ObjectDeduplicator::new("test", 16);
        let once = dedup.get(42);
        let twice = dedup.get(dedup.get(once));
        assert_eq!(once, twice);
    }

    struct Frozenish(bool, u32);
    impl PartialEq for Frozenish {
        fn eq(&self, other: &Self) -> bool {
            self.1 == other.1
        }
    }
    impl Eq for Frozenish {}
    impl Hash for Frozenish {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.1.hash(state)
        }
    }
    impl Clone for Frozenish {
        fn clone(&self) -> Self {
            Frozenish(self.0, self.1)
        }
    }
    impl Freezable for Frozenish {
        fn is_frozen(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn rejects_unfrozen_freezable_input() {
        let dedup: ObjectDeduplicator<Frozenish> = ObjectDeduplicator::new("frozenish", 4);
        assert!(dedup.get_frozen(Frozenish(false, 1)).is_err());
        assert!(dedup.get_frozen(Frozenish(true, 1)).is_ok());
    }
}

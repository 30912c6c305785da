//! Memoizing analyzer wrapper
//!
//! Results are keyed by an MD5 digest of the exact input sequence. Entries
//! are immutable once inserted; an identical input simply overwrites the
//! slot with an identical value. Each operation keeps at most `capacity`
//! results and evicts the oldest insertion first.

use super::traits::{MelodyAnalysis, PatternAnalyzer, Prediction};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Results kept per operation unless configured otherwise
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Cache key: sequence length plus MD5 of its little-endian bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    len: usize,
    digest: [u8; 16],
}

impl SequenceKey {
    pub fn new(notes: &[i32]) -> Self {
        let bytes: Vec<u8> = notes.iter().flat_map(|n| n.to_le_bytes()).collect();
        Self {
            len: notes.len(),
            digest: md5::compute(&bytes).0,
        }
    }
}

/// Entries plus their insertion order, for oldest-first eviction
#[derive(Debug)]
struct SlotMap<T> {
    map: HashMap<SequenceKey, Arc<T>>,
    order: VecDeque<SequenceKey>,
}

/// Many-reader, single-writer map of shared immutable results,
/// holding at most `capacity` entries
#[derive(Debug)]
struct Slots<T> {
    entries: RwLock<SlotMap<T>>,
    capacity: usize,
}

impl<T> Slots<T> {
    fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(SlotMap {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
        }
    }

    fn get(&self, key: &SequenceKey) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.map.get(key).cloned()
    }

    fn insert(&self, key: SequenceKey, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.map.insert(key, Arc::clone(&value)).is_none() {
            entries.order.push_back(key);
        }
        while entries.map.len() > self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.map.remove(&oldest);
                }
                None => break,
            }
        }
        value
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).map.len()
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.map.clear();
        entries.order.clear();
    }
}

/// Analyzer wrapper that memoizes both operations per input sequence
///
/// Safe to share across threads when the wrapped analyzer is.
#[derive(Debug)]
pub struct CachedAnalyzer<A> {
    inner: A,
    analyses: Slots<MelodyAnalysis>,
    predictions: Slots<Prediction>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<A: PatternAnalyzer> CachedAnalyzer<A> {
    pub fn new(inner: A) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// Keep at most `capacity` results per operation
    pub fn with_capacity(inner: A, capacity: usize) -> Self {
        Self {
            inner,
            analyses: Slots::new(capacity),
            predictions: Slots::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped analyzer
    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of cached results across both operations
    pub fn len(&self) -> usize {
        self.analyses.len() + self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached result
    pub fn clear(&self) {
        self.analyses.clear();
        self.predictions.clear();
        log::debug!("Analysis cache cleared");
    }

    fn lookup<T: Clone>(&self, slots: &Slots<T>, notes: &[i32], compute: impl FnOnce() -> T) -> T {
        let key = SequenceKey::new(notes);
        if let Some(hit) = slots.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return (*hit).clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = slots.insert(key, compute());
        (*value).clone()
    }
}

impl<A: PatternAnalyzer> PatternAnalyzer for CachedAnalyzer<A> {
    fn analyze_melody(&self, notes: &[i32]) -> MelodyAnalysis {
        self.lookup(&self.analyses, notes, || self.inner.analyze_melody(notes))
    }

    fn predict_next(&self, recent: &[i32]) -> Prediction {
        self.lookup(&self.predictions, recent, || self.inner.predict_next(recent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MelodyAnalyzer;
    use std::cell::Cell;

    /// Counts calls through to the engine
    struct CountingAnalyzer {
        calls: Cell<usize>,
    }

    impl PatternAnalyzer for CountingAnalyzer {
        fn analyze_melody(&self, notes: &[i32]) -> MelodyAnalysis {
            self.calls.set(self.calls.get() + 1);
            MelodyAnalyzer::new().analyze_melody(notes)
        }

        fn predict_next(&self, recent: &[i32]) -> Prediction {
            self.calls.set(self.calls.get() + 1);
            MelodyAnalyzer::new().predict_next(recent)
        }
    }

    #[test]
    fn test_key_distinguishes_order_and_length() {
        assert_eq!(SequenceKey::new(&[60, 62]), SequenceKey::new(&[60, 62]));
        assert_ne!(SequenceKey::new(&[60, 62]), SequenceKey::new(&[62, 60]));
        assert_ne!(SequenceKey::new(&[]), SequenceKey::new(&[0]));
    }

    #[test]
    fn test_repeated_input_hits_cache() {
        let cached = CachedAnalyzer::new(CountingAnalyzer { calls: Cell::new(0) });
        let notes = [60, 62, 64, 62, 60];

        let first = cached.analyze_melody(&notes);
        let second = cached.analyze_melody(&notes);

        assert_eq!(first, second);
        assert_eq!(cached.inner().calls.get(), 1);
        assert_eq!(cached.hits(), 1);
        assert_eq!(cached.misses(), 1);
    }

    #[test]
    fn test_operations_cached_separately() {
        let cached = CachedAnalyzer::new(CountingAnalyzer { calls: Cell::new(0) });
        let notes = [60, 62, 60, 62, 60];

        cached.analyze_melody(&notes);
        let prediction = cached.predict_next(&notes);

        assert_eq!(prediction.candidates[0].note, 62);
        assert_eq!(cached.inner().calls.get(), 2);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn test_clear_forces_recompute() {
        let cached = CachedAnalyzer::new(CountingAnalyzer { calls: Cell::new(0) });
        cached.analyze_melody(&[1, 2, 3]);
        cached.clear();
        assert!(cached.is_empty());
        cached.analyze_melody(&[1, 2, 3]);
        assert_eq!(cached.inner().calls.get(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cached = CachedAnalyzer::with_capacity(CountingAnalyzer { calls: Cell::new(0) }, 2);
        cached.predict_next(&[1, 2, 1]);
        cached.predict_next(&[3, 4, 3]);
        cached.predict_next(&[5, 6, 5]);
        assert_eq!(cached.len(), 2);

        // newest two still cached
        cached.predict_next(&[3, 4, 3]);
        cached.predict_next(&[5, 6, 5]);
        assert_eq!(cached.inner().calls.get(), 3);

        // oldest was evicted
        cached.predict_next(&[1, 2, 1]);
        assert_eq!(cached.inner().calls.get(), 4);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn test_repeated_insert_does_not_grow() {
        let cached = CachedAnalyzer::with_capacity(MelodyAnalyzer::new(), 1);
        cached.analyze_melody(&[60, 62]);
        cached.analyze_melody(&[60, 62]);
        assert_eq!(cached.len(), 1);
        assert_eq!(cached.hits(), 1);
    }

    #[test]
    fn test_zero_capacity_caches_nothing() {
        let cached = CachedAnalyzer::with_capacity(CountingAnalyzer { calls: Cell::new(0) }, 0);
        let first = cached.analyze_melody(&[60, 64]);
        let second = cached.analyze_melody(&[60, 64]);
        assert_eq!(first, second);
        assert!(cached.is_empty());
        assert_eq!(cached.inner().calls.get(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let cached = Arc::new(CachedAnalyzer::new(MelodyAnalyzer::new()));
        let expected = MelodyAnalyzer::new().analyze_melody(&[60, 64, 67]);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cached = Arc::clone(&cached);
                std::thread::spawn(move || cached.analyze_melody(&[60, 64, 67]))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(cached.hits() + cached.misses(), 4);
    }
}

//! The priority-queue family.
//!
//! Every variant implements the same capability set — `insert`,
//! `extract_min`, `size`, `peek_min_key`, `clear` — over `(f64 key, u32
//! value)` pairs, with FIFO tie-breaking among equal keys realized by an
//! auxiliary monotonically increasing insertion counter compared
//! lexicographically with the key. The router is generic over a single PQ
//! trait with a fixed capability set rather than any one variant;
//! `RouteConfig::heap` selects the concrete type at runtime via
//! [`HeapKind::build`].

mod binary;
mod fibonacci;
mod pairing;
mod quaternary;

pub use binary::BinaryHeapPq;
pub use fibonacci::FibonacciHeapPq;
pub use pairing::PairingHeapPq;
pub use quaternary::QuaternaryHeapPq;

use std::cmp::Ordering;

/// Capability set shared by every PQ variant.
///
/// Keys are real numbers, including `+∞`; values are non-negative
/// integers (node indices, here, though the queue itself is oblivious to
/// that meaning). `peek_min_key`/`clear` are part of the required trait
/// rather than optional methods: the router standardizes on the
/// peek-based termination rule, which needs `peek_min_key` on every PQ
/// implementation, and every variant below can support both cheaply.
pub trait PriorityQueue {
    /// Insert `value` keyed by `key`. Ties among equal keys extract in
    /// insertion order.
    fn insert(&mut self, key: f64, value: u32);

    /// Remove and return the value with the minimum key, or `None` if
    /// empty.
    fn extract_min(&mut self) -> Option<u32>;

    /// Number of live entries.
    fn size(&self) -> usize;

    /// The minimum key currently held, or `+∞` if empty.
    fn peek_min_key(&self) -> f64;

    /// Empty the queue, retaining any allocated capacity.
    fn clear(&mut self);
}

/// Selects which [`PriorityQueue`] implementation `Router` constructs for
/// both search directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeapKind {
    /// Array-backed binary min-heap.
    Binary,
    /// Array-backed 4-ary min-heap — the default, for its better cache
    /// behavior and fewer comparisons per level on this workload.
    #[default]
    Quaternary,
    /// Arena-backed Fibonacci heap.
    Fibonacci,
    /// Arena-backed pairing heap.
    Pairing,
}

impl HeapKind {
    /// Construct a fresh, empty queue of this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn PriorityQueue> {
        match self {
            HeapKind::Binary => Box::<BinaryHeapPq>::default(),
            HeapKind::Quaternary => Box::<QuaternaryHeapPq>::default(),
            HeapKind::Fibonacci => Box::<FibonacciHeapPq>::default(),
            HeapKind::Pairing => Box::<PairingHeapPq>::default(),
        }
    }
}

/// Ordering for `(key, insertion sequence)` pairs: smaller key first, and
/// among equal keys, smaller sequence number (earlier insertion) first.
/// `NaN` keys compare as `Equal` against anything — in practice the keys
/// here are `g`-values and `+∞` sentinels, never `NaN`.
pub(crate) fn cmp_key_seq(key_a: f64, seq_a: u64, key_b: f64, seq_b: u64) -> Ordering {
    key_a
        .partial_cmp(&key_b)
        .unwrap_or(Ordering::Equal)
        .then(seq_a.cmp(&seq_b))
}

#[cfg(test)]
pub(crate) mod conformance {
    //! Shared test scenarios run against every PQ variant. Each module's
    //! own `#[cfg(test)]` block calls these with its concrete type.

    use super::PriorityQueue;

    pub fn single_insert_extract<Q: PriorityQueue + Default>() {
        let mut pq = Q::default();
        pq.insert(5.0, 123);
        assert_eq!(pq.size(), 1);
        assert_eq!(pq.extract_min(), Some(123));
        assert_eq!(pq.size(), 0);
    }

    pub fn fifo_tie_break<Q: PriorityQueue + Default>() {
        let mut pq = Q::default();
        pq.insert(10.0, 1);
        pq.insert(10.0, 2);
        pq.insert(10.0, 3);
        assert_eq!(pq.extract_min(), Some(1));
        assert_eq!(pq.extract_min(), Some(2));
        assert_eq!(pq.extract_min(), Some(3));
    }

    pub fn mixed_keys_extract_in_order<Q: PriorityQueue + Default>() {
        let mut pq = Q::default();
        for (key, value) in [(-10.0, 1), (0.0, 2), (10.0, 3), (-5.0, 4), (5.0, 5)] {
            pq.insert(key, value);
        }
        let extracted: Vec<u32> = std::iter::from_fn(|| pq.extract_min()).collect();
        assert_eq!(extracted, vec![1, 4, 2, 5, 3]);
    }

    pub fn empty_queue_sentinels<Q: PriorityQueue + Default>() {
        let mut pq = Q::default();
        assert_eq!(pq.extract_min(), None);
        assert_eq!(pq.peek_min_key(), f64::INFINITY);
    }

    pub fn clear_retains_usability<Q: PriorityQueue + Default>() {
        let mut pq = Q::default();
        pq.insert(1.0, 1);
        pq.insert(2.0, 2);
        pq.clear();
        assert_eq!(pq.size(), 0);
        assert_eq!(pq.peek_min_key(), f64::INFINITY);
        pq.insert(3.0, 3);
        assert_eq!(pq.extract_min(), Some(3));
    }

    pub fn many_insertions_extract_sorted<Q: PriorityQueue + Default>() {
        let mut pq = Q::default();
        let keys: Vec<f64> = (0..200).map(|i| ((i * 2654435761u32) % 1000) as f64).collect();
        for (value, &key) in keys.iter().enumerate() {
            pq.insert(key, value as u32);
        }
        let mut extracted = Vec::new();
        while let Some(v) = pq.extract_min() {
            extracted.push(keys[v as usize]);
        }
        let mut sorted = keys.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(extracted, sorted);
    }
}

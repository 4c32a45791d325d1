//! 4-ary heap: array-backed complete 4-ary tree.
//!
//! The default PQ, for its better cache behavior and fewer comparisons
//! per level than the binary heap on this workload.

use super::{cmp_key_seq, PriorityQueue};

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: f64,
    seq: u64,
    value: u32,
}

const ARITY: usize = 4;

/// Array-backed 4-ary min-heap with FIFO tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct QuaternaryHeapPq {
    entries: Vec<Entry>,
    next_seq: u64,
}

fn parent(i: usize) -> usize {
    (i - 1) / ARITY
}

fn first_child(i: usize) -> usize {
    ARITY * i + 1
}

impl QuaternaryHeapPq {
    fn less(&self, a: usize, b: usize) -> bool {
        let (ea, eb) = (self.entries[a], self.entries[b]);
        cmp_key_seq(ea.key, ea.seq, eb.key, eb.seq) == std::cmp::Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = parent(i);
            if self.less(i, p) {
                self.entries.swap(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.entries.len();
        loop {
            let first = first_child(i);
            if first >= len {
                break;
            }
            let last_exclusive = (first + ARITY).min(len);
            let mut smallest = i;
            for child in first..last_exclusive {
                if self.less(child, smallest) {
                    smallest = child;
                }
            }
            if smallest == i {
                break;
            }
            self.entries.swap(i, smallest);
            i = smallest;
        }
    }
}

impl PriorityQueue for QuaternaryHeapPq {
    fn insert(&mut self, key: f64, value: u32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { key, seq, value });
        self.sift_up(self.entries.len() - 1);
    }

    fn extract_min(&mut self) -> Option<u32> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let min = self.entries.pop().expect("checked non-empty above");
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(min.value)
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn peek_min_key(&self) -> f64 {
        self.entries.first().map_or(f64::INFINITY, |e| e.key)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::super::conformance::*;
    use super::QuaternaryHeapPq;

    #[test]
    fn single_insert_extract() {
        single_insert_extract::<QuaternaryHeapPq>();
    }

    #[test]
    fn fifo_tie_break() {
        fifo_tie_break::<QuaternaryHeapPq>();
    }

    #[test]
    fn mixed_keys_extract_in_order() {
        mixed_keys_extract_in_order::<QuaternaryHeapPq>();
    }

    #[test]
    fn empty_queue_sentinels() {
        empty_queue_sentinels::<QuaternaryHeapPq>();
    }

    #[test]
    fn clear_retains_usability() {
        clear_retains_usability::<QuaternaryHeapPq>();
    }

    #[test]
    fn many_insertions_extract_sorted() {
        many_insertions_extract_sorted::<QuaternaryHeapPq>();
    }

    #[test]
    fn sift_down_picks_smallest_of_four_children() {
        let mut pq = QuaternaryHeapPq::default();
        for (key, value) in [(5.0, 1), (1.0, 2), (4.0, 3), (2.0, 4), (3.0, 5)] {
            pq.insert(key, value);
        }
        let mut extracted = Vec::new();
        while let Some(v) = pq.extract_min() {
            extracted.push(v);
        }
        assert_eq!(extracted, vec![2, 4, 5, 3, 1]);
    }
}

//! Pairing heap: arena-backed, child/sibling linked.
//!
//! Each node keeps an index to its first child and to its next sibling (a
//! single-linked list, unlike the Fibonacci heap's circular
//! doubly-linked lists) — a simpler constant-factor alternative to the
//! Fibonacci heap with comparable amortized bounds in practice.

use super::{cmp_key_seq, PriorityQueue};
use std::cmp::Ordering;

type NodeRef = u32;

/// Arena-backed pairing heap with FIFO tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct PairingHeapPq {
    key: Vec<f64>,
    seq: Vec<u64>,
    value: Vec<u32>,
    child: Vec<Option<NodeRef>>,
    sibling: Vec<Option<NodeRef>>,
    root: Option<NodeRef>,
    next_seq: u64,
    size: usize,
}

impl PairingHeapPq {
    fn better(&self, a: NodeRef, b: NodeRef) -> bool {
        let (a, b) = (a as usize, b as usize);
        cmp_key_seq(self.key[a], self.seq[a], self.key[b], self.seq[b]) == Ordering::Less
    }

    fn push_node(&mut self, key: f64, value: u32) -> NodeRef {
        let id = NodeRef::try_from(self.key.len()).expect("pairing heap arena exceeds u32::MAX");
        self.key.push(key);
        self.seq.push(self.next_seq);
        self.next_seq += 1;
        self.value.push(value);
        self.child.push(None);
        self.sibling.push(None);
        id
    }

    /// Merge two heaps rooted at `a` and `b` into one, making the
    /// larger-keyed root a child of the smaller-keyed root. Either
    /// argument may be absent; returns the merged root.
    fn merge(&mut self, a: Option<NodeRef>, b: Option<NodeRef>) -> Option<NodeRef> {
        match (a, b) {
            (None, x) | (x, None) => x,
            (Some(a), Some(b)) => {
                let (small, large) = if self.better(a, b) { (a, b) } else { (b, a) };
                self.sibling[large as usize] = self.child[small as usize];
                self.child[small as usize] = Some(large);
                Some(small)
            }
        }
    }

    /// Two-pass pairing merge of a child list: pair adjacent siblings
    /// left-to-right, then merge the resulting list of pairs
    /// right-to-left into a single tree.
    fn merge_pairs(&mut self, first: Option<NodeRef>) -> Option<NodeRef> {
        let Some(first) = first else { return None };
        let next = self.sibling[first as usize];
        self.sibling[first as usize] = None;
        let Some(second) = next else { return Some(first) };
        let rest = self.sibling[second as usize];
        self.sibling[second as usize] = None;

        let pair = self.merge(Some(first), Some(second));
        let rest_merged = self.merge_pairs(rest);
        self.merge(pair, rest_merged)
    }
}

impl PriorityQueue for PairingHeapPq {
    fn insert(&mut self, key: f64, value: u32) {
        let node = self.push_node(key, value);
        self.root = self.merge(self.root, Some(node));
        self.size += 1;
    }

    fn extract_min(&mut self) -> Option<u32> {
        let root = self.root?;
        let merged_children = self.merge_pairs(self.child[root as usize]);
        self.root = merged_children;
        self.size -= 1;
        Some(self.value[root as usize])
    }

    fn size(&self) -> usize {
        self.size
    }

    fn peek_min_key(&self) -> f64 {
        self.root.map_or(f64::INFINITY, |r| self.key[r as usize])
    }

    fn clear(&mut self) {
        self.key.clear();
        self.seq.clear();
        self.value.clear();
        self.child.clear();
        self.sibling.clear();
        self.root = None;
        self.size = 0;
    }
}

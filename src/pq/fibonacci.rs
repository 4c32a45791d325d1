//! Fibonacci heap: a circular doubly-linked root list of heap-ordered
//! trees.
//!
//! Nodes live in an arena rather than as individually allocated,
//! pointer-linked objects: every node occupies a fixed position in a set
//! of parallel `Vec`s, and `next`/`prev` cycles are plain array indices,
//! never pointers, so there is no reference-cycle or drop-order concern.

use super::{cmp_key_seq, PriorityQueue};
use std::cmp::Ordering;

type NodeRef = u32;

/// Arena-backed Fibonacci heap with FIFO tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct FibonacciHeapPq {
    key: Vec<f64>,
    seq: Vec<u64>,
    value: Vec<u32>,
    degree: Vec<u32>,
    parent: Vec<Option<NodeRef>>,
    child: Vec<Option<NodeRef>>,
    next: Vec<NodeRef>,
    prev: Vec<NodeRef>,
    /// Unused: `decrease_key` is not part of this PQ's capability set.
    mark: Vec<bool>,
    min: Option<NodeRef>,
    next_seq: u64,
    size: usize,
}

impl FibonacciHeapPq {
    fn better(&self, a: NodeRef, b: NodeRef) -> bool {
        let (a, b) = (a as usize, b as usize);
        cmp_key_seq(self.key[a], self.seq[a], self.key[b], self.seq[b]) == Ordering::Less
    }

    fn push_node(&mut self, key: f64, value: u32) -> NodeRef {
        let id = NodeRef::try_from(self.key.len()).expect("fibonacci heap arena exceeds u32::MAX");
        self.key.push(key);
        self.seq.push(self.next_seq);
        self.next_seq += 1;
        self.value.push(value);
        self.degree.push(0);
        self.parent.push(None);
        self.child.push(None);
        self.next.push(id);
        self.prev.push(id);
        self.mark.push(false);
        id
    }

    /// Splice the singleton `node` into the root list, updating `min` if
    /// it improves on the current one (or if the root list was empty).
    fn add_to_root_list(&mut self, node: NodeRef) {
        match self.min {
            None => {
                self.next[node as usize] = node;
                self.prev[node as usize] = node;
                self.min = Some(node);
            }
            Some(min) => {
                self.splice_before(min, node);
                if self.better(node, min) {
                    self.min = Some(node);
                }
            }
        }
    }

    /// Insert singleton `node` immediately before `anchor` in whatever
    /// circular list `anchor` belongs to.
    fn splice_before(&mut self, anchor: NodeRef, node: NodeRef) {
        let anchor_prev = self.prev[anchor as usize];
        self.next[anchor_prev as usize] = node;
        self.prev[node as usize] = anchor_prev;
        self.next[node as usize] = anchor;
        self.prev[anchor as usize] = node;
    }

    /// Remove `node` from its circular list. Returns a surviving member of
    /// that list, or `None` if `node` was the list's only member.
    fn unlink(&mut self, node: NodeRef) -> Option<NodeRef> {
        let (p, n) = (self.prev[node as usize], self.next[node as usize]);
        if p == node {
            return None;
        }
        self.next[p as usize] = n;
        self.prev[n as usize] = p;
        Some(n)
    }

    /// Every node in the circular list containing `start`, walking `next`
    /// once around. Collected up front since consolidation restructures
    /// the list as it goes.
    fn list_members(&self, start: NodeRef) -> Vec<NodeRef> {
        let mut members = Vec::new();
        let mut cur = start;
        loop {
            members.push(cur);
            cur = self.next[cur as usize];
            if cur == start {
                break;
            }
        }
        members
    }

    /// Make `child_node` a child of `parent_node` (the smaller-keyed root
    /// wins the parent slot; the caller decides which is which).
    fn link(&mut self, child_node: NodeRef, parent_node: NodeRef) {
        self.unlink(child_node);
        self.next[child_node as usize] = child_node;
        self.prev[child_node as usize] = child_node;

        match self.child[parent_node as usize] {
            None => self.child[parent_node as usize] = Some(child_node),
            Some(existing) => self.splice_before(existing, child_node),
        }
        self.parent[child_node as usize] = Some(parent_node);
        self.degree[parent_node as usize] += 1;
        self.mark[child_node as usize] = false;
    }

    /// Repeatedly link roots of equal degree until at most one root per
    /// degree remains, using a degree table sized `floor(log2 n) + 2`.
    fn consolidate(&mut self) {
        let Some(start) = self.min else { return };
        let roots = self.list_members(start);

        let table_size = ((self.size as f64).log2().floor() as usize) + 2;
        let mut table: Vec<Option<NodeRef>> = vec![None; table_size];

        for root in roots {
            let mut x = root;
            loop {
                let mut d = self.degree[x as usize] as usize;
                while d >= table.len() {
                    table.push(None);
                }
                match table[d] {
                    None => {
                        table[d] = Some(x);
                        break;
                    }
                    Some(y) => {
                        table[d] = None;
                        let (small, large) = if self.better(x, y) { (x, y) } else { (y, x) };
                        self.link(large, small);
                        x = small;
                    }
                }
            }
        }

        self.min = None;
        for slot in table.into_iter().flatten() {
            self.next[slot as usize] = slot;
            self.prev[slot as usize] = slot;
            self.add_to_root_list(slot);
        }
    }
}

impl PriorityQueue for FibonacciHeapPq {
    fn insert(&mut self, key: f64, value: u32) {
        let node = self.push_node(key, value);
        self.add_to_root_list(node);
        self.size += 1;
    }

    fn extract_min(&mut self) -> Option<u32> {
        let z = self.min?;

        if let Some(first_child) = self.child[z as usize] {
            for c in self.list_members(first_child) {
                self.parent[c as usize] = None;
                self.next[c as usize] = c;
                self.prev[c as usize] = c;
                self.add_to_root_list(c);
            }
            self.child[z as usize] = None;
        }

        match self.unlink(z) {
            None => self.min = None,
            Some(survivor) => {
                self.min = Some(survivor);
                self.consolidate();
            }
        }

        self.size -= 1;
        Some(self.value[z as usize])
    }

    fn size(&self) -> usize {
        self.size
    }

    fn peek_min_key(&self) -> f64 {
        self.min.map_or(f64::INFINITY, |m| self.key[m as usize])
    }

    fn clear(&mut self) {
        self.key.clear();
        self.seq.clear();
        self.value.clear();
        self.degree.clear();
        self.parent.clear();
        self.child.clear();
        self.next.clear();
        self.prev.clear();
        self.mark.clear();
        self.min = None;
        self.size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::super::conformance::*;
    use super::FibonacciHeapPq;

    #[test]
    fn single_insert_extract() {
        single_insert_extract::<FibonacciHeapPq>();
    }

    #[test]
    fn fifo_tie_break() {
        fifo_tie_break::<FibonacciHeapPq>();
    }

    #[test]
    fn mixed_keys_extract_in_order() {
        mixed_keys_extract_in_order::<FibonacciHeapPq>();
    }

    #[test]
    fn empty_queue_sentinels() {
        empty_queue_sentinels::<FibonacciHeapPq>();
    }

    #[test]
    fn clear_retains_usability() {
        clear_retains_usability::<FibonacciHeapPq>();
    }

    #[test]
    fn many_insertions_extract_sorted() {
        many_insertions_extract_sorted::<FibonacciHeapPq>();
    }

    #[test]
    fn consolidation_after_several_extractions_stays_correct() {
        // value v is inserted with key (31 - v), so ascending-key order
        // extracts values 31, 30, ..., 0. This walks the heap through
        // several rounds of promote-children-then-consolidate.
        let mut pq = FibonacciHeapPq::default();
        for value in 0..32u32 {
            pq.insert(f64::from(31 - value), value);
        }
        let extracted: Vec<u32> = std::iter::from_fn(|| pq.extract_min()).collect();
        let expected: Vec<u32> = (0..32u32).rev().collect();
        assert_eq!(extracted, expected);
    }
}

//! CSR (Compressed Sparse Row) graph builder.
//!
//! ```text
//! Polylines: [(0,0),(0,1),(0,2)], [(0,1),(1,1)]
//!
//! CSR (undirected, both directions written per segment):
//!   offsets:   [0, 1, 3, 4, 5]   // 4 nodes: (0,0) (0,1) (0,2) (1,1)
//!   neighbors: [1, 0, 2, 3, 1, 1]
//!   weights:   [1, 1, 1, 1, 1, 1]
//! ```
//!
//! `RouteGraph` owns the coordinate interner, the CSR arrays, and a sparse
//! overlay for nodes interned after the CSR was last (re)built. The router
//! reads this structure but never mutates it outside `build`/`expand`.
//!
//! The CSR `offsets` array is authoritative only up to the node count as of
//! the last `build`/`expand` call; it is deliberately *not* extended when
//! `intern` creates a node in between (see `RouteGraph::intern`'s doc
//! comment). That keeps "index `< csr_node_count`" a real distinction
//! rather than one `intern` immediately erases.

use crate::error::RouteError;
use crate::geometry::Coordinate;
use crate::interner::{CoordInterner, NodeIndex};

/// The three-array CSR adjacency.
#[derive(Debug, Clone, Default)]
struct Csr {
    offsets: Vec<u32>,
    neighbors: Vec<u32>,
    weights: Vec<f64>,
}

impl Csr {
    fn empty() -> Self {
        Self {
            offsets: vec![0],
            neighbors: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Number of nodes covered by this CSR snapshot.
    fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    fn neighbor_slice(&self, node: NodeIndex) -> (&[u32], &[f64]) {
        let i = node.index();
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        (&self.neighbors[start..end], &self.weights[start..end])
    }
}

/// A neighbor, weight pair read from either the CSR or the sparse overlay.
pub type Neighbor = (NodeIndex, f64);

/// Iterates `(neighbor, weight)` pairs in storage order — Pass 2 order for
/// CSR entries, append order for overlay entries — over borrowed slices,
/// never allocating. A concrete enum rather than a boxed trait object: this
/// is constructed once per expanded node on the router's hot path, and the
/// spec forbids per-query allocation there.
enum NeighborIter<'a> {
    Csr(std::iter::Zip<std::slice::Iter<'a, u32>, std::slice::Iter<'a, f64>>),
    Overlay(std::slice::Iter<'a, (u32, f64)>),
}

impl Iterator for NeighborIter<'_> {
    type Item = Neighbor;

    fn next(&mut self) -> Option<Neighbor> {
        match self {
            NeighborIter::Csr(iter) => iter.next().map(|(&t, &w)| (NodeIndex(t), w)),
            NeighborIter::Overlay(iter) => iter.next().map(|&(t, w)| (NodeIndex(t), w)),
        }
    }
}

/// Owns the interner, CSR adjacency, and sparse overlay for one routable
/// network. Created empty, grown by [`RouteGraph::build`], optionally
/// mutated by [`RouteGraph::expand`], and torn down with the owning
/// `Router`.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    interner: CoordInterner,
    csr: Csr,
    overlay: Vec<Vec<(u32, f64)>>,
    built: bool,
}

impl RouteGraph {
    /// Create an empty, not-yet-built graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: CoordInterner::new(),
            csr: Csr::empty(),
            overlay: Vec::new(),
            built: false,
        }
    }

    /// `true` once [`RouteGraph::build`] has run at least once.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Number of distinct coordinates interned so far (`N`), which may
    /// exceed the CSR's own node count for coordinates interned via
    /// [`RouteGraph::intern`] (e.g. a query's start/end point) since the
    /// last build/expand.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.interner.len()
    }

    /// The coordinate stored at `idx`.
    #[must_use]
    pub fn coord(&self, idx: NodeIndex) -> Coordinate {
        self.interner.coord(idx)
    }

    /// Intern a coordinate. The single interning entry point used by
    /// `build`, `expand`, and the router's start/end lookup, so every path
    /// that can create a node also extends the sparse overlay for it — the
    /// CSR's own `offsets` array is left untouched here; it only grows on
    /// the next `build`/`expand`.
    pub fn intern(&mut self, coord: Coordinate) -> NodeIndex {
        let (idx, is_new) = self.interner.intern(coord);
        if is_new && self.built {
            self.overlay.push(Vec::new());
        }
        idx
    }

    /// Neighbors of `node`: the CSR slice if `node` is covered by the last
    /// build/expand, otherwise the sparse overlay. Borrows `self`; never
    /// allocates.
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = Neighbor> + '_ {
        if node.index() < self.csr.node_count() {
            let (targets, weights) = self.csr.neighbor_slice(node);
            NeighborIter::Csr(targets.iter().zip(weights.iter()))
        } else {
            NeighborIter::Overlay(self.overlay[node.index()].iter())
        }
    }

    /// Reset everything and build a fresh CSR from `polylines` via the
    /// two-pass degree-count / prefix-sum / fill algorithm.
    pub fn build(
        &mut self,
        polylines: &[Vec<Coordinate>],
        distance: &dyn Fn(Coordinate, Coordinate) -> f64,
    ) {
        self.interner.clear();
        self.csr = Csr::empty();
        self.overlay.clear();
        self.built = true;

        let segments = valid_segments(polylines);
        log::debug!("build_route_graph pass 1: {} candidate segments", segments.len());

        // Pass 1: intern endpoints, count directed-entry degree per node.
        let mut degree: Vec<u32> = Vec::new();
        for &(a, b) in &segments {
            let (u, u_new) = self.interner.intern(a);
            let (v, v_new) = self.interner.intern(b);
            if u_new {
                degree.push(0);
            }
            if v_new {
                degree.push(0);
            }
            degree[u.index()] += 1;
            degree[v.index()] += 1;
        }

        // Prefix sum into offsets.
        let n = self.interner.len();
        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0u32);
        let mut running = 0u32;
        for &d in &degree {
            running += d;
            offsets.push(running);
        }
        let total = running as usize;
        let mut neighbors = vec![0u32; total];
        let mut weights = vec![0.0f64; total];

        // Pass 2: fill neighbor/weight slots using a per-node cursor
        // initialized from offsets.
        log::debug!("build_route_graph pass 2: {n} nodes, {total} directed entries");
        let mut cursor = offsets.clone();
        for &(a, b) in &segments {
            let u = self.interner.get(a).expect("endpoint interned in pass 1");
            let v = self.interner.get(b).expect("endpoint interned in pass 1");
            let w = distance(a, b);

            let u_slot = cursor[u.index()] as usize;
            neighbors[u_slot] = v.0;
            weights[u_slot] = w;
            cursor[u.index()] += 1;

            let v_slot = cursor[v.index()] as usize;
            neighbors[v_slot] = u.0;
            weights[v_slot] = w;
            cursor[v.index()] += 1;
        }

        self.csr = Csr {
            offsets,
            neighbors,
            weights,
        };
        self.overlay = vec![Vec::new(); n];

        log::info!("build_route_graph: {n} nodes, {total} directed entries");
    }

    /// Intern any new coordinates, append new segments to the sparse
    /// overlay, then rebuild the CSR by merging existing entries with the
    /// overlay.
    pub fn expand(
        &mut self,
        additional_polylines: &[Vec<Coordinate>],
        distance: &dyn Fn(Coordinate, Coordinate) -> f64,
    ) -> Result<(), RouteError> {
        if !self.built {
            return Err(RouteError::NotBuilt);
        }

        let segments = valid_segments(additional_polylines);
        let old_csr_node_count = self.csr.node_count();

        for &(a, b) in &segments {
            let u = self.intern(a);
            let v = self.intern(b);
            let w = distance(a, b);
            self.overlay[u.index()].push((v.0, w));
            self.overlay[v.index()].push((u.0, w));
        }

        let n = self.interner.len();

        // (a) sum degree from existing CSR slices and the overlay.
        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0u32);
        let mut running = 0u32;
        for i in 0..n {
            let existing = if i < old_csr_node_count {
                let (targets, _) = self
                    .csr
                    .neighbor_slice(NodeIndex(u32::try_from(i).expect("node index fits u32")));
                targets.len() as u32
            } else {
                0
            };
            running += existing + self.overlay[i].len() as u32;
            offsets.push(running);
        }

        // (b) allocate new arrays; (c) copy existing entries, then overlay.
        let total = running as usize;
        let mut neighbors = vec![0u32; total];
        let mut weights = vec![0.0f64; total];
        let mut cursor = offsets.clone();

        for i in 0..n {
            let node = NodeIndex(u32::try_from(i).expect("node index fits u32"));
            if i < old_csr_node_count {
                let (targets, w) = self.csr.neighbor_slice(node);
                let slot = cursor[i] as usize;
                neighbors[slot..slot + targets.len()].copy_from_slice(targets);
                weights[slot..slot + w.len()].copy_from_slice(w);
                cursor[i] += targets.len() as u32;
            }
            for &(t, w) in &self.overlay[i] {
                let slot = cursor[i] as usize;
                neighbors[slot] = t;
                weights[slot] = w;
                cursor[i] += 1;
            }
        }

        self.csr = Csr {
            offsets,
            neighbors,
            weights,
        };
        // (d) clear the overlay, retaining its per-node allocations.
        for slot in &mut self.overlay {
            slot.clear();
        }

        log::info!("expand_route_graph: {n} nodes, {total} directed entries");
        Ok(())
    }
}

/// Drop polylines with fewer than 2 coordinates and segments touching a
/// non-finite coordinate; everything else becomes a `(a, b)` segment pair,
/// in polyline/position order.
fn valid_segments(polylines: &[Vec<Coordinate>]) -> Vec<(Coordinate, Coordinate)> {
    let mut segments = Vec::new();
    for line in polylines {
        if line.len() < 2 {
            continue;
        }
        for pair in line.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.is_finite_pair() && b.is_finite_pair() {
                segments.push((a, b));
            }
        }
    }
    segments
}

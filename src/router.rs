//! The bidirectional-search router.
//!
//! `Router` owns a [`RouteGraph`], a [`RouteConfig`], per-instance scratch
//! buffers, and the two PQ instances used by each search direction. None
//! of this is safe to share across threads without external
//! synchronization — a router instance is not safe for concurrent
//! `get_route` calls.

use crate::error::RouteError;
use crate::geometry::{haversine_km, Coordinate};
use crate::interner::NodeIndex;
use crate::pq::{HeapKind, PriorityQueue};
use crate::storage::RouteGraph;

/// Configuration recognized by [`Router`]: `distance_measurement` and `heap`.
pub struct RouteConfig {
    /// Edge-weight function. Must be non-negative and symmetric. Default:
    /// [`haversine_km`].
    pub distance_measurement: Box<dyn Fn(Coordinate, Coordinate) -> f64 + Send + Sync>,
    /// PQ implementation used for both search directions. Default:
    /// [`HeapKind::Quaternary`].
    pub heap: HeapKind,
}

impl std::fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteConfig")
            .field("distance_measurement", &"<fn>")
            .field("heap", &self.heap)
            .finish()
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            distance_measurement: Box::new(haversine_km),
            heap: HeapKind::default(),
        }
    }
}

/// Per-router scratch state, reused across queries. Resized
/// geometrically as the graph grows; only the first `N` elements are reset
/// at the top of each query.
#[derive(Debug, Clone, Default)]
struct Scratch {
    g_forward: Vec<f64>,
    g_reverse: Vec<f64>,
    prev_forward: Vec<Option<NodeIndex>>,
    next_reverse: Vec<Option<NodeIndex>>,
    visited_forward: Vec<bool>,
    visited_reverse: Vec<bool>,
}

impl Scratch {
    fn ensure_capacity(&mut self, n: usize) {
        let cap = self.g_forward.len();
        if cap >= n {
            return;
        }
        let new_cap = n.max(cap * 2).max(16);
        self.g_forward.resize(new_cap, f64::INFINITY);
        self.g_reverse.resize(new_cap, f64::INFINITY);
        self.prev_forward.resize(new_cap, None);
        self.next_reverse.resize(new_cap, None);
        self.visited_forward.resize(new_cap, false);
        self.visited_reverse.resize(new_cap, false);
    }

    fn reset(&mut self, n: usize) {
        self.g_forward[..n].fill(f64::INFINITY);
        self.g_reverse[..n].fill(f64::INFINITY);
        self.prev_forward[..n].fill(None);
        self.next_reverse[..n].fill(None);
        self.visited_forward[..n].fill(false);
        self.visited_reverse[..n].fill(false);
    }
}

/// Owns the routable network and the per-query search machinery.
/// `build_route_graph`/`expand_route_graph` populate the network;
/// `get_route` answers shortest-path queries against it.
pub struct Router {
    graph: RouteGraph,
    config: RouteConfig,
    scratch: Scratch,
    open_forward: Box<dyn PriorityQueue>,
    open_reverse: Box<dyn PriorityQueue>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("graph", &self.graph)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new(RouteConfig::default())
    }
}

impl Router {
    /// Build a router with no network yet. `get_route`/`expand_route_graph`
    /// fail with `NotBuilt` until [`Router::build_route_graph`] runs.
    #[must_use]
    pub fn new(config: RouteConfig) -> Self {
        let open_forward = config.heap.build();
        let open_reverse = config.heap.build();
        Self {
            graph: RouteGraph::new(),
            config,
            scratch: Scratch::default(),
            open_forward,
            open_reverse,
        }
    }

    /// Reset and rebuild the CSR network from `polylines`.
    pub fn build_route_graph(&mut self, polylines: &[Vec<Coordinate>]) {
        self.graph.build(polylines, self.config.distance_measurement.as_ref());
    }

    /// Merge `additional_polylines` into the existing network.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotBuilt`] if [`Router::build_route_graph`]
    /// has never been called.
    pub fn expand_route_graph(&mut self, additional_polylines: &[Vec<Coordinate>]) -> Result<(), RouteError> {
        self.graph.expand(additional_polylines, self.config.distance_measurement.as_ref())
    }

    /// Bidirectional Dijkstra from `start` to `end`. Returns `Ok(None)`
    /// when the two points are identical or no
    /// path connects them; otherwise the shortest polyline, first
    /// coordinate `start`, last coordinate `end`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotBuilt`] if [`Router::build_route_graph`]
    /// has never been called.
    pub fn get_route(&mut self, start: Coordinate, end: Coordinate) -> Result<Option<Vec<Coordinate>>, RouteError> {
        if !self.graph.is_built() {
            return Err(RouteError::NotBuilt);
        }

        let start_index = self.graph.intern(start);
        let end_index = self.graph.intern(end);
        if start_index == end_index {
            return Ok(None);
        }

        let n = self.graph.node_count();
        self.scratch.ensure_capacity(n);
        self.scratch.reset(n);
        self.open_forward.clear();
        self.open_reverse.clear();

        self.scratch.g_forward[start_index.index()] = 0.0;
        self.scratch.g_reverse[end_index.index()] = 0.0;
        self.open_forward.insert(0.0, start_index.0);
        self.open_reverse.insert(0.0, end_index.0);

        let mut best = f64::INFINITY;
        let mut meeting: Option<NodeIndex> = None;

        loop {
            if self.open_forward.size() == 0 || self.open_reverse.size() == 0 {
                break;
            }
            if meeting.is_some() {
                let lower_bound = self.open_forward.peek_min_key() + self.open_reverse.peek_min_key();
                if lower_bound >= best {
                    break;
                }
            }

            if self.open_forward.size() <= self.open_reverse.size() {
                self.expand_forward(&mut best, &mut meeting);
            } else {
                self.expand_reverse(&mut best, &mut meeting);
            }
        }

        match meeting {
            Some(meeting) => Ok(self.reconstruct(start_index, end_index, meeting)),
            None => Ok(None),
        }
    }

    /// Extract and relax one node from the forward frontier.
    fn expand_forward(&mut self, best: &mut f64, meeting: &mut Option<NodeIndex>) {
        let Some(u) = self.open_forward.extract_min() else { return };
        let u = NodeIndex(u);
        if self.scratch.visited_forward[u.index()] {
            return;
        }
        self.scratch.visited_forward[u.index()] = true;

        if self.scratch.visited_reverse[u.index()] {
            let total = self.scratch.g_forward[u.index()] + self.scratch.g_reverse[u.index()];
            if total < *best {
                *best = total;
                *meeting = Some(u);
            }
        }

        let g_u = self.scratch.g_forward[u.index()];
        for (v, w) in self.graph.neighbors(u) {
            let tentative = g_u + w;
            if tentative < self.scratch.g_forward[v.index()] {
                self.scratch.g_forward[v.index()] = tentative;
                self.scratch.prev_forward[v.index()] = Some(u);
                if self.scratch.g_reverse[v.index()] < f64::INFINITY {
                    let total = tentative + self.scratch.g_reverse[v.index()];
                    if total < *best {
                        *best = total;
                        *meeting = Some(v);
                    }
                }
                self.open_forward.insert(tentative, v.0);
            }
        }
    }

    /// Extract and relax one node from the reverse frontier. Mirrors
    /// [`Router::expand_forward`] with `g_reverse`/`next_reverse`.
    fn expand_reverse(&mut self, best: &mut f64, meeting: &mut Option<NodeIndex>) {
        let Some(u) = self.open_reverse.extract_min() else { return };
        let u = NodeIndex(u);
        if self.scratch.visited_reverse[u.index()] {
            return;
        }
        self.scratch.visited_reverse[u.index()] = true;

        if self.scratch.visited_forward[u.index()] {
            let total = self.scratch.g_forward[u.index()] + self.scratch.g_reverse[u.index()];
            if total < *best {
                *best = total;
                *meeting = Some(u);
            }
        }

        let g_u = self.scratch.g_reverse[u.index()];
        for (v, w) in self.graph.neighbors(u) {
            let tentative = g_u + w;
            if tentative < self.scratch.g_reverse[v.index()] {
                self.scratch.g_reverse[v.index()] = tentative;
                self.scratch.next_reverse[v.index()] = Some(u);
                if self.scratch.g_forward[v.index()] < f64::INFINITY {
                    let total = tentative + self.scratch.g_forward[v.index()];
                    if total < *best {
                        *best = total;
                        *meeting = Some(v);
                    }
                }
                self.open_reverse.insert(tentative, v.0);
            }
        }
    }

    /// Walk `prev_forward` from `meeting` back to `start`, then
    /// `next_reverse` from `meeting` forward to `end`. Returns `None` if
    /// either walk fails to reach its target — an inconsistent-state guard
    /// that should never trigger given a correct search, mapped to the
    /// absence of a route rather than a panic.
    fn reconstruct(&self, start: NodeIndex, end: NodeIndex, meeting: NodeIndex) -> Option<Vec<Coordinate>> {
        let mut path = Vec::new();
        let mut cur = meeting;
        loop {
            path.push(self.graph.coord(cur));
            if cur == start {
                break;
            }
            cur = self.scratch.prev_forward[cur.index()]?;
        }
        path.reverse();

        let mut cur = meeting;
        while cur != end {
            cur = self.scratch.next_reverse[cur.index()]?;
            path.push(self.graph.coord(cur));
        }

        Some(path)
    }
}

/// Single-ended A*, an optional alternative to the bidirectional search
/// above, available behind `feature = "astar"`. Uses `distance_measurement` as
/// both edge weight and heuristic, which is admissible whenever that
/// function satisfies the triangle inequality (true of both defaults in
/// `crate::geometry`).
#[cfg(feature = "astar")]
impl Router {
    /// `get_route_astar(start, end)`: forward-only A* search. Semantics
    /// match [`Router::get_route`] (same preconditions, same trivial-case
    /// and no-path handling) but explores a single frontier guided by the
    /// heuristic instead of running two Dijkstra searches to a meeting
    /// point.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotBuilt`] if [`Router::build_route_graph`]
    /// has never been called.
    pub fn get_route_astar(&mut self, start: Coordinate, end: Coordinate) -> Result<Option<Vec<Coordinate>>, RouteError> {
        if !self.graph.is_built() {
            return Err(RouteError::NotBuilt);
        }

        let start_index = self.graph.intern(start);
        let end_index = self.graph.intern(end);
        if start_index == end_index {
            return Ok(None);
        }

        let n = self.graph.node_count();
        self.scratch.ensure_capacity(n);
        self.scratch.reset(n);
        self.open_forward.clear();

        let end_coord = self.graph.coord(end_index);
        let heuristic = |coord: Coordinate| (self.config.distance_measurement)(coord, end_coord);

        self.scratch.g_forward[start_index.index()] = 0.0;
        self.open_forward.insert(heuristic(start), start_index.0);

        while let Some(u) = self.open_forward.extract_min() {
            let u = NodeIndex(u);
            if self.scratch.visited_forward[u.index()] {
                continue;
            }
            self.scratch.visited_forward[u.index()] = true;

            if u == end_index {
                return Ok(self.reconstruct_forward_only(start_index, end_index));
            }

            let g_u = self.scratch.g_forward[u.index()];
            for (v, w) in self.graph.neighbors(u) {
                let tentative = g_u + w;
                if tentative < self.scratch.g_forward[v.index()] {
                    self.scratch.g_forward[v.index()] = tentative;
                    self.scratch.prev_forward[v.index()] = Some(u);
                    let priority = tentative + heuristic(self.graph.coord(v));
                    self.open_forward.insert(priority, v.0);
                }
            }
        }

        Ok(None)
    }

    /// Walk `prev_forward` from `end` back to `start` (single-ended
    /// analog of [`Router::reconstruct`]'s forward half).
    fn reconstruct_forward_only(&self, start: NodeIndex, end: NodeIndex) -> Option<Vec<Coordinate>> {
        let mut path = Vec::new();
        let mut cur = end;
        loop {
            path.push(self.graph.coord(cur));
            if cur == start {
                break;
            }
            cur = self.scratch.prev_forward[cur.index()]?;
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::planar;

    fn line(coords: &[(f64, f64)]) -> Vec<Coordinate> {
        coords.iter().map(|&(lng, lat)| Coordinate::new(lng, lat)).collect()
    }

    fn planar_router() -> Router {
        Router::new(RouteConfig {
            distance_measurement: Box::new(planar),
            heap: HeapKind::default(),
        })
    }

    fn path_coords(path: &[Coordinate]) -> Vec<(f64, f64)> {
        path.iter().map(|c| (c.lng, c.lat)).collect()
    }

    #[test]
    fn not_built_before_build_route_graph() {
        let mut router = planar_router();
        let err = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0));
        assert_eq!(err, Err(RouteError::NotBuilt));
    }

    #[test]
    fn l_shape_scenario() {
        let mut router = planar_router();
        router.build_route_graph(&[
            line(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]),
            line(&[(0.0, 1.0), (1.0, 1.0)]),
        ]);
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)).unwrap().unwrap();
        assert_eq!(path_coords(&path), vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
    }

    #[test]
    fn direct_vs_detour_scenario() {
        let mut router = planar_router();
        router.build_route_graph(&[
            line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            line(&[(1.0, 0.0), (1.0, 1.0), (2.0, 0.0)]),
        ]);
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 0.0)).unwrap().unwrap();
        assert_eq!(path_coords(&path), vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    }

    #[test]
    fn disconnected_scenario_returns_no_route() {
        let mut router = planar_router();
        router.build_route_graph(&[line(&[(0.0, 0.0), (1.0, 0.0)]), line(&[(5.0, 5.0), (6.0, 5.0)])]);
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(6.0, 5.0)).unwrap();
        assert_eq!(path, None);
    }

    #[test]
    fn identical_endpoints_return_no_route() {
        let mut router = planar_router();
        router.build_route_graph(&[line(&[(0.0, 0.0), (1.0, 0.0)])]);
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(path, None);
    }

    #[test]
    fn reverse_segment_orientation_scenario() {
        let mut router = planar_router();
        router.build_route_graph(&[line(&[(1.0, 0.0), (0.0, 0.0)]), line(&[(2.0, 0.0), (1.0, 0.0)])]);
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 0.0)).unwrap().unwrap();
        assert_eq!(path_coords(&path), vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    }

    #[test]
    fn self_loop_tolerance_scenario() {
        let mut router = planar_router();
        router.build_route_graph(&[line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]);
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 0.0)).unwrap().unwrap();
        let coords = path_coords(&path);
        assert_eq!(coords.first(), Some(&(0.0, 0.0)));
        assert_eq!(coords.last(), Some(&(2.0, 0.0)));
        for pair in coords.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn reversibility_matches_forward_cost() {
        let mut router = planar_router();
        router.build_route_graph(&[
            line(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]),
            line(&[(0.0, 1.0), (1.0, 1.0)]),
        ]);
        let forward = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)).unwrap().unwrap();
        let backward = router.get_route(Coordinate::new(1.0, 1.0), Coordinate::new(0.0, 0.0)).unwrap().unwrap();
        let mut reversed = backward.clone();
        reversed.reverse();
        assert_eq!(path_coords(&forward), path_coords(&reversed));
    }

    #[test]
    fn unbuilt_nodes_are_unreachable_until_expand() {
        let mut router = planar_router();
        router.build_route_graph(&[line(&[(0.0, 0.0), (1.0, 0.0)])]);
        // Interning (5,5) via a query without a prior expand leaves it
        // disconnected from the rest of the network.
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 5.0)).unwrap();
        assert_eq!(path, None);

        router
            .expand_route_graph(&[line(&[(1.0, 0.0), (5.0, 5.0)])])
            .unwrap();
        let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 5.0)).unwrap();
        assert!(path.is_some());
    }

    #[test]
    fn pq_equivalence_across_variants() {
        let polylines = [
            line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]),
            line(&[(1.0, 0.0), (1.0, 1.0), (2.0, 0.0)]),
            line(&[(0.0, 0.0), (0.0, 3.0), (3.0, 0.0)]),
        ];
        let mut costs = Vec::new();
        for heap in [HeapKind::Binary, HeapKind::Quaternary, HeapKind::Fibonacci, HeapKind::Pairing] {
            let mut router = Router::new(RouteConfig {
                distance_measurement: Box::new(planar),
                heap,
            });
            router.build_route_graph(&polylines);
            let path = router.get_route(Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 0.0)).unwrap().unwrap();
            let cost: f64 = path.windows(2).map(|w| planar(w[0], w[1])).sum();
            costs.push(cost);
        }
        for window in costs.windows(2) {
            assert!((window[0] - window[1]).abs() < 1e-9, "costs differ across PQ variants: {costs:?}");
        }
    }
}

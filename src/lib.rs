//! meshpath: bidirectional shortest-path routing over a coordinate-joined
//! polyline network.
//!
//! # Overview
//!
//! meshpath builds a Compressed Sparse Row (CSR) adjacency from a set of
//! polylines whose endpoints join by exact coordinate equality, then
//! answers shortest-path queries between two points with bidirectional
//! Dijkstra search over a choice of four priority-queue implementations.
//!
//! # Quick Start
//!
//! ```
//! use meshpath::{Coordinate, Router};
//!
//! let mut router = Router::default();
//! router.build_route_graph(&[
//!     vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0), Coordinate::new(0.0, 2.0)],
//!     vec![Coordinate::new(0.0, 1.0), Coordinate::new(1.0, 1.0)],
//! ]);
//!
//! let path = router
//!     .get_route(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
//!     .unwrap();
//! assert!(path.is_some());
//! ```
//!
//! # Architecture
//!
//! - **Interner**: bit-exact coordinate-to-node-index mapping ([`interner`]).
//! - **Storage**: CSR adjacency plus a sparse overlay for nodes added since
//!   the last build/expand ([`storage`]).
//! - **PQ family**: binary, 4-ary, Fibonacci, and pairing heaps behind one
//!   trait ([`pq`]).
//! - **Router**: bidirectional search over the two, with reusable scratch
//!   buffers ([`router`]).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod geometry;
pub mod interner;
pub mod pq;
pub mod router;
pub mod storage;

pub use error::RouteError;
pub use geometry::{haversine_km, planar, Coordinate};
pub use interner::NodeIndex;
pub use pq::{BinaryHeapPq, FibonacciHeapPq, HeapKind, PairingHeapPq, PriorityQueue, QuaternaryHeapPq};
pub use router::{RouteConfig, Router};
pub use storage::RouteGraph;

//! Error taxonomy for the routing core.
//!
//! The core surfaces exactly one error kind. Everything else that can be
//! described as an "outcome" (no route, ignored malformed input) is an
//! ordinary return value, never a `Result::Err`.

use thiserror::Error;

/// Errors raised by [`crate::Router`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// Raised by `get_route`/`expand_route_graph` when `build_route_graph`
    /// has never been called.
    #[error("build_route_graph must be called before this operation")]
    NotBuilt,
}

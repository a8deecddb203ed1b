//! Static route synthesis module.
//!
//! Computes the forwarding entries of every switch and host from the address
//! plan, and traces paths through the result to check reachability.

pub mod types;
pub mod synthesizer;
pub mod trace;

pub use types::{RouteEntry, RouteError, RouteTable, DEFAULT_ROUTE};
pub use synthesizer::{routes_for, synthesize_routes, ROOT_AGGR, ROOT_EDGE};
pub use trace::{trace_route, verify_host_reachability, MAX_HOPS};

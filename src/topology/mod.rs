//! Fat-tree topology module.
//!
//! Pure arithmetic over the arity K: layer sizes, node handles, link
//! numbering and wiring. Nothing here stores state; every consumer recomputes
//! coordinates from integer ids through [`TopologyCounts`].

pub mod types;
pub mod connections;
pub mod nodes;

// Re-export key types and functions for easier access
pub use types::{
    HostPosition, LinkLayer, LinkSide, NodeId, PodPosition, SwitchKind, TopologyCounts,
    TopologyError, MAX_ARITY,
};
pub use connections::{AggrLink, CoreLink, EdgeLink, Link};

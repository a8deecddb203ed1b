//! Traffic matrix generation.
//!
//! Selects (source, destination) host pairs under one of several policies
//! and schedules them as flows for a traffic generator.

pub mod generators;
pub mod pool;
pub mod types;

pub use generators::{
    generate_half_duplex_pairs, generate_matrix, generate_random_fanout, generate_single_pair,
    generate_stride, schedule_flows, RECEIVER_LEAD,
};
pub use pool::NodePool;
pub use types::{FlowPair, FlowParams, FlowSpec, TrafficError, TrafficMatrix, TrafficPolicy};

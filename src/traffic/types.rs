//! Traffic matrix type definitions.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::ip::AddressError;

/// Errors raised by the traffic generators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrafficError {
    #[error("Half-duplex pairing needs an even number of hosts, got {hosts}")]
    OddHostCount { hosts: usize },

    #[error("Stride {stride} maps every host onto itself with {hosts} hosts")]
    InvalidStride { stride: usize, hosts: usize },

    #[error("Host {host} out of range (fabric has {hosts} hosts)")]
    UnknownHost { host: usize, hosts: usize },

    #[error("{flows_per_host} flows per host exceeds the host count {hosts}")]
    TooManyFlows { flows_per_host: usize, hosts: usize },

    #[error("Host pool ran dry after {drawn} draws")]
    PoolExhausted { drawn: usize },

    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Destination selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPolicy {
    /// Every host sends `flows_per_host` flows to pooled random destinations
    #[default]
    RandomFanout,
    /// Hosts are paired off at random, one unidirectional flow per pair
    HalfDuplex,
    /// Host `i` sends to host `i + stride`
    Stride,
    /// One flow between two fixed hosts
    SinglePair,
}

/// Unidirectional flow between two host ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FlowPair {
    pub source: usize,
    pub destination: usize,
}

impl FlowPair {
    pub fn new(source: usize, destination: usize) -> Self {
        FlowPair { source, destination }
    }
}

/// Knobs handed to the traffic generator process on the source host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowParams {
    /// Concurrent flows per generator
    pub flows: u32,
    /// Flow size distribution name
    pub distribution: String,
    /// Packet length in bytes
    pub length: u32,
    /// Randomize source ports
    pub random: bool,
    /// Packets per flow
    pub count: u64,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            flows: 20,
            distribution: "same".to_string(),
            length: 1024,
            random: true,
            count: 150,
        }
    }
}

/// A scheduled flow, ready for a simulation driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSpec {
    pub source: usize,
    pub destination: usize,
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    #[serde(with = "humantime_serde")]
    pub start_time: Duration,
    /// When a receiver must be started on the destination, if one is needed
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub receiver_start_time: Option<Duration>,
    pub params: FlowParams,
}

/// The generated matrix together with how it was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrafficMatrix {
    pub policy: TrafficPolicy,
    pub seed: u64,
    pub flows: Vec<FlowSpec>,
}

impl TrafficMatrix {
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

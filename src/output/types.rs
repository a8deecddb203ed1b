//! Output manifest type definitions.
//!
//! These structures are serialized into `network.yaml` and describe the
//! generated fabric to an external simulation driver: which nodes exist,
//! which interfaces they carry, and how the links connect them.

use ipnet::Ipv4Net;
use serde::Serialize;
use std::time::Duration;

use crate::routing::RouteEntry;
use crate::topology::{LinkLayer, NodeId, TopologyCounts};

/// Root of `network.yaml`.
#[derive(Serialize, Debug)]
pub struct NetworkManifest {
    /// Run-wide settings
    pub general: ManifestGeneral,
    /// Derived fabric dimensions
    pub topology: TopologyCounts,
    /// Parameters shared by every point-to-point link
    pub link_parameters: LinkParameters,
    /// All switches and hosts, core first
    pub nodes: Vec<ManifestNode>,
    /// All links, layer by layer in index order
    pub links: Vec<ManifestLink>,
}

/// Run-wide settings.
#[derive(Serialize, Debug)]
pub struct ManifestGeneral {
    /// Simulated time at which the run stops
    #[serde(with = "humantime_serde")]
    pub stop_time: Duration,
    /// Seed the traffic matrix was drawn with
    pub seed: u64,
}

/// Point-to-point link parameters.
#[derive(Serialize, Debug)]
pub struct LinkParameters {
    /// Data rate as configured, e.g. "10Mbps"
    pub data_rate: String,
    /// Data rate in bits per second
    pub data_rate_bps: u64,
    /// One-way propagation delay
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

/// A switch or host.
#[derive(Serialize, Debug)]
pub struct ManifestNode {
    /// Stable node name, e.g. `aggr-1-0`
    pub name: String,
    /// Tier and id
    pub node: NodeId,
    /// Loopback address (core and aggregation switches only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loopback: Option<Ipv4Net>,
    /// Interfaces in device order
    pub interfaces: Vec<ManifestInterface>,
}

/// One configured interface.
#[derive(Serialize, Debug)]
pub struct ManifestInterface {
    /// Device name, e.g. `sim0`
    pub name: String,
    /// Address with prefix length
    pub address: Ipv4Net,
    /// Name of the node on the other end of the link
    pub peer: String,
}

/// One link between two nodes.
#[derive(Serialize, Debug)]
pub struct ManifestLink {
    pub layer: LinkLayer,
    /// Index within the layer
    pub index: usize,
    /// Upper-tier endpoint
    pub a: LinkEndpoint,
    /// Lower-tier endpoint
    pub b: LinkEndpoint,
}

/// One end of a link.
#[derive(Serialize, Debug)]
pub struct LinkEndpoint {
    pub node: String,
    pub interface: String,
    pub address: Ipv4Net,
}

/// Routes of one node, as written to `routes.json`.
#[derive(Serialize, Debug)]
pub struct NodeRoutes {
    /// Stable node name
    pub owner: String,
    pub node: NodeId,
    /// Entries in emission order
    pub routes: Vec<RouteEntry>,
}

//! Topology type definitions.
//!
//! This file contains the derived fat-tree dimensions, the node handles used by
//! every other module, and the closed-form mappings between integer ids and
//! `(pod, position)` coordinates.

use serde::Serialize;
use std::fmt;

/// Largest arity whose addresses still fit the fixed octet encoding.
///
/// The core-link first octet reaches `K² / 4` and must stay below the
/// aggregation–edge range that starts at 101.
pub const MAX_ARITY: usize = 20;

/// Errors raised by topology derivation and index arithmetic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Invalid arity {arity}: must be a positive even integer no larger than {max}")]
    InvalidArity { arity: usize, max: usize },

    #[error("{what} {value} out of range (must be below {bound})")]
    IndexOutOfRange {
        what: &'static str,
        value: usize,
        bound: usize,
    },
}

/// Check `value < bound`, naming the offending quantity on failure.
pub(crate) fn check_range(
    what: &'static str,
    value: usize,
    bound: usize,
) -> Result<(), TopologyError> {
    if value < bound {
        Ok(())
    } else {
        Err(TopologyError::IndexOutOfRange { what, value, bound })
    }
}

/// Every size derived from the arity K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopologyCounts {
    pub arity: usize,
    pub half: usize,
    pub pods: usize,
    pub aggr_per_pod: usize,
    pub edge_per_pod: usize,
    pub hosts_per_edge: usize,
    pub hosts_per_pod: usize,
    pub core_switches: usize,
    pub aggr_switches: usize,
    pub edge_switches: usize,
    pub hosts: usize,
}

impl TopologyCounts {
    /// Derive all layer sizes from the arity.
    ///
    /// # Examples
    /// ```
    /// use fattree::topology::TopologyCounts;
    ///
    /// let counts = TopologyCounts::derive(4).unwrap();
    /// assert_eq!(counts.core_switches, 4);
    /// assert_eq!(counts.hosts, 16);
    /// assert!(TopologyCounts::derive(3).is_err());
    /// ```
    pub fn derive(arity: usize) -> Result<Self, TopologyError> {
        if arity == 0 || arity % 2 != 0 || arity > MAX_ARITY {
            return Err(TopologyError::InvalidArity { arity, max: MAX_ARITY });
        }

        let half = arity / 2;
        let pods = arity;
        let aggr_per_pod = half;
        let edge_per_pod = half;
        let hosts_per_edge = half;
        let hosts_per_pod = hosts_per_edge * edge_per_pod;

        Ok(TopologyCounts {
            arity,
            half,
            pods,
            aggr_per_pod,
            edge_per_pod,
            hosts_per_edge,
            hosts_per_pod,
            core_switches: half * half,
            aggr_switches: aggr_per_pod * pods,
            edge_switches: edge_per_pod * pods,
            hosts: hosts_per_pod * pods,
        })
    }

    /// Number of core–aggregation links
    pub fn core_links(&self) -> usize {
        self.core_switches * self.pods
    }

    /// Number of aggregation–edge links
    pub fn aggr_links(&self) -> usize {
        self.aggr_per_pod * self.edge_per_pod * self.pods
    }

    /// Number of edge–host links (one per host)
    pub fn edge_links(&self) -> usize {
        self.hosts
    }

    /// Number of links in the given layer
    pub fn links_in(&self, layer: LinkLayer) -> usize {
        match layer {
            LinkLayer::CoreAggr => self.core_links(),
            LinkLayer::AggrEdge => self.aggr_links(),
            LinkLayer::EdgeHost => self.edge_links(),
        }
    }

    /// Total number of switches and hosts
    pub fn total_nodes(&self) -> usize {
        self.core_switches + self.aggr_switches + self.edge_switches + self.hosts
    }

    /// Aggregation position (within every pod) a core switch attaches to
    pub fn core_group(&self, core: usize) -> Result<usize, TopologyError> {
        check_range("core switch", core, self.core_switches)?;
        Ok(core / self.half)
    }

    /// Core switches attached to the aggregation switch at `aggr` in each pod
    pub fn core_switches_of_group(
        &self,
        aggr: usize,
    ) -> Result<std::ops::Range<usize>, TopologyError> {
        check_range("aggregation index", aggr, self.aggr_per_pod)?;
        Ok(aggr * self.half..(aggr + 1) * self.half)
    }

    pub fn aggr_switch_id(&self, pod: usize, aggr: usize) -> Result<usize, TopologyError> {
        check_range("pod", pod, self.pods)?;
        check_range("aggregation index", aggr, self.aggr_per_pod)?;
        Ok(self.aggr_per_pod * pod + aggr)
    }

    pub fn decode_aggr_switch(&self, id: usize) -> Result<PodPosition, TopologyError> {
        check_range("aggregation switch", id, self.aggr_switches)?;
        Ok(PodPosition {
            pod: id / self.aggr_per_pod,
            index: id % self.aggr_per_pod,
        })
    }

    pub fn edge_switch_id(&self, pod: usize, edge: usize) -> Result<usize, TopologyError> {
        check_range("pod", pod, self.pods)?;
        check_range("edge index", edge, self.edge_per_pod)?;
        Ok(self.edge_per_pod * pod + edge)
    }

    pub fn decode_edge_switch(&self, id: usize) -> Result<PodPosition, TopologyError> {
        check_range("edge switch", id, self.edge_switches)?;
        Ok(PodPosition {
            pod: id / self.edge_per_pod,
            index: id % self.edge_per_pod,
        })
    }

    pub fn host_id(&self, pod: usize, edge: usize, host: usize) -> Result<usize, TopologyError> {
        check_range("pod", pod, self.pods)?;
        check_range("edge index", edge, self.edge_per_pod)?;
        check_range("host index", host, self.hosts_per_edge)?;
        Ok(self.hosts_per_pod * pod + self.hosts_per_edge * edge + host)
    }

    pub fn decode_host_id(&self, id: usize) -> Result<HostPosition, TopologyError> {
        check_range("host", id, self.hosts)?;
        Ok(HostPosition {
            pod: id / self.hosts_per_pod,
            edge: (id / self.hosts_per_edge) % self.edge_per_pod,
            index: id % self.hosts_per_edge,
        })
    }

    /// Check that a node handle lies within the derived counts
    pub fn check_node(&self, node: NodeId) -> Result<(), TopologyError> {
        match node {
            NodeId::Core(id) => check_range("core switch", id, self.core_switches),
            NodeId::Aggr(id) => check_range("aggregation switch", id, self.aggr_switches),
            NodeId::Edge(id) => check_range("edge switch", id, self.edge_switches),
            NodeId::Host(id) => check_range("host", id, self.hosts),
        }
    }

    /// Stable, human-readable node name used in manifests and route dumps
    pub fn node_name(&self, node: NodeId) -> Result<String, TopologyError> {
        Ok(match node {
            NodeId::Core(id) => {
                check_range("core switch", id, self.core_switches)?;
                format!("core-{}", id)
            }
            NodeId::Aggr(id) => {
                let pos = self.decode_aggr_switch(id)?;
                format!("aggr-{}-{}", pos.pod, pos.index)
            }
            NodeId::Edge(id) => {
                let pos = self.decode_edge_switch(id)?;
                format!("edge-{}-{}", pos.pod, pos.index)
            }
            NodeId::Host(id) => {
                let pos = self.decode_host_id(id)?;
                format!("host-{}-{}-{}", pos.pod, pos.edge, pos.index)
            }
        })
    }
}

/// Position of an aggregation or edge switch inside its pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PodPosition {
    pub pod: usize,
    pub index: usize,
}

/// Position of a host below its edge switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostPosition {
    pub pod: usize,
    pub edge: usize,
    pub index: usize,
}

/// Switch tiers that carry a loopback address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    Core,
    Aggr,
}

/// Handle of any switch or host in the fabric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeId {
    Core(usize),
    Aggr(usize),
    Edge(usize),
    Host(usize),
}

impl NodeId {
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(id) => write!(f, "core#{}", id),
            Self::Aggr(id) => write!(f, "aggr#{}", id),
            Self::Edge(id) => write!(f, "edge#{}", id),
            Self::Host(id) => write!(f, "host#{}", id),
        }
    }
}

/// The three link tiers of a fat-tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkLayer {
    /// Core switch to aggregation switch
    CoreAggr,
    /// Aggregation switch to edge switch
    AggrEdge,
    /// Edge switch to host
    EdgeHost,
}

impl LinkLayer {
    pub const ALL: [LinkLayer; 3] = [LinkLayer::CoreAggr, LinkLayer::AggrEdge, LinkLayer::EdgeHost];
}

/// Endpoint of a link: side A is the upper tier, side B the lower tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSide {
    A,
    B,
}

impl LinkSide {
    /// Last octet of the endpoint address on its /24
    pub fn host_octet(&self) -> u8 {
        match self {
            Self::A => 1,
            Self::B => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_k4_matches_canonical_configuration() {
        let c = TopologyCounts::derive(4).unwrap();
        assert_eq!(c.pods, 4);
        assert_eq!(c.aggr_per_pod, 2);
        assert_eq!(c.edge_per_pod, 2);
        assert_eq!(c.hosts_per_edge, 2);
        assert_eq!(c.core_switches, 4);
        assert_eq!(c.aggr_switches, 8);
        assert_eq!(c.edge_switches, 8);
        assert_eq!(c.hosts, 16);
        assert_eq!(c.core_links(), 16);
        assert_eq!(c.aggr_links(), 16);
        assert_eq!(c.edge_links(), 16);
        assert_eq!(c.total_nodes(), 36);
    }

    #[test]
    fn test_derive_rejects_invalid_arity() {
        for k in [0, 1, 3, 7, 22, MAX_ARITY + 2, 64] {
            assert!(
                matches!(TopologyCounts::derive(k), Err(TopologyError::InvalidArity { .. })),
                "arity {} should be rejected",
                k
            );
        }
        assert!(TopologyCounts::derive(2).is_ok());
        assert!(TopologyCounts::derive(MAX_ARITY).is_ok());
    }

    #[test]
    fn test_host_id_bijection() {
        for k in [2, 4, 6, 8] {
            let c = TopologyCounts::derive(k).unwrap();
            let mut expected = 0;
            for pod in 0..c.pods {
                for edge in 0..c.edge_per_pod {
                    for host in 0..c.hosts_per_edge {
                        let id = c.host_id(pod, edge, host).unwrap();
                        assert_eq!(id, expected);
                        let pos = c.decode_host_id(id).unwrap();
                        assert_eq!((pos.pod, pos.edge, pos.index), (pod, edge, host));
                        expected += 1;
                    }
                }
            }
            assert_eq!(expected, c.hosts);
        }
    }

    #[test]
    fn test_switch_id_bijection() {
        let c = TopologyCounts::derive(6).unwrap();
        for pod in 0..c.pods {
            for idx in 0..c.aggr_per_pod {
                let id = c.aggr_switch_id(pod, idx).unwrap();
                assert_eq!(c.decode_aggr_switch(id).unwrap(), PodPosition { pod, index: idx });
                let id = c.edge_switch_id(pod, idx).unwrap();
                assert_eq!(c.decode_edge_switch(id).unwrap(), PodPosition { pod, index: idx });
            }
        }
    }

    #[test]
    fn test_out_of_range_is_reported() {
        let c = TopologyCounts::derive(4).unwrap();
        assert_eq!(
            c.decode_host_id(16),
            Err(TopologyError::IndexOutOfRange { what: "host", value: 16, bound: 16 })
        );
        assert!(c.host_id(4, 0, 0).is_err());
        assert!(c.aggr_switch_id(0, 2).is_err());
        assert!(c.core_group(4).is_err());
        assert!(c.check_node(NodeId::Edge(8)).is_err());
        assert!(c.check_node(NodeId::Edge(7)).is_ok());
    }

    #[test]
    fn test_core_groups() {
        let c = TopologyCounts::derive(4).unwrap();
        assert_eq!(c.core_group(0).unwrap(), 0);
        assert_eq!(c.core_group(1).unwrap(), 0);
        assert_eq!(c.core_group(2).unwrap(), 1);
        assert_eq!(c.core_switches_of_group(1).unwrap(), 2..4);
    }

    #[test]
    fn test_node_names() {
        let c = TopologyCounts::derive(4).unwrap();
        assert_eq!(c.node_name(NodeId::Core(3)).unwrap(), "core-3");
        assert_eq!(c.node_name(NodeId::Aggr(5)).unwrap(), "aggr-2-1");
        assert_eq!(c.node_name(NodeId::Edge(2)).unwrap(), "edge-1-0");
        assert_eq!(c.node_name(NodeId::Host(7)).unwrap(), "host-1-1-1");
    }
}

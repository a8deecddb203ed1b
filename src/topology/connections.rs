//! Link numbering and wiring.
//!
//! Links in each layer are numbered by nested iteration with the pod as the
//! outer loop. Address assignment and route synthesis both recompute the same
//! index from coordinates, so every encoder here has an exact inverse.

use serde::Serialize;

use super::types::{check_range, LinkLayer, LinkSide, NodeId, TopologyCounts, TopologyError};

/// Coordinates of a core–aggregation link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreLink {
    pub pod: usize,
    pub core: usize,
}

/// Coordinates of an aggregation–edge link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AggrLink {
    pub pod: usize,
    pub aggr: usize,
    pub edge: usize,
}

/// Coordinates of an edge–host link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeLink {
    pub pod: usize,
    pub edge: usize,
    pub host: usize,
}

/// A wired link: upper endpoint (side A), lower endpoint (side B) and its
/// per-layer index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub layer: LinkLayer,
    pub index: usize,
    pub upper: NodeId,
    pub lower: NodeId,
}

impl Link {
    pub fn endpoint(&self, side: LinkSide) -> NodeId {
        match side {
            LinkSide::A => self.upper,
            LinkSide::B => self.lower,
        }
    }
}

impl TopologyCounts {
    pub fn core_link_index(&self, pod: usize, core: usize) -> Result<usize, TopologyError> {
        check_range("pod", pod, self.pods)?;
        check_range("core switch", core, self.core_switches)?;
        Ok(self.core_switches * pod + core)
    }

    pub fn decode_core_link(&self, index: usize) -> Result<CoreLink, TopologyError> {
        check_range("core link", index, self.core_links())?;
        Ok(CoreLink {
            pod: index / self.core_switches,
            core: index % self.core_switches,
        })
    }

    pub fn aggr_link_index(
        &self,
        pod: usize,
        aggr: usize,
        edge: usize,
    ) -> Result<usize, TopologyError> {
        check_range("pod", pod, self.pods)?;
        check_range("aggregation index", aggr, self.aggr_per_pod)?;
        check_range("edge index", edge, self.edge_per_pod)?;
        Ok(self.edge_per_pod * self.aggr_per_pod * pod + self.edge_per_pod * aggr + edge)
    }

    pub fn decode_aggr_link(&self, index: usize) -> Result<AggrLink, TopologyError> {
        check_range("aggregation link", index, self.aggr_links())?;
        let per_pod = self.edge_per_pod * self.aggr_per_pod;
        Ok(AggrLink {
            pod: index / per_pod,
            aggr: (index % per_pod) / self.edge_per_pod,
            edge: index % self.edge_per_pod,
        })
    }

    pub fn edge_link_index(
        &self,
        pod: usize,
        edge: usize,
        host: usize,
    ) -> Result<usize, TopologyError> {
        // Same numbering as host ids: one link per host.
        self.host_id(pod, edge, host)
    }

    pub fn decode_edge_link(&self, index: usize) -> Result<EdgeLink, TopologyError> {
        check_range("edge link", index, self.edge_links())?;
        let pos = self.decode_host_id(index)?;
        Ok(EdgeLink {
            pod: pos.pod,
            edge: pos.edge,
            host: pos.index,
        })
    }

    /// Resolve a link index to its endpoints
    pub fn link(&self, layer: LinkLayer, index: usize) -> Result<Link, TopologyError> {
        let (upper, lower) = match layer {
            LinkLayer::CoreAggr => {
                let l = self.decode_core_link(index)?;
                let aggr = self.aggr_switch_id(l.pod, self.core_group(l.core)?)?;
                (NodeId::Core(l.core), NodeId::Aggr(aggr))
            }
            LinkLayer::AggrEdge => {
                let l = self.decode_aggr_link(index)?;
                (
                    NodeId::Aggr(self.aggr_switch_id(l.pod, l.aggr)?),
                    NodeId::Edge(self.edge_switch_id(l.pod, l.edge)?),
                )
            }
            LinkLayer::EdgeHost => {
                let l = self.decode_edge_link(index)?;
                (
                    NodeId::Edge(self.edge_switch_id(l.pod, l.edge)?),
                    NodeId::Host(index),
                )
            }
        };
        Ok(Link { layer, index, upper, lower })
    }

    /// All links of a layer in index order
    pub fn links(&self, layer: LinkLayer) -> impl Iterator<Item = Link> + '_ {
        (0..self.links_in(layer)).filter_map(move |index| self.link(layer, index).ok())
    }

    /// Per-node interface number of a link endpoint.
    ///
    /// Interfaces are numbered in wiring order: core links first, then
    /// aggregation links, then host links, so a switch's uplinks always come
    /// before its downlinks.
    pub fn interface_index(
        &self,
        layer: LinkLayer,
        index: usize,
        side: LinkSide,
    ) -> Result<usize, TopologyError> {
        Ok(match (layer, side) {
            // Each core switch has one link per pod.
            (LinkLayer::CoreAggr, LinkSide::A) => self.decode_core_link(index)?.pod,
            // Aggregation uplinks are ordered by the attached core switch.
            (LinkLayer::CoreAggr, LinkSide::B) => self.decode_core_link(index)?.core % self.half,
            // Aggregation downlinks follow its `half` uplinks.
            (LinkLayer::AggrEdge, LinkSide::A) => self.half + self.decode_aggr_link(index)?.edge,
            (LinkLayer::AggrEdge, LinkSide::B) => self.decode_aggr_link(index)?.aggr,
            (LinkLayer::EdgeHost, LinkSide::A) => {
                self.aggr_per_pod + self.decode_edge_link(index)?.host
            }
            (LinkLayer::EdgeHost, LinkSide::B) => {
                check_range("edge link", index, self.edge_links())?;
                0
            }
        })
    }
}

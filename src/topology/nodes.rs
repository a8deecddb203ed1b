//! Canonical node enumeration.

use super::types::{NodeId, TopologyCounts};

impl TopologyCounts {
    /// Core switches in id order
    pub fn core_nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.core_switches).map(NodeId::Core)
    }

    pub fn aggr_nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.aggr_switches).map(NodeId::Aggr)
    }

    pub fn edge_nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.edge_switches).map(NodeId::Edge)
    }

    pub fn host_nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.hosts).map(NodeId::Host)
    }

    /// Every switch, top tier first
    pub fn switch_nodes(&self) -> impl Iterator<Item = NodeId> {
        self.core_nodes().chain(self.aggr_nodes()).chain(self.edge_nodes())
    }

    /// Every node: switches top-down, then hosts
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeId> {
        self.switch_nodes().chain(self.host_nodes())
    }
}

//! IP address registry.
//!
//! This file enumerates every address the plan hands out (link interfaces
//! and loopbacks) and keeps a registry of which node owns which address, so
//! that uniqueness can be checked and next hops resolved back to nodes.

use ipnet::Ipv4Net;
use serde::Serialize;
use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::allocator::{AddressError, AddressPlan, LinkAddress};
use crate::topology::{LinkLayer, LinkSide, NodeId, SwitchKind};

/// One configured interface on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceAssignment {
    pub node: NodeId,
    /// Device name on the node, e.g. `sim0`
    pub interface: String,
    pub layer: LinkLayer,
    pub link: usize,
    pub side: LinkSide,
    pub address: LinkAddress,
}

/// Loopback address of a core or aggregation switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopbackAssignment {
    pub node: NodeId,
    pub address: Ipv4Net,
}

impl AddressPlan {
    /// Every link interface in the fabric, layer by layer in link order
    pub fn interface_assignments(&self) -> Result<Vec<InterfaceAssignment>, AddressError> {
        let counts = self.counts();
        let links = counts.core_links() + counts.aggr_links() + counts.edge_links();
        let mut assignments = Vec::with_capacity(2 * links);

        for layer in LinkLayer::ALL {
            for index in 0..counts.links_in(layer) {
                let link = counts.link(layer, index)?;
                for side in [LinkSide::A, LinkSide::B] {
                    let ifindex = counts.interface_index(layer, index, side)?;
                    assignments.push(InterfaceAssignment {
                        node: link.endpoint(side),
                        interface: format!("sim{}", ifindex),
                        layer,
                        link: index,
                        side,
                        address: self.link_address(layer, index, side)?,
                    });
                }
            }
        }

        Ok(assignments)
    }

    /// Loopbacks of all core switches, then all aggregation switches
    pub fn loopback_assignments(&self) -> Result<Vec<LoopbackAssignment>, AddressError> {
        let counts = self.counts();
        let mut assignments = Vec::with_capacity(counts.core_switches + counts.aggr_switches);

        for id in 0..counts.core_switches {
            assignments.push(LoopbackAssignment {
                node: NodeId::Core(id),
                address: self.loopback_address(SwitchKind::Core, id)?,
            });
        }
        for id in 0..counts.aggr_switches {
            assignments.push(LoopbackAssignment {
                node: NodeId::Aggr(id),
                address: self.loopback_address(SwitchKind::Aggr, id)?,
            });
        }

        Ok(assignments)
    }
}

/// Registry of assigned addresses, mapping each address to its owner
#[derive(Debug, Default)]
pub struct AddressRegistry {
    owners: HashMap<Ipv4Addr, NodeId>,
    /// Directly connected subnets per node
    connected: HashMap<NodeId, Vec<Ipv4Net>>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every interface and loopback of the plan, failing on the
    /// first address handed out twice.
    pub fn from_plan(plan: &AddressPlan) -> Result<Self, AddressError> {
        let mut registry = Self::new();
        for assignment in plan.interface_assignments()? {
            registry.register(assignment.address.address, assignment.node)?;
            registry
                .connected
                .entry(assignment.node)
                .or_default()
                .push(assignment.address.network());
        }
        for loopback in plan.loopback_assignments()? {
            registry.register(loopback.address.addr(), loopback.node)?;
        }
        log::debug!("Address registry holds {} addresses", registry.len());
        Ok(registry)
    }

    /// Record `address` as owned by `node`. Every address is registered once.
    pub fn register(&mut self, address: Ipv4Addr, node: NodeId) -> Result<(), AddressError> {
        match self.owners.get(&address) {
            Some(&existing) if existing == node => Err(AddressError::Duplicate { address, node }),
            Some(&existing) => Err(AddressError::Conflict { address, existing, node }),
            None => {
                self.owners.insert(address, node);
                Ok(())
            }
        }
    }

    /// Node owning an address, if any
    pub fn owner_of(&self, address: Ipv4Addr) -> Option<NodeId> {
        self.owners.get(&address).copied()
    }

    /// Subnets directly attached to a node
    pub fn connected_networks(&self, node: NodeId) -> &[Ipv4Net] {
        self.connected.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

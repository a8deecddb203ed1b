//! IP address allocation logic.
//!
//! Every address in the fabric is a pure function of topology coordinates:
//!
//! - core–aggregation link `(pod, core)`: `{core+1}.{pod+1}.{core/K2+1}.0/24`
//! - aggregation–edge link `(pod, aggr, edge)`: `{pod+101}.{aggr+1}.{edge+1}.0/24`
//! - edge–host link `(pod, edge, host)`: `{pod+201}.{edge+1}.{host+1}.0/24`
//! - core loopback: `{core prefix}.{core+1}/32`
//! - aggregation loopback: `{aggr prefix}.{pod+1}.{aggr+1}/32`
//!
//! Side A (upper tier) takes `.1`, side B (lower tier) takes `.2`. The `+100`
//! and `+200` offsets are fixed; route prefixes are derived from the same
//! scheme, so they are not configurable per instance.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::topology::types::check_range;
use crate::topology::{LinkLayer, LinkSide, NodeId, SwitchKind, TopologyCounts, TopologyError};

/// Highest value a derived octet may take
pub const MAX_OCTET: usize = 254;

/// First-octet offset of aggregation–edge link subnets
pub const AGGR_EDGE_OFFSET: usize = 100;

/// First-octet offset of edge–host link subnets and host aggregates
pub const EDGE_HOST_OFFSET: usize = 200;

/// Prefix length of every point-to-point link subnet
pub const LINK_PREFIX_LEN: u8 = 24;

/// Errors raised while deriving addresses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address space exhausted: {what} octet would be {value} (maximum {max})")]
    AddressSpaceExhausted {
        what: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Address {address} assigned to {existing} is also assigned to {node}")]
    Conflict {
        address: Ipv4Addr,
        existing: NodeId,
        node: NodeId,
    },

    #[error("Address {address} assigned twice to {node}")]
    Duplicate { address: Ipv4Addr, node: NodeId },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Encode a derived value as an octet, refusing anything above [`MAX_OCTET`].
pub fn octet(what: &'static str, value: usize) -> Result<u8, AddressError> {
    if value > MAX_OCTET {
        return Err(AddressError::AddressSpaceExhausted { what, value, max: MAX_OCTET });
    }
    Ok(value as u8)
}

/// Leading octets of the loopback ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopbackPrefixes {
    /// First three octets of core loopbacks
    pub core_prefix: [u8; 3],
    /// First two octets of aggregation loopbacks
    pub aggr_prefix: [u8; 2],
}

impl Default for LoopbackPrefixes {
    fn default() -> Self {
        Self {
            core_prefix: [250, 255, 255],
            aggr_prefix: [250, 255],
        }
    }
}

/// Address of one link endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LinkAddress {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
    pub broadcast: Ipv4Addr,
}

impl LinkAddress {
    fn on(network: Ipv4Net, side: LinkSide) -> Self {
        let [a, b, c, _] = network.network().octets();
        LinkAddress {
            address: Ipv4Addr::new(a, b, c, side.host_octet()),
            prefix_len: network.prefix_len(),
            broadcast: network.broadcast(),
        }
    }

    /// Address with its prefix length, e.g. `1.1.1.1/24`
    pub fn interface(&self) -> Ipv4Net {
        Ipv4Net::new_assert(self.address, self.prefix_len)
    }

    /// Subnet the address lives on
    pub fn network(&self) -> Ipv4Net {
        self.interface().trunc()
    }
}

/// Deterministic address plan for one fat-tree instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressPlan {
    counts: TopologyCounts,
    loopback: LoopbackPrefixes,
}

impl AddressPlan {
    /// Build the plan, failing if the largest coordinates overflow an octet
    /// or core link subnets would reach into the aggregation–edge range.
    pub fn new(counts: TopologyCounts, loopback: LoopbackPrefixes) -> Result<Self, AddressError> {
        octet("core switch", counts.core_switches)?;
        if counts.core_switches > AGGR_EDGE_OFFSET {
            return Err(AddressError::AddressSpaceExhausted {
                what: "core link",
                value: counts.core_switches,
                max: AGGR_EDGE_OFFSET,
            });
        }
        octet("pod", counts.pods)?;
        octet("edge-host pod", counts.pods + EDGE_HOST_OFFSET)?;
        octet("aggregation index", counts.aggr_per_pod)?;
        octet("edge index", counts.edge_per_pod)?;
        octet("host index", counts.hosts_per_edge)?;

        Ok(AddressPlan { counts, loopback })
    }

    pub fn counts(&self) -> &TopologyCounts {
        &self.counts
    }

    pub fn loopback_prefixes(&self) -> &LoopbackPrefixes {
        &self.loopback
    }

    /// The /24 subnet of a link
    pub fn link_network(&self, layer: LinkLayer, index: usize) -> Result<Ipv4Net, AddressError> {
        let c = &self.counts;
        let octets = match layer {
            LinkLayer::CoreAggr => {
                let l = c.decode_core_link(index)?;
                [
                    octet("core switch", l.core + 1)?,
                    octet("pod", l.pod + 1)?,
                    octet("core group", c.core_group(l.core)? + 1)?,
                ]
            }
            LinkLayer::AggrEdge => {
                let l = c.decode_aggr_link(index)?;
                [
                    octet("aggregation-edge pod", l.pod + 1 + AGGR_EDGE_OFFSET)?,
                    octet("aggregation index", l.aggr + 1)?,
                    octet("edge index", l.edge + 1)?,
                ]
            }
            LinkLayer::EdgeHost => {
                let l = c.decode_edge_link(index)?;
                [
                    octet("edge-host pod", l.pod + 1 + EDGE_HOST_OFFSET)?,
                    octet("edge index", l.edge + 1)?,
                    octet("host index", l.host + 1)?,
                ]
            }
        };
        Ok(Ipv4Net::new_assert(
            Ipv4Addr::new(octets[0], octets[1], octets[2], 0),
            LINK_PREFIX_LEN,
        ))
    }

    /// Address of one side of a link
    ///
    /// # Examples
    /// ```
    /// use fattree::ip::{AddressPlan, LoopbackPrefixes};
    /// use fattree::topology::{LinkLayer, LinkSide, TopologyCounts};
    ///
    /// let counts = TopologyCounts::derive(4).unwrap();
    /// let plan = AddressPlan::new(counts, LoopbackPrefixes::default()).unwrap();
    /// let a = plan.link_address(LinkLayer::CoreAggr, 0, LinkSide::A).unwrap();
    /// assert_eq!(a.interface().to_string(), "1.1.1.1/24");
    /// assert_eq!(a.broadcast.to_string(), "1.1.1.255");
    /// ```
    pub fn link_address(
        &self,
        layer: LinkLayer,
        index: usize,
        side: LinkSide,
    ) -> Result<LinkAddress, AddressError> {
        Ok(LinkAddress::on(self.link_network(layer, index)?, side))
    }

    pub fn core_link_address(
        &self,
        pod: usize,
        core: usize,
        side: LinkSide,
    ) -> Result<LinkAddress, AddressError> {
        let index = self.counts.core_link_index(pod, core)?;
        self.link_address(LinkLayer::CoreAggr, index, side)
    }

    pub fn aggr_link_address(
        &self,
        pod: usize,
        aggr: usize,
        edge: usize,
        side: LinkSide,
    ) -> Result<LinkAddress, AddressError> {
        let index = self.counts.aggr_link_index(pod, aggr, edge)?;
        self.link_address(LinkLayer::AggrEdge, index, side)
    }

    pub fn edge_link_address(
        &self,
        pod: usize,
        edge: usize,
        host: usize,
        side: LinkSide,
    ) -> Result<LinkAddress, AddressError> {
        let index = self.counts.edge_link_index(pod, edge, host)?;
        self.link_address(LinkLayer::EdgeHost, index, side)
    }

    /// Routable identity of a host: the host side of its edge link
    pub fn host_address(&self, host: usize) -> Result<Ipv4Addr, AddressError> {
        Ok(self.link_address(LinkLayer::EdgeHost, host, LinkSide::B)?.address)
    }

    /// Loopback /32 of a core or aggregation switch
    pub fn loopback_address(&self, kind: SwitchKind, id: usize) -> Result<Ipv4Net, AddressError> {
        let addr = match kind {
            SwitchKind::Core => {
                check_range("core switch", id, self.counts.core_switches)?;
                let [a, b, c] = self.loopback.core_prefix;
                Ipv4Addr::new(a, b, c, octet("core loopback", id + 1)?)
            }
            SwitchKind::Aggr => {
                let pos = self.counts.decode_aggr_switch(id)?;
                let [a, b] = self.loopback.aggr_prefix;
                Ipv4Addr::new(
                    a,
                    b,
                    octet("aggregation loopback pod", pos.pod + 1)?,
                    octet("aggregation loopback index", pos.index + 1)?,
                )
            }
        };
        Ok(Ipv4Net::new_assert(addr, 32))
    }

    /// Aggregate of every host subnet in a pod: `{pod+201}.0.0.0/8`
    pub fn pod_prefix(&self, pod: usize) -> Result<Ipv4Net, AddressError> {
        check_range("pod", pod, self.counts.pods)?;
        let first = octet("edge-host pod", pod + 1 + EDGE_HOST_OFFSET)?;
        Ok(Ipv4Net::new_assert(Ipv4Addr::new(first, 0, 0, 0), 8))
    }

    /// Aggregate of the host subnets below one edge switch: `{pod+201}.{edge+1}.0.0/16`
    pub fn edge_prefix(&self, pod: usize, edge: usize) -> Result<Ipv4Net, AddressError> {
        check_range("edge index", edge, self.counts.edge_per_pod)?;
        let first = self.pod_prefix(pod)?.network().octets()[0];
        Ok(Ipv4Net::new_assert(Ipv4Addr::new(first, octet("edge index", edge + 1)?, 0, 0), 16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use crate::topology::MAX_ARITY;

    fn plan(k: usize) -> AddressPlan {
        AddressPlan::new(TopologyCounts::derive(k).unwrap(), LoopbackPrefixes::default()).unwrap()
    }

    #[test]
    fn test_k4_worked_example() {
        let p = plan(4);
        let a = p.core_link_address(0, 0, LinkSide::A).unwrap();
        let b = p.core_link_address(0, 0, LinkSide::B).unwrap();
        assert_eq!(a.interface().to_string(), "1.1.1.1/24");
        assert_eq!(b.interface().to_string(), "1.1.1.2/24");

        let a = p.edge_link_address(0, 0, 0, LinkSide::A).unwrap();
        let b = p.edge_link_address(0, 0, 0, LinkSide::B).unwrap();
        assert_eq!(a.interface().to_string(), "201.1.1.1/24");
        assert_eq!(b.interface().to_string(), "201.1.1.2/24");
        assert_eq!(b.broadcast, Ipv4Addr::new(201, 1, 1, 255));
    }

    #[test]
    fn test_layer_encodings() {
        let p = plan(4);
        // Core 3 sits in group 1.
        let a = p.core_link_address(2, 3, LinkSide::B).unwrap();
        assert_eq!(a.address, Ipv4Addr::new(4, 3, 2, 2));

        let a = p.aggr_link_address(3, 1, 0, LinkSide::A).unwrap();
        assert_eq!(a.address, Ipv4Addr::new(104, 2, 1, 1));
        assert_eq!(a.network().to_string(), "104.2.1.0/24");

        assert_eq!(p.host_address(15).unwrap(), Ipv4Addr::new(204, 2, 2, 2));
    }

    #[test]
    fn test_loopbacks() {
        let p = plan(4);
        assert_eq!(
            p.loopback_address(SwitchKind::Core, 0).unwrap().to_string(),
            "250.255.255.1/32"
        );
        assert_eq!(p.loopback_address(SwitchKind::Aggr, 5).unwrap().to_string(), "250.255.3.2/32");
        assert!(p.loopback_address(SwitchKind::Core, 4).is_err());

        let custom = AddressPlan::new(
            TopologyCounts::derive(4).unwrap(),
            LoopbackPrefixes { core_prefix: [10, 0, 0], aggr_prefix: [10, 1] },
        )
        .unwrap();
        let core = custom.loopback_address(SwitchKind::Core, 2).unwrap();
        let aggr = custom.loopback_address(SwitchKind::Aggr, 0).unwrap();
        assert_eq!(core.to_string(), "10.0.0.3/32");
        assert_eq!(aggr.to_string(), "10.1.1.1/32");
    }

    #[test]
    fn test_aggregate_prefixes() {
        let p = plan(4);
        assert_eq!(p.pod_prefix(0).unwrap().to_string(), "201.0.0.0/8");
        assert_eq!(p.edge_prefix(3, 1).unwrap().to_string(), "204.2.0.0/16");
        assert!(p.pod_prefix(4).is_err());
        assert!(p.pod_prefix(0).unwrap().contains(&p.host_address(3).unwrap()));
    }

    #[test]
    fn test_link_addresses_are_unique() {
        for k in (2..=MAX_ARITY).step_by(2) {
            let p = plan(k);
            let mut seen = HashSet::new();
            for layer in LinkLayer::ALL {
                for index in 0..p.counts().links_in(layer) {
                    for side in [LinkSide::A, LinkSide::B] {
                        let a = p.link_address(layer, index, side).unwrap();
                        let fresh = seen.insert(a.address);
                        assert!(fresh, "duplicate address {} for k={}", a.address, k);
                    }
                }
            }
        }
    }

    #[test]
    fn test_octet_ceiling() {
        assert_eq!(octet("x", 254), Ok(254));
        assert_eq!(
            octet("x", 255),
            Err(AddressError::AddressSpaceExhausted { what: "x", value: 255, max: MAX_OCTET })
        );
        // The largest supported arity still fits.
        let largest = TopologyCounts::derive(MAX_ARITY).unwrap();
        assert!(AddressPlan::new(largest, LoopbackPrefixes::default()).is_ok());
    }

    #[test]
    fn test_core_links_stay_below_aggregation_range() {
        // Counts for K=22, which derive() refuses
        let mut counts = TopologyCounts::derive(20).unwrap();
        counts.arity = 22;
        counts.half = 11;
        counts.core_switches = 121;
        assert_eq!(
            AddressPlan::new(counts, LoopbackPrefixes::default()),
            Err(AddressError::AddressSpaceExhausted {
                what: "core link",
                value: 121,
                max: AGGR_EDGE_OFFSET
            })
        );
    }
}

//! Hop-by-hop path tracing over a synthesized route table.
//!
//! Emulates what the forwarding substrate does with the installed entries:
//! deliver on a connected subnet, otherwise follow the longest matching
//! prefix. Used to check that the static tables actually connect the fabric.

use std::net::Ipv4Addr;

use super::types::{RouteError, RouteTable};
use crate::ip::{AddressPlan, AddressRegistry};
use crate::topology::NodeId;

/// Longest path a fat-tree can produce is host-edge-aggr-core-aggr-edge-host,
/// plus the edge detour aggregation switches take towards foreign cores.
pub const MAX_HOPS: usize = 12;

/// Follow the tables from `source` until the node owning `destination` is
/// reached. Returns every node visited, `source` first.
pub fn trace_route(
    table: &RouteTable,
    registry: &AddressRegistry,
    source: NodeId,
    destination: Ipv4Addr,
) -> Result<Vec<NodeId>, RouteError> {
    let mut path = vec![source];
    let mut current = source;

    for _ in 0..MAX_HOPS {
        if registry.owner_of(destination) == Some(current) {
            return Ok(path);
        }

        let on_link = registry
            .connected_networks(current)
            .iter()
            .any(|net| net.contains(&destination));

        let next_address = if on_link {
            destination
        } else {
            table
                .lookup(current, destination)
                .ok_or(RouteError::NoRoute { node: current, destination })?
                .next_hop
        };

        current = registry.owner_of(next_address).ok_or(RouteError::UnresolvedNextHop {
            node: current,
            next_hop: next_address,
        })?;
        path.push(current);
    }

    if registry.owner_of(destination) == Some(current) {
        return Ok(path);
    }
    Err(RouteError::HopLimit { destination, hops: MAX_HOPS })
}

/// Check that every host reaches `probe` hosts and that `probe` hosts reach
/// every host. Returns the number of traced paths.
pub fn verify_host_reachability(
    plan: &AddressPlan,
    table: &RouteTable,
    registry: &AddressRegistry,
    probes: &[usize],
) -> Result<usize, RouteError> {
    let counts = plan.counts();
    let mut traced = 0;
    for &probe in probes {
        let probe_address = plan.host_address(probe)?;
        for host in 0..counts.hosts {
            let host_address = plan.host_address(host)?;
            trace_route(table, registry, NodeId::Host(host), probe_address)?;
            trace_route(table, registry, NodeId::Host(probe), host_address)?;
            traced += 2;
        }
    }
    log::debug!("Traced {} host-to-host paths", traced);
    Ok(traced)
}

//! Static route synthesis.
//!
//! The fat-tree is regular enough that every shortest path has a closed
//! form, so no routing protocol is run. Each node's entries depend only on
//! its own coordinates; they are computed in parallel and assembled into a
//! single [`RouteTable`], which is where duplicate prefixes are rejected.
//!
//! Policy per tier:
//!
//! - core: one `/8` per pod towards the aggregation switch it reaches there
//! - aggregation: a `/32` to every core loopback (directly for the core
//!   switches it is wired to, through the pod's root edge switch otherwise),
//!   a default route via its first core switch, and one `/16` per edge switch
//! - edge: a `/32` to every aggregation loopback of its pod and to every core
//!   loopback, plus a default route via the pod's root aggregation switch
//! - host: a single default route via its edge switch

use log::{debug, info};
use rayon::prelude::*;
use std::net::Ipv4Addr;

use super::types::{RouteEntry, RouteError, RouteTable, DEFAULT_ROUTE};
use crate::ip::AddressPlan;
use crate::topology::{LinkSide, NodeId, SwitchKind};

/// Aggregation position every edge switch uses as its default next hop
pub const ROOT_AGGR: usize = 0;

/// Edge position an aggregation switch goes through to reach core switches
/// it is not wired to
pub const ROOT_EDGE: usize = 0;

/// Synthesize the forwarding entries of every switch and host.
pub fn synthesize_routes(plan: &AddressPlan) -> Result<RouteTable, RouteError> {
    let counts = plan.counts();
    let nodes: Vec<NodeId> = counts.all_nodes().collect();

    let per_node: Vec<(NodeId, Vec<RouteEntry>)> = nodes
        .par_iter()
        .map(|&node| routes_for(plan, node).map(|entries| (node, entries)))
        .collect::<Result<_, _>>()?;

    let mut table = RouteTable::new();
    for (node, entries) in per_node {
        debug!("{}: {} routes", node, entries.len());
        for entry in entries {
            table.insert(node, entry)?;
        }
    }

    info!(
        "Synthesized {} static routes for {} nodes (k={})",
        table.len(),
        nodes.len(),
        counts.arity
    );
    Ok(table)
}

/// Entries of a single node, in emission order.
pub fn routes_for(plan: &AddressPlan, node: NodeId) -> Result<Vec<RouteEntry>, RouteError> {
    let counts = plan.counts();
    counts
        .check_node(node)
        .map_err(|_| RouteError::UnknownEndpoint { node })?;

    match node {
        NodeId::Core(core) => core_routes(plan, core),
        NodeId::Aggr(id) => aggr_routes(plan, id),
        NodeId::Edge(id) => edge_routes(plan, id),
        NodeId::Host(id) => host_routes(plan, id),
    }
}

fn core_routes(plan: &AddressPlan, core: usize) -> Result<Vec<RouteEntry>, RouteError> {
    let counts = plan.counts();
    let mut entries = Vec::with_capacity(counts.pods);
    for pod in 0..counts.pods {
        let aggr_side = plan.core_link_address(pod, core, LinkSide::B)?;
        entries.push(RouteEntry::new(plan.pod_prefix(pod)?, aggr_side.address));
    }
    Ok(entries)
}

fn aggr_routes(plan: &AddressPlan, id: usize) -> Result<Vec<RouteEntry>, RouteError> {
    let counts = plan.counts();
    let pos = counts.decode_aggr_switch(id)?;
    let uplinks = counts.core_switches_of_group(pos.index)?;
    let mut entries = Vec::with_capacity(counts.core_switches + 1 + counts.edge_per_pod);

    // Core switches outside this switch's group are one edge hop away.
    let via_root_edge = plan
        .aggr_link_address(pos.pod, pos.index, ROOT_EDGE, LinkSide::B)?
        .address;

    for core in 0..counts.core_switches {
        let next_hop: Ipv4Addr = if uplinks.contains(&core) {
            plan.core_link_address(pos.pod, core, LinkSide::A)?.address
        } else {
            via_root_edge
        };
        entries.push(RouteEntry::new(plan.loopback_address(SwitchKind::Core, core)?, next_hop));
    }

    // The first wired core switch is the shortest-path root for default traffic.
    let root = plan.core_link_address(pos.pod, uplinks.start, LinkSide::A)?;
    entries.push(RouteEntry::new(DEFAULT_ROUTE, root.address));

    for edge in 0..counts.edge_per_pod {
        let edge_side = plan.aggr_link_address(pos.pod, pos.index, edge, LinkSide::B)?;
        entries.push(RouteEntry::new(plan.edge_prefix(pos.pod, edge)?, edge_side.address));
    }

    Ok(entries)
}

fn edge_routes(plan: &AddressPlan, id: usize) -> Result<Vec<RouteEntry>, RouteError> {
    let counts = plan.counts();
    let pos = counts.decode_edge_switch(id)?;
    let mut entries = Vec::with_capacity(counts.aggr_per_pod + counts.core_switches + 1);

    for aggr in 0..counts.aggr_per_pod {
        let aggr_side = plan.aggr_link_address(pos.pod, aggr, pos.index, LinkSide::A)?;
        let aggr_id = counts.aggr_switch_id(pos.pod, aggr)?;
        entries.push(RouteEntry::new(
            plan.loopback_address(SwitchKind::Aggr, aggr_id)?,
            aggr_side.address,
        ));
    }

    for core in 0..counts.core_switches {
        let group = counts.core_group(core)?;
        let aggr_side = plan.aggr_link_address(pos.pod, group, pos.index, LinkSide::A)?;
        let loopback = plan.loopback_address(SwitchKind::Core, core)?;
        entries.push(RouteEntry::new(loopback, aggr_side.address));
    }

    let root = plan.aggr_link_address(pos.pod, ROOT_AGGR, pos.index, LinkSide::A)?;
    entries.push(RouteEntry::new(DEFAULT_ROUTE, root.address));

    Ok(entries)
}

fn host_routes(plan: &AddressPlan, id: usize) -> Result<Vec<RouteEntry>, RouteError> {
    let pos = plan.counts().decode_host_id(id)?;
    let edge_side = plan.edge_link_address(pos.pod, pos.edge, pos.index, LinkSide::A)?;
    Ok(vec![RouteEntry::new(DEFAULT_ROUTE, edge_side.address)])
}

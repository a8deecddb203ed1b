//! Manifest assembly and text rendering.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::types::{
    LinkEndpoint, LinkParameters, ManifestGeneral, ManifestInterface, ManifestLink, ManifestNode,
    NetworkManifest, NodeRoutes,
};
use crate::ip::{AddressError, AddressPlan, InterfaceAssignment};
use crate::routing::RouteTable;
use crate::topology::{NodeId, SwitchKind, TopologyCounts, TopologyError};

/// Describe every node, interface and link of the plan.
pub fn build_manifest(
    plan: &AddressPlan,
    general: ManifestGeneral,
    link_parameters: LinkParameters,
) -> Result<NetworkManifest, AddressError> {
    let counts = plan.counts();
    let assignments = plan.interface_assignments()?;

    let mut interfaces: BTreeMap<NodeId, Vec<(usize, ManifestInterface)>> = BTreeMap::new();
    let mut links = Vec::with_capacity(assignments.len() / 2);

    for pair in assignments.chunks_exact(2) {
        let (a, b) = (&pair[0], &pair[1]);
        for (own, peer) in [(a, b), (b, a)] {
            let ifindex = counts.interface_index(own.layer, own.link, own.side)?;
            interfaces.entry(own.node).or_default().push((
                ifindex,
                ManifestInterface {
                    name: own.interface.clone(),
                    address: own.address.interface(),
                    peer: counts.node_name(peer.node)?,
                },
            ));
        }
        links.push(ManifestLink {
            layer: a.layer,
            index: a.link,
            a: endpoint(counts, a)?,
            b: endpoint(counts, b)?,
        });
    }

    let mut nodes = Vec::with_capacity(counts.total_nodes());
    for node in counts.all_nodes() {
        let loopback = match node {
            NodeId::Core(id) => Some(plan.loopback_address(SwitchKind::Core, id)?),
            NodeId::Aggr(id) => Some(plan.loopback_address(SwitchKind::Aggr, id)?),
            NodeId::Edge(_) | NodeId::Host(_) => None,
        };
        let mut node_interfaces = interfaces.remove(&node).unwrap_or_default();
        node_interfaces.sort_by_key(|(ifindex, _)| *ifindex);

        nodes.push(ManifestNode {
            name: counts.node_name(node)?,
            node,
            loopback,
            interfaces: node_interfaces.into_iter().map(|(_, iface)| iface).collect(),
        });
    }

    Ok(NetworkManifest {
        general,
        topology: *counts,
        link_parameters,
        nodes,
        links,
    })
}

fn endpoint(
    counts: &TopologyCounts,
    assignment: &InterfaceAssignment,
) -> Result<LinkEndpoint, TopologyError> {
    Ok(LinkEndpoint {
        node: counts.node_name(assignment.node)?,
        interface: assignment.interface.clone(),
        address: assignment.address.interface(),
    })
}

/// Render the route table as text: a `# <node>` header per owner followed by
/// one `<prefix> via <next-hop>` line per entry.
///
/// # Examples
/// ```
/// use fattree::ip::{AddressPlan, LoopbackPrefixes};
/// use fattree::output::render_routes;
/// use fattree::routing::synthesize_routes;
/// use fattree::topology::TopologyCounts;
///
/// let counts = TopologyCounts::derive(2).unwrap();
/// let plan = AddressPlan::new(counts, LoopbackPrefixes::default()).unwrap();
/// let text = render_routes(&counts, &synthesize_routes(&plan).unwrap()).unwrap();
/// assert!(text.starts_with("# core-0\n201.0.0.0/8 via 1.1.1.2\n"));
/// assert!(text.ends_with("# host-1-0-0\n0.0.0.0/0 via 202.1.1.1\n"));
/// ```
pub fn render_routes(counts: &TopologyCounts, table: &RouteTable) -> Result<String, TopologyError> {
    let mut out = String::new();
    for (owner, entries) in table.iter() {
        if !out.is_empty() {
            out.push('\n');
        }
        // Writing into a String cannot fail.
        let _ = writeln!(out, "# {}", counts.node_name(owner)?);
        for entry in entries {
            let _ = writeln!(out, "{}", entry);
        }
    }
    Ok(out)
}

/// Route table as a list of per-node documents, in owner order.
pub fn route_documents(
    counts: &TopologyCounts,
    table: &RouteTable,
) -> Result<Vec<NodeRoutes>, TopologyError> {
    table
        .iter()
        .map(|(node, entries)| {
            Ok(NodeRoutes {
                owner: counts.node_name(node)?,
                node,
                routes: entries.to_vec(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ip::LoopbackPrefixes;
    use crate::routing::synthesize_routes;
    use std::time::Duration;

    fn plan(k: usize) -> AddressPlan {
        AddressPlan::new(TopologyCounts::derive(k).unwrap(), LoopbackPrefixes::default()).unwrap()
    }

    fn manifest(k: usize) -> NetworkManifest {
        build_manifest(
            &plan(k),
            ManifestGeneral { stop_time: Duration::from_secs(60), seed: 1 },
            LinkParameters {
                data_rate: "10Mbps".to_string(),
                data_rate_bps: 10_000_000,
                delay: Duration::from_micros(100),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_manifest_shape() {
        let m = manifest(4);
        let c = m.topology;
        assert_eq!(m.nodes.len(), c.total_nodes());
        assert_eq!(m.links.len(), c.core_links() + c.aggr_links() + c.edge_links());

        // Every switch in a fat-tree uses all K ports, every host one.
        for node in &m.nodes {
            let expected = if node.node.is_host() { 1 } else { 4 };
            assert_eq!(node.interfaces.len(), expected, "{}", node.name);
            let is_router = matches!(node.node, NodeId::Core(_) | NodeId::Aggr(_));
            assert_eq!(node.loopback.is_some(), is_router);
            for (i, iface) in node.interfaces.iter().enumerate() {
                assert_eq!(iface.name, format!("sim{}", i));
            }
        }
    }

    #[test]
    fn test_manifest_k4_details() {
        let m = manifest(4);
        let aggr = m.nodes.iter().find(|n| n.name == "aggr-0-1").unwrap();
        assert_eq!(aggr.loopback.unwrap().to_string(), "250.255.1.2/32");
        let rendered: Vec<(String, String, String)> = aggr
            .interfaces
            .iter()
            .map(|i| (i.name.clone(), i.address.to_string(), i.peer.clone()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("sim0".to_string(), "3.1.2.2/24".to_string(), "core-2".to_string()),
                ("sim1".to_string(), "4.1.2.2/24".to_string(), "core-3".to_string()),
                ("sim2".to_string(), "101.2.1.1/24".to_string(), "edge-0-0".to_string()),
                ("sim3".to_string(), "101.2.2.1/24".to_string(), "edge-0-1".to_string()),
            ]
        );

        let first = &m.links[0];
        assert_eq!(first.a.node, "core-0");
        assert_eq!(first.a.address.to_string(), "1.1.1.1/24");
        assert_eq!(first.b.node, "aggr-0-0");
        assert_eq!(first.b.address.to_string(), "1.1.1.2/24");
    }

    #[test]
    fn test_manifest_serializes_to_yaml() {
        let yaml = serde_yaml::to_string(&manifest(2)).unwrap();
        assert!(yaml.contains("data_rate_bps: 10000000"));
        assert!(yaml.contains("delay: 100us"));
        assert!(yaml.contains("name: host-0-0-0"));
        assert!(yaml.contains("kind: core"));
    }

    #[test]
    fn test_render_routes_groups_by_owner() {
        let p = plan(4);
        let table = synthesize_routes(&p).unwrap();
        let text = render_routes(p.counts(), &table).unwrap();

        let headers = text.lines().filter(|l| l.starts_with("# ")).count();
        assert_eq!(headers, p.counts().total_nodes());
        let routes = text.lines().filter(|l| l.contains(" via ")).count();
        assert_eq!(routes, table.len());
        assert!(text.contains("# host-3-1-1\n0.0.0.0/0 via 204.2.2.1\n"));
    }

    #[test]
    fn test_route_documents_serialize_to_json() {
        let p = plan(2);
        let table = synthesize_routes(&p).unwrap();
        let docs = route_documents(p.counts(), &table).unwrap();
        assert_eq!(docs.len(), p.counts().total_nodes());

        let json: serde_json::Value = serde_json::to_value(&docs).unwrap();
        assert_eq!(json[0]["owner"], "core-0");
        assert_eq!(json[0]["node"]["kind"], "core");
        assert_eq!(json[0]["routes"][0]["destination"], "201.0.0.0/8");
        assert_eq!(json[0]["routes"][0]["next_hop"], "1.1.1.2");
    }
}

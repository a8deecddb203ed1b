//! Route table type definitions.

use ipnet::Ipv4Net;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use crate::ip::AddressError;
use crate::topology::{NodeId, TopologyError};

/// The default route, `0.0.0.0/0`
pub const DEFAULT_ROUTE: Ipv4Net = Ipv4Net::new_assert(Ipv4Addr::UNSPECIFIED, 0);

/// Errors raised by route synthesis and route tracing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error(
        "Duplicate prefix {prefix} on {owner}: already via {existing}, new entry via {next_hop}"
    )]
    DuplicatePrefix {
        owner: NodeId,
        prefix: Ipv4Net,
        existing: Ipv4Addr,
        next_hop: Ipv4Addr,
    },

    #[error("Unknown endpoint {node}")]
    UnknownEndpoint { node: NodeId },

    #[error("No route on {node} towards {destination}")]
    NoRoute { node: NodeId, destination: Ipv4Addr },

    #[error("Next hop {next_hop} on {node} is not owned by any node")]
    UnresolvedNextHop { node: NodeId, next_hop: Ipv4Addr },

    #[error("Gave up tracing towards {destination} after {hops} hops")]
    HopLimit { destination: Ipv4Addr, hops: usize },

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// One static forwarding entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RouteEntry {
    pub destination: Ipv4Net,
    pub next_hop: Ipv4Addr,
}

impl RouteEntry {
    pub fn new(destination: Ipv4Net, next_hop: Ipv4Addr) -> Self {
        RouteEntry { destination, next_hop }
    }

    pub fn is_default(&self) -> bool {
        self.destination == DEFAULT_ROUTE
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.destination, self.next_hop)
    }
}

/// Static forwarding state of the whole fabric, keyed by owner.
///
/// Entries keep insertion order per owner. An owner never holds two entries
/// for the same prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: BTreeMap<NodeId, Vec<RouteEntry>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, refusing a second entry for a prefix the owner already routes.
    pub fn insert(&mut self, owner: NodeId, entry: RouteEntry) -> Result<(), RouteError> {
        let entries = self.routes.entry(owner).or_default();
        if let Some(existing) = entries.iter().find(|e| e.destination == entry.destination) {
            return Err(RouteError::DuplicatePrefix {
                owner,
                prefix: entry.destination,
                existing: existing.next_hop,
                next_hop: entry.next_hop,
            });
        }
        entries.push(entry);
        Ok(())
    }

    /// Entries of one owner, empty when it has none
    pub fn routes(&self, owner: NodeId) -> &[RouteEntry] {
        self.routes.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[RouteEntry])> {
        self.routes.iter().map(|(owner, entries)| (*owner, entries.as_slice()))
    }

    /// Total number of entries across all owners
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn default_route(&self, owner: NodeId) -> Option<&RouteEntry> {
        self.routes(owner).iter().find(|e| e.is_default())
    }

    /// Longest-prefix match of `destination` in the owner's entries
    pub fn lookup(&self, owner: NodeId, destination: Ipv4Addr) -> Option<&RouteEntry> {
        self.routes(owner)
            .iter()
            .filter(|e| e.destination.contains(&destination))
            .max_by_key(|e| e.destination.prefix_len())
    }
}

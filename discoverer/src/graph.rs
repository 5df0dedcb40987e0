// vim: tw=80
//! The liquidity graph produced by discovery.

use std::collections::BTreeSet;

/// Identifies one network (chain) in the liquidity graph.
pub type NetworkSelector = u64;

/// Topology of the networks a liquidity manager can rebalance between.
///
/// `Graph` is a plain value: discoverers build it, consumers inspect it.  The
/// default value is the empty graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    networks: BTreeSet<NetworkSelector>,
    connections: BTreeSet<(NetworkSelector, NetworkSelector)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network without any connections.  Returns `false` if it was
    /// already present.
    pub fn add_network(&mut self, network: NetworkSelector) -> bool {
        self.networks.insert(network)
    }

    /// Add a directed connection, adding either endpoint if it is missing.
    /// Returns `false` if the connection was already present.
    pub fn add_connection(&mut self, from: NetworkSelector, to: NetworkSelector)
        -> bool
    {
        self.networks.insert(from);
        self.networks.insert(to);
        self.connections.insert((from, to))
    }

    pub fn has_network(&self, network: NetworkSelector) -> bool {
        self.networks.contains(&network)
    }

    pub fn is_connected(&self, from: NetworkSelector, to: NetworkSelector)
        -> bool
    {
        self.connections.contains(&(from, to))
    }

    /// Networks in ascending selector order
    pub fn networks(&self) -> impl Iterator<Item = NetworkSelector> + '_ {
        self.networks.iter().copied()
    }

    pub fn connections(&self)
        -> impl Iterator<Item = (NetworkSelector, NetworkSelector)> + '_
    {
        self.connections.iter().copied()
    }

    /// Number of networks
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl FromIterator<(NetworkSelector, NetworkSelector)> for Graph {
    fn from_iter<T>(iter: T) -> Self
        where T: IntoIterator<Item = (NetworkSelector, NetworkSelector)>
    {
        let mut g = Graph::new();
        for (from, to) in iter {
            g.add_connection(from, to);
        }
        g
    }
}

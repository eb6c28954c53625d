//! Node store and random topology generation
//!
//! The [`Network`] is a flat arena of nodes indexed by [`NodeId`]; adjacency
//! is stored as id lists, so cycles in the graph never turn into ownership
//! cycles. Node 0 is always Start and the last node is always End.
//!
//! The [`TopologyGenerator`] builds random graphs by rejection sampling: an
//! attempt that violates any invariant is thrown away whole and the next
//! attempt starts again from an empty edge set.

use std::fmt;

use detour_core::{ConfigError, NodeId, Topology, TopologyError};
use detour_routing::SelectionError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smallest network that can hold Start, End and a three-node optimal path
pub const MIN_NETWORK_SIZE: usize = 5;

/// Edges needed for a Start → End path with three interior nodes
pub const MIN_PATH_EDGES: usize = 4;

/// Smallest sparseness that leaves the graph incomplete
pub const MIN_SPARSENESS: usize = 2;

/// A topology vertex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identity, assigned at creation
    pub id: NodeId,
    /// Neighbors in insertion order
    adjacency: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            adjacency: Vec::new(),
        }
    }

    /// Neighbors in insertion order
    pub fn neighbors(&self) -> &[NodeId] {
        &self.adjacency
    }

    /// Number of edges touching this node
    pub fn degree(&self) -> usize {
        self.adjacency.len()
    }

    /// Check if this node lists `other` as a neighbor
    pub fn is_connected_to(&self, other: NodeId) -> bool {
        self.adjacency.contains(&other)
    }
}

/// Undirected graph over a fixed set of nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    nodes: Vec<Node>,
}

impl Network {
    /// Create `count` unconnected nodes with ids `0..count`
    pub fn with_nodes(count: usize) -> Self {
        Self {
            nodes: NodeId::range(count).map(Node::new).collect(),
        }
    }

    /// Build a network from an undirected edge list
    ///
    /// Self-loops and duplicate edges are ignored; an endpoint outside
    /// `0..count` is an error.
    pub fn from_edges(count: usize, edges: &[(usize, usize)]) -> Result<Self, TopologyError> {
        let mut network = Self::with_nodes(count);
        for &(a, b) in edges {
            for id in [a, b] {
                if id >= count {
                    return Err(TopologyError::UnknownNode(NodeId(id)));
                }
            }
            network.connect(NodeId(a), NodeId(b));
        }
        Ok(network)
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes in id order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Add an undirected edge
    ///
    /// Returns `false` for self-loops, existing edges and unknown nodes.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || a.index() >= self.nodes.len() || b.index() >= self.nodes.len() {
            return false;
        }
        if self.nodes[a.index()].is_connected_to(b) {
            return false;
        }

        self.nodes[a.index()].adjacency.push(b);
        self.nodes[b.index()].adjacency.push(a);
        true
    }

    /// Remove an undirected edge, returning whether it existed
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> bool {
        let (Some(node_a), Some(node_b)) = (self.nodes.get(a.index()), self.nodes.get(b.index()))
        else {
            return false;
        };
        if !node_a.is_connected_to(b) || !node_b.is_connected_to(a) {
            return false;
        }

        self.nodes[a.index()].adjacency.retain(|&n| n != b);
        self.nodes[b.index()].adjacency.retain(|&n| n != a);
        true
    }

    /// Drop every edge, keeping the nodes
    pub fn clear_edges(&mut self) {
        for node in &mut self.nodes {
            node.adjacency.clear();
        }
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(Node::degree).sum::<usize>() / 2
    }

    /// Remove all but the first edge of a node, symmetrically
    ///
    /// Returns the number of edges removed.
    pub fn prune_to_first_edge(&mut self, id: NodeId) -> usize {
        let Some(node) = self.nodes.get(id.index()) else {
            return 0;
        };
        let extra: Vec<NodeId> = node.adjacency.iter().skip(1).copied().collect();
        extra
            .into_iter()
            .filter(|&neighbor| self.disconnect(id, neighbor))
            .count()
    }

    /// First node with no edges, if any
    pub fn isolated_node(&self) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.degree() == 0).map(|n| n.id)
    }

    /// Smallest degree over all nodes
    pub fn min_degree(&self) -> usize {
        self.nodes.iter().map(Node::degree).min().unwrap_or(0)
    }

    /// Whether `to` can be reached from `from` by following edges
    ///
    /// Depth-first with an explicit stack; a node already visited is never
    /// descended into again, so cycles terminate.
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        if from.index() >= self.nodes.len() || to.index() >= self.nodes.len() {
            return false;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if visited[node.index()] {
                continue;
            }
            visited[node.index()] = true;

            stack.extend(
                self.nodes[node.index()]
                    .adjacency
                    .iter()
                    .filter(|n| !visited[n.index()]),
            );
        }

        false
    }
}

impl Topology for Network {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map(Node::neighbors)
            .unwrap_or(&[])
    }

    fn start(&self) -> NodeId {
        NodeId(0)
    }

    fn end(&self) -> NodeId {
        NodeId(self.nodes.len().saturating_sub(1))
    }
}

/// Why a generation attempt was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A node ended up with no edges
    IsolatedNode(NodeId),
    /// Start cannot reach End
    Unreachable,
    /// The optimal path has too few interior nodes for a surveillance node
    PathTooShort(usize),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::IsolatedNode(node) => write!(f, "node {} is isolated", node),
            Rejection::Unreachable => write!(f, "end is unreachable from start"),
            Rejection::PathTooShort(len) => {
                write!(f, "optimal path has only {} interior nodes", len)
            }
        }
    }
}

impl From<SelectionError> for Rejection {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::PathTooShort(len) => Rejection::PathTooShort(len),
        }
    }
}

/// Parameters of random topology generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of nodes, including Start and End
    pub network_size: usize,
    /// Divisor applied to the complete-graph edge count; higher means sparser
    pub sparseness: usize,
    /// Give up after this many attempts (None = retry forever)
    pub max_attempts: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            network_size: 16,
            sparseness: 6,
            max_attempts: None,
        }
    }
}

impl GeneratorConfig {
    /// Number of edges inserted per attempt: `((n² - n) / 2) / sparseness`
    pub fn edge_budget(&self) -> usize {
        let n = self.network_size;
        (n * n.saturating_sub(1) / 2)
            .checked_div(self.sparseness)
            .unwrap_or(0)
    }

    /// Reject parameters that no attempt could ever satisfy
    ///
    /// These are necessary conditions only; a configuration that passes can
    /// still be unlucky enough to need many attempts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network_size < MIN_NETWORK_SIZE {
            return Err(ConfigError::NetworkTooSmall {
                size: self.network_size,
                min: MIN_NETWORK_SIZE,
            });
        }
        // In a complete graph Start's and End's kept neighbors are always
        // adjacent, so no path ever has room for a surveillance node
        if self.sparseness < MIN_SPARSENESS {
            return Err(ConfigError::InvalidSparseness(self.sparseness));
        }

        let required = self.network_size.div_ceil(2).max(MIN_PATH_EDGES);
        let edges = self.edge_budget();
        if edges < required {
            return Err(ConfigError::EdgeBudgetTooSmall {
                edges,
                nodes: self.network_size,
                required,
            });
        }
        Ok(())
    }
}

/// Builds random topologies that satisfy the structural invariants
#[derive(Debug, Clone)]
pub struct TopologyGenerator {
    config: GeneratorConfig,
}

impl TopologyGenerator {
    /// Create a generator, validating its parameters
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Fresh, unconnected node store of the configured size
    pub fn empty_network(&self) -> Network {
        Network::with_nodes(self.config.network_size)
    }

    /// Rewire `network` from scratch and check the structural invariants
    ///
    /// On success every node has an edge, Start and End have exactly one,
    /// and Start reaches End.
    pub fn attempt<R: Rng + ?Sized>(
        &self,
        network: &mut Network,
        rng: &mut R,
    ) -> Result<(), Rejection> {
        network.clear_edges();

        let n = network.node_count();
        let mut remaining = self.config.edge_budget();
        while remaining > 0 {
            let from = NodeId(rng.random_range(0..n));
            let to = NodeId(rng.random_range(0..n));
            // Self-loops and existing edges are rejected and resampled
            if network.connect(from, to) {
                remaining -= 1;
            }
        }

        if let Some(node) = network.isolated_node() {
            return Err(Rejection::IsolatedNode(node));
        }

        let (start, end) = (network.start(), network.end());
        network.prune_to_first_edge(start);
        network.prune_to_first_edge(end);

        // Pruning can strand a node whose only edge went to Start or End
        if let Some(node) = network.isolated_node() {
            return Err(Rejection::IsolatedNode(node));
        }

        if !network.reaches(start, end) {
            return Err(Rejection::Unreachable);
        }

        Ok(())
    }

    /// Retry [`attempt`](Self::attempt) until one is accepted
    ///
    /// Only fails when `max_attempts` is set and exhausted.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network, TopologyError> {
        let mut network = self.empty_network();
        let mut attempts: u64 = 0;

        loop {
            if self.config.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(TopologyError::AttemptsExhausted(attempts));
            }
            attempts += 1;

            match self.attempt(&mut network, rng) {
                Ok(()) => {
                    info!(
                        "Accepted topology with {} edges after {} attempts",
                        network.edge_count(),
                        attempts
                    );
                    return Ok(network);
                }
                Err(rejection) => debug!("Attempt {} rejected: {}", attempts, rejection),
            }
        }
    }
}

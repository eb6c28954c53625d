//! Core trait definitions for Detour
//!
//! These traits separate the graph algorithms from the concrete node store
//! and keep every output collaborator behind a narrow interface.

use crate::error::ExportError;
use crate::identity::NodeId;
use crate::report::{GraphView, RunReport};

/// Read-only view of an undirected graph with designated Start and End nodes
///
/// Node ids are dense: every id in `0..node_count()` is a valid node.
pub trait Topology {
    /// Number of nodes in the graph
    fn node_count(&self) -> usize;

    /// Neighbors of a node, in adjacency insertion order
    fn neighbors(&self, node: NodeId) -> &[NodeId];

    /// The source of all traffic
    fn start(&self) -> NodeId;

    /// The sink of all traffic
    fn end(&self) -> NodeId;

    /// All node ids in ascending order
    fn node_ids(&self) -> Vec<NodeId> {
        NodeId::range(self.node_count()).collect()
    }

    /// Number of edges touching a node
    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Check if two nodes are directly connected
    fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).contains(&b)
    }
}

/// Receives the accepted topology for rendering
///
/// Implementations only write what they are given; invoking an external
/// renderer on the result is left to the caller.
pub trait GraphExporter {
    fn export(&mut self, view: &GraphView) -> Result<(), ExportError>;
}

/// Receives one metrics record per run
pub trait MetricsSink {
    fn record(&mut self, report: &RunReport) -> Result<(), ExportError>;
}

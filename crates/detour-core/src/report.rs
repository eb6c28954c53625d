//! Values handed from the simulation core to its output collaborators

use serde::{Deserialize, Serialize};

use crate::identity::NodeId;
use crate::traits::Topology;

/// Final values of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of nodes in the network
    pub network_size: usize,
    /// Packets injected at Start
    pub packet_count: usize,
    /// Probability of a random detour per forwarding decision
    pub randomness: f64,
    /// Ticks until every packet reached End
    pub ticks: u64,
    /// Hop count of the optimal path (interior nodes + 1)
    pub optimal_path_length: usize,
    /// Packets copied by the surveillance node
    pub interceptions: usize,
    /// Share of packets that were never intercepted, in percent
    pub security_percent: f64,
    /// Seed that reproduces this run
    pub seed: u64,
}

impl RunReport {
    pub fn new(
        network_size: usize,
        packet_count: usize,
        randomness: f64,
        ticks: u64,
        optimal_path_length: usize,
        interceptions: usize,
        seed: u64,
    ) -> Self {
        Self {
            network_size,
            packet_count,
            randomness,
            ticks,
            optimal_path_length,
            interceptions,
            security_percent: security_percent(packet_count, interceptions),
            seed,
        }
    }
}

/// `(packets - interceptions) * 100 / packets`, or 100% when nothing was sent
pub fn security_percent(packet_count: usize, interceptions: usize) -> f64 {
    if packet_count == 0 {
        return 100.0;
    }
    let escaped = packet_count.saturating_sub(interceptions);
    escaped as f64 * 100.0 / packet_count as f64
}

/// Edge list and highlight sets describing an accepted topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    /// Directed pairs; every undirected edge appears in both directions
    pub edges: Vec<(NodeId, NodeId)>,
    pub start: NodeId,
    pub end: NodeId,
    /// Interior nodes of the optimal path
    pub path: Vec<NodeId>,
    /// Highest-priority highlight, overrides the path highlight
    pub surveillance: Option<NodeId>,
}

impl GraphView {
    /// Snapshot a topology together with its optimal path and surveillance node
    pub fn from_topology<T: Topology + ?Sized>(
        topology: &T,
        path: &[NodeId],
        surveillance: Option<NodeId>,
    ) -> Self {
        let edges = topology
            .node_ids()
            .into_iter()
            .flat_map(|node| {
                topology
                    .neighbors(node)
                    .iter()
                    .map(move |&neighbor| (node, neighbor))
            })
            .collect();

        Self {
            edges,
            start: topology.start(),
            end: topology.end(),
            path: path.to_vec(),
            surveillance,
        }
    }
}

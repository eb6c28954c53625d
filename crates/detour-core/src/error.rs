//! Error types for Detour

use std::path::PathBuf;

use thiserror::Error;

use crate::identity::NodeId;

/// Top-level error type for Detour
#[derive(Debug, Error)]
pub enum DetourError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors raised while validating run parameters
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Network size {size} is too small: at least {min} nodes are required")]
    NetworkTooSmall { size: usize, min: usize },

    #[error("Packet count must be at least 1")]
    NoPackets,

    #[error("Randomness probability {0} is outside 0.0..=1.0")]
    InvalidRandomness(f64),

    #[error("Sparseness {0} is below 2 and always builds a complete graph")]
    InvalidSparseness(usize),

    #[error("Edge budget {edges} cannot satisfy {nodes} nodes (need at least {required})")]
    EdgeBudgetTooSmall {
        edges: usize,
        nodes: usize,
        required: usize,
    },
}

/// Errors related to topology generation and lookups
#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("Node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("No acceptable topology after {0} attempts")]
    AttemptsExhausted(u64),
}

/// Errors related to forwarding-table construction and path reconstruction
#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    #[error("Start node {0} has no neighbor")]
    StartIsolated(NodeId),

    #[error("Node {0} has no forwarding target")]
    NoForwardingTarget(NodeId),

    #[error("Forwarding chain revisits node {0}")]
    ForwardingLoop(NodeId),
}

/// Fatal conditions inside the tick loop
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Reached a sink node with no outlet: node {node} at tick {tick}")]
    NoOutlet { node: NodeId, tick: u64 },

    #[error("Node {node} has a due packet but no forwarding target at tick {tick}")]
    MissingForwardingTarget { node: NodeId, tick: u64 },
}

/// Errors raised by output collaborators
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Detour operations
pub type DetourResult<T> = Result<T, DetourError>;

//! Node identity
//!
//! Nodes live in a flat arena, so their identity is simply a dense index
//! assigned at creation time. Adjacency, forwarding targets and packet
//! queues all refer to nodes by [`NodeId`] rather than by reference.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Stable integer identity of a node (`0..network_size`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Index into node-indexed arenas
    pub fn index(self) -> usize {
        self.0
    }

    /// All ids of a network with `count` nodes, in ascending order
    pub fn range(count: usize) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator {
        (0..count).map(NodeId)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

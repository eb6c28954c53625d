//! Forwarding table
//!
//! The [`ForwardingTable`] maps every node to the neighbor it forwards
//! traffic through, along with its hop distance to the root (End).
//!
//! Entries are write-once: the first assignment wins and later attempts are
//! ignored. Breadth-first level order then guarantees every entry lies on a
//! shortest path.

use detour_core::NodeId;

/// Next hops toward a single root node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingTable {
    /// The node all traffic is routed toward
    root: NodeId,
    /// Next hop per node, indexed by node id
    targets: Vec<Option<NodeId>>,
    /// Hop distance to the root per node, indexed by node id
    distances: Vec<Option<u32>>,
}

impl ForwardingTable {
    /// Create an empty table for `node_count` nodes routed toward `root`
    pub fn new(node_count: usize, root: NodeId) -> Self {
        let mut distances = vec![None; node_count];
        if let Some(slot) = distances.get_mut(root.index()) {
            *slot = Some(0);
        }
        Self {
            root,
            targets: vec![None; node_count],
            distances,
        }
    }

    /// Record `target` as the next hop of `node`.
    ///
    /// Returns `false` without changing anything if `node` already has a
    /// target, is the root, or is out of range.
    pub fn assign(&mut self, node: NodeId, target: NodeId) -> bool {
        if node == self.root || self.has_target(node) {
            return false;
        }
        let Some(target_distance) = self.distance(target) else {
            return false;
        };
        match self.targets.get_mut(node.index()) {
            Some(slot) => {
                *slot = Some(target);
                self.distances[node.index()] = Some(target_distance + 1);
                true
            }
            None => false,
        }
    }

    /// The root every entry leads to
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Next hop of a node, if one was assigned
    pub fn target(&self, node: NodeId) -> Option<NodeId> {
        self.targets.get(node.index()).copied().flatten()
    }

    /// Whether a node already has a next hop
    pub fn has_target(&self, node: NodeId) -> bool {
        self.target(node).is_some()
    }

    /// Hop distance from a node to the root (0 for the root itself)
    pub fn distance(&self, node: NodeId) -> Option<u32> {
        self.distances.get(node.index()).copied().flatten()
    }

    /// Number of nodes the table covers
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if the table covers no nodes
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of nodes with an assigned next hop
    pub fn assigned_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_some()).count()
    }

    /// `(node, next hop)` pairs in ascending node order
    pub fn entries(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(index, target)| target.map(|t| (NodeId(index), t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_zero_distance() {
        let table = ForwardingTable::new(4, NodeId(3));
        assert_eq!(table.root(), NodeId(3));
        assert_eq!(table.distance(NodeId(3)), Some(0));
        assert_eq!(table.distance(NodeId(0)), None);
        assert_eq!(table.assigned_count(), 0);
    }

    #[test]
    fn test_first_writer_wins() {
        let mut table = ForwardingTable::new(4, NodeId(3));

        assert!(table.assign(NodeId(2), NodeId(3)));
        assert!(table.assign(NodeId(1), NodeId(3)));
        assert!(!table.assign(NodeId(1), NodeId(2)));

        assert_eq!(table.target(NodeId(1)), Some(NodeId(3)));
        assert_eq!(table.distance(NodeId(1)), Some(1));
    }

    #[test]
    fn test_root_never_assigned() {
        let mut table = ForwardingTable::new(3, NodeId(2));
        assert!(table.assign(NodeId(1), NodeId(2)));
        assert!(!table.assign(NodeId(2), NodeId(1)));
        assert_eq!(table.target(NodeId(2)), None);
    }

    #[test]
    fn test_target_must_be_routed() {
        let mut table = ForwardingTable::new(4, NodeId(3));
        // Node 1 has no distance yet, so nothing can route through it
        assert!(!table.assign(NodeId(0), NodeId(1)));
        assert!(!table.assign(NodeId(9), NodeId(3)));
    }

    #[test]
    fn test_entries_in_node_order() {
        let mut table = ForwardingTable::new(4, NodeId(3));
        table.assign(NodeId(2), NodeId(3));
        table.assign(NodeId(0), NodeId(2));

        let entries: Vec<_> = table.entries().collect();
        assert_eq!(entries, vec![(NodeId(0), NodeId(2)), (NodeId(2), NodeId(3))]);
        assert_eq!(table.distance(NodeId(0)), Some(2));
    }
}

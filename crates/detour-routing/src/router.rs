//! Breadth-first route precomputation
//!
//! The [`RoutePrecomputer`] runs a single-source BFS seeded at the sink.
//! When a node is dequeued, each neighbor that has no next hop yet is
//! pointed at that node and enqueued. Because BFS settles nodes in level
//! order, the first assignment a node receives comes from a node one hop
//! closer to End, so following next hops always walks a shortest path.
//!
//! Ties between equally short paths are broken by adjacency order. The
//! result is deterministic for a given topology and carries no other
//! meaning.

use std::collections::VecDeque;

use detour_core::{NodeId, Topology};
use tracing::{debug, trace};

use crate::error::{RoutingError, RoutingResult};
use crate::table::ForwardingTable;

/// Builds forwarding tables over a topology
pub struct RoutePrecomputer;

impl RoutePrecomputer {
    /// Compute next hops toward `topology.end()` for every node that can reach it
    ///
    /// Nodes in components that do not contain End are left without a target.
    pub fn precompute<T: Topology + ?Sized>(topology: &T) -> ForwardingTable {
        let end = topology.end();
        let mut table = ForwardingTable::new(topology.node_count(), end);

        // Pass-local traversal state, never stored on the topology
        let mut visited = vec![false; topology.node_count()];
        let mut queue = VecDeque::from([end]);

        while let Some(node) = queue.pop_front() {
            if visited.get(node.index()).copied().unwrap_or(true) {
                continue;
            }

            for &neighbor in topology.neighbors(node) {
                if table.assign(neighbor, node) {
                    trace!("Next hop of {} is {}", neighbor, node);
                    queue.push_back(neighbor);
                }
            }

            visited[node.index()] = true;
        }

        debug!(
            "Forwarding table toward {} covers {} of {} nodes",
            end,
            table.assigned_count() + 1,
            topology.node_count()
        );
        table
    }
}

/// Reconstruct the optimal path from Start to End
///
/// Starts at Start's first neighbor and follows next hops until End is
/// reached. The returned sequence excludes Start and End themselves, so its
/// hop count is `path.len() + 1`.
pub fn optimal_path<T: Topology + ?Sized>(
    topology: &T,
    table: &ForwardingTable,
) -> RoutingResult<Vec<NodeId>> {
    let start = topology.start();
    let end = topology.end();

    let mut node = *topology
        .neighbors(start)
        .first()
        .ok_or(RoutingError::StartIsolated(start))?;

    let mut path = Vec::new();
    while node != end {
        if path.len() >= topology.node_count() {
            return Err(RoutingError::ForwardingLoop(node));
        }
        path.push(node);
        node = table
            .target(node)
            .ok_or(RoutingError::NoForwardingTarget(node))?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal adjacency-list topology for tests
    struct Graph {
        adjacency: Vec<Vec<NodeId>>,
    }

    impl Graph {
        fn from_edges(node_count: usize, edges: &[(usize, usize)]) -> Self {
            let mut adjacency = vec![Vec::new(); node_count];
            for &(a, b) in edges {
                adjacency[a].push(NodeId(b));
                adjacency[b].push(NodeId(a));
            }
            Self { adjacency }
        }
    }

    impl Topology for Graph {
        fn node_count(&self) -> usize {
            self.adjacency.len()
        }

        fn neighbors(&self, node: NodeId) -> &[NodeId] {
            &self.adjacency[node.index()]
        }

        fn start(&self) -> NodeId {
            NodeId(0)
        }

        fn end(&self) -> NodeId {
            NodeId(self.adjacency.len() - 1)
        }
    }

    #[test]
    fn test_line_routes_toward_end() {
        // 0 - 1 - 2 - 3 - 4
        let graph = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let table = RoutePrecomputer::precompute(&graph);

        assert_eq!(table.target(NodeId(0)), Some(NodeId(1)));
        assert_eq!(table.target(NodeId(3)), Some(NodeId(4)));
        assert_eq!(table.target(NodeId(4)), None);
        assert_eq!(table.distance(NodeId(0)), Some(4));

        let path = optimal_path(&graph, &table).unwrap();
        assert_eq!(path, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_shortcut_is_preferred() {
        // 0 - 1 - 2 - 3 - 5 and a shortcut 1 - 4 - 5
        let graph = Graph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 5), (1, 4), (4, 5)]);
        let table = RoutePrecomputer::precompute(&graph);

        let path = optimal_path(&graph, &table).unwrap();
        assert_eq!(path, vec![NodeId(1), NodeId(4)]);
        assert_eq!(table.distance(NodeId(0)), Some(3));
    }

    #[test]
    fn test_disconnected_nodes_have_no_target() {
        // 0 - 1 - 4, and a separate 2 - 3
        let graph = Graph::from_edges(5, &[(0, 1), (1, 4), (2, 3)]);
        let table = RoutePrecomputer::precompute(&graph);

        assert!(table.has_target(NodeId(0)));
        assert!(!table.has_target(NodeId(2)));
        assert!(!table.has_target(NodeId(3)));
    }

    #[test]
    fn test_start_next_to_end_gives_empty_path() {
        let graph = Graph::from_edges(3, &[(0, 2), (1, 2)]);
        let table = RoutePrecomputer::precompute(&graph);
        assert!(optimal_path(&graph, &table).unwrap().is_empty());
    }

    #[test]
    fn test_isolated_start_is_an_error() {
        let graph = Graph::from_edges(3, &[(1, 2)]);
        let table = RoutePrecomputer::precompute(&graph);
        assert_eq!(
            optimal_path(&graph, &table),
            Err(RoutingError::StartIsolated(NodeId(0)))
        );
    }

    #[test]
    fn test_unreachable_end_is_an_error() {
        let graph = Graph::from_edges(4, &[(0, 1), (2, 3)]);
        let table = RoutePrecomputer::precompute(&graph);
        assert_eq!(
            optimal_path(&graph, &table),
            Err(RoutingError::NoForwardingTarget(NodeId(1)))
        );
    }
}

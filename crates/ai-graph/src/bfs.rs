use std::collections::VecDeque;

use crate::graph::{Graph, GraphConnection, GraphNode, NodeIndex};

/// Breadth-first search. Finds a path with the fewest hops; connection costs are ignored.
pub struct Bfs<'g, N, C> {
    graph: &'g Graph<N, C>,
}

impl<'g, N: GraphNode, C: GraphConnection> Bfs<'g, N, C> {
    pub fn new(graph: &'g Graph<N, C>) -> Self {
        Self { graph }
    }

    /// Node path from `start` to `goal` (both included), or empty when unreachable.
    pub fn find_path(&self, start: NodeIndex, goal: NodeIndex) -> Vec<NodeIndex> {
        if !self.graph.is_node_valid(start) || !self.graph.is_node_valid(goal) {
            return Vec::new();
        }

        let slots = self.graph.slot_count();
        let mut visited = vec![false; slots];
        let mut parent: Vec<Option<NodeIndex>> = vec![None; slots];
        let mut open = VecDeque::new();

        visited[start.0] = true;
        open.push_back(start);

        while let Some(current) = open.pop_front() {
            if current == goal {
                let mut path = vec![goal];
                let mut node = goal;
                while let Some(prev) = parent[node.0] {
                    node = prev;
                    path.push(node);
                }
                path.reverse();
                return path;
            }

            for connection in self.graph.node_connections(current) {
                let next = connection.to();
                if !self.graph.is_node_valid(next) || visited[next.0] {
                    continue;
                }
                visited[next.0] = true;
                parent[next.0] = Some(current);
                open.push_back(next);
            }
        }

        Vec::new()
    }
}

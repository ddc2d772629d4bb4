use core::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::{Graph, GraphConnection, GraphNode, NodeIndex};
use crate::heuristic::Heuristic;

#[derive(Debug, Clone, Copy)]
struct OpenRecord {
    estimated_total_cost: f32,
    cost_so_far: f32,
    node: NodeIndex,
    tie: u64,
}

impl OpenRecord {
    // Lower estimate first, then lower node index, then insertion order.
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.estimated_total_cost
            .total_cmp(&other.estimated_total_cost)
            .then(self.node.cmp(&other.node))
            .then(self.tie.cmp(&other.tie))
    }
}

impl PartialEq for OpenRecord {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenRecord {}

impl PartialOrd for OpenRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key_cmp(self)
    }
}

/// Best known way of reaching a node.
#[derive(Debug, Clone)]
struct NodeRecord<C> {
    connection: Option<C>,
    cost_so_far: f32,
}

/// Heuristic-guided best-first search.
///
/// Connection costs must be non-negative. With an admissible heuristic the returned path is a
/// cheapest one.
pub struct AStar<'g, N, C> {
    graph: &'g Graph<N, C>,
    heuristic: Heuristic,
}

impl<'g, N: GraphNode, C: GraphConnection> AStar<'g, N, C> {
    pub fn new(graph: &'g Graph<N, C>, heuristic: Heuristic) -> Self {
        Self { graph, heuristic }
    }

    /// Node path from `start` to `goal` (both included), or an empty path if the goal is
    /// unreachable or either endpoint is not a valid node.
    pub fn find_path(&self, start: NodeIndex, goal: NodeIndex) -> Vec<NodeIndex> {
        if !self.graph.is_node_valid(start) || !self.graph.is_node_valid(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let mut records: Vec<Option<NodeRecord<C>>> = vec![None; self.graph.slot_count()];
        let mut open = BinaryHeap::new();
        let mut tie: u64 = 0;

        records[start.0] = Some(NodeRecord {
            connection: None,
            cost_so_far: 0.0,
        });
        open.push(OpenRecord {
            estimated_total_cost: self.heuristic_cost(start, goal),
            cost_so_far: 0.0,
            node: start,
            tie,
        });
        tie += 1;

        let mut expanded = 0usize;
        while let Some(current) = open.pop() {
            let Some(record) = &records[current.node.0] else {
                continue;
            };
            if current.cost_so_far != record.cost_so_far {
                // Stale heap entry: a cheaper record replaced it.
                continue;
            }

            if current.node == goal {
                tracing::trace!(expanded, cost = current.cost_so_far, "a* reached goal");
                return reconstruct(&records, start, goal);
            }
            expanded += 1;

            for connection in self.graph.node_connections(current.node) {
                let next = connection.to();
                if !self.graph.is_node_valid(next) {
                    continue;
                }

                let cost_so_far = current.cost_so_far + connection.cost();
                if let Some(existing) = &records[next.0] {
                    if existing.cost_so_far <= cost_so_far {
                        continue;
                    }
                }

                records[next.0] = Some(NodeRecord {
                    connection: Some(connection.clone()),
                    cost_so_far,
                });
                open.push(OpenRecord {
                    estimated_total_cost: cost_so_far + self.heuristic_cost(next, goal),
                    cost_so_far,
                    node: next,
                    tie,
                });
                tie += 1;
            }
        }

        tracing::trace!(expanded, "a* exhausted open set");
        Vec::new()
    }

    fn heuristic_cost(&self, from: NodeIndex, to: NodeIndex) -> f32 {
        match (self.graph.node_pos(from), self.graph.node_pos(to)) {
            (Some(a), Some(b)) => {
                let d = (b - a).abs();
                (self.heuristic)(d.x, d.y)
            }
            _ => 0.0,
        }
    }
}

fn reconstruct<C: GraphConnection>(
    records: &[Option<NodeRecord<C>>],
    start: NodeIndex,
    goal: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(Some(connection)) = records[current.0].as_ref().map(|r| r.connection.as_ref())
        else {
            return Vec::new();
        };
        current = connection.from();
        path.push(current);
    }
    path.reverse();
    path
}

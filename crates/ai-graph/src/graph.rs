use core::fmt;

use thiserror::Error;

use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Indices are handed out densely and never reused by the graph that issued them, so a removed
/// node leaves an empty slot behind instead of renumbering its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    InvalidNode(NodeIndex),
    #[error("node {0} cannot be connected to itself")]
    SelfConnection(NodeIndex),
}

/// A node that lives somewhere in the world.
pub trait GraphNode: Clone {
    fn position(&self) -> Vec2;
}

/// A weighted connection between two nodes.
pub trait GraphConnection: Clone {
    fn new(from: NodeIndex, to: NodeIndex, cost: f32) -> Self;
    fn from(&self) -> NodeIndex;
    fn to(&self) -> NodeIndex;
    fn cost(&self) -> f32;
    fn set_cost(&mut self, cost: f32);

    fn reversed(&self) -> Self {
        Self::new(self.to(), self.from(), self.cost())
    }
}

/// Plain positioned node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphNode2D {
    pub position: Vec2,
}

impl GraphNode2D {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }
}

impl GraphNode for GraphNode2D {
    fn position(&self) -> Vec2 {
        self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connection {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub cost: f32,
}

impl GraphConnection for Connection {
    fn new(from: NodeIndex, to: NodeIndex, cost: f32) -> Self {
        Self { from, to, cost }
    }

    fn from(&self) -> NodeIndex {
        self.from
    }

    fn to(&self) -> NodeIndex {
        self.to
    }

    fn cost(&self) -> f32 {
        self.cost
    }

    fn set_cost(&mut self, cost: f32) {
        self.cost = cost;
    }
}

/// Generic graph of positioned nodes and weighted connections.
///
/// Nodes are stored in a slot map keyed by [`NodeIndex`]. Connections are kept in per-node
/// adjacency lists. For undirected graphs an added connection `a -> b` is mirrored into `b`'s list
/// so searches can traverse it both ways; [`Graph::connections`] still yields it only once.
///
/// `Clone` is a deep copy: per-query scratch edits on a clone never leak into the original.
#[derive(Debug, Clone)]
pub struct Graph<N, C = Connection> {
    directed: bool,
    nodes: Vec<Option<N>>,
    adjacency: Vec<Vec<C>>,
}

impl<N: GraphNode, C: GraphConnection> Graph<N, C> {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            nodes: Vec::new(),
            adjacency: Vec::new(),
        }
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Index the next [`Graph::add_node`] call will return.
    pub fn next_free_node_index(&self) -> NodeIndex {
        NodeIndex(self.nodes.len())
    }

    pub fn add_node(&mut self, node: N) -> NodeIndex {
        let idx = self.next_free_node_index();
        self.nodes.push(Some(node));
        self.adjacency.push(Vec::new());
        tracing::trace!(node = %idx, "graph node added");
        idx
    }

    /// Remove a node together with every connection that references it.
    pub fn remove_node(&mut self, idx: NodeIndex) -> Option<N> {
        let node = self.nodes.get_mut(idx.0)?.take()?;
        self.adjacency[idx.0].clear();
        for list in self.adjacency.iter_mut() {
            list.retain(|c| c.to() != idx);
        }
        tracing::trace!(node = %idx, "graph node removed");
        Some(node)
    }

    /// Connect two nodes with a cost equal to the distance between them.
    pub fn add_connection(&mut self, from: NodeIndex, to: NodeIndex) -> Result<(), GraphError> {
        let cost = self.distance_between(from, to)?;
        self.add_connection_with_cost(from, to, cost)
    }

    /// Connect two nodes with an explicit cost. Re-adding an existing connection updates its cost.
    pub fn add_connection_with_cost(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        cost: f32,
    ) -> Result<(), GraphError> {
        self.check_node(from)?;
        self.check_node(to)?;
        if from == to {
            return Err(GraphError::SelfConnection(from));
        }

        let connection = C::new(from, to, cost);
        if !self.directed {
            upsert(&mut self.adjacency[to.0], connection.reversed());
        }
        upsert(&mut self.adjacency[from.0], connection);
        tracing::trace!(%from, %to, cost, "graph connection added");
        Ok(())
    }

    /// Remove the connection `from -> to` (both directions for undirected graphs).
    pub fn remove_connection(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        let Some(list) = self.adjacency.get_mut(from.0) else {
            return false;
        };
        let before = list.len();
        list.retain(|c| c.to() != to);
        let removed = list.len() != before;

        if removed && !self.directed {
            if let Some(list) = self.adjacency.get_mut(to.0) {
                list.retain(|c| c.to() != from);
            }
        }
        if removed {
            tracing::trace!(%from, %to, "graph connection removed");
        }
        removed
    }

    pub fn is_node_valid(&self, idx: NodeIndex) -> bool {
        matches!(self.nodes.get(idx.0), Some(Some(_)))
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&N> {
        self.nodes.get(idx.0)?.as_ref()
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut N> {
        self.nodes.get_mut(idx.0)?.as_mut()
    }

    pub fn node_pos(&self, idx: NodeIndex) -> Option<Vec2> {
        self.node(idx).map(GraphNode::position)
    }

    /// Active nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &N)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeIndex(i), n)))
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeIndex, &mut N)> + '_ {
        self.nodes
            .iter_mut()
            .enumerate()
            .filter_map(|(i, n)| n.as_mut().map(|n| (NodeIndex(i), n)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Number of slots ever handed out, including removed ones. Useful for sizing per-node buffers.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connections traversable from `idx`. For undirected graphs this includes the mirrored
    /// direction of connections that were added towards `idx`.
    pub fn node_connections(&self, idx: NodeIndex) -> &[C] {
        self.adjacency
            .get(idx.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn connection(&self, from: NodeIndex, to: NodeIndex) -> Option<&C> {
        self.node_connections(from).iter().find(|c| c.to() == to)
    }

    /// Every connection once. Undirected connections are reported with `from < to`.
    pub fn connections(&self) -> impl Iterator<Item = &C> + '_ {
        let directed = self.directed;
        self.adjacency
            .iter()
            .flatten()
            .filter(move |c| directed || c.from() < c.to())
    }

    pub fn connection_count(&self) -> usize {
        self.connections().count()
    }

    /// Reset every connection cost to the distance between its endpoints.
    pub fn set_connection_costs_to_distance(&mut self) {
        let nodes = &self.nodes;
        let pos = |idx: NodeIndex| nodes.get(idx.0).and_then(Option::as_ref).map(N::position);
        for c in self.adjacency.iter_mut().flatten() {
            if let (Some(a), Some(b)) = (pos(c.from()), pos(c.to())) {
                c.set_cost(a.distance(b));
            }
        }
    }

    /// Closest active node within `radius` of `pos`.
    pub fn node_idx_at_world_pos(&self, pos: Vec2, radius: f32) -> Option<NodeIndex> {
        let radius2 = radius * radius;
        let mut best: Option<(f32, NodeIndex)> = None;
        for (idx, node) in self.nodes() {
            let d2 = node.position().distance_squared(pos);
            if d2 > radius2 {
                continue;
            }
            match best {
                Some((best_d2, _)) if best_d2 <= d2 => {}
                _ => best = Some((d2, idx)),
            }
        }
        best.map(|(_, idx)| idx)
    }

    /// Sum of connection costs along `path`, or `None` if two consecutive nodes are not connected.
    pub fn path_cost(&self, path: &[NodeIndex]) -> Option<f32> {
        path.windows(2)
            .map(|w| self.connection(w[0], w[1]).map(GraphConnection::cost))
            .sum()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.adjacency.clear();
    }

    fn check_node(&self, idx: NodeIndex) -> Result<(), GraphError> {
        if self.is_node_valid(idx) {
            Ok(())
        } else {
            Err(GraphError::InvalidNode(idx))
        }
    }

    fn distance_between(&self, from: NodeIndex, to: NodeIndex) -> Result<f32, GraphError> {
        let a = self.node_pos(from).ok_or(GraphError::InvalidNode(from))?;
        let b = self.node_pos(to).ok_or(GraphError::InvalidNode(to))?;
        Ok(a.distance(b))
    }
}

impl<N: GraphNode, C: GraphConnection> Default for Graph<N, C> {
    fn default() -> Self {
        Self::undirected()
    }
}

fn upsert<C: GraphConnection>(list: &mut Vec<C>, connection: C) {
    match list.iter_mut().find(|c| c.to() == connection.to()) {
        Some(existing) => *existing = connection,
        None => list.push(connection),
    }
}

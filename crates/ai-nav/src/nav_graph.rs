use ai_graph::{Graph, GraphNode, NodeIndex};

use crate::geometry::Polygon;
use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node of the navigation graph: the midpoint of an interior polygon edge.
///
/// `line_index` is `None` only for the temporary start and end nodes injected by a path query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavGraphNode {
    pub position: Vec2,
    pub line_index: Option<usize>,
}

impl NavGraphNode {
    pub fn on_line(position: Vec2, line_index: usize) -> Self {
        Self {
            position,
            line_index: Some(line_index),
        }
    }

    pub fn free(position: Vec2) -> Self {
        Self {
            position,
            line_index: None,
        }
    }
}

impl GraphNode for NavGraphNode {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// Source of static obstacles to carve out of a walkable contour.
pub trait ShapeQuery {
    fn static_shapes(&self) -> Vec<Polygon>;
}

impl ShapeQuery for [Polygon] {
    fn static_shapes(&self) -> Vec<Polygon> {
        self.to_vec()
    }
}

impl ShapeQuery for Vec<Polygon> {
    fn static_shapes(&self) -> Vec<Polygon> {
        self.clone()
    }
}

/// Walkable polygon plus the graph connecting the midpoints of its interior edges.
///
/// Two nodes are connected when their edges bound the same triangle, with the distance between
/// midpoints as cost. The graph is built once and never modified; queries work on a clone.
#[derive(Debug, Clone)]
pub struct NavGraph {
    graph: Graph<NavGraphNode>,
    polygon: Polygon,
    line_nodes: Vec<Option<NodeIndex>>,
}

impl NavGraph {
    /// Build from a walkable contour with every static shape, grown by `agent_radius`, as a hole.
    ///
    /// Holes on the contour itself are dropped; obstacles come from `shapes` only.
    pub fn new<Q>(contour: &Polygon, shapes: &Q, agent_radius: f32) -> Self
    where
        Q: ShapeQuery + ?Sized,
    {
        let mut polygon = Polygon::new(contour.points().to_vec());
        for shape in shapes.static_shapes() {
            polygon.add_child(shape.expanded(agent_radius));
        }
        Self::from_polygon(polygon)
    }

    /// Build from a polygon whose holes are already in place.
    ///
    /// A polygon that cannot be triangulated yields an empty graph; every path query on it fails.
    pub fn from_polygon(mut polygon: Polygon) -> Self {
        if let Err(err) = polygon.triangulate() {
            tracing::warn!(%err, "navigation polygon could not be triangulated");
        }

        let mut nav = Self {
            graph: Graph::undirected(),
            polygon,
            line_nodes: Vec::new(),
        };
        nav.create_navigation_graph();
        nav
    }

    fn create_navigation_graph(&mut self) {
        let polygon = &self.polygon;
        self.line_nodes = vec![None; polygon.lines().len()];

        for line in polygon.lines() {
            if polygon.triangles_from_line_index(line.index).len() == 2 {
                let idx = self
                    .graph
                    .add_node(NavGraphNode::on_line(line.midpoint(), line.index));
                self.line_nodes[line.index] = Some(idx);
            }
        }

        for (tri_idx, tri) in polygon.triangles().iter().enumerate() {
            let nodes: Vec<NodeIndex> = tri
                .line_indices
                .iter()
                .filter_map(|&l| self.line_nodes[l])
                .collect();

            match nodes.as_slice() {
                [a, b] => connect(&mut self.graph, *a, *b),
                [a, b, c] => {
                    connect(&mut self.graph, *a, *b);
                    connect(&mut self.graph, *b, *c);
                    connect(&mut self.graph, *a, *c);
                }
                // Ears and lone triangles have at most one interior edge.
                [] | [_] => {
                    tracing::trace!(
                        triangle = tri_idx,
                        nodes = nodes.len(),
                        "triangle adds no connections"
                    );
                }
                _ => {
                    tracing::warn!(
                        triangle = tri_idx,
                        nodes = nodes.len(),
                        "unexpected node count for triangle"
                    );
                }
            }
        }

        self.graph.set_connection_costs_to_distance();

        tracing::debug!(
            nodes = self.graph.node_count(),
            connections = self.graph.connection_count(),
            triangles = polygon.triangles().len(),
            "navigation graph built"
        );
    }

    pub fn graph(&self) -> &Graph<NavGraphNode> {
        &self.graph
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Node placed on the given polygon edge, if the edge is interior.
    pub fn node_idx_from_line_idx(&self, line_index: usize) -> Option<NodeIndex> {
        self.line_nodes.get(line_index).copied().flatten()
    }

    /// `true` when triangulation failed or produced nothing walkable.
    pub fn is_empty(&self) -> bool {
        self.polygon.triangles().is_empty()
    }
}

fn connect(graph: &mut Graph<NavGraphNode>, a: NodeIndex, b: NodeIndex) {
    if let Err(err) = graph.add_connection(a, b) {
        tracing::warn!(%err, "failed to connect navigation nodes");
    }
}

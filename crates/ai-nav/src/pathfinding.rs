use ai_graph::{AStar, HeuristicKind};

use crate::funnel::{find_portals, optimize_portals, Portal};
use crate::nav_graph::{NavGraph, NavGraphNode};
use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfindingConfig {
    pub heuristic: HeuristicKind,
}

/// Intermediate results of the last path query, for visualization.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathDebug {
    /// Node positions of the raw graph path, start and end included.
    pub node_positions: Vec<Vec2>,
    pub portals: Vec<Portal>,
}

impl PathDebug {
    pub fn clear(&mut self) {
        self.node_positions.clear();
        self.portals.clear();
    }
}

/// Shortest path from `start` to `end` across the walkable area of `nav_graph`.
///
/// Returns an empty path when either point is not finite or lies outside the walkable area, or
/// when no route exists. When both points share a triangle the result is just `[end]`; otherwise
/// it starts at `start` and ends at `end`.
pub fn find_path(
    start: Vec2,
    end: Vec2,
    nav_graph: &NavGraph,
    debug: Option<&mut PathDebug>,
) -> Vec<Vec2> {
    find_path_with_config(start, end, nav_graph, &PathfindingConfig::default(), debug)
}

pub fn find_path_with_config(
    start: Vec2,
    end: Vec2,
    nav_graph: &NavGraph,
    config: &PathfindingConfig,
    mut debug: Option<&mut PathDebug>,
) -> Vec<Vec2> {
    if let Some(debug) = debug.as_deref_mut() {
        debug.clear();
    }

    if !start.is_finite() || !end.is_finite() {
        tracing::debug!(?start, ?end, "path endpoint is not finite");
        return Vec::new();
    }

    let polygon = nav_graph.polygon();
    let Some(start_tri) = polygon.triangle_index_from_position(start) else {
        tracing::debug!(x = start.x, y = start.y, "path start outside walkable area");
        return Vec::new();
    };
    let Some(end_tri) = polygon.triangle_index_from_position(end) else {
        tracing::debug!(x = end.x, y = end.y, "path end outside walkable area");
        return Vec::new();
    };

    if start_tri == end_tri {
        if let Some(debug) = debug.as_deref_mut() {
            debug.node_positions = vec![start, end];
        }
        return vec![end];
    }

    let mut graph = nav_graph.graph().clone();
    let start_node = graph.add_node(NavGraphNode::free(start));
    let end_node = graph.add_node(NavGraphNode::free(end));
    for (node, tri) in [(start_node, start_tri), (end_node, end_tri)] {
        for &line in &polygon.triangles()[tri].line_indices {
            let Some(target) = nav_graph.node_idx_from_line_idx(line) else {
                continue;
            };
            if let Err(err) = graph.add_connection(node, target) {
                tracing::warn!(%err, "failed to attach path endpoint");
            }
        }
    }

    let node_path = AStar::new(&graph, config.heuristic.function()).find_path(start_node, end_node);
    if node_path.is_empty() {
        tracing::debug!(start_tri, end_tri, "no path between triangles");
        return Vec::new();
    }

    let nodes: Vec<NavGraphNode> = node_path
        .iter()
        .filter_map(|&idx| graph.node(idx).copied())
        .collect();
    let portals = find_portals(&nodes, polygon);
    let path = optimize_portals(&portals);

    tracing::trace!(
        nodes = nodes.len(),
        portals = portals.len(),
        points = path.len(),
        "path found"
    );

    if let Some(debug) = debug {
        debug.node_positions = nodes.iter().map(|n| n.position).collect();
        debug.portals = portals;
    }
    path
}

//! Influence maps: scalar values spread over a grid graph and decaying with distance.

use crate::graph::{GraphConnection, GraphNode, NodeIndex};
use crate::grid::{GridConnectivity, GridGraph};
use crate::math::lerp;
use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InfluenceNode {
    pub position: Vec2,
    pub influence: f32,
}

impl InfluenceNode {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            influence: 0.0,
        }
    }
}

impl GraphNode for InfluenceNode {
    fn position(&self) -> Vec2 {
        self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InfluenceConfig {
    /// Share of a node's current influence kept on each propagation step, in `[0, 1]`.
    pub momentum: f32,
    /// Attenuation per unit of connection cost.
    pub decay: f32,
    /// Seconds between propagation steps.
    pub propagation_interval: f32,
    /// Influence is clamped to `[-max_abs_influence, max_abs_influence]`.
    pub max_abs_influence: f32,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            momentum: 0.3,
            decay: 0.5,
            propagation_interval: 0.05,
            max_abs_influence: 100.0,
        }
    }
}

/// Grid of influence values.
///
/// Structural edits go through the map so the propagation buffer always matches the graph.
#[derive(Debug, Clone)]
pub struct InfluenceMap {
    grid: GridGraph<InfluenceNode>,
    config: InfluenceConfig,
    time_since_last_propagation: f32,
    buffer: Vec<f32>,
}

impl InfluenceMap {
    pub fn new(
        columns: u32,
        rows: u32,
        cell_size: f32,
        connectivity: GridConnectivity,
        config: InfluenceConfig,
    ) -> Self {
        let grid = GridGraph::new(columns, rows, cell_size, connectivity, InfluenceNode::new);
        let mut map = Self {
            grid,
            config,
            time_since_last_propagation: 0.0,
            buffer: Vec::new(),
        };
        map.initialize_buffer();
        map
    }

    pub fn config(&self) -> InfluenceConfig {
        self.config
    }

    pub fn set_config(&mut self, config: InfluenceConfig) {
        self.config = config;
    }

    pub fn grid(&self) -> &GridGraph<InfluenceNode> {
        &self.grid
    }

    pub fn influence(&self, idx: NodeIndex) -> Option<f32> {
        self.grid.graph().node(idx).map(|n| n.influence)
    }

    pub fn influence_at_position(&self, pos: Vec2) -> Option<f32> {
        self.influence(self.grid.node_idx_at_world_pos(pos)?)
    }

    /// Influence scaled into `[-1, 1]` by `max_abs_influence`, e.g. for coloring.
    pub fn relative_influence(&self, idx: NodeIndex) -> Option<f32> {
        let max = self.config.max_abs_influence.max(f32::EPSILON);
        self.influence(idx).map(|v| (v / max).clamp(-1.0, 1.0))
    }

    pub fn set_influence_at_position(&mut self, pos: Vec2, influence: f32) -> bool {
        let Some(idx) = self.grid.node_idx_at_world_pos(pos) else {
            return false;
        };
        self.set_influence(idx, influence)
    }

    /// Set every cell whose center lies within `radius` of `pos`. Returns the number of cells set.
    pub fn set_influence_in_radius(&mut self, pos: Vec2, influence: f32, radius: f32) -> usize {
        let size = self.grid.cell_size();
        let radius = radius.max(0.0);
        let min_x = ((pos.x - radius) / size).floor() as i32;
        let max_x = ((pos.x + radius) / size).floor() as i32;
        let min_y = ((pos.y - radius) / size).floor() as i32;
        let max_y = ((pos.y + radius) / size).floor() as i32;
        let radius2 = radius * radius;

        let mut count = 0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let Some(center) = self.grid.cell_center_of(x, y) else {
                    continue;
                };
                if center.distance_squared(pos) > radius2 {
                    continue;
                }
                let Some(idx) = self.grid.node_idx_at_cell(x, y) else {
                    continue;
                };
                if self.set_influence(idx, influence) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Advance the propagation timer. Returns `true` if a propagation step ran.
    pub fn propagate_influence(&mut self, dt_seconds: f32) -> bool {
        self.time_since_last_propagation += dt_seconds.max(0.0);
        if self.time_since_last_propagation < self.config.propagation_interval {
            return false;
        }
        self.time_since_last_propagation = 0.0;
        self.propagate_step();
        true
    }

    /// One propagation step, ignoring the timer.
    ///
    /// Every node takes its strongest neighbour influence, attenuated by
    /// `exp(-cost * decay)`, and blends it with its own value by `momentum`.
    pub fn propagate_step(&mut self) {
        let graph = self.grid.graph();
        for (idx, node) in graph.nodes() {
            let mut strongest = 0.0f32;
            for connection in graph.node_connections(idx) {
                let Some(neighbor) = graph.node(connection.to()) else {
                    continue;
                };
                let value =
                    neighbor.influence * (-connection.cost() * self.config.decay).exp();
                if value.abs() > strongest.abs() {
                    strongest = value;
                }
            }
            let blended = lerp(strongest, node.influence, self.config.momentum);
            let value = clamp_influence(blended, self.config.max_abs_influence);
            self.buffer[idx.0] = value;
        }

        let buffer = &self.buffer;
        for (idx, node) in self.grid.graph_mut().nodes_mut() {
            node.influence = buffer[idx.0];
        }
    }

    /// Remove a cell, turning it into a wall.
    pub fn remove_cell(&mut self, x: i32, y: i32) -> bool {
        let removed = self.grid.remove_cell(x, y).is_some();
        if removed {
            self.on_graph_modified(true, true);
        }
        removed
    }

    pub fn remove_connection(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        let removed = self.grid.graph_mut().remove_connection(from, to);
        if removed {
            self.on_graph_modified(false, true);
        }
        removed
    }

    pub fn reset_influence(&mut self) {
        for (_, node) in self.grid.graph_mut().nodes_mut() {
            node.influence = 0.0;
        }
    }

    fn set_influence(&mut self, idx: NodeIndex, influence: f32) -> bool {
        let value = clamp_influence(influence, self.config.max_abs_influence);
        match self.grid.graph_mut().node_mut(idx) {
            Some(node) => {
                node.influence = value;
                true
            }
            None => false,
        }
    }

    fn on_graph_modified(&mut self, nodes_changed: bool, connections_changed: bool) {
        tracing::trace!(nodes_changed, connections_changed, "influence map graph modified");
        if nodes_changed {
            self.initialize_buffer();
        }
    }

    fn initialize_buffer(&mut self) {
        self.buffer = vec![0.0; self.grid.graph().slot_count()];
    }
}

fn clamp_influence(value: f32, max_abs: f32) -> f32 {
    let max = max_abs.abs();
    value.clamp(-max, max)
}

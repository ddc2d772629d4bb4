use crate::graph::{Connection, Graph, GraphConnection, GraphNode, NodeIndex};
use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Cell {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GridConnectivity {
    /// N, E, S, W.
    #[default]
    Four,
    /// Four plus the diagonals.
    Eight,
}

/// Uniform grid of cells backed by an undirected [`Graph`].
///
/// Cell `(x, y)` covers `[x, x + 1) * cell_size` by `[y, y + 1) * cell_size` and owns the node
/// with index `y * columns + x`, positioned at the cell center.
#[derive(Debug, Clone)]
pub struct GridGraph<N, C = Connection> {
    graph: Graph<N, C>,
    columns: i32,
    rows: i32,
    cell_size: f32,
    connectivity: GridConnectivity,
}

impl<N: GraphNode, C: GraphConnection> GridGraph<N, C> {
    pub fn new(
        columns: u32,
        rows: u32,
        cell_size: f32,
        connectivity: GridConnectivity,
        mut make_node: impl FnMut(Vec2) -> N,
    ) -> Self {
        assert!(columns > 0 && rows > 0, "grid must be non-empty");
        assert!(cell_size > 0.0, "cell_size must be > 0");

        let mut grid = Self {
            graph: Graph::undirected(),
            columns: columns as i32,
            rows: rows as i32,
            cell_size,
            connectivity,
        };

        for y in 0..grid.rows {
            for x in 0..grid.columns {
                let center = grid.cell_center(Cell { x, y });
                grid.graph.add_node(make_node(center));
            }
        }

        // Only forward neighbours: the graph mirrors each connection.
        let forward: &[(i32, i32)] = match connectivity {
            GridConnectivity::Four => &[(1, 0), (0, 1)],
            GridConnectivity::Eight => &[(1, 0), (0, 1), (1, 1), (-1, 1)],
        };
        for y in 0..grid.rows {
            for x in 0..grid.columns {
                let Some(from) = grid.idx(Cell { x, y }) else {
                    continue;
                };
                for &(dx, dy) in forward {
                    let Some(to) = grid.idx(Cell { x: x + dx, y: y + dy }) else {
                        continue;
                    };
                    // Both cells were just created, so this cannot fail.
                    let _ = grid.graph.add_connection(from, to);
                }
            }
        }

        tracing::debug!(
            columns,
            rows,
            nodes = grid.graph.node_count(),
            connections = grid.graph.connection_count(),
            "grid graph built"
        );
        grid
    }

    pub fn columns(&self) -> u32 {
        self.columns as u32
    }

    pub fn rows(&self) -> u32 {
        self.rows as u32
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn connectivity(&self) -> GridConnectivity {
        self.connectivity
    }

    pub fn graph(&self) -> &Graph<N, C> {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph<N, C> {
        &mut self.graph
    }

    pub fn into_graph(self) -> Graph<N, C> {
        self.graph
    }

    /// Node of the cell containing `pos`, if the cell exists and its node was not removed.
    pub fn node_idx_at_world_pos(&self, pos: Vec2) -> Option<NodeIndex> {
        let cell = self.world_to_cell(pos)?;
        let idx = self.idx(cell)?;
        self.graph.is_node_valid(idx).then_some(idx)
    }

    pub fn node_idx_at_cell(&self, x: i32, y: i32) -> Option<NodeIndex> {
        let idx = self.idx(Cell { x, y })?;
        self.graph.is_node_valid(idx).then_some(idx)
    }

    /// Remove a cell's node, turning it into a wall.
    pub fn remove_cell(&mut self, x: i32, y: i32) -> Option<N> {
        let idx = self.idx(Cell { x, y })?;
        self.graph.remove_node(idx)
    }

    pub fn cell_center_of(&self, x: i32, y: i32) -> Option<Vec2> {
        let cell = Cell { x, y };
        self.in_bounds(cell).then(|| self.cell_center(cell))
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.columns && cell.y < self.rows
    }

    fn idx(&self, cell: Cell) -> Option<NodeIndex> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some(NodeIndex((cell.y * self.columns + cell.x) as usize))
    }

    fn world_to_cell(&self, p: Vec2) -> Option<Cell> {
        let x = (p.x / self.cell_size).floor() as i32;
        let y = (p.y / self.cell_size).floor() as i32;
        let cell = Cell { x, y };
        if self.in_bounds(cell) {
            Some(cell)
        } else {
            None
        }
    }

    fn cell_center(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }
}

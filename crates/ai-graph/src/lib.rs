//! Deterministic, engine-agnostic graph primitives: positioned nodes, weighted connections and
//! the searches that run over them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod astar;
pub mod bfs;
pub mod graph;
pub mod grid;
pub mod heuristic;
pub mod influence;
pub mod math;

pub use astar::AStar;
pub use bfs::Bfs;
pub use graph::{
    Connection, Graph, GraphConnection, GraphError, GraphNode, GraphNode2D, NodeIndex,
};
pub use grid::{GridConnectivity, GridGraph};
pub use heuristic::{Heuristic, HeuristicKind};
pub use influence::{InfluenceConfig, InfluenceMap, InfluenceNode};
pub use math::Vec2;

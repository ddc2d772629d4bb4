//! Polygon navigation: triangulated walkable areas, an edge-midpoint graph, and funnel-smoothed
//! path queries.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod funnel;
pub mod geometry;
pub mod nav_graph;
pub mod navigator;
pub mod pathfinding;

pub use ai_graph::{HeuristicKind, Vec2};
pub use funnel::{find_portals, optimize_portals, Portal};
pub use geometry::{Line, Polygon, Triangle, TriangulationError};
pub use nav_graph::{NavGraph, NavGraphNode, ShapeQuery};
pub use navigator::{NavCorridor, NavPath, NavRaycastHit, Navigator};
pub use pathfinding::{find_path, find_path_with_config, PathDebug, PathfindingConfig};

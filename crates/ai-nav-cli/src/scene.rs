//! Scene files: a walkable contour, obstacles, and the queries to run against them.

use std::path::Path;

use ai_nav::{NavGraph, PathfindingConfig, Polygon, Vec2};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// `[x, y]` in scene files.
pub type Point = [f32; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub contour: Vec<Point>,

    /// Static obstacles, each grown by `agent_radius` before being cut out of the contour.
    pub obstacles: Vec<Vec<Point>>,

    #[serde(default = "default_agent_radius")]
    pub agent_radius: f32,

    pub pathfinding: PathfindingConfig,

    pub queries: Vec<PathQuery>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathQuery {
    pub from: Point,
    pub to: Point,
}

fn default_agent_radius() -> f32 {
    1.0
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            contour: Vec::new(),
            obstacles: Vec::new(),
            agent_radius: default_agent_radius(),
            pathfinding: PathfindingConfig::default(),
            queries: Vec::new(),
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene from {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse scene from {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scene: Self = serde_yaml::from_str(content)?;
        anyhow::ensure!(
            scene.agent_radius >= 0.0,
            "agent_radius must not be negative (got {})",
            scene.agent_radius
        );
        Ok(scene)
    }

    pub fn contour_polygon(&self) -> Polygon {
        polygon_from_points(&self.contour)
    }

    pub fn obstacle_polygons(&self) -> Vec<Polygon> {
        self.obstacles.iter().map(|o| polygon_from_points(o)).collect()
    }

    pub fn build_nav_graph(&self) -> NavGraph {
        NavGraph::new(&self.contour_polygon(), &self.obstacle_polygons(), self.agent_radius)
    }
}

pub fn to_vec2(p: Point) -> Vec2 {
    Vec2::new(p[0], p[1])
}

fn polygon_from_points(points: &[Point]) -> Polygon {
    Polygon::new(points.iter().copied().map(to_vec2).collect())
}

/// Parse `x,y` from the command line.
pub fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("invalid x `{x}`: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("invalid y `{y}`: {e}"))?;
    Ok(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_nav::{find_path_with_config, HeuristicKind};

    #[test]
    fn missing_fields_use_defaults() {
        let scene =
            SceneConfig::parse("contour: [[0, 0], [4, 0], [4, 4], [0, 4]]\n").expect("scene");
        assert_eq!(scene.agent_radius, 1.0);
        assert_eq!(scene.pathfinding.heuristic, HeuristicKind::Euclidean);
        assert!(scene.obstacles.is_empty());
        assert!(scene.queries.is_empty());
    }

    #[test]
    fn negative_radius_is_rejected() {
        let err = SceneConfig::parse("agent_radius: -1.0\n").expect_err("negative radius");
        assert!(err.to_string().contains("agent_radius"));
    }

    #[test]
    fn bundled_scene_answers_its_queries() {
        let scene = SceneConfig::parse(include_str!("../../../scenes/pillar_hall.yaml"))
            .expect("scene");
        assert_eq!(scene.obstacles.len(), 3);
        assert_eq!(scene.pathfinding.heuristic, HeuristicKind::Euclidean);

        let nav = scene.build_nav_graph();
        assert!(!nav.is_empty());

        let results: Vec<Vec<Vec2>> = scene
            .queries
            .iter()
            .map(|q| {
                let (from, to) = (to_vec2(q.from), to_vec2(q.to));
                find_path_with_config(from, to, &nav, &scene.pathfinding, None)
            })
            .collect();
        assert!(results[..3].iter().all(|p| !p.is_empty()));
        assert!(results[3].is_empty());
    }

    #[test]
    fn points_parse_from_the_command_line() {
        assert_eq!(parse_point("1.5, -2"), Ok(Vec2::new(1.5, -2.0)));
        assert!(parse_point("1.5").is_err());
        assert!(parse_point("a,2").is_err());
    }
}

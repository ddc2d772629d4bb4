use crate::funnel::Portal;
use crate::geometry::segment_hit;
use crate::nav_graph::NavGraph;
use crate::pathfinding::{find_path, PathDebug};
use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPath {
    pub points: Vec<Vec2>,
}

impl NavPath {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavRaycastHit {
    pub point: Vec2,
}

/// Debug-friendly corridor result for path following / visualization.
///
/// `portals` starts and ends with point portals at the requested start and goal. `corners` is the
/// funnel output for those portals.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavCorridor {
    /// Positions of the graph nodes the corridor passes through.
    pub nodes: Vec<Vec2>,
    pub portals: Vec<Portal>,
    pub corners: Vec<Vec2>,
}

pub trait Navigator {
    fn find_path(&self, start: Vec2, goal: Vec2) -> Option<NavPath>;

    /// Backends that don't support corridor queries may return `None`.
    fn corridor(&self, _start: Vec2, _goal: Vec2) -> Option<NavCorridor> {
        None
    }

    /// Returns the first point where the segment from `start` to `end` exits navigable space.
    fn raycast(&self, _start: Vec2, _end: Vec2) -> Option<NavRaycastHit> {
        None
    }

    /// Project a point onto the nearest navigable surface.
    fn nearest_point(&self, _point: Vec2) -> Option<Vec2> {
        None
    }
}

impl Navigator for NavGraph {
    fn find_path(&self, start: Vec2, goal: Vec2) -> Option<NavPath> {
        let points = find_path(start, goal, self, None);
        (!points.is_empty()).then(|| NavPath::new(points))
    }

    fn corridor(&self, start: Vec2, goal: Vec2) -> Option<NavCorridor> {
        let mut debug = PathDebug::default();
        let corners = find_path(start, goal, self, Some(&mut debug));
        if corners.is_empty() {
            return None;
        }
        // Same-triangle queries skip the funnel.
        let portals = if debug.portals.is_empty() {
            vec![Portal::point(start), Portal::point(goal)]
        } else {
            debug.portals
        };
        Some(NavCorridor {
            nodes: debug.node_positions,
            portals,
            corners,
        })
    }

    fn raycast(&self, start: Vec2, end: Vec2) -> Option<NavRaycastHit> {
        let polygon = self.polygon();
        polygon.triangle_from_position(start)?;

        let dir = end - start;
        let mut best_t: Option<f32> = None;
        for line in polygon.boundary_lines() {
            let Some(t) = segment_hit(start, dir, line.p1, line.p2) else {
                continue;
            };
            // Contact at either end of the ray does not count as leaving.
            if t <= 1e-6 || t >= 1.0 - 1e-6 {
                continue;
            }
            if best_t.map_or(true, |best| t < best) {
                best_t = Some(t);
            }
        }

        let t = best_t?;
        Some(NavRaycastHit {
            point: start + dir * t,
        })
    }

    fn nearest_point(&self, point: Vec2) -> Option<Vec2> {
        self.polygon().closest_point(point)
    }
}

//! Portal extraction and string pulling (simple stupid funnel algorithm).

use crate::geometry::Polygon;
use crate::nav_graph::NavGraphNode;
use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Edge the path has to cross, with endpoints named relative to the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Portal {
    pub right: Vec2,
    pub left: Vec2,
}

impl Portal {
    pub fn new(right: Vec2, left: Vec2) -> Self {
        Self { right, left }
    }

    /// Zero-width portal used for the start and end points.
    pub fn point(p: Vec2) -> Self {
        Self { right: p, left: p }
    }

    pub fn is_point(&self) -> bool {
        self.right == self.left
    }
}

/// Turn a node path into portals: a point portal for the first and last node, and one oriented
/// portal per interior edge in between.
///
/// Nodes without a line index in the middle of the path are skipped.
pub fn find_portals(nodes: &[NavGraphNode], polygon: &Polygon) -> Vec<Portal> {
    let (Some(first), Some(last)) = (nodes.first(), nodes.last()) else {
        return Vec::new();
    };

    let mut portals = Vec::with_capacity(nodes.len());
    portals.push(Portal::point(first.position));

    if nodes.len() > 2 {
        for pair in nodes[..nodes.len() - 1].windows(2) {
            let (prev, node) = (pair[0], pair[1]);
            let Some(line) = node.line_index.and_then(|l| polygon.lines().get(l)) else {
                continue;
            };
            // The previous node sits behind the edge, so the edge endpoints fall on opposite
            // sides of the ray from it through the edge midpoint.
            let ahead = line.midpoint() - prev.position;
            if ahead.cross(line.p1 - prev.position) > 0.0 {
                portals.push(Portal::new(line.p2, line.p1));
            } else {
                portals.push(Portal::new(line.p1, line.p2));
            }
        }
    }

    if nodes.len() > 1 {
        portals.push(Portal::point(last.position));
    }
    portals
}

/// Shortest path through a portal sequence. The result starts at the first portal and ends at the
/// last.
pub fn optimize_portals(portals: &[Portal]) -> Vec<Vec2> {
    let Some(first) = portals.first() else {
        return Vec::new();
    };
    let end = portals[portals.len() - 1].left;

    let mut path = vec![first.left];
    let mut apex = first.left;
    let mut left = first.left;
    let mut right = first.right;
    let mut left_index = 0;
    let mut right_index = 0;

    let mut i = 1;
    while i < portals.len() {
        let portal = portals[i];

        // Tighten the right leg.
        if (right - apex).cross(portal.right - apex) >= 0.0 {
            if apex == right || (portal.right - apex).cross(left - apex) >= 0.0 {
                right = portal.right;
                right_index = i;
            } else {
                // Right crossed over left: the left point becomes a corner.
                apex = left;
                path.push(apex);
                right = apex;
                right_index = left_index;
                i = left_index + 1;
                continue;
            }
        }

        // Tighten the left leg.
        if (left - apex).cross(portal.left - apex) <= 0.0 {
            if apex == left || (portal.left - apex).cross(right - apex) <= 0.0 {
                left = portal.left;
                left_index = i;
            } else {
                apex = right;
                path.push(apex);
                left = apex;
                left_index = right_index;
                i = right_index + 1;
                continue;
            }
        }

        i += 1;
    }

    if path.last() != Some(&end) {
        path.push(end);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn straight_corridor_collapses_to_two_points() {
        let portals = [
            Portal::point(v(0.0, 0.0)),
            Portal::new(v(1.0, -1.0), v(1.0, 1.0)),
            Portal::new(v(2.0, -1.0), v(2.0, 1.0)),
            Portal::point(v(3.0, 0.0)),
        ];
        assert_eq!(optimize_portals(&portals), vec![v(0.0, 0.0), v(3.0, 0.0)]);
    }

    #[test]
    fn funnel_turns_at_the_inner_corner() {
        // Travel east then north around a corner at (1, 1) on the left.
        let portals = [
            Portal::point(v(0.0, 0.5)),
            Portal::new(v(1.0, 0.0), v(1.0, 1.0)),
            Portal::new(v(2.0, 1.0), v(1.0, 1.0)),
            Portal::point(v(1.5, 3.0)),
        ];
        assert_eq!(
            optimize_portals(&portals),
            vec![v(0.0, 0.5), v(1.0, 1.0), v(1.5, 3.0)]
        );
    }

    #[test]
    fn funnel_turns_at_a_corner_on_the_right() {
        // Mirror of the left turn: east then south around (1, 0).
        let portals = [
            Portal::point(v(0.0, 0.5)),
            Portal::new(v(1.0, 0.0), v(1.0, 1.0)),
            Portal::new(v(1.0, 0.0), v(2.0, 0.0)),
            Portal::point(v(1.5, -2.0)),
        ];
        assert_eq!(
            optimize_portals(&portals),
            vec![v(0.0, 0.5), v(1.0, 0.0), v(1.5, -2.0)]
        );
    }

    #[test]
    fn empty_and_single_portal_inputs() {
        assert!(optimize_portals(&[]).is_empty());
        assert_eq!(optimize_portals(&[Portal::point(v(2.0, 2.0))]), vec![v(2.0, 2.0)]);
        assert!(find_portals(&[], &Polygon::default()).is_empty());
    }
}

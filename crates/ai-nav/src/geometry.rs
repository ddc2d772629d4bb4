//! Polygons, their triangulation, and point queries against the resulting triangles.

use std::collections::BTreeMap;

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon};
use thiserror::Error;

use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const AREA_EPSILON: f32 = 1e-6;
const CONTAINS_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriangulationError {
    /// `ring` is 0 for the outer contour and `i + 1` for hole `i`.
    #[error("ring {ring} has {count} vertices, at least 3 are required")]
    TooFewVertices { ring: usize, count: usize },
    #[error("ring {ring} has zero area")]
    ZeroArea { ring: usize },
    #[error("ring {ring} intersects itself")]
    SelfIntersecting { ring: usize },
    #[error("triangulator failed: {0}")]
    Triangulator(String),
    #[error("triangulation produced no triangles")]
    NoTriangles,
}

/// A polygon edge. `index` is its position in the owning polygon's line list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Line {
    pub p1: Vec2,
    pub p2: Vec2,
    pub index: usize,
}

impl Line {
    pub fn new(p1: Vec2, p2: Vec2, index: usize) -> Self {
        Self { p1, p2, index }
    }

    pub fn midpoint(&self) -> Vec2 {
        self.p1.midpoint(self.p2)
    }

    pub fn length(&self) -> f32 {
        self.p1.distance(self.p2)
    }
}

/// Triangle produced by [`Polygon::triangulate`]. Vertices are counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    pub points: [Vec2; 3],
    /// Indices of the bounding edges in the owning polygon's line list: `(p0, p1)`, `(p1, p2)`,
    /// `(p2, p0)`.
    pub line_indices: [usize; 3],
}

impl Triangle {
    pub fn centroid(&self) -> Vec2 {
        (self.points[0] + self.points[1] + self.points[2]) / 3.0
    }

    pub fn area(&self) -> f32 {
        tri_area2(self.points[0], self.points[1], self.points[2]).abs() * 0.5
    }

    /// `true` if `p` lies inside the triangle or on its boundary.
    pub fn contains(&self, p: Vec2) -> bool {
        point_in_triangle(p, self.points)
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        closest_point_on_triangle(p, self.points)
    }

    pub fn has_line(&self, line_index: usize) -> bool {
        self.line_indices.contains(&line_index)
    }
}

/// Walkable area: an outer contour with hole children (obstacles).
///
/// Lines and triangles are derived by [`Polygon::triangulate`]; until then both are empty.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    points: Vec<Vec2>,
    #[cfg_attr(feature = "serde", serde(default))]
    children: Vec<Polygon>,
    #[cfg_attr(feature = "serde", serde(skip))]
    lines: Vec<Line>,
    #[cfg_attr(feature = "serde", serde(skip))]
    triangles: Vec<Triangle>,
    #[cfg_attr(feature = "serde", serde(skip))]
    line_triangles: Vec<Vec<usize>>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Axis-aligned rectangle, counter-clockwise from `min`.
    pub fn rectangle(min: Vec2, max: Vec2) -> Self {
        Self::new(vec![
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ])
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn children(&self) -> &[Polygon] {
        &self.children
    }

    pub fn add_child(&mut self, hole: Polygon) {
        self.children.push(hole);
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f32 {
        signed_area(&self.points)
    }

    /// Walkable area: the outer ring minus the union of the holes, clipped to the outer ring.
    pub fn area(&self) -> f32 {
        if self.children.is_empty() {
            return self.signed_area().abs();
        }
        walkable_region(&self.points, &self.children).unsigned_area() as f32
    }

    pub fn is_self_intersecting(&self) -> bool {
        ring_self_intersects(&self.points)
    }

    /// Copy of the outer ring pushed outwards by `radius` along the vertex bisectors (miter join).
    ///
    /// Children are not carried over. Used to grow obstacles by an agent's radius.
    pub fn expanded(&self, radius: f32) -> Polygon {
        let n = self.points.len();
        if n < 3 || radius == 0.0 {
            return Polygon::new(self.points.clone());
        }

        let winding = if self.signed_area() >= 0.0 { 1.0 } else { -1.0 };
        let outward = |dir: Vec2| Vec2::new(dir.y, -dir.x) * winding;

        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            let prev = self.points[(i + n - 1) % n];
            let cur = self.points[i];
            let next = self.points[(i + 1) % n];

            let n0 = outward((cur - prev).normalize_or_zero());
            let n1 = outward((next - cur).normalize_or_zero());
            let bisector = (n0 + n1).normalize_or_zero();
            if bisector == Vec2::ZERO {
                points.push(cur + n0 * radius);
                continue;
            }
            // Miter length grows as the corner sharpens; cap it at 4x the radius.
            let cos = bisector.dot(n0).max(0.25);
            points.push(cur + bisector * (radius / cos));
        }
        Polygon::new(points)
    }

    /// Triangulate the area between the outer ring and the holes.
    ///
    /// On error the polygon is left with no lines and no triangles.
    pub fn triangulate(&mut self) -> Result<(), TriangulationError> {
        self.lines.clear();
        self.triangles.clear();
        self.line_triangles.clear();

        validate_ring(&self.points, 0)?;
        for (i, child) in self.children.iter().enumerate() {
            validate_ring(&child.points, i + 1)?;
        }

        let parts = self.walkable_parts();
        let mut edge_map: BTreeMap<EdgeKey, usize> = BTreeMap::new();
        for (outer, holes) in &parts {
            let mut vertices: Vec<Vec2> = outer.clone();
            let mut hole_indices = Vec::with_capacity(holes.len());
            for hole in holes {
                hole_indices.push(vertices.len());
                vertices.extend_from_slice(hole);
            }
            let coords: Vec<f64> = vertices
                .iter()
                .flat_map(|p| [f64::from(p.x), f64::from(p.y)])
                .collect();

            let indices = match earcutr::earcut(&coords, &hole_indices, 2) {
                Ok(indices) => indices,
                Err(err) => {
                    self.lines.clear();
                    self.triangles.clear();
                    self.line_triangles.clear();
                    return Err(TriangulationError::Triangulator(format!("{err:?}")));
                }
            };
            for tri in indices.chunks_exact(3) {
                self.add_triangle(
                    [vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]],
                    &mut edge_map,
                );
            }
        }

        if self.triangles.is_empty() {
            self.lines.clear();
            self.line_triangles.clear();
            return Err(TriangulationError::NoTriangles);
        }

        let overfull = self.line_triangles.iter().filter(|t| t.len() > 2).count();
        if overfull > 0 {
            tracing::warn!(overfull, "edges shared by more than two triangles");
        }

        tracing::debug!(
            triangles = self.triangles.len(),
            lines = self.lines.len(),
            holes = self.children.len(),
            parts = parts.len(),
            "polygon triangulated"
        );
        Ok(())
    }

    /// Rings to triangulate, as `(outer, holes)` pairs.
    ///
    /// Holes are merged with each other and clipped against the outer ring first, which can split
    /// the walkable area into several parts.
    fn walkable_parts(&self) -> Vec<(Vec<Vec2>, Vec<Vec<Vec2>>)> {
        if self.children.is_empty() {
            return vec![(self.points.clone(), Vec::new())];
        }
        walkable_region(&self.points, &self.children)
            .0
            .iter()
            .map(|part| {
                let holes = part
                    .interiors()
                    .iter()
                    .map(from_geo_ring)
                    .filter(|h| h.len() >= 3)
                    .collect();
                (from_geo_ring(part.exterior()), holes)
            })
            .filter(|(outer, _)| outer.len() >= 3)
            .collect()
    }

    fn add_triangle(
        &mut self,
        [mut a, b, mut c]: [Vec2; 3],
        edge_map: &mut BTreeMap<EdgeKey, usize>,
    ) {
        let area2 = tri_area2(a, b, c);
        if area2.abs() <= AREA_EPSILON {
            return;
        }
        if area2 < 0.0 {
            core::mem::swap(&mut a, &mut c);
        }

        let tri_idx = self.triangles.len();
        let points = [a, b, c];
        let mut line_indices = [0usize; 3];
        for (slot, (p, q)) in tri_edges(&points).into_iter().enumerate() {
            let line_idx = *edge_map.entry(EdgeKey::new(p, q)).or_insert_with(|| {
                self.lines.push(Line::new(p, q, self.lines.len()));
                self.line_triangles.push(Vec::with_capacity(2));
                self.lines.len() - 1
            });
            self.line_triangles[line_idx].push(tri_idx);
            line_indices[slot] = line_idx;
        }
        self.triangles.push(Triangle {
            points,
            line_indices,
        });
    }

    /// Triangle containing `pos`. On a shared edge the lower triangle index wins.
    pub fn triangle_from_position(&self, pos: Vec2) -> Option<&Triangle> {
        self.triangle_index_from_position(pos)
            .map(|i| &self.triangles[i])
    }

    pub fn triangle_index_from_position(&self, pos: Vec2) -> Option<usize> {
        self.triangles.iter().position(|t| t.contains(pos))
    }

    /// Indices of the one (boundary edge) or two (interior edge) triangles bordering a line.
    pub fn triangles_from_line_index(&self, line_index: usize) -> &[usize] {
        self.line_triangles
            .get(line_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Edges that border exactly one triangle: the outer contour and the hole outlines.
    pub fn boundary_lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.lines
            .iter()
            .filter(|l| self.triangles_from_line_index(l.index).len() == 1)
    }

    /// Closest point on the triangulated area.
    pub fn closest_point(&self, p: Vec2) -> Option<Vec2> {
        let mut best: Option<(f32, Vec2)> = None;
        for tri in &self.triangles {
            let q = tri.closest_point(p);
            let d2 = q.distance_squared(p);
            match best {
                None => best = Some((d2, q)),
                Some((best_d2, _)) if d2 < best_d2 => best = Some((d2, q)),
                _ => {}
            }
        }
        best.map(|(_, q)| q)
    }
}

/// Direction-independent edge identity, keyed on the exact bits of both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EdgeKey([u32; 2], [u32; 2]);

impl EdgeKey {
    fn new(a: Vec2, b: Vec2) -> Self {
        let bits = |p: Vec2| [p.x.to_bits(), p.y.to_bits()];
        let (a, b) = (bits(a), bits(b));
        Self(a.min(b), a.max(b))
    }
}

fn validate_ring(points: &[Vec2], ring: usize) -> Result<(), TriangulationError> {
    if points.len() < 3 {
        return Err(TriangulationError::TooFewVertices {
            ring,
            count: points.len(),
        });
    }
    if signed_area(points).abs() <= AREA_EPSILON {
        return Err(TriangulationError::ZeroArea { ring });
    }
    if ring_self_intersects(points) {
        return Err(TriangulationError::SelfIntersecting { ring });
    }
    Ok(())
}

fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| points[i].cross(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

fn ring_self_intersects(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        for j in (i + 2)..n {
            // The first and last edges share a vertex.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (points[j], points[(j + 1) % n]);
            if segments_intersect(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let d1 = tri_area2(c, d, a);
    let d2 = tri_area2(c, d, b);
    let d3 = tri_area2(a, b, c);
    let d4 = tri_area2(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

// `p` is known to be collinear with `a`-`b`.
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

pub(crate) fn tri_edges(tri: &[Vec2; 3]) -> [(Vec2, Vec2); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

pub(crate) fn tri_area2(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).cross(c - a)
}

fn point_in_triangle(p: Vec2, [a, b, c]: [Vec2; 3]) -> bool {
    let sides = [tri_area2(a, b, p), tri_area2(b, c, p), tri_area2(c, a, p)];
    sides.iter().all(|&s| s >= -CONTAINS_EPSILON) || sides.iter().all(|&s| s <= CONTAINS_EPSILON)
}

fn project_onto_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return a;
    }
    a + ab * ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
}

fn closest_point_on_triangle(p: Vec2, tri: [Vec2; 3]) -> Vec2 {
    if point_in_triangle(p, tri) {
        return p;
    }
    tri_edges(&tri)
        .into_iter()
        .map(|(a, b)| project_onto_segment(p, a, b))
        .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
        .unwrap_or(p)
}

/// Parameter `t` at which `origin + t * dir` meets the segment `a`-`b`, if it does within
/// `t` in `[0, 1]`.
pub(crate) fn segment_hit(origin: Vec2, dir: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let edge = b - a;
    let denom = dir.cross(edge);
    if denom.abs() <= 1e-8 {
        return None;
    }
    let to_a = a - origin;
    let t = to_a.cross(edge) / denom;
    let u = to_a.cross(dir) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then_some(t)
}

fn to_geo_polygon(points: &[Vec2]) -> geo::Polygon<f64> {
    let ring: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord {
            x: f64::from(p.x),
            y: f64::from(p.y),
        })
        .collect();
    geo::Polygon::new(LineString::new(ring), Vec::new())
}

fn from_geo_ring(ring: &LineString<f64>) -> Vec<Vec2> {
    let mut points: Vec<Vec2> = ring
        .coords()
        .map(|c| Vec2::new(c.x as f32, c.y as f32))
        .collect();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// `outer` minus the union of `holes`. Holes may overlap each other or cross the outer ring.
fn walkable_region(outer: &[Vec2], holes: &[Polygon]) -> MultiPolygon<f64> {
    let blocked = holes
        .iter()
        .filter(|h| h.points.len() >= 3)
        .fold(MultiPolygon::new(Vec::new()), |acc, h| {
            acc.union(&MultiPolygon::new(vec![to_geo_polygon(&h.points)]))
        });
    MultiPolygon::new(vec![to_geo_polygon(outer)]).difference(&blocked)
}

//! Planar geometry for the lasso trail
//!
//! Pure functions only. Degenerate inputs (polygons with fewer than three
//! vertices, empty polylines) return empty/false results instead of
//! panicking, so a single frame of bad input can never halt the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Point containment (inclusive on all edges)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Grow the rect by `margin` on every side (negative shrinks)
    pub fn expand(&self, margin: f32) -> Rect {
        let m = Vec2::splat(margin);
        Rect {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Clamp a point into the rect
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Even-odd ray-casting point-in-polygon test
///
/// The polygon need not be convex or non-self-intersecting. Points exactly on
/// an edge resolve deterministically (one side in, one side out) but are not
/// guaranteed "inside". Fewer than three vertices is never a hit.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let t = (point.y - a.y) / (b.y - a.y);
            if point.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Min/max extents of a vertex set (zero rect when empty)
pub fn bounding_box(polygon: &[Vec2]) -> Rect {
    let Some(&first) = polygon.first() else {
        return Rect::default();
    };
    let mut min = first;
    let mut max = first;
    for &p in &polygon[1..] {
        min = min.min(p);
        max = max.max(p);
    }
    Rect { min, max }
}

/// Distance from a point to a line segment
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-6 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Minimum distance from a point to any segment of an open polyline
///
/// A single-vertex polyline is a point; an empty one is infinitely far away.
pub fn distance_to_polyline(p: Vec2, polyline: &[Vec2]) -> f32 {
    match polyline {
        [] => f32::INFINITY,
        [only] => p.distance(*only),
        _ => polyline
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

/// Absolute polygon area via the shoelace formula (zero below three vertices)
pub fn polygon_area(polygon: &[Vec2]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        sum += polygon[j].x * polygon[i].y - polygon[i].x * polygon[j].y;
        j = i;
    }
    (sum * 0.5).abs()
}

/// Find the earliest trail index the last point closes against
///
/// A candidate must sit at least `min_loop_points` back from the trail end
/// (guards against trivial self-touch right after the trail starts) and
/// within `closure_radius` of the last point. Scanning from the front keeps
/// the resulting sub-loop as large as possible.
pub fn closing_index(polyline: &[Vec2], closure_radius: f32, min_loop_points: usize) -> Option<usize> {
    let last_idx = polyline.len().checked_sub(1)?;
    let last = polyline[last_idx];
    let limit = last_idx.checked_sub(min_loop_points)?;
    (0..=limit).find(|&i| polyline[i].distance(last) <= closure_radius)
}

/// Loop closure predicate
///
/// True iff the trail end closes against an earlier point (see
/// [`closing_index`]) and the enclosed sub-loop area exceeds `min_loop_area`,
/// which rejects flat back-and-forth scribbles.
pub fn is_loop_closed(
    polyline: &[Vec2],
    closure_radius: f32,
    min_loop_points: usize,
    min_loop_area: f32,
) -> bool {
    closing_index(polyline, closure_radius, min_loop_points)
        .map(|i| polygon_area(&polyline[i..]) >= min_loop_area)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(size, 0.0),
            Vec2::new(size, size),
            Vec2::new(0.0, size),
        ]
    }

    #[test]
    fn test_rect_ops() {
        let r = Rect::new(Vec2::new(10.0, 10.0), Vec2::new(30.0, 20.0));
        assert_eq!(r.size(), Vec2::new(20.0, 10.0));
        assert_eq!(r.center(), Vec2::new(20.0, 15.0));
        assert!(r.intersects(&Rect::new(Vec2::new(25.0, 5.0), Vec2::new(40.0, 15.0))));
        assert!(!r.intersects(&Rect::new(Vec2::new(31.0, 10.0), Vec2::new(40.0, 20.0))));
        assert_eq!(r.clamp_point(Vec2::new(0.0, 50.0)), Vec2::new(10.0, 20.0));
        // Inverted corners normalize
        assert_eq!(
            Rect::new(Vec2::splat(5.0), Vec2::ZERO),
            Rect::new(Vec2::ZERO, Vec2::splat(5.0))
        );
    }

    #[test]
    fn test_point_in_square() {
        let poly = square(10.0);
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &poly));
        assert!(!point_in_polygon(Vec2::new(-1.0, 5.0), &poly));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U-shape: the notch at the top middle is outside
        let poly = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(30.0, 30.0),
            Vec2::new(20.0, 30.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 30.0),
            Vec2::new(0.0, 30.0),
        ];
        assert!(point_in_polygon(Vec2::new(5.0, 20.0), &poly));
        assert!(point_in_polygon(Vec2::new(25.0, 20.0), &poly));
        assert!(!point_in_polygon(Vec2::new(15.0, 20.0), &poly)); // in the notch
        assert!(point_in_polygon(Vec2::new(15.0, 5.0), &poly)); // in the base
    }

    #[test]
    fn test_degenerate_polygon_never_contains() {
        assert!(!point_in_polygon(Vec2::ZERO, &[]));
        assert!(!point_in_polygon(Vec2::ZERO, &[Vec2::ZERO]));
        assert!(!point_in_polygon(Vec2::ZERO, &[Vec2::ZERO, Vec2::ONE]));
    }

    #[test]
    fn test_bounding_box() {
        let bb = bounding_box(&[Vec2::new(3.0, -2.0), Vec2::new(-1.0, 5.0), Vec2::new(2.0, 2.0)]);
        assert_eq!(bb.min, Vec2::new(-1.0, -2.0));
        assert_eq!(bb.max, Vec2::new(3.0, 5.0));
        assert_eq!(bounding_box(&[]), Rect::default());
    }

    #[test]
    fn test_distance_to_polyline() {
        let line = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)];
        assert!((distance_to_polyline(Vec2::new(5.0, 3.0), &line) - 3.0).abs() < 1e-5);
        assert!((distance_to_polyline(Vec2::new(-4.0, 0.0), &line) - 4.0).abs() < 1e-5);
        assert_eq!(distance_to_polyline(Vec2::ZERO, &[]), f32::INFINITY);
    }

    #[test]
    fn test_polygon_area() {
        assert!((polygon_area(&square(10.0)) - 100.0).abs() < 1e-4);
        assert_eq!(polygon_area(&[Vec2::ZERO, Vec2::ONE]), 0.0);
    }

    #[test]
    fn test_square_loop_closes() {
        // Perfect square back to its start point
        let trail = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(0.0, 0.0),
        ];
        assert!(is_loop_closed(&trail, 10.0, 3, 500.0));
    }

    #[test]
    fn test_straight_line_never_closes() {
        let trail: Vec<Vec2> = (0..20).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect();
        assert!(!is_loop_closed(&trail, 10.0, 3, 500.0));
        // Even with a huge closure radius the enclosed area is zero
        assert!(!is_loop_closed(&trail, 500.0, 3, 1.0));
    }

    #[test]
    fn test_trivial_self_touch_rejected() {
        // Last point touches its immediate predecessors only
        let trail = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.5, 0.5),
        ];
        assert!(!is_loop_closed(&trail, 3.0, 8, 1.0));
    }
}

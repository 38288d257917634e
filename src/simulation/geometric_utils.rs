//! Geometric utility functions for ray casting and collision tests.
//!
//! Everything here is a pure function over `geo` points and segments.

use geo::{Coord, Line};

/// Four corners of an oriented rectangle, in winding order.
pub type Polygon = [Coord<f32>; 4];

/// A point where a segment crosses another one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Location of the crossing.
    pub point: Coord<f32>,
    /// Fraction of the first segment (start to end) at which the crossing lies.
    pub offset: f32,
}

/// Linear interpolation between `start` and `end`.
#[inline]
pub fn lerp(start: f32, end: f32, fraction: f32) -> f32 {
    start + (end - start) * fraction
}

/// Intersects two segments.
///
/// Returns `None` when the segments are parallel or when the crossing point lies
/// outside either of them. The returned offset is measured along `a`.
pub fn intersect(a: &Line<f32>, b: &Line<f32>) -> Option<Intersection> {
    let (p, q) = (a.start, a.end);
    let (c, d) = (b.start, b.end);

    let t_top = (d.x - c.x) * (p.y - c.y) - (d.y - c.y) * (p.x - c.x);
    let u_top = (c.y - p.y) * (p.x - q.x) - (c.x - p.x) * (p.y - q.y);
    let bottom = (d.y - c.y) * (q.x - p.x) - (d.x - c.x) * (q.y - p.y);

    if bottom == 0.0 {
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(Intersection {
        point: Coord {
            x: lerp(p.x, q.x, t),
            y: lerp(p.y, q.y, t),
        },
        offset: t,
    })
}

/// Returns the four boundary edges of a polygon, `p[i]` to `p[(i + 1) % 4]`.
pub fn polygon_edges(polygon: &Polygon) -> [Line<f32>; 4] {
    std::array::from_fn(|i| Line::new(polygon[i], polygon[(i + 1) % polygon.len()]))
}

/// Checks whether any edge of `polygon` crosses `line`.
pub fn polygon_intersects_line(polygon: &Polygon, line: &Line<f32>) -> bool {
    polygon_edges(polygon)
        .iter()
        .any(|edge| intersect(edge, line).is_some())
}

/// Checks whether the outlines of two polygons cross.
///
/// Containment without touching edges is not reported.
pub fn polygons_intersect(a: &Polygon, b: &Polygon) -> bool {
    polygon_edges(b)
        .iter()
        .any(|edge| polygon_intersects_line(a, edge))
}

/// Builds the corners of a rectangle of `width` x `height` centered at `center`
/// and rotated by `angle` radians.
///
/// At `angle = 0` the corners come out front-right, front-left, back-left, back-right
/// (front is `-y`). Consecutive corners share an edge and the wrap-around closes the
/// outline, so callers may rely on this order for edge tests and fill paths.
pub fn oriented_rectangle(center: Coord<f32>, angle: f32, width: f32, height: f32) -> Polygon {
    let radius = width.hypot(height) / 2.0;
    // tan(alpha) = width / height
    let alpha = width.atan2(height);

    let corner = |theta: f32| Coord {
        x: center.x - theta.sin() * radius,
        y: center.y - theta.cos() * radius,
    };

    [
        corner(angle - alpha),
        corner(angle + alpha),
        corner(std::f32::consts::PI + angle - alpha),
        corner(std::f32::consts::PI + angle + alpha),
    ]
}

/// Center of a polygon as the mean of its corners.
pub fn polygon_center(polygon: &Polygon) -> Coord<f32> {
    let sum = polygon
        .iter()
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, p| acc + *p);
    sum / polygon.len() as f32
}

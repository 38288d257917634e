#![allow(missing_docs)]

use autopilot::simulation::geometric_utils::{
    intersect, lerp, oriented_rectangle, polygon_center, polygon_edges,
    polygon_intersects_line, polygons_intersect,
};
use geo::{Coord, Line};

const EPS: f32 = 1e-4;

fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> Line<f32> {
    Line::new(Coord { x: x1, y: y1 }, Coord { x: x2, y: y2 })
}

fn assert_close(actual: Coord<f32>, expected: (f32, f32)) {
    assert!(
        (actual.x - expected.0).abs() < EPS && (actual.y - expected.1).abs() < EPS,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn test_lerp() {
    assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    assert!((lerp(2.0, 4.0, 0.25) - 2.5).abs() < EPS);
}

#[test]
fn test_crossing_segments_intersect() {
    let a = line(0.0, 0.0, 10.0, 0.0);
    let b = line(5.0, -5.0, 5.0, 5.0);

    let hit = intersect(&a, &b).expect("segments cross");
    assert_close(hit.point, (5.0, 0.0));
    assert!((hit.offset - 0.5).abs() < EPS);
}

#[test]
fn test_offset_is_measured_along_first_segment() {
    let a = line(0.0, 0.0, 0.0, -100.0);
    let b = line(-10.0, -25.0, 10.0, -25.0);

    let hit = intersect(&a, &b).expect("segments cross");
    assert!((hit.offset - 0.25).abs() < EPS);

    let reversed = intersect(&b, &a).expect("segments cross");
    assert!((reversed.offset - 0.5).abs() < EPS);
}

#[test]
fn test_parallel_segments_do_not_intersect() {
    let a = line(0.0, 0.0, 10.0, 0.0);
    let b = line(0.0, 1.0, 10.0, 1.0);
    assert!(intersect(&a, &b).is_none());

    // collinear overlap counts as parallel
    let c = line(5.0, 0.0, 15.0, 0.0);
    assert!(intersect(&a, &c).is_none());
}

#[test]
fn test_crossing_outside_either_segment_is_ignored() {
    let a = line(0.0, 0.0, 10.0, 0.0);
    let beyond_end = line(15.0, -5.0, 15.0, 5.0);
    let short = line(5.0, 1.0, 5.0, 5.0);

    assert!(intersect(&a, &beyond_end).is_none());
    assert!(intersect(&a, &short).is_none());
}

#[test]
fn test_touching_endpoint_counts() {
    let a = line(0.0, 0.0, 10.0, 0.0);
    let b = line(10.0, -5.0, 10.0, 5.0);

    let hit = intersect(&a, &b).expect("endpoint touch");
    assert!((hit.offset - 1.0).abs() < EPS);
}

#[test]
fn test_rectangle_corners_at_zero_angle() {
    let corners = oriented_rectangle(Coord { x: 0.0, y: 0.0 }, 0.0, 30.0, 50.0);

    // front-right, front-left, back-left, back-right with front towards -y
    assert_close(corners[0], (15.0, -25.0));
    assert_close(corners[1], (-15.0, -25.0));
    assert_close(corners[2], (-15.0, 25.0));
    assert_close(corners[3], (15.0, 25.0));
}

#[test]
fn test_rectangle_rotated_quarter_turn() {
    let center = Coord { x: 100.0, y: 50.0 };
    let corners = oriented_rectangle(center, std::f32::consts::FRAC_PI_2, 30.0, 50.0);

    let max_x = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max);
    let max_y = corners.iter().map(|c| c.y).fold(f32::MIN, f32::max);
    assert!((max_x - 125.0).abs() < EPS);
    assert!((max_y - 65.0).abs() < EPS);
    assert_close(polygon_center(&corners), (100.0, 50.0));
}

#[test]
fn test_polygon_edges_wrap_around() {
    let corners = oriented_rectangle(Coord { x: 0.0, y: 0.0 }, 0.0, 30.0, 50.0);
    let edges = polygon_edges(&corners);

    assert_eq!(edges.len(), 4);
    for (i, edge) in edges.iter().enumerate() {
        assert_eq!(edge.start, corners[i]);
        assert_eq!(edge.end, corners[(i + 1) % 4]);
    }
}

#[test]
fn test_polygon_line_intersection() {
    let corners = oriented_rectangle(Coord { x: 0.0, y: 0.0 }, 0.0, 30.0, 50.0);

    assert!(polygon_intersects_line(&corners, &line(10.0, -100.0, 10.0, 100.0)));
    assert!(!polygon_intersects_line(&corners, &line(20.0, -100.0, 20.0, 100.0)));
}

#[test]
fn test_overlapping_polygons_intersect() {
    let a = oriented_rectangle(Coord { x: 0.0, y: 0.0 }, 0.0, 30.0, 50.0);
    let b = oriented_rectangle(Coord { x: 20.0, y: 10.0 }, 0.0, 30.0, 50.0);
    let far = oriented_rectangle(Coord { x: 100.0, y: 0.0 }, 0.0, 30.0, 50.0);

    assert!(polygons_intersect(&a, &b));
    assert!(polygons_intersect(&b, &a));
    assert!(!polygons_intersect(&a, &far));
}

#[test]
fn test_contained_polygon_does_not_intersect() {
    let outer = oriented_rectangle(Coord { x: 0.0, y: 0.0 }, 0.0, 100.0, 100.0);
    let inner = oriented_rectangle(Coord { x: 0.0, y: 0.0 }, 0.3, 10.0, 10.0);

    assert!(!polygons_intersect(&outer, &inner));
    assert!(!polygons_intersect(&inner, &outer));
}

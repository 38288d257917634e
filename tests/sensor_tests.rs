#![allow(missing_docs)]

use autopilot::simulation::geometric_utils::oriented_rectangle;
use autopilot::simulation::sensors::Sensors;
use geo::{Coord, Line};
use std::f32::consts::FRAC_PI_2;

const EPS: f32 = 1e-4;
const ORIGIN: Coord<f32> = Coord { x: 100.0, y: 100.0 };

fn horizontal(y: f32) -> Line<f32> {
    Line::new(Coord { x: -1000.0, y }, Coord { x: 1000.0, y })
}

#[test]
fn test_no_readings_before_first_update() {
    let sensors = Sensors::new(5, FRAC_PI_2, 150.0);

    assert!(sensors.rays().is_empty());
    assert!(sensors.readings().is_empty());
    assert_eq!(sensors.closeness().to_vec(), vec![0.0; 5]);
}

#[test]
fn test_fan_settings() {
    let sensors = Sensors::new(5, FRAC_PI_2, 150.0);

    assert_eq!(sensors.ray_count(), 5);
    assert_eq!(sensors.spread(), FRAC_PI_2);
    assert_eq!(sensors.length(), 150.0);
}

#[test]
fn test_rays_fan_out_from_left_to_right() {
    let mut sensors = Sensors::new(5, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.0, &[], &[]);

    let rays = sensors.rays();
    assert_eq!(rays.len(), 5);
    for ray in rays {
        assert_eq!(ray.start, ORIGIN);
        let length = (ray.end.x - ray.start.x).hypot(ray.end.y - ray.start.y);
        assert!((length - 150.0).abs() < EPS);
    }

    // middle ray straight ahead, first ray to the left, last to the right
    assert!((rays[2].end.x - 100.0).abs() < EPS);
    assert!((rays[2].end.y - -50.0).abs() < EPS);
    assert!(rays[0].end.x < 100.0);
    assert!(rays[4].end.x > 100.0);
    assert!((rays[0].end.x - (100.0 - 150.0 * std::f32::consts::FRAC_1_SQRT_2)).abs() < EPS);
}

#[test]
fn test_single_ray_points_straight_ahead() {
    let mut sensors = Sensors::new(1, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.0, &[], &[]);

    let ray = sensors.rays()[0];
    assert!((ray.end.x - 100.0).abs() < EPS);
    assert!((ray.end.y - -50.0).abs() < EPS);
}

#[test]
fn test_rays_turn_with_the_vehicle() {
    let mut sensors = Sensors::new(1, FRAC_PI_2, 100.0);
    sensors.update(ORIGIN, FRAC_PI_2, &[], &[]);

    let ray = sensors.rays()[0];
    assert!((ray.end.x - 0.0).abs() < EPS);
    assert!((ray.end.y - 100.0).abs() < EPS);
}

#[test]
fn test_nothing_in_range_reads_zero() {
    let mut sensors = Sensors::new(3, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.0, &[horizontal(-500.0)], &[]);

    assert!(sensors.readings().iter().all(Option::is_none));
    assert_eq!(sensors.closeness().to_vec(), vec![0.0; 3]);
}

#[test]
fn test_border_hit_closeness() {
    let mut sensors = Sensors::new(1, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.0, &[horizontal(25.0)], &[]);

    let hit = sensors.readings()[0].expect("ray reaches the border");
    assert!((hit.offset - 0.5).abs() < EPS);
    assert!((hit.point.y - 25.0).abs() < EPS);
    assert!((sensors.closeness()[0] - 0.5).abs() < EPS);
}

#[test]
fn test_nearest_hit_wins() {
    let mut sensors = Sensors::new(1, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.0, &[horizontal(0.0), horizontal(70.0)], &[]);

    let hit = sensors.readings()[0].expect("ray reaches both borders");
    assert!((hit.offset - 0.2).abs() < EPS);
    assert!((sensors.closeness()[0] - 0.8).abs() < EPS);
}

#[test]
fn test_obstacle_hit_uses_nearest_edge() {
    // back edge at y = 25, front edge at y = -25
    let obstacle = oriented_rectangle(Coord { x: 100.0, y: 0.0 }, 0.0, 30.0, 50.0);

    let mut sensors = Sensors::new(1, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.0, &[], &[&obstacle]);

    let hit = sensors.readings()[0].expect("ray reaches the obstacle");
    assert!((hit.point.y - 25.0).abs() < EPS);
    assert!((sensors.closeness()[0] - 0.5).abs() < EPS);
}

#[test]
fn test_obstacle_behind_border_is_hidden() {
    let obstacle = oriented_rectangle(Coord { x: 100.0, y: 0.0 }, 0.0, 30.0, 50.0);

    let mut sensors = Sensors::new(1, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.0, &[horizontal(55.0)], &[&obstacle]);

    let hit = sensors.readings()[0].expect("ray reaches the border");
    assert!((hit.point.y - 55.0).abs() < EPS);
}

#[test]
fn test_closeness_values_are_in_unit_range() {
    let obstacle = oriented_rectangle(Coord { x: 60.0, y: 20.0 }, 0.4, 30.0, 50.0);
    let border = Line::new(Coord { x: 170.0, y: -1000.0 }, Coord { x: 170.0, y: 1000.0 });

    let mut sensors = Sensors::new(7, FRAC_PI_2, 150.0);
    sensors.update(ORIGIN, 0.1, &[border], &[&obstacle]);

    let closeness = sensors.closeness();
    assert_eq!(closeness.len(), 7);
    assert!(closeness.iter().all(|&c| (0.0..=1.0).contains(&c)));
    assert!(closeness.iter().any(|&c| c > 0.0));
}

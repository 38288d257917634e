//! Ray-cast distance sensors mounted on a vehicle.
//!
//! A fan of rays is cast from the vehicle center; every ray reports the nearest
//! road border or obstacle edge it touches.

use geo::{Coord, Line};
use ndarray::Array1;

use super::geometric_utils::{Intersection, Polygon, intersect, lerp, polygon_edges};

/// A fan of rays centered on the vehicle heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensors {
    ray_count: usize,
    spread: f32,
    length: f32,
    rays: Vec<Line<f32>>,
    readings: Vec<Option<Intersection>>,
}

impl Sensors {
    /// Creates a fan of `ray_count` rays spanning `spread` radians, each `length`
    /// pixels long. Rays are empty until the first [`Sensors::update`].
    pub fn new(ray_count: usize, spread: f32, length: f32) -> Self {
        Self {
            ray_count,
            spread,
            length,
            rays: Vec::with_capacity(ray_count),
            readings: Vec::with_capacity(ray_count),
        }
    }

    /// Recasts the rays from `origin` facing `angle` and takes new readings.
    ///
    /// Borders are tested before obstacles, and obstacles in the order given.
    pub fn update(
        &mut self,
        origin: Coord<f32>,
        angle: f32,
        borders: &[Line<f32>],
        obstacles: &[&Polygon],
    ) {
        self.rays = self.cast_rays(origin, angle);
        self.readings = self
            .rays
            .iter()
            .map(|ray| read_ray(ray, borders, obstacles))
            .collect();
    }

    fn cast_rays(&self, origin: Coord<f32>, angle: f32) -> Vec<Line<f32>> {
        (0..self.ray_count)
            .map(|i| {
                let fraction = if self.ray_count == 1 {
                    0.5
                } else {
                    i as f32 / (self.ray_count - 1) as f32
                };
                let ray_angle = angle + lerp(self.spread / 2.0, -self.spread / 2.0, fraction);

                let end = Coord {
                    x: origin.x - ray_angle.sin() * self.length,
                    y: origin.y - ray_angle.cos() * self.length,
                };
                Line::new(origin, end)
            })
            .collect()
    }

    /// Per-ray closeness, `1 - offset` for a hit and `0` when nothing is in range.
    pub fn closeness(&self) -> Array1<f32> {
        if self.readings.is_empty() {
            return Array1::zeros(self.ray_count);
        }
        self.readings
            .iter()
            .map(|reading| reading.map_or(0.0, |hit| 1.0 - hit.offset))
            .collect()
    }

    /// Number of rays, which is also the network input size.
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Angle covered by the fan.
    pub fn spread(&self) -> f32 {
        self.spread
    }

    /// Length of every ray.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Rays from the last update.
    pub fn rays(&self) -> &[Line<f32>] {
        &self.rays
    }

    /// Nearest hit per ray from the last update.
    pub fn readings(&self) -> &[Option<Intersection>] {
        &self.readings
    }
}

/// Finds the nearest hit along `ray`. On equal offsets the first hit found wins.
fn read_ray(
    ray: &Line<f32>,
    borders: &[Line<f32>],
    obstacles: &[&Polygon],
) -> Option<Intersection> {
    let border_hits = borders.iter().filter_map(|border| intersect(ray, border));
    let obstacle_hits = obstacles
        .iter()
        .flat_map(|polygon| polygon_edges(polygon))
        .filter_map(|edge| intersect(ray, &edge));

    border_hits
        .chain(obstacle_hits)
        .fold(None, |nearest: Option<Intersection>, hit| match nearest {
            Some(best) if best.offset <= hit.offset => Some(best),
            _ => Some(hit),
        })
}

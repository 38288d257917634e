//! Straight multi-lane road.

use geo::{Coord, Line};

use super::geometric_utils::lerp;

/// Stand-in for an endless road in both directions.
pub const ROAD_EXTENT: f32 = 1_000_000.0;

/// A straight road running along the y axis.
///
/// The road never changes after construction; vehicles, sensors and rendering all
/// read its borders.
#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    center_x: f32,
    width: f32,
    lane_count: usize,
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    borders: [Line<f32>; 2],
}

impl Road {
    /// Creates a road centered at `center_x`. A lane count of zero is treated as one.
    pub fn new(center_x: f32, width: f32, lane_count: usize) -> Self {
        let left = center_x - width / 2.0;
        let right = center_x + width / 2.0;
        let top = -ROAD_EXTENT;
        let bottom = ROAD_EXTENT;

        let top_left = Coord { x: left, y: top };
        let bottom_left = Coord { x: left, y: bottom };
        let top_right = Coord { x: right, y: top };
        let bottom_right = Coord { x: right, y: bottom };

        Self {
            center_x,
            width,
            lane_count: lane_count.max(1),
            left,
            right,
            top,
            bottom,
            borders: [
                Line::new(top_left, bottom_left),
                Line::new(top_right, bottom_right),
            ],
        }
    }

    /// X coordinate of the middle of lane `index`, counted from the left.
    ///
    /// Indices past the last lane resolve to the last lane.
    pub fn lane_center_x(&self, index: usize) -> f32 {
        let lane_width = self.width / self.lane_count as f32;
        let index = index.min(self.lane_count - 1);
        self.left + lane_width / 2.0 + index as f32 * lane_width
    }

    /// The left and right border lines.
    pub fn borders(&self) -> &[Line<f32>; 2] {
        &self.borders
    }

    /// Dashed divider lines between adjacent lanes.
    pub fn lane_markings(&self) -> Vec<Line<f32>> {
        (1..self.lane_count)
            .map(|i| {
                let x = lerp(self.left, self.right, i as f32 / self.lane_count as f32);
                Line::new(Coord { x, y: self.top }, Coord { x, y: self.bottom })
            })
            .collect()
    }

    /// X coordinate of the road center.
    pub fn center_x(&self) -> f32 {
        self.center_x
    }

    /// Total road width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Number of lanes.
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// X coordinate of the left border.
    pub fn left(&self) -> f32 {
        self.left
    }

    /// X coordinate of the right border.
    pub fn right(&self) -> f32 {
        self.right
    }
}

//! Vehicle kinematics, damage and lifecycle.
//!
//! A vehicle is a rectangle that accelerates, brakes and steers according to its
//! [`Controls`]. Its outline polygon and damage flag are derived from the pose and
//! rebuilt on every tick.

use geo::{Coord, Line};
use ndarray::Array1;

use super::controls::{ControlSource, Controls};
use super::geometric_utils::{
    Polygon, oriented_rectangle, polygon_intersects_line, polygons_intersect,
};
use super::sensors::Sensors;

/// Heading change per tick while steering, in radians.
pub const ANGLE_STEP: f32 = 0.03;
/// Speed gained per tick while accelerating.
pub const ACCELERATION: f32 = 0.2;
/// Speed lost per tick to friction.
pub const FRICTION: f32 = 0.02;
/// Top speed of primary vehicles.
pub const MAX_SPEED: f32 = 9.0;
/// Top speed of traffic vehicles.
pub const TRAFFIC_MAX_SPEED: f32 = 4.5;

/// Index of a vehicle in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

impl VehicleId {
    /// Position in the world's vehicle list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Role of a vehicle in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    /// Learning or keyboard-driven vehicle; freezes when damaged.
    Primary,
    /// Obstacle vehicle; keeps driving whatever happens.
    Traffic,
}

/// A simulated car.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Center of the vehicle.
    pub position: Coord<f32>,
    /// Extent across the heading.
    pub width: f32,
    /// Extent along the heading.
    pub height: f32,
    /// Signed speed along the heading; negative when reversing.
    pub speed: f32,
    /// Speed change per tick while accelerating or reversing.
    pub acceleration: f32,
    /// Heading in radians; 0 faces `-y`.
    pub angle: f32,
    /// Forward speed limit. Reverse is limited to half of it.
    pub max_speed: f32,
    /// Speed decay per tick.
    pub friction: f32,
    /// Flags applied on the next tick.
    pub controls: Controls,
    /// Producer of the next controls.
    pub driver: ControlSource,
    /// Primary or traffic.
    pub kind: VehicleKind,
    /// Fill color (RGB).
    pub color: [u8; 3],
    /// Keep the damage flag once set instead of recomputing it every tick.
    pub latch_damage: bool,
    polygon: Polygon,
    damaged: bool,
    sensors: Option<Sensors>,
}

impl Vehicle {
    /// Creates a vehicle at rest facing `-y`.
    pub fn new(
        position: Coord<f32>,
        width: f32,
        height: f32,
        kind: VehicleKind,
        driver: ControlSource,
    ) -> Self {
        let max_speed = match kind {
            VehicleKind::Primary => MAX_SPEED,
            VehicleKind::Traffic => TRAFFIC_MAX_SPEED,
        };
        let color = match kind {
            VehicleKind::Primary => [30, 90, 200],
            VehicleKind::Traffic => [160, 40, 160],
        };

        Self {
            position,
            width,
            height,
            speed: 0.0,
            acceleration: ACCELERATION,
            angle: 0.0,
            max_speed,
            friction: FRICTION,
            controls: Controls::default(),
            driver,
            kind,
            color,
            latch_damage: false,
            polygon: oriented_rectangle(position, 0.0, width, height),
            damaged: false,
            sensors: None,
        }
    }

    /// Mounts a sensor fan on the vehicle.
    #[must_use]
    pub fn with_sensors(mut self, sensors: Sensors) -> Self {
        self.sensors = Some(sensors);
        self
    }

    /// Overrides the forward speed limit.
    #[must_use]
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Overrides the fill color.
    #[must_use]
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Advances the vehicle by one tick.
    ///
    /// Damage is assessed first from the current outline against `borders` and
    /// `obstacles` (which must not contain this vehicle). A damaged primary vehicle
    /// does not move; traffic always moves. The outline and sensors are rebuilt
    /// afterwards either way.
    pub fn update(&mut self, borders: &[Line<f32>], obstacles: &[&Polygon]) {
        let hit = self.assess_damage(borders, obstacles);
        self.damaged = hit || (self.latch_damage && self.damaged);

        if !(self.damaged && self.kind == VehicleKind::Primary) {
            self.apply_controls();
        }

        self.polygon = oriented_rectangle(self.position, self.angle, self.width, self.height);

        if let Some(sensors) = &mut self.sensors {
            sensors.update(self.position, self.angle, borders, obstacles);
        }
    }

    fn assess_damage(&self, borders: &[Line<f32>], obstacles: &[&Polygon]) -> bool {
        borders
            .iter()
            .any(|border| polygon_intersects_line(&self.polygon, border))
            || obstacles
                .iter()
                .any(|other| polygons_intersect(&self.polygon, other))
    }

    fn apply_controls(&mut self) {
        if self.controls.forward {
            self.speed += self.acceleration;
        }
        if self.controls.reverse {
            self.speed -= self.acceleration;
        }

        // steering flips when reversing and does nothing at a standstill
        let flip = if self.speed > 0.0 {
            1.0
        } else if self.speed < 0.0 {
            -1.0
        } else {
            0.0
        };
        if self.controls.left {
            self.angle += ANGLE_STEP * flip;
        }
        if self.controls.right {
            self.angle -= ANGLE_STEP * flip;
        }

        self.speed = self.speed.clamp(-self.max_speed / 2.0, self.max_speed);

        if self.speed > 0.0 {
            self.speed = (self.speed - self.friction).max(0.0);
        } else if self.speed < 0.0 {
            self.speed = (self.speed + self.friction).min(0.0);
        }

        self.position.x -= self.angle.sin() * self.speed;
        self.position.y -= self.angle.cos() * self.speed;
    }

    /// Outline from the last update.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Whether the last update found the vehicle touching a border or obstacle.
    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    /// Sensor fan, if mounted.
    pub fn sensors(&self) -> Option<&Sensors> {
        self.sensors.as_ref()
    }

    /// Sensor closeness values, empty without sensors.
    pub fn closeness(&self) -> Array1<f32> {
        self.sensors
            .as_ref()
            .map_or_else(|| Array1::zeros(0), Sensors::closeness)
    }

    /// Distance travelled up the road from `start_y`.
    pub fn progress(&self, start_y: f32) -> f32 {
        start_y - self.position.y
    }

    /// Half of the diagonal, the radius of a circle enclosing the outline.
    pub fn reach(&self) -> f32 {
        self.width.hypot(self.height) / 2.0
    }
}

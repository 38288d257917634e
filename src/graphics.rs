use autopilot::simulation::geometric_utils::polygon_center;
use autopilot::simulation::vehicle::VehicleKind;
use autopilot::simulation::world::{Frame, VehicleView};
use geo::{Coord, Line};
use macroquad::prelude::*;

const MARKER_WIDTH: f32 = 5.0;
const DASH_LENGTH: f32 = 20.0;
/// Fraction of the screen height at which the followed vehicle is drawn.
const FOLLOW_HEIGHT: f32 = 0.7;

/// Maps simulation coordinates to screen coordinates.
///
/// The view keeps the road centered horizontally and scrolls vertically to follow
/// one vehicle.
pub struct View {
    origin: Coord<f32>,
    anchor: Vec2,
}

impl View {
    /// Follows the fittest vehicle of `frame`, or the road start if there is none.
    pub fn following(frame: &Frame, road_center_x: f32, fallback_y: f32) -> Self {
        let focus_y = frame
            .fittest
            .and_then(|id| frame.vehicles.get(id.index()))
            .map_or(fallback_y, |vehicle| polygon_center(vehicle.polygon).y);

        Self {
            origin: Coord {
                x: road_center_x,
                y: focus_y,
            },
            anchor: vec2(
                (screen_width() - crate::ui::PANEL_WIDTH) / 2.0,
                screen_height() * FOLLOW_HEIGHT,
            ),
        }
    }

    /// Simulation y coordinate shown at the top of the screen.
    fn top(&self) -> f32 {
        self.origin.y - self.anchor.y
    }

    /// Simulation y coordinate shown at the bottom of the screen.
    fn bottom(&self) -> f32 {
        self.origin.y + (screen_height() - self.anchor.y)
    }
}

trait ToScreen {
    type Output;
    fn to_screen(&self, view: &View) -> Self::Output;
}

impl ToScreen for Coord<f32> {
    type Output = Vec2;
    fn to_screen(&self, view: &View) -> Vec2 {
        vec2(
            self.x - view.origin.x + view.anchor.x,
            self.y - view.origin.y + view.anchor.y,
        )
    }
}

impl ToScreen for Line<f32> {
    type Output = (Vec2, Vec2);
    fn to_screen(&self, view: &View) -> (Vec2, Vec2) {
        (self.start.to_screen(view), self.end.to_screen(view))
    }
}

/// Draws road, vehicles and the sensors of the fittest vehicle.
pub fn draw_frame(frame: &Frame, view: &View) {
    draw_road(frame, view);

    // traffic and the fittest vehicle on top of the ghosted population
    let (focused, rest): (Vec<&VehicleView>, Vec<&VehicleView>) = frame
        .vehicles
        .iter()
        .partition(|v| v.fittest || v.kind == VehicleKind::Traffic);

    for vehicle in rest {
        draw_vehicle(vehicle, view, 0.2);
    }
    for vehicle in focused {
        draw_vehicle(vehicle, view, 1.0);
        if vehicle.fittest {
            draw_sensors(vehicle, view);
        }
    }
}

fn draw_road(frame: &Frame, view: &View) {
    for border in frame.borders {
        let (start, end) = border.to_screen(view);
        draw_line(start.x, start.y, end.x, end.y, MARKER_WIDTH, WHITE);
    }

    // dashes stay aligned to the road while it scrolls
    let first_dash = (view.top() / (DASH_LENGTH * 2.0)).floor() * DASH_LENGTH * 2.0;
    for marking in &frame.lane_markings {
        let x = marking.start.x;
        let mut y = first_dash;
        while y < view.bottom() {
            let start = Coord { x, y }.to_screen(view);
            let end = Coord {
                x,
                y: y + DASH_LENGTH,
            }
            .to_screen(view);
            draw_line(start.x, start.y, end.x, end.y, MARKER_WIDTH, WHITE);
            y += DASH_LENGTH * 2.0;
        }
    }
}

fn draw_vehicle(vehicle: &VehicleView, view: &View, alpha: f32) {
    let [a, b, c, d] = (*vehicle.polygon).map(|corner| corner.to_screen(view));

    let color = if vehicle.damaged {
        Color::new(0.5, 0.5, 0.5, alpha)
    } else {
        let [red, green, blue] = vehicle.color;
        Color::from_rgba(red, green, blue, (alpha * 255.0) as u8)
    };

    draw_triangle(a, b, c, color);
    draw_triangle(a, c, d, color);
}

fn draw_sensors(vehicle: &VehicleView, view: &View) {
    for (ray, reading) in vehicle.rays.iter().zip(vehicle.readings) {
        let (start, end) = ray.to_screen(view);
        match reading {
            Some(hit) => {
                let touch = hit.point.to_screen(view);
                draw_line(start.x, start.y, touch.x, touch.y, 2.0, YELLOW);
                draw_line(touch.x, touch.y, end.x, end.y, 2.0, BLACK);
            }
            None => draw_line(start.x, start.y, end.x, end.y, 2.0, YELLOW),
        }
    }
}

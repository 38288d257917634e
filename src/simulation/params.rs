use serde::{Deserialize, Serialize};

use super::storage::DEFAULT_STORE_KEY;
use super::vehicle::{MAX_SPEED, TRAFFIC_MAX_SPEED};

/// Who drives the primary vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverMode {
    /// A population of network drivers that evolves between runs.
    Autopilot,
    /// A single vehicle driven from the keyboard.
    Keyboard,
}

/// Placement of one traffic vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficCar {
    /// Lane index, counted from the left.
    pub lane: usize,
    /// Starting y coordinate.
    pub y: f32,
}

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// X coordinate of the road center.
    pub road_center_x: f32,
    /// Total road width.
    pub road_width: f32,
    /// Number of lanes.
    pub lane_count: usize,
    /// Vehicle extent across the heading.
    pub car_width: f32,
    /// Vehicle extent along the heading.
    pub car_height: f32,
    /// Lane the primary vehicles start in.
    pub start_lane: usize,
    /// Starting y coordinate of the primary vehicles; progress is measured from here.
    pub start_y: f32,
    /// Top speed of primary vehicles.
    pub max_speed: f32,
    /// Top speed of traffic.
    pub traffic_max_speed: f32,
    /// Whether traffic holds forward or stands still.
    pub traffic_cruise: bool,
    /// Traffic layout.
    pub traffic: Vec<TrafficCar>,
    /// Number of sensor rays, which is also the network input size.
    pub ray_count: usize,
    /// Angle covered by the ray fan in radians.
    pub ray_spread: f32,
    /// Length of each ray.
    pub ray_length: f32,
    /// Hidden layer sizes between the sensor inputs and the four control outputs.
    pub hidden_layers: Vec<usize>,
    /// Number of network-driven vehicles in autopilot mode.
    pub population: usize,
    /// Mutation amount applied to copies of a restored network.
    pub mutation_amount: f32,
    /// Progress a new best vehicle must exceed the saved one by before it is saved.
    pub save_margin: f32,
    /// Key of the saved network in the store.
    pub store_key: String,
    /// Whether primary vehicles collide with and see each other.
    pub population_collisions: bool,
    /// Keep primary vehicles damaged once hit instead of recomputing every tick.
    pub latch_damage: bool,
    /// Driver of the primary vehicles.
    pub driver: DriverMode,
    /// Random seed; entropy is used when unset.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        let traffic = [
            (1, -100.0),
            (0, -300.0),
            (2, -300.0),
            (0, -500.0),
            (1, -500.0),
            (1, -700.0),
            (2, -700.0),
        ]
        .into_iter()
        .map(|(lane, y)| TrafficCar { lane, y })
        .collect();

        Self {
            road_center_x: 100.0,
            road_width: 180.0,
            lane_count: 3,
            car_width: 30.0,
            car_height: 50.0,
            start_lane: 1,
            start_y: 100.0,
            max_speed: MAX_SPEED,
            traffic_max_speed: TRAFFIC_MAX_SPEED,
            traffic_cruise: true,
            traffic,
            ray_count: 5,
            ray_spread: std::f32::consts::FRAC_PI_2,
            ray_length: 150.0,
            hidden_layers: vec![6],
            population: 1000,
            mutation_amount: 0.1,
            save_margin: 0.0,
            store_key: DEFAULT_STORE_KEY.to_owned(),
            population_collisions: false,
            latch_damage: false,
            driver: DriverMode::Autopilot,
            seed: None,
        }
    }
}

impl Params {
    /// Neuron counts of the driver networks: rays, hidden layers, four controls.
    pub fn network_topology(&self) -> Vec<usize> {
        let mut counts = Vec::with_capacity(self.hidden_layers.len() + 2);
        counts.push(self.ray_count);
        counts.extend(&self.hidden_layers);
        counts.push(super::controls::CONTROL_OUTPUTS);
        counts
    }

    /// Saves the parameters to a JSON file.
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads parameters from a JSON file; missing fields take their defaults.
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)?;
        let params = serde_json::from_str(&json)?;
        Ok(params)
    }
}

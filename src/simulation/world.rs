//! Main simulation loop.
//!
//! The world owns the road, every vehicle, the network arena and the network store.
//! A host calls [`World::step`] once per frame; each call:
//! - advances traffic, then every primary vehicle in parallel against a snapshot
//!   of obstacle outlines found through a k-d tree
//! - lets every control source pick the controls for the next tick
//! - selects the fittest primary vehicle and persists its network when it beats
//!   the saved record
//! - publishes the fittest network when it changes

use std::sync::Arc;

use geo::{Coord, Line};
use kdtree::distance::squared_euclidean;
use kdtree::{ErrorKind as KdTreeError, KdTree};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::brain::{NetworkId, NeuralNetwork};
use super::controls::{ControlSource, Controls, Key};
use super::geometric_utils::{Intersection, Polygon, polygon_center};
use super::params::{DriverMode, Params};
use super::road::Road;
use super::sensors::Sensors;
use super::storage::{NetworkStore, SavedNetwork};
use super::vehicle::{Vehicle, VehicleId, VehicleKind};

/// What happened during one [`World::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Number of the tick just completed, starting at 1.
    pub tick: u64,
    /// Fittest primary vehicle after the tick.
    pub fittest: Option<VehicleId>,
    /// Set when the published network changed during this tick.
    pub published: Option<NetworkId>,
    /// Whether a network was written to the store during this tick.
    pub saved: bool,
}

/// Read-only view of one vehicle for rendering.
#[derive(Debug, Clone, Copy)]
pub struct VehicleView<'a> {
    /// Identity of the vehicle.
    pub id: VehicleId,
    /// Primary or traffic.
    pub kind: VehicleKind,
    /// Outline corners.
    pub polygon: &'a Polygon,
    /// Damage flag from the last tick.
    pub damaged: bool,
    /// Fill color (RGB).
    pub color: [u8; 3],
    /// Sensor rays, empty without sensors.
    pub rays: &'a [Line<f32>],
    /// Sensor readings, one per ray.
    pub readings: &'a [Option<Intersection>],
    /// Whether this is the fittest vehicle.
    pub fittest: bool,
}

/// Read-only snapshot of everything a renderer needs.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    /// Tick the snapshot was taken after.
    pub tick: u64,
    /// Left and right road borders.
    pub borders: &'a [Line<f32>; 2],
    /// Lane divider lines.
    pub lane_markings: Vec<Line<f32>>,
    /// Every vehicle, traffic first.
    pub vehicles: Vec<VehicleView<'a>>,
    /// Fittest primary vehicle.
    pub fittest: Option<VehicleId>,
    /// Published network of the fittest vehicle.
    pub network: Option<&'a NeuralNetwork>,
}

/// The complete simulation state.
pub struct World {
    params: Params,
    road: Road,
    vehicles: Vec<Vehicle>,
    brains: Vec<NeuralNetwork>,
    store: Box<dyn NetworkStore>,
    saved: Option<Arc<SavedNetwork>>,
    fittest: Option<VehicleId>,
    published: Option<NetworkId>,
    // cleared by a discard, set again by an explicit save
    autosave: bool,
    tick: u64,
}

impl World {
    /// Builds the road, the traffic and the primary vehicles.
    ///
    /// In autopilot mode every primary vehicle gets a random network, unless the
    /// store holds a network of matching topology: then the first vehicle drives
    /// that network and all others drive mutated copies of it. Store failures and
    /// mismatching networks are logged and otherwise ignored.
    pub fn new(params: Params, store: Box<dyn NetworkStore>) -> Self {
        let mut rng = params
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        let road = Road::new(params.road_center_x, params.road_width, params.lane_count);
        let mut vehicles = spawn_traffic(&params, &road);
        let mut brains = Vec::new();
        let mut saved = None;

        let start = Coord {
            x: road.lane_center_x(params.start_lane),
            y: params.start_y,
        };

        match params.driver {
            DriverMode::Keyboard => {
                vehicles.push(primary_vehicle(
                    &params,
                    start,
                    ControlSource::Keyboard(Controls::default()),
                ));
            }
            DriverMode::Autopilot => {
                let topology = params.network_topology();
                brains = (0..params.population)
                    .map(|_| NeuralNetwork::new_random(&topology, &mut rng))
                    .collect();

                let restored = restore(store.as_ref(), &params.store_key, brains.first());
                if let Some(record) = restored {
                    for (i, brain) in brains.iter_mut().enumerate() {
                        *brain = if i == 0 {
                            record.network.clone()
                        } else {
                            record.network.mutated(params.mutation_amount, &mut rng)
                        };
                    }
                    saved = Some(Arc::new(record));
                }

                for i in 0..brains.len() {
                    vehicles.push(primary_vehicle(
                        &params,
                        start,
                        ControlSource::Network(NetworkId(i)),
                    ));
                }
            }
        }

        info!(
            "World ready: {} vehicles, {} networks, restored: {}",
            vehicles.len(),
            brains.len(),
            saved.is_some()
        );

        Self {
            params,
            road,
            vehicles,
            brains,
            store,
            saved,
            fittest: None,
            published: None,
            autosave: true,
            tick: 0,
        }
    }

    /// Advances the simulation by one fixed tick.
    pub fn step(&mut self) -> StepReport {
        self.tick += 1;

        self.advance_vehicles();
        self.decide_controls();

        self.fittest = self.select_fittest();
        let saved = self.maybe_persist();
        let published = self.publish();

        StepReport {
            tick: self.tick,
            fittest: self.fittest,
            published,
            saved,
        }
    }

    fn advance_vehicles(&mut self) {
        let borders = *self.road.borders();

        // traffic ignores everything but the road
        self.vehicles
            .par_iter_mut()
            .filter(|vehicle| vehicle.kind == VehicleKind::Traffic)
            .for_each(|vehicle| vehicle.update(&borders, &[]));

        let outlines: Vec<Polygon> = self.vehicles.iter().map(|v| *v.polygon()).collect();
        let obstacles = ObstacleIndex::build(&self.vehicles, self.params.population_collisions);
        let ray_length = self.params.ray_length;

        self.vehicles
            .par_iter_mut()
            .enumerate()
            .filter(|(_, vehicle)| vehicle.kind == VehicleKind::Primary)
            .for_each(|(i, vehicle)| {
                // sensors are cast after the move
                let travel = vehicle.speed.abs() + vehicle.acceleration;
                let radius = vehicle.reach() + travel + ray_length + obstacles.max_reach;
                let nearby: Vec<&Polygon> = obstacles
                    .near(i, vehicle.position, radius)
                    .into_iter()
                    .map(|j| &outlines[j])
                    .collect();
                vehicle.update(&borders, &nearby);
            });
    }

    fn decide_controls(&mut self) {
        for vehicle in &mut self.vehicles {
            let closeness = vehicle.closeness();
            vehicle.controls = vehicle.driver.decide(&closeness, &mut self.brains);
        }
    }

    /// Picks the primary vehicle with the most progress, preferring undamaged ones.
    /// On equal progress the current fittest keeps its place.
    fn select_fittest(&self) -> Option<VehicleId> {
        let start_y = self.params.start_y;
        let any_intact = self
            .vehicles
            .iter()
            .any(|v| v.kind == VehicleKind::Primary && !v.is_damaged());
        let is_candidate = |vehicle: &Vehicle| {
            vehicle.kind == VehicleKind::Primary && (!any_intact || !vehicle.is_damaged())
        };

        let mut best = self
            .fittest
            .filter(|id| self.vehicles.get(id.index()).is_some_and(is_candidate));

        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if !is_candidate(vehicle) {
                continue;
            }
            let better = best.is_none_or(|current| {
                vehicle.progress(start_y) > self.vehicles[current.index()].progress(start_y)
            });
            if better {
                best = Some(VehicleId(i));
            }
        }
        best
    }

    fn maybe_persist(&mut self) -> bool {
        if !self.autosave {
            return false;
        }
        let Some(id) = self.fittest else {
            return false;
        };
        let vehicle = &self.vehicles[id.index()];
        let Some(network) = vehicle.driver.network() else {
            return false;
        };

        let progress = vehicle.progress(self.params.start_y);
        let threshold = self
            .saved
            .as_ref()
            .map_or(0.0, |record| record.progress)
            + self.params.save_margin;

        if progress > threshold {
            self.persist(network, progress)
        } else {
            false
        }
    }

    /// Replaces the saved record and writes it to the store.
    ///
    /// The in-memory record is replaced even when the write fails, so a broken store
    /// is retried on the next improvement rather than on every tick.
    fn persist(&mut self, network: NetworkId, progress: f32) -> bool {
        let Some(brain) = self.brains.get(network.index()) else {
            return false;
        };
        let record = Arc::new(SavedNetwork::new(brain.clone(), progress));
        let written = match self.store.save(&self.params.store_key, &record) {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping save of network {:?}: {}", network, e);
                false
            }
        };
        self.saved = Some(record);
        written
    }

    fn publish(&mut self) -> Option<NetworkId> {
        let network = self
            .fittest
            .and_then(|id| self.vehicles[id.index()].driver.network());
        if network == self.published {
            return None;
        }

        self.published = network;
        if let Some(id) = network {
            debug!("Publishing network {:?} at tick {}", id, self.tick);
        }
        network
    }

    /// Routes an input edge event to keyboard-driven vehicles, effective immediately.
    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        for vehicle in &mut self.vehicles {
            vehicle.driver.handle_key(key, pressed);
            if let ControlSource::Keyboard(held) = vehicle.driver {
                vehicle.controls = held;
            }
        }
    }

    /// Saves the fittest network regardless of the saved record and resumes
    /// automatic saving.
    pub fn save_fittest(&mut self) -> bool {
        let Some(id) = self.fittest else {
            return false;
        };
        let vehicle = &self.vehicles[id.index()];
        let Some(network) = vehicle.driver.network() else {
            return false;
        };
        let progress = vehicle.progress(self.params.start_y);
        self.autosave = true;
        self.persist(network, progress)
    }

    /// Forgets the saved network, in memory and in the store.
    ///
    /// Automatic saving stays off until the next [`World::save_fittest`].
    pub fn discard_saved(&mut self) {
        if let Err(e) = self.store.remove(&self.params.store_key) {
            warn!("Failed to remove saved network: {}", e);
        }
        self.saved = None;
        self.autosave = false;
        info!("Discarded saved network, automatic saving paused");
    }

    /// Whether improvements are saved automatically.
    pub fn autosave(&self) -> bool {
        self.autosave
    }

    /// Read-only snapshot for rendering.
    pub fn frame(&self) -> Frame<'_> {
        let vehicles = self
            .vehicles
            .iter()
            .enumerate()
            .map(|(i, vehicle)| VehicleView {
                id: VehicleId(i),
                kind: vehicle.kind,
                polygon: vehicle.polygon(),
                damaged: vehicle.is_damaged(),
                color: vehicle.color,
                rays: vehicle.sensors().map_or(&[][..], Sensors::rays),
                readings: vehicle.sensors().map_or(&[][..], Sensors::readings),
                fittest: self.fittest == Some(VehicleId(i)),
            })
            .collect();

        Frame {
            tick: self.tick,
            borders: self.road.borders(),
            lane_markings: self.road.lane_markings(),
            vehicles,
            fittest: self.fittest,
            network: self.published.and_then(|id| self.brain(id)),
        }
    }

    /// Simulation parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The road.
    pub fn road(&self) -> &Road {
        &self.road
    }

    /// All vehicles, traffic first.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle by identity.
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id.index())
    }

    /// Network by identity.
    pub fn brain(&self, id: NetworkId) -> Option<&NeuralNetwork> {
        self.brains.get(id.index())
    }

    /// The network arena.
    pub fn brains(&self) -> &[NeuralNetwork] {
        &self.brains
    }

    /// Fittest primary vehicle after the last tick.
    pub fn fittest(&self) -> Option<VehicleId> {
        self.fittest
    }

    /// Network driving the fittest vehicle.
    pub fn fittest_network(&self) -> Option<&NeuralNetwork> {
        self.fittest
            .and_then(|id| self.vehicles[id.index()].driver.network())
            .and_then(|id| self.brain(id))
    }

    /// Last published network.
    pub fn published(&self) -> Option<NetworkId> {
        self.published
    }

    /// The saved record, shared with whoever holds a clone.
    pub fn saved(&self) -> Option<&Arc<SavedNetwork>> {
        self.saved.as_ref()
    }

    /// The network store.
    pub fn store(&self) -> &dyn NetworkStore {
        self.store.as_ref()
    }

    /// Hands the store back, e.g. to build a fresh world on it.
    pub fn into_store(self) -> Box<dyn NetworkStore> {
        self.store
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of undamaged primary vehicles.
    pub fn alive_count(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|v| v.kind == VehicleKind::Primary && !v.is_damaged())
            .count()
    }
}

fn spawn_traffic(params: &Params, road: &Road) -> Vec<Vehicle> {
    let controls = if params.traffic_cruise {
        Controls::cruise()
    } else {
        Controls::default()
    };

    params
        .traffic
        .iter()
        .map(|car| {
            if car.lane >= road.lane_count() {
                warn!(
                    "Traffic lane {} does not exist, placing the car in lane {}",
                    car.lane,
                    road.lane_count() - 1
                );
            }
            let position = Coord {
                x: road.lane_center_x(car.lane),
                y: car.y,
            };
            Vehicle::new(
                position,
                params.car_width,
                params.car_height,
                VehicleKind::Traffic,
                ControlSource::Scripted(controls),
            )
            .with_max_speed(params.traffic_max_speed)
        })
        .collect()
}

fn primary_vehicle(params: &Params, start: Coord<f32>, driver: ControlSource) -> Vehicle {
    let mut vehicle = Vehicle::new(
        start,
        params.car_width,
        params.car_height,
        VehicleKind::Primary,
        driver,
    )
    .with_max_speed(params.max_speed)
    .with_sensors(Sensors::new(
        params.ray_count,
        params.ray_spread,
        params.ray_length,
    ));
    vehicle.latch_damage = params.latch_damage;
    vehicle
}

/// Loads the saved network if it fits `template`'s topology.
fn restore(
    store: &dyn NetworkStore,
    key: &str,
    template: Option<&NeuralNetwork>,
) -> Option<SavedNetwork> {
    let template = template?;
    let record = match store.load(key) {
        Ok(Some(record)) => record,
        Ok(None) => return None,
        Err(e) => {
            warn!("Ignoring saved network {:?}: {}", key, e);
            return None;
        }
    };

    if !record.network.same_topology(template) {
        warn!(
            "Discarding saved network {:?}: topology {:?} does not match {:?}",
            key,
            record.network.topology(),
            template.topology()
        );
        return None;
    }

    info!(
        "Restored network {:?} (progress {:.1}, saved {})",
        key, record.progress, record.saved_at
    );
    Some(record)
}

type Tree2D = KdTree<f32, usize, [f32; 2]>;

/// Centers of the vehicles other vehicles can hit or see.
struct ObstacleIndex {
    tree: Option<Tree2D>,
    ids: Vec<usize>,
    max_reach: f32,
}

impl ObstacleIndex {
    fn build(vehicles: &[Vehicle], include_primary: bool) -> Self {
        let ids: Vec<usize> = vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| include_primary || v.kind == VehicleKind::Traffic)
            .map(|(i, _)| i)
            .collect();
        let max_reach = ids
            .iter()
            .map(|&i| vehicles[i].reach())
            .fold(0.0, f32::max);

        let tree = match build_tree(vehicles, &ids) {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!("Obstacle index unavailable, testing every vehicle: {:?}", e);
                None
            }
        };

        Self {
            tree,
            ids,
            max_reach,
        }
    }

    /// Obstacles whose center lies within `radius` of `center`, excluding `own`,
    /// in ascending index order.
    fn near(&self, own: usize, center: Coord<f32>, radius: f32) -> Vec<usize> {
        let mut found: Vec<usize> = match &self.tree {
            Some(tree) => tree
                .within(&[center.x, center.y], radius.powi(2), &squared_euclidean)
                .map(|hits| hits.into_iter().map(|(_, &i)| i).collect())
                .unwrap_or_else(|_| self.ids.clone()),
            None => self.ids.clone(),
        };
        found.retain(|&i| i != own);
        found.sort_unstable();
        found
    }
}

fn build_tree(vehicles: &[Vehicle], ids: &[usize]) -> Result<Tree2D, KdTreeError> {
    let mut tree = KdTree::with_capacity(2, ids.len().max(1));
    for &i in ids {
        let center = polygon_center(vehicles[i].polygon());
        tree.add([center.x, center.y], i)?;
    }
    Ok(tree)
}

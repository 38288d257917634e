//! # Autopilot - Self-Driving Car Evolution
//!
//! A top-down driving simulation in which a population of cars learns to weave
//! through traffic. Each car reads a fan of distance sensors, feeds the readings
//! through a small threshold network and steers with the result. The furthest car's
//! network is saved and seeds the next run with mutated copies.
//!
//! ## Features
//!
//! - Fixed-timestep vehicle kinematics with friction and speed limits
//! - Ray-cast sensors against road borders and other vehicles
//! - Collision detection between oriented rectangles
//! - Feed-forward networks with binary threshold activation and mutation
//! - Persistence of the best network in a key-value store
//! - Keyboard driving as an alternative control source
//!
//! ## Core Modules
//!
//! - [`simulation::world`] - Simulation loop, fittest selection and persistence
//! - [`simulation::vehicle`] - Vehicle dynamics and damage
//! - [`simulation::sensors`] - Ray-cast sensors
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::road`] - Road geometry
//! - [`simulation::storage`] - Network stores

/// Core simulation logic and data structures.
pub mod simulation {
    /// Neural network implementation for vehicle drivers.
    pub mod brain;
    /// Driving controls and control sources.
    pub mod controls;
    /// Geometric utility functions for intersections and outlines.
    pub mod geometric_utils;
    /// Simulation parameters.
    pub mod params;
    /// Straight multi-lane road.
    pub mod road;
    /// Ray-cast distance sensors.
    pub mod sensors;
    /// Persistence of the best network.
    pub mod storage;
    /// Vehicle state and kinematics.
    pub mod vehicle;
    /// Main simulation loop.
    pub mod world;
}

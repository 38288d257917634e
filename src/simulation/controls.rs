//! Driving controls and the sources that produce them.
//!
//! Vehicle dynamics only ever read [`Controls`]; whether a person or a network is
//! driving is decided by the vehicle's [`ControlSource`].

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::brain::{NetworkId, NeuralNetwork};

/// Number of network outputs a driver network must have.
pub const CONTROL_OUTPUTS: usize = 4;

/// The four driving flags consumed by a vehicle each tick.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    /// Accelerate along the heading.
    pub forward: bool,
    /// Accelerate against the heading.
    pub reverse: bool,
    /// Steer left.
    pub left: bool,
    /// Steer right.
    pub right: bool,
}

impl Controls {
    /// Controls with only `forward` held.
    pub fn cruise() -> Self {
        Self {
            forward: true,
            ..Self::default()
        }
    }

    /// Reads network outputs in the order forward, left, right, reverse.
    ///
    /// Missing outputs read as released.
    pub fn from_outputs(outputs: &Array1<f32>) -> Self {
        let held = |i: usize| outputs.get(i).is_some_and(|&v| v > 0.5);
        Self {
            forward: held(0),
            left: held(1),
            right: held(2),
            reverse: held(3),
        }
    }

    /// Applies a key press or release.
    pub fn apply_key(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Up => self.forward = pressed,
            Key::Down => self.reverse = pressed,
            Key::Left => self.left = pressed,
            Key::Right => self.right = pressed,
        }
    }
}

/// Input device keys understood by keyboard drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Forward.
    Up,
    /// Reverse.
    Down,
    /// Steer left.
    Left,
    /// Steer right.
    Right,
}

/// Where a vehicle's controls come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSource {
    /// Held keys, updated from input edge events.
    Keyboard(Controls),
    /// Fixed controls, used for traffic.
    Scripted(Controls),
    /// Outputs of a network in the world's network arena.
    Network(NetworkId),
}

impl ControlSource {
    /// Produces the controls for the next tick.
    ///
    /// `closeness` holds one sensor value per ray. Network drivers feed it forward
    /// through their network, recording activations on the network's levels.
    pub fn decide(&self, closeness: &Array1<f32>, brains: &mut [NeuralNetwork]) -> Controls {
        match *self {
            ControlSource::Keyboard(held) => held,
            ControlSource::Scripted(controls) => controls,
            ControlSource::Network(id) => brains
                .get_mut(id.index())
                .map(|brain| Controls::from_outputs(&brain.feed_forward(closeness)))
                .unwrap_or_default(),
        }
    }

    /// Forwards a key edge event; only keyboard drivers react.
    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        if let ControlSource::Keyboard(held) = self {
            held.apply_key(key, pressed);
        }
    }

    /// The driving network, if any.
    pub fn network(&self) -> Option<NetworkId> {
        match self {
            ControlSource::Network(id) => Some(*id),
            _ => None,
        }
    }
}

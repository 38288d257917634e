//! Feed-forward neural network that drives a vehicle.
//!
//! Networks map sensor closeness values to the four control flags. They learn only
//! through [`NeuralNetwork::mutate`]; there is no gradient training.

use ndarray::Array1;
use ndarray_rand::rand::Rng;
use serde::{Deserialize, Serialize};

pub mod level;

pub use level::Level;

/// Index of a network in the world's network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub usize);

impl NetworkId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Fully connected network of threshold [`Level`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    /// Ordered levels from input to output.
    pub levels: Vec<Level>,
}

impl NeuralNetwork {
    /// Creates a network with one random level per consecutive pair of
    /// `neuron_counts`, e.g. `[5, 6, 4]` gives a 5→6 level and a 6→4 level.
    pub fn new_random<R: Rng + ?Sized>(neuron_counts: &[usize], rng: &mut R) -> Self {
        let levels = neuron_counts
            .windows(2)
            .map(|pair| Level::new_random(pair[0], pair[1], rng))
            .collect();

        Self { levels }
    }

    /// Runs `inputs` through every level, recording activations along the way.
    #[inline]
    pub fn feed_forward(&mut self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = inputs.clone();
        for level in &mut self.levels {
            output = level.feed_forward(&output);
        }
        output
    }

    /// Same as [`NeuralNetwork::feed_forward`] but leaves the network untouched.
    pub fn evaluate(&self, inputs: &Array1<f32>) -> Array1<f32> {
        self.levels
            .iter()
            .fold(inputs.clone(), |output, level| level.evaluate(&output))
    }

    /// Outputs of the last level from the most recent feed forward pass.
    pub fn outputs(&self) -> Option<&Array1<f32>> {
        self.levels.last().map(|level| &level.outputs)
    }

    /// Mutates every level, see [`Level::mutate`].
    pub fn mutate<R: Rng + ?Sized>(&mut self, amount: f32, rng: &mut R) {
        for level in &mut self.levels {
            level.mutate(amount, rng);
        }
    }

    /// Returns a mutated copy, leaving `self` as it is.
    pub fn mutated<R: Rng + ?Sized>(&self, amount: f32, rng: &mut R) -> Self {
        let mut child = self.clone();
        child.mutate(amount, rng);
        child
    }

    /// Neuron counts from the input layer to the output layer.
    pub fn topology(&self) -> Vec<usize> {
        let mut counts: Vec<usize> = self.levels.iter().map(Level::input_size).collect();
        if let Some(last) = self.levels.last() {
            counts.push(last.output_size());
        }
        counts
    }

    /// Checks that both networks have the same level count and the same input and
    /// output count on every level.
    pub fn same_topology(&self, other: &NeuralNetwork) -> bool {
        self.levels.len() == other.levels.len()
            && self.levels.iter().zip(&other.levels).all(|(a, b)| {
                a.input_size() == b.input_size() && a.output_size() == b.output_size()
            })
    }

    /// Flattens all weights and biases into a single vector.
    pub fn to_flat_vector(&self) -> Vec<f32> {
        let mut flat = Vec::new();
        for level in &self.levels {
            flat.extend(level.weights.iter().copied());
            flat.extend(level.biases.iter().copied());
        }
        flat
    }
}

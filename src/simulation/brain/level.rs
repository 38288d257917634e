//! A single fully connected level with a binary threshold activation.

use ndarray::{Array1, Array2, Zip};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::simulation::geometric_utils::lerp;

/// One level of a [`super::NeuralNetwork`].
///
/// `inputs` and `outputs` hold the activations of the most recent feed forward pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Last inputs fed into the level.
    pub inputs: Array1<f32>,
    /// Last outputs, each either 0.0 or 1.0.
    pub outputs: Array1<f32>,
    /// Firing threshold per output (`output_size`).
    pub biases: Array1<f32>,
    /// Weight matrix (`input_size` × `output_size`); `weights[[i, j]]` links input `i`
    /// to output `j`.
    pub weights: Array2<f32>,
}

impl Level {
    /// Creates a level with weights and biases drawn uniformly from `[-1, 1]`.
    pub fn new_random<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            inputs: Array1::zeros(input_size),
            outputs: Array1::zeros(output_size),
            biases: Array1::random_using(output_size, Uniform::new(-1.0, 1.0), rng),
            weights: Array2::random_using(
                (input_size, output_size),
                Uniform::new(-1.0, 1.0),
                rng,
            ),
        }
    }

    /// Number of inputs the level expects.
    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of outputs the level produces.
    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Computes the outputs for `inputs` without touching the recorded activations.
    ///
    /// An output fires (1.0) when its weighted input sum is strictly above its bias.
    pub fn evaluate(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let sums = inputs.dot(&self.weights);
        Zip::from(&sums)
            .and(&self.biases)
            .map_collect(|&sum, &bias| if sum > bias { 1.0 } else { 0.0 })
    }

    /// Runs the level and records its inputs and outputs.
    #[inline]
    pub fn feed_forward(&mut self, inputs: &Array1<f32>) -> Array1<f32> {
        self.outputs = self.evaluate(inputs);
        self.inputs = inputs.clone();
        self.outputs.clone()
    }

    /// Moves every weight and bias towards a fresh random value by `amount`.
    ///
    /// `amount = 0` keeps the level, `amount = 1` replaces it with random values.
    pub fn mutate<R: Rng + ?Sized>(&mut self, amount: f32, rng: &mut R) {
        let target_biases: Array1<f32> =
            Array1::random_using(self.biases.len(), Uniform::new(-1.0, 1.0), rng);
        let target_weights: Array2<f32> =
            Array2::random_using(self.weights.dim(), Uniform::new(-1.0, 1.0), rng);

        Zip::from(&mut self.biases)
            .and(&target_biases)
            .for_each(|b, &target| *b = lerp(*b, target, amount));
        Zip::from(&mut self.weights)
            .and(&target_weights)
            .for_each(|w, &target| *w = lerp(*w, target, amount));
    }
}

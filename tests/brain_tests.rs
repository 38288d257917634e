#![allow(missing_docs)]

use autopilot::simulation::brain::{Level, NeuralNetwork};
use ndarray::{Array1, Array2, array};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;

fn summing_level(bias: f32) -> Level {
    Level {
        inputs: Array1::zeros(2),
        outputs: Array1::zeros(1),
        biases: array![bias],
        weights: Array2::ones((2, 1)),
    }
}

#[test]
fn test_topology_follows_neuron_counts() {
    let mut rng = StdRng::seed_from_u64(1);
    let network = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);

    assert_eq!(network.levels.len(), 2);
    assert_eq!(network.topology(), vec![5, 6, 4]);
    assert_eq!(network.levels[0].weights.dim(), (5, 6));
    assert_eq!(network.levels[1].biases.len(), 4);
}

#[test]
fn test_random_values_in_unit_range() {
    let mut rng = StdRng::seed_from_u64(2);
    let network = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);

    assert!(
        network
            .to_flat_vector()
            .iter()
            .all(|v| (-1.0..=1.0).contains(v))
    );
}

#[test]
fn test_threshold_activation() {
    let level = summing_level(1.5);
    assert_eq!(level.evaluate(&array![1.0, 1.0]), array![1.0_f32]);
    assert_eq!(level.evaluate(&array![1.0, 0.0]), array![0.0_f32]);
}

#[test]
fn test_sum_equal_to_bias_does_not_fire() {
    let level = summing_level(1.0);
    assert_eq!(level.evaluate(&array![1.0, 0.0]), array![0.0_f32]);
    assert_eq!(level.evaluate(&array![0.5, 0.6]), array![1.0_f32]);
}

#[test]
fn test_feed_forward_records_activations() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut network = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);
    let inputs: Array1<f32> = array![0.0, 0.2, 0.9, 0.0, 0.4];

    let pure = network.evaluate(&inputs);
    assert_eq!(network.levels[0].inputs, Array1::<f32>::zeros(5));

    let outputs = network.feed_forward(&inputs);
    assert_eq!(outputs, pure);
    assert_eq!(network.levels[0].inputs, inputs);
    assert_eq!(network.levels[1].inputs, network.levels[0].outputs);
    assert_eq!(network.outputs(), Some(&outputs));
    assert!(outputs.iter().all(|&v| v == 0.0 || v == 1.0));
}

#[test]
fn test_mutate_zero_keeps_network() {
    let mut rng = StdRng::seed_from_u64(4);
    let network = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);

    let mut copy = network.clone();
    copy.mutate(0.0, &mut rng);

    assert_eq!(copy, network);
}

#[test]
fn test_mutate_one_forgets_the_parent() {
    let mut rng = StdRng::seed_from_u64(5);
    let a = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);
    let b = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);

    // the same random stream turns both parents into the same child
    let child_a = a.mutated(1.0, &mut StdRng::seed_from_u64(9));
    let child_b = b.mutated(1.0, &mut StdRng::seed_from_u64(9));

    for (x, y) in child_a.to_flat_vector().iter().zip(child_b.to_flat_vector()) {
        assert!((x - y).abs() < 1e-5);
    }
    assert_ne!(child_a, a);
}

#[test]
fn test_small_mutation_stays_close() {
    let mut rng = StdRng::seed_from_u64(6);
    let network = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);
    let child = network.mutated(0.1, &mut rng);

    assert!(child.same_topology(&network));
    assert_ne!(child, network);
    for (before, after) in network.to_flat_vector().iter().zip(child.to_flat_vector()) {
        // lerp by 0.1 towards a target at most 2 away
        assert!((before - after).abs() <= 0.2 + 1e-5);
    }
}

#[test]
fn test_mutated_leaves_original() {
    let mut rng = StdRng::seed_from_u64(7);
    let network = NeuralNetwork::new_random(&[3, 4], &mut rng);
    let snapshot = network.clone();

    let _child = network.mutated(0.5, &mut rng);

    assert_eq!(network, snapshot);
}

#[test]
fn test_same_seed_same_network() {
    let a = NeuralNetwork::new_random(&[5, 6, 4], &mut StdRng::seed_from_u64(42));
    let b = NeuralNetwork::new_random(&[5, 6, 4], &mut StdRng::seed_from_u64(42));

    assert_eq!(a, b);
}

#[test]
fn test_topology_mismatch_detected() {
    let mut rng = StdRng::seed_from_u64(8);
    let a = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);
    let b = NeuralNetwork::new_random(&[5, 4], &mut rng);
    let c = NeuralNetwork::new_random(&[5, 7, 4], &mut rng);

    assert!(a.same_topology(&a.clone()));
    assert!(!a.same_topology(&b));
    assert!(!a.same_topology(&c));
}

#[test]
fn test_json_roundtrip() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut network = NeuralNetwork::new_random(&[5, 6, 4], &mut rng);
    network.feed_forward(&array![0.1, 0.0, 0.3, 0.0, 0.7]);

    let json = serde_json::to_string(&network).expect("serialize");
    let restored: NeuralNetwork = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored, network);
}

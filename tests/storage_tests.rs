#![allow(missing_docs)]

use autopilot::simulation::brain::NeuralNetwork;
use autopilot::simulation::storage::{
    DEFAULT_STORE_KEY, FileStore, MemoryStore, NetworkStore, SavedNetwork, StoreError,
};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use std::fs;
use std::path::PathBuf;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("autopilot_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn saved_network(seed: u64, progress: f32) -> SavedNetwork {
    let network = NeuralNetwork::new_random(&[5, 6, 4], &mut StdRng::seed_from_u64(seed));
    SavedNetwork::new(network, progress)
}

#[test]
fn test_file_store_save_and_load() {
    let dir = temp_dir("save_load");
    let mut store = FileStore::new(&dir);
    let saved = saved_network(1, 123.5);

    store.save(DEFAULT_STORE_KEY, &saved).expect("save");
    assert!(store.path_for(DEFAULT_STORE_KEY).exists());
    assert!(dir.join("bestBrain.json").exists());

    let loaded = store.load(DEFAULT_STORE_KEY).expect("load");
    assert_eq!(loaded, Some(saved));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_file_store_overwrites() {
    let dir = temp_dir("overwrite");
    let mut store = FileStore::new(&dir);

    store.save("best", &saved_network(1, 10.0)).expect("first save");
    let second = saved_network(2, 20.0);
    store.save("best", &second).expect("second save");

    assert_eq!(store.load("best").expect("load"), Some(second));
    assert!(!dir.join("best.json.partial").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_file_store_missing_key() {
    let dir = temp_dir("missing");
    let store = FileStore::new(&dir);

    assert!(matches!(store.load("nothing"), Ok(None)));
}

#[test]
fn test_file_store_invalid_json() {
    let dir = temp_dir("invalid");
    fs::create_dir_all(&dir).expect("create dir");
    fs::write(dir.join("broken.json"), "{ not a network").expect("write");

    let store = FileStore::new(&dir);
    assert!(matches!(store.load("broken"), Err(StoreError::Json(_))));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_file_store_remove() {
    let dir = temp_dir("remove");
    let mut store = FileStore::new(&dir);

    store.save("best", &saved_network(3, 5.0)).expect("save");
    store.remove("best").expect("remove");
    assert!(matches!(store.load("best"), Ok(None)));

    // removing twice is fine
    store.remove("best").expect("remove missing");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_memory_store_roundtrip() {
    let mut store = MemoryStore::new();
    let saved = saved_network(4, 42.0);

    assert!(matches!(store.load(DEFAULT_STORE_KEY), Ok(None)));

    store.save(DEFAULT_STORE_KEY, &saved).expect("save");
    assert!(store.raw(DEFAULT_STORE_KEY).is_some());
    assert_eq!(store.load(DEFAULT_STORE_KEY).expect("load"), Some(saved));

    store.remove(DEFAULT_STORE_KEY).expect("remove");
    assert!(store.raw(DEFAULT_STORE_KEY).is_none());
}

#[test]
fn test_memory_store_invalid_value() {
    let store = MemoryStore::new().with_raw(DEFAULT_STORE_KEY, "[1, 2, 3]");

    assert!(matches!(
        store.load(DEFAULT_STORE_KEY),
        Err(StoreError::Json(_))
    ));
}

#[test]
fn test_saved_network_keeps_progress() {
    let saved = saved_network(5, 77.0);
    let json = serde_json::to_string(&saved).expect("serialize");

    assert!(json.contains("\"progress\":77.0"));
    assert!(json.contains("\"saved_at\""));
}

use std::path::PathBuf;
use std::time::Instant;

use autopilot::simulation::controls::Key;
use autopilot::simulation::params::{DriverMode, Params};
use autopilot::simulation::storage::FileStore;
use autopilot::simulation::world::World;
use clap::Parser;
use macroquad::prelude::*;
use tracing::{info, warn};

mod graphics;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "autopilot",
    version,
    about = "Evolve self-driving cars that weave through traffic"
)]
struct Cli {
    /// JSON parameter file; missing fields take their defaults.
    #[arg(long, default_value = "params.json")]
    params: String,
    /// Directory holding the saved network.
    #[arg(long, default_value = "saves")]
    store_dir: PathBuf,
    /// Number of network-driven cars.
    #[arg(long)]
    population: Option<usize>,
    /// Random seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Drive a single car with the arrow keys instead.
    #[arg(long)]
    keyboard: bool,
    /// Write the effective parameters back to the parameter file.
    #[arg(long)]
    write_params: bool,
}

const KEY_BINDINGS: [(KeyCode, Key); 4] = [
    (KeyCode::Up, Key::Up),
    (KeyCode::Down, Key::Down),
    (KeyCode::Left, Key::Left),
    (KeyCode::Right, Key::Right),
];

fn window_conf() -> Conf {
    Conf {
        window_title: "Autopilot".to_owned(),
        window_width: 900,
        window_height: 900,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_params(cli: &Cli) -> Params {
    let mut params = match Params::load_from_file(&cli.params) {
        Ok(params) => {
            info!("Loaded parameters from {}", cli.params);
            params
        }
        Err(e) => {
            warn!("Using default parameters ({}: {})", cli.params, e);
            Params::default()
        }
    };

    if let Some(population) = cli.population {
        params.population = population;
    }
    if cli.seed.is_some() {
        params.seed = cli.seed;
    }
    if cli.keyboard {
        params.driver = DriverMode::Keyboard;
    }

    if cli.write_params {
        match params.save_to_file(&cli.params) {
            Ok(()) => info!("Wrote parameters to {}", cli.params),
            Err(e) => warn!("Failed to write parameters to {}: {}", cli.params, e),
        }
    }
    params
}

#[macroquad::main(window_conf)]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    let params = load_params(&cli);
    let store = FileStore::new(cli.store_dir.clone());
    info!("Saving networks to {}", store.dir().display());

    let mut world = World::new(params.clone(), Box::new(store));
    let mut ui_state = ui::UIState::new();

    loop {
        for (code, key) in KEY_BINDINGS {
            if is_key_pressed(code) {
                world.handle_key(key, true);
            }
            if is_key_released(code) {
                world.handle_key(key, false);
            }
        }

        if !ui_state.paused {
            let start = Instant::now();
            for _ in 0..ui_state.steps_per_frame {
                let report = world.step();
                ui_state.record(&world, &report);
            }
            ui_state.last_step_time_ms =
                start.elapsed().as_secs_f32() * 1000.0 / ui_state.steps_per_frame.max(1) as f32;
        }

        clear_background(DARKGRAY);

        let frame = world.frame();
        let view = graphics::View::following(&frame, world.road().center_x(), params.start_y);
        graphics::draw_frame(&frame, &view);

        ui::draw_ui(&mut ui_state, &world);
        ui::process_egui();

        if ui_state.save_requested {
            ui_state.save_requested = false;
            ui_state.status_message = Some(if world.save_fittest() {
                "Saved fittest network".to_owned()
            } else {
                "Nothing to save".to_owned()
            });
        }
        if ui_state.discard_requested {
            ui_state.discard_requested = false;
            world.discard_saved();
            ui_state.status_message = Some("Discarded saved network".to_owned());
        }
        if ui_state.restart_requested {
            ui_state.restart_requested = false;
            let store = world.into_store();
            world = World::new(params.clone(), store);
            ui_state.reset_history();
            ui_state.status_message = Some("Restarted".to_owned());
        }

        next_frame().await
    }
}

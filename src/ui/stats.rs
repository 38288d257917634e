use autopilot::simulation::params::DriverMode;
use autopilot::simulation::world::World;
use egui_macroquad::egui;
use egui_plot::{Line, Plot, PlotPoints};
use std::collections::VecDeque;

use super::PANEL_WIDTH;
use super::ui::UIState;

pub(super) fn draw_stats_panel(egui_ctx: &egui::Context, state: &mut UIState, world: &World) {
    egui::SidePanel::right("stats_panel")
        .exact_width(PANEL_WIDTH)
        .resizable(false)
        .show(egui_ctx, |ui| {
            ui.heading("Simulation Stats");
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("💾 Save").clicked() {
                    state.save_requested = true;
                }
                if ui.button("🗑 Discard").clicked() {
                    state.discard_requested = true;
                }
                if ui.button("🔄 Restart").clicked() {
                    state.restart_requested = true;
                }
            });

            ui.horizontal(|ui| {
                let button_text = if state.paused {
                    "▶ Resume"
                } else {
                    "⏸ Pause"
                };
                if ui.button(button_text).clicked() {
                    state.paused = !state.paused;
                }
            });

            if let Some(ref msg) = state.status_message {
                ui.label(msg);
            }

            ui.separator();

            ui.label("Simulation Speed");
            ui.add(egui::Slider::new(&mut state.steps_per_frame, 1..=20).text("ticks/frame"));
            ui.label(format!("Step time: {:.2}ms", state.last_step_time_ms));

            ui.separator();

            let params = world.params();
            let start_y = params.start_y;
            let primaries = match params.driver {
                DriverMode::Autopilot => params.population,
                DriverMode::Keyboard => 1,
            };

            ui.label(format!("Tick: {}", world.tick()));
            ui.label(format!("Alive: {}/{}", world.alive_count(), primaries));

            if let Some(vehicle) = world.fittest().and_then(|id| world.vehicle(id)) {
                ui.label(format!("Best progress: {:.1}", vehicle.progress(start_y)));
                ui.label(format!("Best speed: {:.2}", vehicle.speed));
                if let Some(sensors) = vehicle.sensors() {
                    ui.label(format!(
                        "Sensors: {} rays, {:.0}° fan, {:.0}px range",
                        sensors.ray_count(),
                        sensors.spread().to_degrees(),
                        sensors.length()
                    ));
                }
            }

            match world.saved() {
                Some(record) => {
                    ui.label(format!("Saved progress: {:.1}", record.progress));
                    ui.label(format!(
                        "Saved at: {}",
                        record.saved_at.format("%Y-%m-%d %H:%M:%S")
                    ));
                }
                None => {
                    ui.label("No saved network");
                }
            }
            if !world.autosave() {
                ui.label("Automatic saving paused until the next save");
            }

            ui.separator();

            if let Some(network) = world.fittest_network() {
                ui.collapsing("🧠 Fittest Network", |ui| {
                    ui.label(format!("Topology: {:?}", network.topology()));
                    super::nn::draw_neural_network(ui, network);
                });
                ui.separator();
            }

            ui.heading("Progress Over Time");
            draw_progress_plot(
                ui,
                &state.progress_history,
                &state.saved_progress_history,
            );

            ui.separator();

            ui.heading("Alive Over Time");
            draw_time_series_plot(ui, "alive_plot", &state.alive_history, "Tick", "Alive");
        });
}

fn draw_time_series_plot(
    ui: &mut egui::Ui,
    id: &str,
    data: &VecDeque<(f64, f64)>,
    x_label: &str,
    y_label: &str,
) {
    if data.is_empty() {
        ui.label("Collecting data...");
        return;
    }

    let points: PlotPoints = data.iter().map(|&(x, y)| [x, y]).collect();
    let line = Line::new(points).color(egui::Color32::from_rgb(100, 150, 255));

    Plot::new(id)
        .height(150.0)
        .show_axes([true, true])
        .label_formatter(|_name, value| {
            format!("{}: {:.0}\n{}: {:.0}", x_label, value.x, y_label, value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

fn draw_progress_plot(
    ui: &mut egui::Ui,
    best_data: &VecDeque<(f64, f64)>,
    saved_data: &VecDeque<(f64, f64)>,
) {
    if best_data.is_empty() && saved_data.is_empty() {
        ui.label("Collecting data...");
        return;
    }

    Plot::new("progress_plot")
        .height(150.0)
        .show_axes([true, true])
        .legend(egui_plot::Legend::default())
        .label_formatter(|name, value| {
            format!("{}\nTick: {:.0}\nProgress: {:.1}", name, value.x, value.y)
        })
        .show(ui, |plot_ui| {
            if !best_data.is_empty() {
                let points: PlotPoints = best_data.iter().map(|&(x, y)| [x, y]).collect();
                let line = Line::new(points)
                    .color(egui::Color32::from_rgb(100, 150, 255))
                    .name("Fittest");
                plot_ui.line(line);
            }
            if !saved_data.is_empty() {
                let points: PlotPoints = saved_data.iter().map(|&(x, y)| [x, y]).collect();
                let line = Line::new(points)
                    .color(egui::Color32::from_rgb(255, 200, 100))
                    .name("Saved");
                plot_ui.line(line);
            }
        });
}

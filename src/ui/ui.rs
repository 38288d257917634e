use autopilot::simulation::world::{StepReport, World};
use egui_macroquad::egui;
use std::collections::VecDeque;

const MAX_HISTORY_POINTS: usize = 500;
/// Ticks between two history samples.
const HISTORY_INTERVAL: u64 = 10;

#[allow(clippy::struct_excessive_bools)]
pub struct UIState {
    pub progress_history: VecDeque<(f64, f64)>,
    pub saved_progress_history: VecDeque<(f64, f64)>,
    pub alive_history: VecDeque<(f64, f64)>,
    pub save_requested: bool,
    pub discard_requested: bool,
    pub restart_requested: bool,
    pub paused: bool,
    pub steps_per_frame: usize,
    pub status_message: Option<String>,
    pub last_step_time_ms: f32,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            progress_history: VecDeque::new(),
            saved_progress_history: VecDeque::new(),
            alive_history: VecDeque::new(),
            save_requested: false,
            discard_requested: false,
            restart_requested: false,
            paused: false,
            steps_per_frame: 1,
            status_message: None,
            last_step_time_ms: 0.0,
        }
    }

    /// Clears the plots, e.g. after a restart.
    pub fn reset_history(&mut self) {
        self.progress_history.clear();
        self.saved_progress_history.clear();
        self.alive_history.clear();
    }

    pub fn record(&mut self, world: &World, report: &StepReport) {
        if report.saved {
            self.status_message = Some(format!("Saved network at tick {}", report.tick));
        }
        if report.tick % HISTORY_INTERVAL != 0 {
            return;
        }

        let tick = report.tick as f64;
        let start_y = world.params().start_y;
        let progress = report
            .fittest
            .and_then(|id| world.vehicle(id))
            .map_or(0.0, |vehicle| vehicle.progress(start_y));
        let saved = world.saved().map_or(0.0, |record| record.progress);

        push_capped(&mut self.progress_history, (tick, progress as f64));
        push_capped(&mut self.saved_progress_history, (tick, saved as f64));
        push_capped(&mut self.alive_history, (tick, world.alive_count() as f64));
    }
}

fn push_capped(history: &mut VecDeque<(f64, f64)>, point: (f64, f64)) {
    history.push_back(point);
    if history.len() > MAX_HISTORY_POINTS {
        history.pop_front();
    }
}

pub fn draw_ui(state: &mut UIState, world: &World) {
    egui_macroquad::ui(|egui_ctx| {
        // Configure brighter text and UI
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::from_rgb(240, 240, 240));
        visuals.widgets.noninteractive.fg_stroke.color = egui::Color32::from_rgb(220, 220, 220);
        visuals.widgets.inactive.fg_stroke.color = egui::Color32::from_rgb(200, 200, 200);
        visuals.widgets.hovered.fg_stroke.color = egui::Color32::WHITE;
        visuals.widgets.active.fg_stroke.color = egui::Color32::WHITE;
        egui_ctx.set_visuals(visuals);

        super::stats::draw_stats_panel(egui_ctx, state, world);
    });
}

pub fn process_egui() {
    egui_macroquad::draw();
}

// UI module - handles all user interface rendering

mod nn;
mod stats;
mod ui;

/// Width of the right-hand stats panel in pixels.
pub const PANEL_WIDTH: f32 = 320.0;

// Re-export the public interface
pub use ui::{UIState, draw_ui, process_egui};

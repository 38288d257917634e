use autopilot::simulation::brain::NeuralNetwork;
use egui_macroquad::egui;

const OUTPUT_LABELS: [&str; 4] = ["fwd", "left", "right", "rev"];
/// Usable painter width inside the stats panel.
const PANEL_WIDTH_INNER: f32 = super::PANEL_WIDTH - 30.0;

pub(super) fn draw_neural_network(ui: &mut egui::Ui, network: &NeuralNetwork) {
    let Some(first) = network.levels.first() else {
        ui.label("No levels to display");
        return;
    };

    // inputs of the first level, then the outputs of every level
    let mut layer_activations = vec![&first.inputs];
    layer_activations.extend(network.levels.iter().map(|level| &level.outputs));

    let width = PANEL_WIDTH_INNER;
    let height = 260.0;
    let (response, painter) = ui.allocate_painter(egui::vec2(width, height), egui::Sense::hover());

    let rect = response.rect;
    let layer_count = layer_activations.len();
    let layer_spacing = rect.width() / (layer_count as f32 + 1.0);

    // Draw connections first (so they appear behind neurons)
    for (layer_idx, level) in network.levels.iter().enumerate() {
        let input_activations = layer_activations[layer_idx];
        let output_count = level.output_size();
        let input_count = level.input_size();

        let x1 = rect.left() + layer_spacing * (layer_idx + 1) as f32;
        let x2 = rect.left() + layer_spacing * (layer_idx + 2) as f32;

        for out_idx in 0..output_count {
            let y2 = neuron_y(rect, out_idx, output_count);

            for in_idx in 0..input_count {
                let y1 = neuron_y(rect, in_idx, input_count);

                let weight = level.weights[[in_idx, out_idx]];
                let signal = input_activations.get(in_idx).copied().unwrap_or(0.0) * weight;
                let strength = weight.abs().min(1.0);
                let alpha = (40.0 + strength * 160.0) as u8;

                let color = if weight > 0.0 {
                    egui::Color32::from_rgba_unmultiplied(0, 200, 50, alpha)
                } else {
                    egui::Color32::from_rgba_unmultiplied(220, 0, 50, alpha)
                };

                // connections carrying a signal this tick are drawn thicker
                let line_width = if signal == 0.0 { 0.8 } else { 0.8 + strength * 2.0 };

                painter.line_segment(
                    [egui::pos2(x1, y1), egui::pos2(x2, y2)],
                    egui::Stroke::new(line_width, color),
                );
            }
        }
    }

    // Draw neurons
    for (layer_idx, activations) in layer_activations.iter().enumerate() {
        let x = rect.left() + layer_spacing * (layer_idx + 1) as f32;
        let neuron_count = activations.len();

        let is_input_layer = layer_idx == 0;
        let is_output_layer = layer_idx == layer_count - 1;

        for (neuron_idx, &activation) in activations.iter().enumerate() {
            let y = neuron_y(rect, neuron_idx, neuron_count);

            // sensor inputs are closeness values in [0, 1], other neurons fire 0 or 1
            let intensity = (activation.clamp(0.0, 1.0) * 255.0) as u8;
            let color = egui::Color32::from_rgb(255, intensity, 0);
            let fill = if activation > 0.0 {
                color
            } else {
                egui::Color32::from_rgb(60, 60, 60)
            };

            painter.circle_filled(egui::pos2(x, y), 6.0, fill);
            painter.circle_stroke(
                egui::pos2(x, y),
                6.0,
                egui::Stroke::new(1.5, egui::Color32::WHITE),
            );

            if is_output_layer {
                if let Some(label) = OUTPUT_LABELS.get(neuron_idx) {
                    painter.text(
                        egui::pos2(x + 10.0, y),
                        egui::Align2::LEFT_CENTER,
                        *label,
                        egui::FontId::proportional(9.0),
                        egui::Color32::WHITE,
                    );
                }
            } else if is_input_layer {
                painter.text(
                    egui::pos2(x - 10.0, y),
                    egui::Align2::RIGHT_CENTER,
                    format!("{:.2}", activation),
                    egui::FontId::proportional(9.0),
                    egui::Color32::WHITE,
                );
            }
        }

        let layer_name = if is_input_layer {
            "Sensors"
        } else if is_output_layer {
            "Controls"
        } else {
            "Hidden"
        };

        painter.text(
            egui::pos2(x, rect.bottom() - 12.0),
            egui::Align2::CENTER_TOP,
            layer_name,
            egui::FontId::proportional(11.0),
            egui::Color32::WHITE,
        );
    }
}

fn neuron_y(rect: egui::Rect, index: usize, count: usize) -> f32 {
    // leave room for the layer names at the bottom
    let height = rect.height() - 20.0;
    rect.top() + height * (index as f32 + 1.0) / (count as f32 + 1.0)
}

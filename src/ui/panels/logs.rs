use bevy_egui::egui;
use crate::panel::ModeControlPanel;

/// Renders the action log section
pub fn render_logs_section(
    ui: &mut egui::Ui,
    panel: &mut ModeControlPanel,
    auto_scroll: bool,
    width: f32,
) {
    ui.vertical(|ui| {
        ui.set_width(width);
        ui.label(format!("Action Log ({} messages)", panel.log().len()));

        if ui.button("clear log").clicked() {
            panel.log_mut().clear();
        }

        egui::ScrollArea::vertical()
            .max_height(300.0)
            .id_salt("action_log")
            .auto_shrink([false; 2])
            .stick_to_bottom(auto_scroll)
            .show(ui, |ui| {
                for entry in panel.log().iter() {
                    ui.horizontal(|ui| {
                        ui.label(format!("[{}]", entry.clock_time.format("%H:%M:%S%.3f")));
                        ui.label(&entry.message);
                    });
                }
            });
    });
}

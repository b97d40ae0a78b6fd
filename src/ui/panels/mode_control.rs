use bevy_egui::egui;
use crate::config::{SELECT_PROMPT_INDEX, SELECT_PROMPT_LABEL};
use crate::panel::ModeControlPanel;
use crate::vehicle::{MODE_CHOICES, mode_for_index};

// Unbound panels reject actions with NoBoundVehicle, which needs no feedback.
// Invalid mode selections are logged by the panel itself.

/// Renders the vehicle control section
pub fn render_mode_control_section(ui: &mut egui::Ui, panel: &mut ModeControlPanel, width: f32) {
    ui.vertical(|ui| {
        ui.set_width(width);
        ui.heading("Vehicle Control");

        if !panel.is_bound() {
            ui.label("Select a vehicle to enable controls");
        }

        ui.add_enabled_ui(panel.is_bound(), |ui| {
            render_engine_toggle(ui, panel);
            ui.separator();
            render_mode_selector(ui, panel);
            ui.separator();
            render_flight_actions(ui, panel);
        });

        ui.separator();
        render_vehicle_state(ui, panel);
    });
}

fn render_engine_toggle(ui: &mut egui::Ui, panel: &mut ModeControlPanel) {
    ui.horizontal(|ui| {
        if ui.button(panel.toggle_label()).clicked() {
            let _ = panel.toggle_engine();
        }
        ui.label("Arm or disarm motors");
    });
}

fn render_mode_selector(ui: &mut egui::Ui, panel: &mut ModeControlPanel) {
    let current = panel.selector_index();
    let selected_text = mode_for_index(current)
        .map(|mode| mode.selector_label())
        .unwrap_or(SELECT_PROMPT_LABEL);

    ui.horizontal(|ui| {
        let mut choice = None;
        egui::ComboBox::from_id_salt("mode_select")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(current == SELECT_PROMPT_INDEX, SELECT_PROMPT_LABEL)
                    .clicked()
                {
                    choice = Some(SELECT_PROMPT_INDEX);
                }
                for (index, mode) in MODE_CHOICES {
                    if ui
                        .selectable_label(current == index, mode.selector_label())
                        .clicked()
                    {
                        choice = Some(index);
                    }
                }
            });

        if let Some(index) = choice {
            let _ = panel.select_mode(index);
        }

        if ui.button("Set Mode").clicked() {
            let _ = panel.commit_mode();
        }
    });
}

fn render_flight_actions(ui: &mut egui::Ui, panel: &mut ModeControlPanel) {
    ui.horizontal(|ui| {
        if ui.button("Launch").clicked() {
            let _ = panel.launch();
        }
        ui.label("Take off");
    });
    ui.add_space(3.0);

    ui.horizontal(|ui| {
        if ui.button("Land").clicked() {
            let _ = panel.land();
        }
        ui.label("Return home and land");
    });
    ui.add_space(3.0);

    ui.horizontal(|ui| {
        if ui.button("Shutdown").clicked() {
            let _ = panel.shutdown();
        }
        ui.label("Power off the vehicle");
    });
}

fn render_vehicle_state(ui: &mut egui::Ui, panel: &ModeControlPanel) {
    let engine = if panel.engine_state().is_on() {
        "running"
    } else {
        "stopped"
    };
    ui.label(format!("Engine: {engine}"));

    match panel.reported_mode() {
        Some(mode) => ui.label(format!("Reported mode: {} ({})", mode.name, mode.description)),
        None => ui.label("Reported mode: unknown"),
    };

    if let Some(action) = panel.last_action() {
        ui.label(format!("Last action: {action}"));
    }
}

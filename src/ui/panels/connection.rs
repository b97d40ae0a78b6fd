use bevy_egui::egui;
use crate::config::WINDOW_TITLE;
use crate::panel::{BindPolicy, ModeControlPanel};
use crate::persistence::PanelSettings;
use crate::registry::VehicleRegistry;
use crate::vehicle::VehicleId;

/// Renders the top bar with the active vehicle selector and panel options
pub fn render_connection_panel(
    ui: &mut egui::Ui,
    panel: &ModeControlPanel,
    registry: &mut VehicleRegistry,
    settings: &mut PanelSettings,
) {
    ui.horizontal_wrapped(|ui| {
        ui.heading(WINDOW_TITLE);
        ui.separator();

        // Active vehicle
        ui.label("Active vehicle:");
        let selected_text = registry
            .active()
            .map(|v| v.name())
            .unwrap_or_else(|| "None".to_string());
        let mut requested: Option<VehicleId> = None;
        egui::ComboBox::from_id_salt("active_vehicle_select")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for vehicle in registry.vehicles() {
                    let selected = registry.active_id() == Some(vehicle.id());
                    if ui.selectable_label(selected, vehicle.name()).clicked() {
                        requested = Some(vehicle.id());
                    }
                }
            });
        if let Some(id) = requested
            && let Err(e) = registry.set_active(id)
        {
            tracing::warn!(error = %e, "vehicle selection failed");
        }

        if let Some(id) = registry.active_id()
            && ui.button("Remove").clicked()
            && registry.remove(id).is_none()
        {
            tracing::warn!(vehicle_id = id, "vehicle already removed");
        }

        ui.separator();

        let mut follow = settings.bind_policy == BindPolicy::FollowActive;
        if ui.checkbox(&mut follow, "Follow active vehicle").changed() {
            settings.bind_policy = if follow {
                BindPolicy::FollowActive
            } else {
                BindPolicy::KeepFirst
            };
        }

        ui.separator();
        ui.checkbox(&mut settings.auto_scroll_log, "Auto-scroll log");

        ui.separator();
        ui.label(panel.status_text());
    });
}

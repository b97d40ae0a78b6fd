use bevy::prelude::*;
use std::sync::Arc;

use crate::panel::ModeControlPanel;
use crate::persistence::PanelSettings;
use crate::registry::VehicleRegistry;
use crate::sim::SimulatedVehicle;
use crate::vehicle::VehicleId;

/// Registers one simulated vehicle per configured name and makes the first
/// one active, the way a ground station selects the first vehicle it hears.
pub fn build_registry(settings: &PanelSettings) -> VehicleRegistry {
    let mut registry = VehicleRegistry::default();

    for (id, name) in (1..).zip(&settings.simulated_vehicles) {
        let vehicle: Arc<SimulatedVehicle> = Arc::new(SimulatedVehicle::new(id, name.clone()));
        if let Err(e) = registry.register(vehicle) {
            tracing::warn!(name = %name, error = %e, "skipping simulated vehicle");
        }
    }

    let first: Option<VehicleId> = registry.vehicles().next().map(|v| v.id());
    if let Some(id) = first
        && let Err(e) = registry.set_active(id)
    {
        tracing::warn!(vehicle_id = id, error = %e, "could not select vehicle");
    }

    registry
}

// The panel holds mpsc receivers, which are not Sync, so it lives in a
// NonSend resource and every system touching it runs on the main thread.
pub fn setup_panel(world: &mut World) {
    let settings = PanelSettings::load();
    let mut registry = build_registry(&settings);

    let mut panel = ModeControlPanel::new(settings.bind_policy);
    panel.attach_registry(&mut registry);

    world.insert_resource(settings);
    world.insert_resource(registry);
    world.insert_non_send_resource(panel);
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Keeps the panel's bind policy in sync with the operator settings
pub fn apply_settings_system(
    settings: Res<PanelSettings>,
    registry: Res<VehicleRegistry>,
    mut panel: NonSendMut<ModeControlPanel>,
) {
    if settings.is_changed() {
        panel.apply_policy(settings.bind_policy, &registry);
    }
}

/// Applies vehicle and registry notifications queued since the last frame
pub fn process_panel_events(mut panel: NonSendMut<ModeControlPanel>) {
    let handled = panel.process_events();
    if handled > 0 {
        tracing::trace!(handled, "applied vehicle notifications");
    }
}

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use mode_control_panel::{app, config, persistence, ui};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: config::WINDOW_TITLE.to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_systems(Startup, (app::setup_panel, app::setup_camera))
        .add_systems(
            Update,
            (
                app::apply_settings_system,
                app::process_panel_events,
                ui::ui_system,
                persistence::auto_save_system,
            )
                .chain(),
        )
        .run();
}

pub mod panels;

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::panel::ModeControlPanel;
use crate::persistence::PanelSettings;
use crate::registry::VehicleRegistry;

/// Main UI system that renders all the egui panels
pub fn ui_system(
    mut contexts: EguiContexts,
    mut panel: NonSendMut<ModeControlPanel>,
    mut registry: ResMut<VehicleRegistry>,
    mut settings: ResMut<PanelSettings>,
) {
    let ctx = contexts.ctx_mut();

    // Edit a copy so unchanged settings do not trigger an auto-save
    let mut edited = settings.clone();

    // Top Panel - Vehicle selection
    egui::TopBottomPanel::top("top_panel")
        .frame(egui::Frame {
            inner_margin: egui::Margin::same(8.0),
            fill: ctx.style().visuals.window_fill(),
            ..Default::default()
        })
        .show(ctx, |ui| {
            panels::render_connection_panel(ui, &panel, &mut registry, &mut edited);
        });

    // Central Panel - Controls | Log
    egui::CentralPanel::default()
        .frame(egui::Frame {
            inner_margin: egui::Margin::same(8.0),
            fill: ctx.style().visuals.window_fill(),
            ..Default::default()
        })
        .show(ctx, |ui| {
            ui.horizontal_top(|ui| {
                let available_width = ui.available_width();
                let controls_width = available_width * 0.40;
                let log_width = available_width * 0.55;

                ui.group(|ui| {
                    panels::render_mode_control_section(ui, &mut panel, controls_width);
                });

                ui.group(|ui| {
                    panels::render_logs_section(ui, &mut panel, edited.auto_scroll_log, log_width);
                });
            });
        });

    settings.set_if_neq(edited);
}

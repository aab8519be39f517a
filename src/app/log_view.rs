//! Event log side panel: "In flight" and "Completed" lists
//!
//! Clicking an entry toggles its extra-fields block; hovering one highlights
//! its node/edge pair on the canvas.

use eframe::egui;

use crate::core::LogEntry;
use crate::theme::colors;

use super::ArchflowApp;

const NO_DETAILS: &str = "No additional details.";

/// What the pointer did to the log this frame
#[derive(Default)]
struct LogInteraction {
    hovered: Option<String>,
    clicked: Option<String>,
}

fn entry_card(ui: &mut egui::Ui, entry: &LogEntry, interaction: &mut LogInteraction) {
    let event = &entry.event;
    let response = egui::Frame::new()
        .fill(colors::BG_ELEVATED)
        .corner_radius(4.0)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(
                egui::RichText::new(format!("{} → {}", event.source(), event.deliver_to()))
                    .color(colors::TEXT_PRIMARY),
            );
            ui.label(egui::RichText::new(event.operation()).color(colors::TEXT_SECONDARY));
            if entry.expanded {
                let details = event
                    .extra_details_pretty()
                    .unwrap_or_else(|| NO_DETAILS.to_string());
                ui.label(egui::RichText::new(details).monospace().small().color(colors::TEXT_SECONDARY));
            }
        })
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand);

    if response.hovered() {
        interaction.hovered = Some(entry.id().to_string());
    }
    if response.clicked() {
        interaction.clicked = Some(entry.id().to_string());
    }
    ui.add_space(4.0);
}

impl ArchflowApp {
    pub(crate) fn render_log(&mut self, ctx: &egui::Context) {
        let mut interaction = LogInteraction::default();

        egui::SidePanel::right("event_log")
            .default_width(300.0)
            .min_width(200.0)
            .resizable(true)
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(8.0))
            .show(ctx, |ui| {
                let Some(view) = &self.view else {
                    ui.label(egui::RichText::new("Waiting for diagram").color(colors::TEXT_MUTED));
                    return;
                };
                let log = view.scheduler.log();

                egui::ScrollArea::vertical()
                    .id_salt("event_log_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        egui::CollapsingHeader::new(format!("In flight ({})", log.current_len()))
                            .id_salt("in_flight")
                            .default_open(true)
                            .show(ui, |ui| {
                                for entry in log.current() {
                                    entry_card(ui, entry, &mut interaction);
                                }
                            });

                        egui::CollapsingHeader::new(format!("Completed ({})", log.completed_len()))
                            .id_salt("completed")
                            .default_open(true)
                            .show(ui, |ui| {
                                for entry in log.completed() {
                                    entry_card(ui, entry, &mut interaction);
                                }
                            });
                    });
            });

        if let Some(view) = &mut self.view {
            if let Some(id) = &interaction.clicked {
                view.scheduler.log_mut().toggle_expanded(id);
            }
            view.scheduler
                .log_mut()
                .hover(interaction.hovered.as_deref(), &mut view.canvas);
        }
    }
}

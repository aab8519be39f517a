//! Diagnostics window: link status, queue sizes, poll counters

use eframe::egui;

use crate::theme::colors;

use super::header::link_color;
use super::ArchflowApp;

impl ArchflowApp {
    pub(crate) fn draw_diagnostics(&self, ctx: &egui::Context) {
        let link = self.link_state();
        let title = egui::RichText::new(format!("● {}", link.label())).color(link_color(&link));

        egui::Area::new(egui::Id::new("diagnostics_area"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(8.0, -8.0))
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 200))
                    .corner_radius(4.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.set_min_width(220.0);
                        egui::CollapsingHeader::new(title)
                            .default_open(false)
                            .show(ui, |ui| {
                                ui.label(
                                    egui::RichText::new(&self.base_url).color(colors::TEXT_SECONDARY),
                                );
                                if let Some(error) = link.error() {
                                    ui.label(egui::RichText::new(error).color(colors::ERROR));
                                }

                                ui.label(
                                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                                        .color(colors::TEXT_SECONDARY),
                                );

                                let stats = &self.poll_stats;
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} polls ({} failed)",
                                        stats.polls_ok + stats.polls_failed,
                                        stats.polls_failed
                                    ))
                                    .color(colors::TEXT_MUTED),
                                );
                                ui.label(
                                    egui::RichText::new(format!("{} events observed", stats.events_observed))
                                        .color(colors::TEXT_MUTED),
                                );

                                if let Some(view) = &self.view {
                                    let s = &view.scheduler;
                                    let counts = s.stats();
                                    ui.label(
                                        egui::RichText::new(format!(
                                            "{} pending / {} animating",
                                            s.pending_len(),
                                            s.running().len()
                                        ))
                                        .color(colors::TEXT_MUTED),
                                    );
                                    ui.label(
                                        egui::RichText::new(format!(
                                            "{} completed / {} without edge",
                                            counts.completed, counts.missing_edge
                                        ))
                                        .color(colors::TEXT_MUTED),
                                    );
                                    let discarded_color = if counts.discarded > 0 {
                                        colors::ERROR
                                    } else {
                                        colors::TEXT_MUTED
                                    };
                                    ui.label(
                                        egui::RichText::new(format!("{} discarded", counts.discarded))
                                            .color(discarded_color),
                                    );
                                    ui.label(
                                        egui::RichText::new(format!("mode: {}", s.config().mode))
                                            .color(colors::TEXT_MUTED),
                                    );
                                }
                            });
                    });
            });
    }
}

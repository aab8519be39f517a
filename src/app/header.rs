//! Header bar with panel toggles and status

use eframe::egui;

use crate::link_state::LinkState;
use crate::theme::colors;
use crate::time::now_millis;

use super::ArchflowApp;

/// Status color for a link state
pub(crate) fn link_color(state: &LinkState) -> egui::Color32 {
    match state {
        LinkState::Ready => colors::OK,
        LinkState::Loading | LinkState::Degraded(_) => colors::PENDING,
        LinkState::Failed(_) => colors::ERROR,
    }
}

impl ArchflowApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        self.fps_counter.tick();

        let link = self.link_state();
        let (in_flight, completed, discarded) = self
            .view
            .as_ref()
            .map(|v| {
                let log = v.scheduler.log();
                (log.current_len(), log.completed_len(), v.scheduler.stats().discarded)
            })
            .unwrap_or_default();

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("archflow").color(colors::TEXT_PRIMARY).strong());
            ui.add_space(10.0);

            let controls_text = if self.settings.show_controls { "Controls <<<" } else { "Controls >>>" };
            if ui.button(controls_text).clicked() {
                self.settings.show_controls = !self.settings.show_controls;
            }

            let log_text = if self.settings.show_log { "Hide log" } else { "Show log" };
            if ui.button(log_text).clicked() {
                self.settings.show_log = !self.settings.show_log;
            }

            if ui.button("Reset view").clicked() {
                if let Some(view) = &mut self.view {
                    view.canvas.reset_view();
                }
            }

            // Status and stats, right-to-left
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!("{} discarded", discarded))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("{} completed", completed))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("{} in flight", in_flight))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(colors::TEXT_SECONDARY),
                );

                ui.add_space(10.0);
                ui.colored_label(link_color(&link), link.label());
            });
        });
    }
}

/// FPS counter over the last 60 frames
pub struct FpsCounter {
    frames: Vec<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(60),
        }
    }

    pub fn tick(&mut self) {
        self.record(now_millis());
    }

    fn record(&mut self, now_ms: f64) {
        self.frames.push(now_ms);
        if self.frames.len() > 60 {
            self.frames.remove(0);
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if self.frames.len() < 2 || elapsed <= 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / (elapsed / 1000.0)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_from_frame_times() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.fps(), 0.0);
        for i in 0..=60 {
            counter.record(i as f64 * 20.0);
        }
        // 60 frames kept, 59 intervals of 20 ms
        assert!((counter.fps() - 50.0).abs() < 1e-9);
    }
}

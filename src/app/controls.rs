//! Controls sidebar: animation speed, mode, view

use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::core::scheduler::{AnimationMode, DEFAULT_SPEED_MS};
use crate::theme::colors;

use super::ArchflowApp;

/// Slider bounds for the marker travel time (ms)
pub const SPEED_RANGE_MS: std::ops::RangeInclusive<u32> = 100..=10_000;

/// User-adjustable viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub speed_ms: u32,
    pub mode: AnimationMode,
    pub show_log: bool,
    pub show_controls: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            speed_ms: DEFAULT_SPEED_MS,
            mode: AnimationMode::default(),
            show_log: true,
            show_controls: false,
        }
    }
}

impl ViewerSettings {
    /// Clamp values coming from the command line or the page into slider range
    pub fn clamped(mut self) -> Self {
        self.speed_ms = self
            .speed_ms
            .clamp(*SPEED_RANGE_MS.start(), *SPEED_RANGE_MS.end());
        self
    }
}

impl ArchflowApp {
    pub(crate) fn render_controls(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .default_width(220.0)
            .min_width(180.0)
            .resizable(true)
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(8.0))
            .show(ctx, |ui| {
                let group_frame = egui::Frame::new()
                    .stroke(egui::Stroke::new(1.0, colors::BORDER))
                    .corner_radius(4.0)
                    .inner_margin(6.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    let label = format!("Animation speed: {} ms", self.settings.speed_ms);
                    ui.label(egui::RichText::new(label).color(colors::TEXT_SECONDARY));
                    ui.spacing_mut().slider_width = ui.available_width();
                    let response = ui.add(
                        egui::Slider::new(&mut self.settings.speed_ms, SPEED_RANGE_MS)
                            .logarithmic(true)
                            .clamping(egui::SliderClamping::Always)
                            .show_value(false),
                    );
                    if response.double_clicked() {
                        self.settings.speed_ms = DEFAULT_SPEED_MS;
                    }
                });

                ui.add_space(8.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Mode:").color(colors::TEXT_SECONDARY));
                    for &mode in AnimationMode::ALL {
                        ui.radio_value(&mut self.settings.mode, mode, mode.label());
                    }
                    let hint = match self.settings.mode {
                        AnimationMode::Sequential => "One event at a time, in arrival order",
                        AnimationMode::Auto => "All pending events animate together",
                    };
                    ui.label(egui::RichText::new(hint).color(colors::TEXT_MUTED).small());
                });

                ui.add_space(8.0);

                if ui.button("Reset view").clicked() {
                    if let Some(view) = &mut self.view {
                        view.canvas.reset_view();
                    }
                }
            });
    }
}

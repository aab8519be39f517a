//! Dark theme for the viewer plus diagram color helpers

use egui::Color32;

pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(14, 14, 16);
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(24, 24, 28);
    pub const BG_HOVER: Color32 = Color32::from_rgb(36, 36, 42);
    /// Diagram canvas, light so draw.io fill colors read as authored
    pub const CANVAS: Color32 = Color32::from_rgb(245, 245, 245);

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(235, 235, 235);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 160, 160);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(90, 90, 90);
    /// Node and edge labels on the light canvas
    pub const LABEL: Color32 = Color32::from_rgb(30, 30, 30);

    // === Lines & Borders ===
    pub const BORDER: Color32 = Color32::from_rgb(48, 48, 54);
    pub const NODE_OUTLINE: Color32 = Color32::from_rgb(90, 90, 90);

    // === Status ===
    pub const OK: Color32 = Color32::from_rgb(100, 200, 100);
    pub const PENDING: Color32 = Color32::from_rgb(200, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(200, 100, 100);

    // === Animation ===
    pub const HIGHLIGHT: Color32 = Color32::from_rgb(255, 140, 0);
    pub const MARKER: Color32 = Color32::from_rgb(255, 0, 0);
}

/// Parse `#rrggbb` or `#rgb`
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
        3 => {
            let expand = |v: u8| v * 17;
            Some(Color32::from_rgb(
                expand(channel(0, 1)?),
                expand(channel(1, 1)?),
                expand(channel(2, 1)?),
            ))
        }
        _ => None,
    }
}

/// Parse a diagram color, falling back when it is absent or unparseable
pub fn diagram_color(s: &str, fallback: Color32) -> Color32 {
    parse_hex_color(s).unwrap_or(fallback)
}

/// Create the dark egui Visuals used around the canvas
pub fn minimal_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_ELEVATED;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_ELEVATED;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PRIMARY;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_ELEVATED;
    visuals.widgets.inactive.weak_bg_fill = BG_ELEVATED;
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.weak_bg_fill = BG_HOVER;
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);

    visuals.selection.bg_fill = Color32::from_rgb(70, 70, 80);
    visuals.selection.stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);

    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("#DAE8FC"), Some(Color32::from_rgb(218, 232, 252)));
        assert_eq!(parse_hex_color("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("none"), None);
    }

    #[test]
    fn test_diagram_color_fallback() {
        assert_eq!(diagram_color("none", Color32::GRAY), Color32::GRAY);
    }
}

//! Slate-on-white look of the academy shell.

use std::collections::BTreeMap;

use eframe::egui;

#[derive(Debug, Clone, Copy)]
pub struct AcademyPalette {
    pub app_background: egui::Color32,
    pub card_background: egui::Color32,
    pub card_stroke: egui::Color32,
    pub accent: egui::Color32,
    pub accent_text: egui::Color32,
    pub muted_text: egui::Color32,
    pub track: egui::Color32,
    pub success: egui::Color32,
    pub success_background: egui::Color32,
    pub error_background: egui::Color32,
    pub error_stroke: egui::Color32,
}

pub const PALETTE: AcademyPalette = AcademyPalette {
    app_background: egui::Color32::from_rgb(241, 245, 249),
    card_background: egui::Color32::WHITE,
    card_stroke: egui::Color32::from_rgb(226, 232, 240),
    accent: egui::Color32::from_rgb(15, 23, 42),
    accent_text: egui::Color32::WHITE,
    muted_text: egui::Color32::from_rgb(100, 116, 139),
    track: egui::Color32::from_rgb(226, 232, 240),
    success: egui::Color32::from_rgb(22, 163, 74),
    success_background: egui::Color32::from_rgb(240, 253, 244),
    error_background: egui::Color32::from_rgb(254, 226, 226),
    error_stroke: egui::Color32::from_rgb(248, 113, 113),
};

pub const CARD_RADIUS: u8 = 16;

pub fn lighten_color(c: egui::Color32, t: f32) -> egui::Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |channel: u8| -> u8 {
        let channel = channel as f32;
        (channel + (255.0 - channel) * t).round().clamp(0.0, 255.0) as u8
    };
    egui::Color32::from_rgba_unmultiplied(mix(c.r()), mix(c.g()), mix(c.b()), c.a())
}

pub fn academy_visuals() -> egui::Visuals {
    let palette = PALETTE;
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = palette.app_background;
    visuals.window_fill = palette.card_background;
    visuals.extreme_bg_color = palette.card_background;
    visuals.faint_bg_color = lighten_color(palette.app_background, 0.4);
    visuals.hyperlink_color = palette.accent;
    visuals.selection.bg_fill = palette.accent;
    visuals.selection.stroke = egui::Stroke::new(1.0, palette.accent_text);
    visuals.window_stroke = egui::Stroke::new(1.0, palette.card_stroke);
    visuals.window_corner_radius = egui::CornerRadius::same(CARD_RADIUS);
    visuals.menu_corner_radius = egui::CornerRadius::same(10);

    let widget_radius = egui::CornerRadius::same(10);
    for widget in [
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
        &mut visuals.widgets.open,
    ] {
        widget.corner_radius = widget_radius;
    }
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, palette.card_stroke);
    visuals.widgets.inactive.weak_bg_fill = palette.card_background;
    visuals.widgets.hovered.weak_bg_fill = lighten_color(palette.card_stroke, 0.5);
    visuals.widgets.active.bg_fill = palette.accent;
    visuals
}

pub fn scaled_text_styles(text_scale: f32) -> BTreeMap<egui::TextStyle, egui::FontId> {
    let mut styles = egui::Style::default().text_styles;
    for font in styles.values_mut() {
        font.size *= text_scale;
    }
    styles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_moves_channels_towards_white() {
        let c = lighten_color(egui::Color32::from_rgb(0, 100, 200), 0.5);
        assert_eq!((c.r(), c.g(), c.b()), (128, 178, 228));
        assert_eq!(lighten_color(PALETTE.accent, 1.0), egui::Color32::WHITE);
    }
}

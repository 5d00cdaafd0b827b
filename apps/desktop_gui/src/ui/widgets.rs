//! Small drawing helpers shared by the screens.

use eframe::egui;
use shared::domain::StudyDay;

use crate::ui::theme::{lighten_color, CARD_RADIUS, PALETTE};

pub fn card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    egui::Frame::NONE
        .fill(PALETTE.card_background)
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(CARD_RADIUS)
        .inner_margin(egui::Margin::same(18))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui)
        })
        .inner
}

pub fn card_title(ui: &mut egui::Ui, title: &str) {
    ui.label(egui::RichText::new(title).strong().size(16.0));
    ui.add_space(6.0);
}

pub fn badge(ui: &mut egui::Ui, text: &str) -> egui::Response {
    egui::Frame::NONE
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(255)
        .inner_margin(egui::Margin::symmetric(10, 3))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(text)
                    .size(12.0)
                    .color(PALETTE.muted_text),
            )
        })
        .response
}

/// Width fraction filled by a progress bar for `percent`.
pub fn progress_fraction(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

pub fn progress_bar(ui: &mut egui::Ui, percent: u8) -> egui::Response {
    let desired = egui::vec2(ui.available_width().max(40.0), 8.0);
    let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::hover());
    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        painter.rect_filled(rect, 4.0, PALETTE.track);
        let mut filled = rect;
        filled.set_width(rect.width() * progress_fraction(percent));
        if filled.width() > 0.0 {
            painter.rect_filled(filled, 4.0, PALETTE.accent);
        }
    }
    response
}

pub fn muted(text: impl Into<String>) -> egui::RichText {
    egui::RichText::new(text.into()).color(PALETTE.muted_text)
}

/// Dark square with a glyph, used in front of list rows and stat cards.
pub fn icon_tile(ui: &mut egui::Ui, glyph: &str, size: f32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
    let painter = ui.painter();
    painter.rect_filled(rect, size * 0.25, PALETTE.accent);
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        glyph,
        egui::FontId::proportional(size * 0.45),
        PALETTE.accent_text,
    );
}

pub fn stat_card(ui: &mut egui::Ui, glyph: &str, label: &str, value: &str) {
    card(ui, |ui| {
        ui.horizontal(|ui| {
            icon_tile(ui, glyph, 46.0);
            ui.vertical(|ui| {
                ui.label(muted(label));
                ui.label(egui::RichText::new(value).size(24.0).strong());
            });
        });
    });
}

/// Maps study minutes onto chart coordinates inside `rect`.
pub fn chart_points(days: &[StudyDay], rect: egui::Rect) -> Vec<egui::Pos2> {
    let max_minutes = days.iter().map(|day| day.minutes).max().unwrap_or(0).max(1) as f32;
    let steps = days.len().saturating_sub(1).max(1) as f32;
    days.iter()
        .enumerate()
        .map(|(index, day)| {
            let x = rect.left() + rect.width() * index as f32 / steps;
            let y = rect.bottom() - rect.height() * day.minutes as f32 / max_minutes;
            egui::pos2(x, y)
        })
        .collect()
}

pub fn weekly_line_chart(ui: &mut egui::Ui, days: &[StudyDay], height: f32) {
    let desired = egui::vec2(ui.available_width(), height);
    let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }

    let painter = ui.painter_at(rect);
    let plot = egui::Rect::from_min_max(
        rect.min + egui::vec2(36.0, 8.0),
        rect.max - egui::vec2(12.0, 22.0),
    );

    let grid = egui::Stroke::new(1.0, lighten_color(PALETTE.card_stroke, 0.2));
    for step in 0..=4 {
        let y = plot.bottom() - plot.height() * step as f32 / 4.0;
        painter.hline(plot.x_range(), y, grid);
    }

    let max_minutes = days.iter().map(|day| day.minutes).max().unwrap_or(0);
    painter.text(
        egui::pos2(rect.left() + 2.0, plot.top()),
        egui::Align2::LEFT_CENTER,
        max_minutes.to_string(),
        egui::FontId::proportional(11.0),
        PALETTE.muted_text,
    );
    painter.text(
        egui::pos2(rect.left() + 2.0, plot.bottom()),
        egui::Align2::LEFT_CENTER,
        "0",
        egui::FontId::proportional(11.0),
        PALETTE.muted_text,
    );

    let points = chart_points(days, plot);
    for (point, day) in points.iter().zip(days) {
        painter.text(
            egui::pos2(point.x, plot.bottom() + 12.0),
            egui::Align2::CENTER_CENTER,
            &day.weekday,
            egui::FontId::proportional(11.0),
            PALETTE.muted_text,
        );
    }
    painter.add(egui::Shape::line(
        points.clone(),
        egui::Stroke::new(3.0, PALETTE.accent),
    ));

    if let Some(hover) = response.hover_pos() {
        let nearest = points.iter().zip(days).min_by(|(a, _), (b, _)| {
            (a.x - hover.x).abs().total_cmp(&(b.x - hover.x).abs())
        });
        if let Some((point, day)) = nearest {
            painter.circle_filled(*point, 4.0, PALETTE.accent);
            painter.text(
                *point - egui::vec2(0.0, 12.0),
                egui::Align2::CENTER_BOTTOM,
                format!("{} min", day.minutes),
                egui::FontId::proportional(12.0),
                PALETTE.accent,
            );
        }
    }
}

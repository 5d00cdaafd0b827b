use eframe::egui;
use shared::{
    catalog::CatalogFacets,
    domain::{Course, CourseId, Level},
};

use crate::ui::theme::{CARD_RADIUS, PALETTE};
use crate::ui::widgets::{badge, icon_tile, muted, progress_bar};

const CARD_MIN_WIDTH: f32 = 320.0;

pub fn column_count(available_width: f32) -> usize {
    ((available_width / CARD_MIN_WIDTH).floor() as usize).clamp(1, 3)
}

fn facet_selectors(ui: &mut egui::Ui, facets: &mut CatalogFacets, topics: &[&str]) {
    let level_text = facets
        .level
        .map(Level::label)
        .unwrap_or("Todos los niveles");
    egui::ComboBox::from_id_salt("catalog_level")
        .selected_text(level_text)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut facets.level, None, "Todos los niveles");
            for level in Level::ALL {
                ui.selectable_value(&mut facets.level, Some(level), level.label());
            }
        });

    let topic_text = facets.topic.clone().unwrap_or_else(|| "Todos los temas".to_string());
    egui::ComboBox::from_id_salt("catalog_topic")
        .selected_text(topic_text)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut facets.topic, None, "Todos los temas");
            for topic in topics {
                ui.selectable_value(&mut facets.topic, Some((*topic).to_string()), *topic);
            }
        });
}

fn course_card(ui: &mut egui::Ui, course: &Course) -> bool {
    let frame = egui::Frame::NONE
        .fill(PALETTE.card_background)
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(CARD_RADIUS)
        .inner_margin(egui::Margin::same(16))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_top(|ui| {
                icon_tile(ui, "📖", 52.0);
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&course.title).strong());
                    ui.label(muted(&course.short_description).size(13.0));
                    ui.add_space(6.0);
                    ui.horizontal_wrapped(|ui| {
                        badge(ui, course.level.label());
                        badge(ui, &course.duration);
                        for tag in course.card_tags() {
                            badge(ui, tag);
                        }
                    });
                    ui.add_space(8.0);
                    progress_bar(ui, course.progress_percent);
                    ui.label(muted(format!("Progreso: {}%", course.progress_percent)).size(12.0));
                });
            });
        });

    let response = frame
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand);
    response.clicked()
}

/// Draws the catalog for the already filtered `visible` courses. Returns the
/// course the user opened, if any.
pub fn show(
    ui: &mut egui::Ui,
    visible: &[&Course],
    query: &str,
    facets: &mut CatalogFacets,
    topics: &[&str],
) -> Option<CourseId> {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Catálogo").strong().size(24.0));
            ui.label(muted("Explora cursos y rutas de certificación"));
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            facet_selectors(ui, facets, topics);
        });
    });
    ui.add_space(12.0);

    if visible.is_empty() {
        let message = if query.is_empty() {
            "No hay cursos para los filtros seleccionados.".to_string()
        } else {
            format!("Ningún curso coincide con \"{query}\".")
        };
        ui.label(muted(message));
        return None;
    }

    let mut opened = None;
    let columns = column_count(ui.available_width());
    ui.columns(columns, |cols| {
        for (index, course) in visible.iter().enumerate() {
            let ui = &mut cols[index % columns];
            if course_card(ui, course) {
                opened = Some(course.id.clone());
            }
            ui.add_space(12.0);
        }
    });
    opened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_follows_available_width() {
        assert_eq!(column_count(200.0), 1);
        assert_eq!(column_count(700.0), 2);
        assert_eq!(column_count(2000.0), 3);
    }
}

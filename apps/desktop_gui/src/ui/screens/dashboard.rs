use eframe::egui;
use shared::{
    catalog::average_progress,
    domain::{Course, CourseId, StudyDay},
};

use crate::ui::widgets::{
    card, card_title, icon_tile, muted, progress_bar, stat_card, weekly_line_chart,
};

/// Courses listed under "Continuar aprendiendo"; the rest are recommended.
const CONTINUE_COUNT: usize = 2;

pub fn show(
    ui: &mut egui::Ui,
    courses: &[Course],
    weekly: &[StudyDay],
    badges: u32,
) -> Option<CourseId> {
    let mut opened = None;

    ui.columns(3, |columns| {
        stat_card(
            &mut columns[0],
            "▶",
            "Cursos activos",
            &courses.len().to_string(),
        );
        stat_card(
            &mut columns[1],
            "✔",
            "Progreso promedio",
            &format!("{}%", average_progress(courses)),
        );
        stat_card(&mut columns[2], "★", "Insignias", &badges.to_string());
    });
    ui.add_space(12.0);

    card(ui, |ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Tu actividad semanal").strong().size(16.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(muted("Minutos estudiados"));
            });
        });
        ui.add_space(8.0);
        weekly_line_chart(ui, weekly, 220.0);
    });
    ui.add_space(12.0);

    let split = CONTINUE_COUNT.min(courses.len());
    let (in_progress, recommended) = courses.split_at(split);
    ui.columns(2, |columns| {
        card(&mut columns[0], |ui| {
            card_title(ui, "Continuar aprendiendo");
            for course in in_progress {
                ui.horizontal(|ui| {
                    icon_tile(ui, "▶", 36.0);
                    ui.vertical(|ui| {
                        ui.set_width((ui.available_width() - 90.0).max(80.0));
                        ui.label(egui::RichText::new(&course.title).strong());
                        progress_bar(ui, course.progress_percent);
                    });
                    if ui.button("Reanudar").clicked() {
                        opened = Some(course.id.clone());
                    }
                });
                ui.add_space(6.0);
            }
        });
        card(&mut columns[1], |ui| {
            card_title(ui, "Recomendado para ti");
            for course in recommended {
                ui.horizontal(|ui| {
                    icon_tile(ui, "📖", 36.0);
                    ui.vertical(|ui| {
                        ui.set_width((ui.available_width() - 60.0).max(80.0));
                        ui.label(egui::RichText::new(&course.title).strong());
                        ui.label(muted(&course.short_description).size(12.0));
                    });
                    if ui.button("Ver").clicked() {
                        opened = Some(course.id.clone());
                    }
                });
                ui.add_space(6.0);
            }
        });
    });

    opened
}

use eframe::egui;
use shared::{
    domain::{Course, CourseModule, QuizQuestion},
    sample::{current_module, DEFAULT_LESSON_DESCRIPTION},
};

use crate::ui::theme::{CARD_RADIUS, PALETTE};
use crate::ui::widgets::{card, card_title, muted};

#[derive(Debug, Clone, Default)]
pub struct QuizState {
    pub selected: Option<usize>,
    pub submitted: bool,
}

impl QuizState {
    pub fn select(&mut self, option: usize) {
        if self.selected != Some(option) {
            self.selected = Some(option);
            self.submitted = false;
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.submitted
    }
}

/// Title and description of what the player shows: the opened course, or the
/// module the learner is on.
pub fn lesson_heading<'a>(
    opened: Option<&'a Course>,
    modules: &'a [CourseModule],
) -> (&'a str, &'a str) {
    match opened {
        Some(course) => (course.title.as_str(), course.short_description.as_str()),
        None => (
            current_module(modules)
                .map(|module| module.title.as_str())
                .unwrap_or("Curso"),
            DEFAULT_LESSON_DESCRIPTION,
        ),
    }
}

fn video_placeholder(ui: &mut egui::Ui, title: &str, module: Option<&CourseModule>) {
    let width = ui.available_width();
    let (rect, _) =
        ui.allocate_exact_size(egui::vec2(width, width * 9.0 / 16.0), egui::Sense::hover());
    let painter = ui.painter();
    painter.rect_filled(rect, 12.0, PALETTE.accent);
    if let Some(module) = module {
        painter.text(
            rect.center() - egui::vec2(0.0, 18.0),
            egui::Align2::CENTER_CENTER,
            format!("▶ Módulo {} · {}", module.id, module.duration),
            egui::FontId::proportional(14.0),
            PALETTE.accent_text,
        );
    }
    painter.text(
        rect.center() + egui::vec2(0.0, 12.0),
        egui::Align2::CENTER_CENTER,
        title,
        egui::FontId::proportional(18.0),
        PALETTE.accent_text,
    );
}

fn quiz(ui: &mut egui::Ui, question: &QuizQuestion, state: &mut QuizState) {
    ui.label(egui::RichText::new("Quiz rápido").strong());
    egui::Frame::NONE
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(CARD_RADIUS)
        .inner_margin(egui::Margin::same(14))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(&question.prompt).strong());
            ui.add_space(6.0);
            for (index, option) in question.options.iter().enumerate() {
                if ui
                    .radio(state.selected == Some(index), option.as_str())
                    .clicked()
                {
                    state.select(index);
                }
            }
            ui.add_space(6.0);
            if ui
                .add_enabled(state.can_submit(), egui::Button::new("Enviar"))
                .clicked()
            {
                state.submitted = true;
            }
            if state.submitted {
                ui.label(muted("Respuesta enviada."));
            }
        });
}

pub fn show(
    ui: &mut egui::Ui,
    opened: Option<&Course>,
    modules: &[CourseModule],
    resources: &[&str],
    question: &QuizQuestion,
    quiz_state: &mut QuizState,
) {
    let (title, description) = lesson_heading(opened, modules);
    let side_width = 360.0_f32.min(ui.available_width() * 0.4);

    ui.horizontal_top(|ui| {
        let main_width = (ui.available_width() - side_width - 12.0).max(280.0);
        ui.vertical(|ui| {
            ui.set_width(main_width);
            card(ui, |ui| {
                video_placeholder(ui, title, current_module(modules));
                ui.add_space(12.0);
                ui.columns(2, |cols| {
                    card(&mut cols[0], |ui| {
                        card_title(ui, "Descripción");
                        ui.label(muted(description));
                    });
                    card(&mut cols[1], |ui| {
                        card_title(ui, "Recursos");
                        for resource in resources {
                            ui.label(muted(format!("• {resource}")));
                        }
                    });
                });
                ui.add_space(12.0);
                quiz(ui, question, quiz_state);
            });
        });

        ui.vertical(|ui| {
            ui.set_width(side_width);
            card(ui, |ui| {
                card_title(ui, "Contenido del curso");
                for module in modules {
                    module_row(ui, module);
                }
            });
            ui.add_space(12.0);
            card(ui, |ui| {
                card_title(ui, "Foro del curso");
                ui.horizontal_wrapped(|ui| {
                    ui.label(muted(
                        "Comparte dudas, casos y recursos con otros profesionales.",
                    ));
                    ui.label(egui::RichText::new("Próximamente chat en vivo.").strong());
                });
            });
        });
    });
}

fn module_row(ui: &mut egui::Ui, module: &CourseModule) {
    egui::Frame::NONE
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(10)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let (glyph, color, fill) = if module.done {
                    ("✔", PALETTE.success, PALETTE.success_background)
                } else {
                    ("▶", PALETTE.muted_text, PALETTE.track)
                };
                egui::Frame::NONE
                    .fill(fill)
                    .corner_radius(8)
                    .inner_margin(egui::Margin::same(6))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(glyph).color(color));
                    });
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&module.title).strong());
                    ui.label(muted(&module.duration).size(12.0));
                });
            });
        });
    ui.add_space(4.0);
}

#[cfg(test)]
mod tests {
    use shared::{
        domain::Level,
        sample::{course_modules, sample_courses},
    };

    use super::*;

    #[test]
    fn opened_course_drives_the_heading() {
        let courses = sample_courses();
        let modules = course_modules();
        let (title, description) = lesson_heading(Some(&courses[3]), &modules);
        assert_eq!(title, "Fraude Operativo: Señales y Controles");
        assert_eq!(description, courses[3].short_description);
        assert_eq!(courses[3].level, Level::Intermediate);
    }

    #[test]
    fn without_a_course_the_current_module_is_shown() {
        let modules = course_modules();
        let (title, description) = lesson_heading(None, &modules);
        assert_eq!(title, "Metodología de evaluación de riesgo");
        assert_eq!(description, DEFAULT_LESSON_DESCRIPTION);
    }

    #[test]
    fn changing_the_answer_allows_another_submission() {
        let mut quiz = QuizState::default();
        assert!(!quiz.can_submit());
        quiz.select(1);
        assert!(quiz.can_submit());
        quiz.submitted = true;
        assert!(!quiz.can_submit());
        quiz.select(1);
        assert!(!quiz.can_submit());
        quiz.select(0);
        assert!(quiz.can_submit());
    }
}

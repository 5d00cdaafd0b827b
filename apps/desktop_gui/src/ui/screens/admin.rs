//! Course authoring screen. Drafts and queued uploads live only in memory.

use eframe::egui;
use shared::domain::Level;

use crate::controller::uploads::{human_readable_bytes, UploadKind, UploadQueue};
use crate::ui::theme::{CARD_RADIUS, PALETTE};
use crate::ui::widgets::{card, card_title, muted};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub level: Level,
    pub duration: String,
}

impl Default for CourseDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            level: Level::Basic,
            duration: String::new(),
        }
    }
}

impl CourseDraft {
    /// Fields that still need a value.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("título");
        }
        if self.duration.trim().is_empty() {
            missing.push("duración");
        }
        missing
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminState {
    pub draft: CourseDraft,
    pub saved_drafts: Vec<CourseDraft>,
    pub uploads: UploadQueue,
    /// Last outcome shown under the forms.
    pub feedback: Option<String>,
}

impl AdminState {
    pub fn save_draft(&mut self) -> Result<(), String> {
        let missing = self.draft.missing_fields();
        if !missing.is_empty() {
            return Err(format!("Completa: {}", missing.join(", ")));
        }
        let draft = std::mem::take(&mut self.draft);
        tracing::info!(title = %draft.title, level = ?draft.level, "course draft saved");
        self.saved_drafts.push(draft);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    PickFiles,
    Publish,
}

fn upload_counter(ui: &mut egui::Ui, uploads: &UploadQueue, kind: UploadKind) {
    egui::Frame::NONE
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(10)
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(format!(
                    "{} ({}/{})",
                    kind.label(),
                    uploads.count(kind),
                    kind.limit()
                ))
                .strong(),
            );
            ui.label(muted(kind.accepted_formats()).size(12.0));
        });
}

pub fn show(ui: &mut egui::Ui, state: &mut AdminState) -> Option<AdminAction> {
    let mut action = None;

    ui.columns(2, |cols| {
        card(&mut cols[0], |ui| {
            card_title(ui, "Nuevo curso");
            ui.add(
                egui::TextEdit::singleline(&mut state.draft.title)
                    .id_salt("admin_title")
                    .hint_text("Título del curso")
                    .desired_width(f32::INFINITY),
            );
            ui.add(
                egui::TextEdit::multiline(&mut state.draft.description)
                    .id_salt("admin_description")
                    .hint_text("Descripción")
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("admin_level")
                    .selected_text(format!("Nivel: {}", state.draft.level.label()))
                    .show_ui(ui, |ui| {
                        for level in Level::ALL {
                            ui.selectable_value(&mut state.draft.level, level, level.label());
                        }
                    });
                ui.add(
                    egui::TextEdit::singleline(&mut state.draft.duration)
                        .id_salt("admin_duration")
                        .hint_text("Duración (ej. 4h 30m)")
                        .desired_width(f32::INFINITY),
                );
            });
            ui.add_space(6.0);
            if ui.button("Guardar borrador").clicked() {
                state.feedback = Some(match state.save_draft() {
                    Ok(()) => format!("Borrador guardado ({} en esta sesión).", state.saved_drafts.len()),
                    Err(message) => message,
                });
            }
            for draft in &state.saved_drafts {
                ui.label(muted(format!("• {} · {} · {}", draft.title, draft.level, draft.duration)).size(12.0));
            }
        });

        card(&mut cols[1], |ui| {
            card_title(ui, "Carga de contenido");
            let drop_zone = egui::Frame::NONE
                .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
                .corner_radius(CARD_RADIUS)
                .inner_margin(egui::Margin::same(22))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(muted("Arrastra y suelta tus videos, PDFs y plantillas aquí"));
                    if ui.button("Elegir archivos…").clicked() {
                        action = Some(AdminAction::PickFiles);
                    }
                });
            if drop_zone.response.hovered() && ui.input(|i| !i.raw.hovered_files.is_empty()) {
                ui.painter().rect_stroke(
                    drop_zone.response.rect,
                    CARD_RADIUS,
                    egui::Stroke::new(2.0, PALETTE.accent),
                    egui::StrokeKind::Inside,
                );
            }
            ui.add_space(8.0);
            ui.columns(2, |counters| {
                upload_counter(&mut counters[0], &state.uploads, UploadKind::Video);
                upload_counter(&mut counters[1], &state.uploads, UploadKind::Resource);
            });

            let mut removed = None;
            for (index, item) in state.uploads.items().iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(format!(
                        "{} · {}",
                        item.filename,
                        human_readable_bytes(item.size_bytes)
                    ));
                    if ui.small_button("Quitar").clicked() {
                        removed = Some(index);
                    }
                });
            }
            if let Some(index) = removed {
                state.uploads.remove(index);
            }

            ui.add_space(6.0);
            if ui
                .add_enabled(!state.uploads.is_empty(), egui::Button::new("Publicar"))
                .clicked()
            {
                action = Some(AdminAction::Publish);
            }
        });
    });

    if let Some(feedback) = &state.feedback {
        ui.add_space(8.0);
        ui.label(muted(feedback));
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_needs_title_and_duration() {
        let mut admin = AdminState::default();
        assert_eq!(
            admin.save_draft(),
            Err("Completa: título, duración".to_string())
        );

        admin.draft.title = "Auditoría interna".to_string();
        admin.draft.duration = "2h".to_string();
        admin.draft.level = Level::Advanced;
        assert_eq!(admin.save_draft(), Ok(()));
        assert_eq!(admin.saved_drafts.len(), 1);
        assert_eq!(admin.saved_drafts[0].level, Level::Advanced);
        assert_eq!(admin.draft, CourseDraft::default());
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        let draft = CourseDraft {
            title: "   ".to_string(),
            duration: "1h".to_string(),
            ..CourseDraft::default()
        };
        assert_eq!(draft.missing_fields(), vec!["título"]);
    }
}

use eframe::egui;
use shared::domain::CertificatePreview;

use crate::ui::theme::{lighten_color, PALETTE};
use crate::ui::widgets::{card, card_title, muted, progress_bar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateAction {
    CopyVerification,
}

fn detail(ui: &mut egui::Ui, label: &str, value: &str, monospace: bool) {
    ui.vertical(|ui| {
        ui.label(muted(label).size(12.0));
        let text = egui::RichText::new(value);
        ui.label(if monospace { text.monospace() } else { text });
    });
}

fn preview(ui: &mut egui::Ui, certificate: &CertificatePreview) {
    egui::Frame::NONE
        .fill(lighten_color(PALETTE.app_background, 0.5))
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(16)
        .inner_margin(egui::Margin::same(22))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(muted(certificate.issuer.to_uppercase()).size(12.0));
                ui.label(
                    egui::RichText::new("Certificado de Finalización")
                        .strong()
                        .size(22.0),
                );
                ui.add_space(14.0);
                ui.label(muted("Se otorga a"));
                ui.label(egui::RichText::new(&certificate.holder).strong().size(22.0));
                ui.add_space(8.0);
                ui.label(muted("por completar satisfactoriamente"));
                ui.label(
                    egui::RichText::new(format!("“{}”", certificate.course_title)).size(17.0),
                );
            });
            ui.add_space(16.0);
            ui.columns(3, |cols| {
                detail(
                    &mut cols[0],
                    "ID del certificado",
                    &certificate.certificate_id,
                    true,
                );
                detail(&mut cols[1], "Fecha", &certificate.issued_on, false);
                detail(&mut cols[2], "Verificación", &certificate.verification, false);
            });
            ui.add_space(16.0);
            ui.vertical_centered(|ui| {
                ui.label("______________________");
                ui.label(muted(&certificate.signatory).size(12.0));
            });
        });
}

pub fn show(ui: &mut egui::Ui, certificate: &CertificatePreview) -> Option<CertificateAction> {
    let mut action = None;
    ui.columns(2, |cols| {
        card(&mut cols[0], |ui| {
            card_title(ui, "Vista previa del certificado");
            preview(ui, certificate);
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.add_enabled(false, egui::Button::new("Descargar PDF"))
                    .on_disabled_hover_text("Disponible al completar el curso");
                if ui.button("Copiar enlace de verificación").clicked() {
                    action = Some(CertificateAction::CopyVerification);
                }
            });
        });

        card(&mut cols[1], |ui| {
            card_title(ui, "Criterios de certificación");
            for criterion in &certificate.criteria {
                ui.label(muted(format!("• {criterion}")));
            }
            ui.add_space(14.0);
            card(ui, |ui| {
                ui.label(egui::RichText::new("Estado actual").strong());
                ui.add_space(6.0);
                progress_bar(ui, certificate.completion_percent);
                ui.label(
                    muted(format!("{}% completado", certificate.completion_percent)).size(12.0),
                );
            });
        });
    });
    action
}

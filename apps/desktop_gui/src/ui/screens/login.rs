//! Sign-in form shown while no session is present.

use eframe::egui;

use crate::ui::theme::{CARD_RADIUS, PALETTE};
use crate::ui::widgets::muted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAction {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Field to focus on the next frame.
    pub focus: Option<LoginField>,
    /// A request is in flight; cleared by the next notice or transition.
    pub busy: bool,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: Some(LoginField::Email),
            busy: false,
        }
    }
}

impl LoginForm {
    pub fn with_email(email: impl Into<String>) -> Self {
        let email = email.into();
        let focus = if email.is_empty() {
            LoginField::Email
        } else {
            LoginField::Password
        };
        Self {
            email,
            focus: Some(focus),
            ..Self::default()
        }
    }

    /// Credentials to send, or the field that needs attention.
    pub fn credentials(&self) -> Result<(String, String), LoginField> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(LoginField::Email);
        }
        if self.password.is_empty() {
            return Err(LoginField::Password);
        }
        Ok((email.to_string(), self.password.clone()))
    }

    fn take_focus_request(&mut self) -> Option<LoginField> {
        self.focus.take()
    }
}

fn login_text_field(
    ui: &mut egui::Ui,
    id: &'static str,
    hint: &str,
    value: &mut String,
    password: bool,
    should_focus: bool,
) -> egui::Response {
    let edit = egui::TextEdit::singleline(value)
        .id_salt(id)
        .hint_text(hint)
        .password(password)
        .desired_width(f32::INFINITY);
    let response = ui.add_sized([ui.available_width(), 34.0], edit);
    if should_focus {
        response.request_focus();
    }
    response
}

/// Draws the form inside `ui` and reports which button (or Enter) was used.
pub fn show(ui: &mut egui::Ui, form: &mut LoginForm) -> Option<LoginAction> {
    let mut action = None;
    let focus = form.take_focus_request();

    egui::Frame::NONE
        .fill(PALETTE.card_background)
        .stroke(egui::Stroke::new(1.0, PALETTE.card_stroke))
        .corner_radius(CARD_RADIUS)
        .inner_margin(egui::Margin::symmetric(24, 22))
        .show(ui, |ui| {
            ui.style_mut().spacing.item_spacing = egui::vec2(8.0, 8.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("RED Consult")
                        .strong()
                        .size(22.0)
                        .color(PALETTE.accent),
                );
                ui.label(egui::RichText::new("Iniciar sesión").strong().size(18.0));
            });
            ui.add_space(8.0);

            let email = login_text_field(
                ui,
                "login_email",
                "Email",
                &mut form.email,
                false,
                focus == Some(LoginField::Email),
            );
            let password = login_text_field(
                ui,
                "login_password",
                "Contraseña",
                &mut form.password,
                true,
                focus == Some(LoginField::Password),
            );

            let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
            if enter && (email.lost_focus() || password.lost_focus()) && !form.busy {
                action = Some(LoginAction::SignIn);
            }

            ui.add_space(6.0);
            let full_width = egui::vec2(ui.available_width(), 36.0);
            let sign_in = egui::Button::new(
                egui::RichText::new("Entrar")
                    .strong()
                    .color(PALETTE.accent_text),
            )
            .fill(PALETTE.accent)
            .min_size(full_width);
            if ui.add_enabled(!form.busy, sign_in).clicked() {
                action = Some(LoginAction::SignIn);
            }
            let sign_up = egui::Button::new("Crear cuenta").min_size(full_width);
            if ui.add_enabled(!form.busy, sign_up).clicked() {
                action = Some(LoginAction::SignUp);
            }

            if form.busy {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(muted("Conectando…"));
                });
            }
        });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_email_and_password() {
        let mut form = LoginForm::default();
        assert_eq!(form.credentials(), Err(LoginField::Email));

        form.email = "  ana@example.com ".to_string();
        assert_eq!(form.credentials(), Err(LoginField::Password));

        form.password = " secreto ".to_string();
        assert_eq!(
            form.credentials(),
            Ok(("ana@example.com".to_string(), " secreto ".to_string()))
        );
    }

    #[test]
    fn remembered_email_moves_focus_to_password() {
        let mut form = LoginForm::with_email("ana@example.com");
        assert_eq!(form.take_focus_request(), Some(LoginField::Password));
        assert_eq!(form.take_focus_request(), None);
    }
}

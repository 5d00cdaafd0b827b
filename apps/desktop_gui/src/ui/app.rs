use std::{path::PathBuf, sync::Arc, time::Duration};

use arboard::Clipboard;
use chrono::Datelike;
use client_core::{AuthNotice, GateEvent, GatePhase, GateSignal, SessionState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::{
    catalog::{CatalogFacets, CatalogView},
    domain::{
        CertificatePreview, CertificationTrack, Course, CourseId, CourseModule, QuizQuestion,
        StudyDay,
    },
    sample,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{describe_failure, UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
    uploads::PICKER_EXTENSIONS,
};
use crate::ui::screens::{
    admin::{self, AdminAction, AdminState},
    catalog,
    certificate::{self, CertificateAction},
    course::{self, QuizState},
    dashboard,
    login::{self, LoginAction, LoginField, LoginForm},
};
use crate::ui::theme::{academy_visuals, scaled_text_styles, PALETTE};
use crate::ui::widgets::{badge, muted};

pub const SETTINGS_STORAGE_KEY: &str = "academy.shell";

const MIN_TEXT_SCALE: f32 = 0.85;
const MAX_TEXT_SCALE: f32 = 1.4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellTab {
    #[default]
    Dashboard,
    Catalog,
    Course,
    Certificate,
    Admin,
}

impl ShellTab {
    pub const ALL: [ShellTab; 5] = [
        ShellTab::Dashboard,
        ShellTab::Catalog,
        ShellTab::Course,
        ShellTab::Certificate,
        ShellTab::Admin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShellTab::Dashboard => "Inicio",
            ShellTab::Catalog => "Catálogo",
            ShellTab::Course => "Curso",
            ShellTab::Certificate => "Certificación",
            ShellTab::Admin => "Admin",
        }
    }
}

/// Shell preferences kept in eframe storage between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedShellSettings {
    pub tab: ShellTab,
    pub remembered_email: String,
    pub text_scale: f32,
}

impl Default for PersistedShellSettings {
    fn default() -> Self {
        Self {
            tab: ShellTab::Dashboard,
            remembered_email: String::new(),
            text_scale: 1.0,
        }
    }
}

impl PersistedShellSettings {
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Option<Self> {
        storage?
            .get_string(SETTINGS_STORAGE_KEY)
            .and_then(|text| serde_json::from_str(&text).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusBanner {
    summary: String,
    detail: String,
}

pub fn footer_text(year: i32) -> String {
    format!("© {year} Red Consult · Plataforma demo UI")
}

fn find_course<'a>(courses: &'a [Course], id: Option<&CourseId>) -> Option<&'a Course> {
    let id = id?;
    courses.iter().find(|course| &course.id == id)
}

pub struct AcademyApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: SessionState,
    courses: Arc<Vec<Course>>,
    weekly: Vec<StudyDay>,
    modules: Vec<CourseModule>,
    resources: Vec<&'static str>,
    quiz_question: QuizQuestion,
    certificate: CertificatePreview,
    tracks: Vec<CertificationTrack>,
    topics: Vec<&'static str>,
    catalog_view: CatalogView,
    facets: CatalogFacets,
    query: String,
    tab: ShellTab,
    opened_course: Option<CourseId>,
    login: LoginForm,
    quiz: QuizState,
    admin: AdminState,
    status: String,
    status_banner: Option<StatusBanner>,
    notice: Option<AuthNotice>,
    help_open: bool,
    text_scale: f32,
    applied_text_scale: Option<f32>,
    remembered_email: String,
}

impl AcademyApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted: Option<PersistedShellSettings>,
    ) -> Self {
        let persisted = persisted.unwrap_or_default();
        Self {
            cmd_tx,
            ui_rx,
            session: SessionState::new(),
            courses: Arc::new(sample::sample_courses()),
            weekly: sample::weekly_study(),
            modules: sample::course_modules(),
            resources: sample::course_resources(),
            quiz_question: sample::quick_quiz(),
            certificate: sample::certificate_preview(),
            tracks: sample::certification_tracks(),
            topics: sample::catalog_topics(),
            catalog_view: CatalogView::new(),
            facets: CatalogFacets::default(),
            query: String::new(),
            tab: persisted.tab,
            opened_course: None,
            login: LoginForm::with_email(persisted.remembered_email.clone()),
            quiz: QuizState::default(),
            admin: AdminState::default(),
            status: "Comprobando sesión…".to_string(),
            status_banner: None,
            notice: None,
            help_open: false,
            text_scale: persisted.text_scale.clamp(MIN_TEXT_SCALE, MAX_TEXT_SCALE),
            applied_text_scale: None,
            remembered_email: persisted.remembered_email,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => self.show_error(err),
                UiEvent::Gate(GateSignal::Transition(event)) => self.apply_gate_event(event),
                UiEvent::Gate(GateSignal::Notice(notice)) => {
                    self.login.busy = false;
                    if notice.is_error() {
                        tracing::warn!(message = notice.message(), "auth request rejected");
                    }
                    self.status = notice.message().to_string();
                    self.notice = Some(notice);
                }
            }
        }
    }

    fn apply_gate_event(&mut self, event: GateEvent) {
        if let GateEvent::LookupFailed(message) = &event {
            self.show_error(UiError::from_message(
                UiErrorContext::SessionLookup,
                message.clone(),
            ));
        }

        let before = self.session.phase();
        self.session.apply_in_place(event);
        let after = self.session.phase();
        if before == after {
            return;
        }
        tracing::info!(?before, ?after, "session gate phase changed");

        match after {
            GatePhase::Authenticated => {
                self.login.busy = false;
                self.login.password.clear();
                let email = self
                    .session
                    .session()
                    .and_then(|session| session.email())
                    .unwrap_or_default()
                    .to_string();
                if !email.is_empty() {
                    self.remembered_email = email.clone();
                }
                self.status = if email.is_empty() {
                    "Sesión iniciada".to_string()
                } else {
                    format!("Sesión iniciada como {email}")
                };
            }
            GatePhase::Unauthenticated => {
                self.login.busy = false;
                self.login.password.clear();
                self.login.focus = Some(if self.login.email.is_empty() {
                    LoginField::Email
                } else {
                    LoginField::Password
                });
                self.status = if before == GatePhase::Authenticated {
                    "Sesión cerrada".to_string()
                } else {
                    "Inicia sesión para continuar".to_string()
                };
            }
            GatePhase::Loading => {}
        }
    }

    fn show_error(&mut self, err: UiError) {
        tracing::warn!(
            category = ?err.category(),
            context = ?err.context(),
            "{}",
            err.message()
        );
        if err.requires_reauth() {
            self.login.focus = Some(LoginField::Email);
        }
        self.status = err.message().to_string();
        self.status_banner = Some(StatusBanner {
            summary: describe_failure(&err),
            detail: err.message().to_string(),
        });
    }

    fn submit_login(&mut self, action: LoginAction) {
        let (email, password) = match self.login.credentials() {
            Ok(credentials) => credentials,
            Err(field) => {
                self.login.focus = Some(field);
                self.status = match field {
                    LoginField::Email => "Ingresa tu correo".to_string(),
                    LoginField::Password => "Ingresa tu contraseña".to_string(),
                };
                return;
            }
        };

        self.remembered_email = email.clone();
        let cmd = match action {
            LoginAction::SignIn => BackendCommand::SignIn { email, password },
            LoginAction::SignUp => BackendCommand::SignUp { email, password },
        };
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.login.busy = true;
            self.status_banner = None;
        }
    }

    fn sign_out(&mut self) {
        if dispatch_backend_command(&self.cmd_tx, BackendCommand::SignOut, &mut self.status) {
            self.status = "Cerrando sesión…".to_string();
        }
    }

    fn open_course(&mut self, id: CourseId) {
        tracing::debug!(course = %id, "course opened");
        self.opened_course = Some(id);
        self.quiz = QuizState::default();
        self.tab = ShellTab::Course;
    }

    fn copy_certificate_id(&mut self) {
        let id = self.certificate.certificate_id.clone();
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(id.clone())) {
            Ok(()) => self.status = format!("ID {id} copiado al portapapeles"),
            Err(err) => {
                tracing::warn!("clipboard unavailable: {err}");
                self.status = format!("No se pudo copiar el ID {id}");
            }
        }
    }

    fn pick_uploads(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Seleccionar contenido")
            .add_filter("Videos y recursos", &PICKER_EXTENSIONS);
        if let Some(dir) = dirs::document_dir() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(paths) = dialog.pick_files() {
            self.queue_uploads(paths);
        }
    }

    fn queue_uploads(&mut self, paths: Vec<PathBuf>) {
        let mut added = 0usize;
        let mut rejected = Vec::new();
        for path in paths {
            match self.admin.uploads.add_from_disk(&path) {
                Ok(kind) => {
                    tracing::debug!(path = %path.display(), ?kind, "upload queued");
                    added += 1;
                }
                Err(rejection) => {
                    tracing::info!(path = %path.display(), "upload rejected: {rejection}");
                    rejected.push(rejection.to_string());
                }
            }
        }
        let mut feedback = format!("{added} archivo(s) agregados.");
        if !rejected.is_empty() {
            feedback.push(' ');
            feedback.push_str(&rejected.join(" "));
        }
        self.admin.feedback = Some(feedback);
    }

    fn publish_uploads(&mut self) {
        let items = self.admin.uploads.take_all();
        let total: u64 = items.iter().map(|item| item.size_bytes).sum();
        tracing::info!(files = items.len(), total_bytes = total, "content marked for publishing");
        self.admin.feedback = Some(format!(
            "{} archivo(s) listos. La publicación no está disponible en la demo.",
            items.len()
        ));
    }

    fn apply_theme_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_text_scale == Some(self.text_scale) {
            return;
        }
        let mut style = (*ctx.style()).clone();
        style.visuals = academy_visuals();
        style.text_styles = scaled_text_styles(self.text_scale);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);
        ctx.set_style(style);
        self.applied_text_scale = Some(self.text_scale);
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        egui::Frame::NONE
            .fill(PALETTE.error_background)
            .stroke(egui::Stroke::new(1.0, PALETTE.error_stroke))
            .corner_radius(8)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(&banner.summary).strong());
                        if !banner.summary.contains(&banner.detail) {
                            ui.label(muted(&banner.detail).size(12.0));
                        }
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Cerrar").clicked() {
                            self.status_banner = None;
                        }
                    });
                });
            });
        ui.add_space(8.0);
    }

    fn show_loading_screen(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(muted("Cargando…"));
                });
            });
        });
    }

    fn show_login_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.vertical_centered(|ui| {
                ui.add_space((ui.available_height() * 0.15).max(24.0));
                ui.label(egui::RichText::new("RED Consult Academy").strong().size(26.0));
                ui.label(muted("Formación en cumplimiento, riesgo y fraude"));
                ui.add_space(16.0);
                ui.scope(|ui| {
                    ui.set_max_width(380.0);
                    if let Some(action) = login::show(ui, &mut self.login) {
                        self.submit_login(action);
                    }
                });
            });
        });
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .exact_height(52.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(egui::RichText::new("RED Consult").strong().size(18.0));
                    ui.add_space(16.0);
                    let search = ui.add(
                        egui::TextEdit::singleline(&mut self.query)
                            .id_salt("shell_search")
                            .hint_text("Buscar cursos, temas…")
                            .desired_width(300.0),
                    );
                    if search.changed() && !self.query.is_empty() && self.tab != ShellTab::Catalog {
                        self.tab = ShellTab::Catalog;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let account = self
                            .session
                            .session()
                            .and_then(|session| session.email())
                            .unwrap_or("Cuenta")
                            .to_string();
                        ui.menu_button(account, |ui| {
                            ui.label(muted("Tamaño de texto"));
                            ui.add(egui::Slider::new(
                                &mut self.text_scale,
                                MIN_TEXT_SCALE..=MAX_TEXT_SCALE,
                            ));
                            ui.separator();
                            if ui.button("Cerrar sesión").clicked() {
                                self.sign_out();
                                ui.close();
                            }
                        });
                        if ui.button("Ayuda").clicked() {
                            self.help_open = !self.help_open;
                        }
                    });
                });
            });
    }

    fn show_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(muted(footer_text(chrono::Local::now().year())).size(12.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(muted(&self.status).size(12.0));
                });
            });
        });
    }

    fn show_navigation(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("navigation")
            .exact_width(220.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(12.0);
                for tab in ShellTab::ALL {
                    let button = egui::Button::selectable(self.tab == tab, tab.label())
                        .min_size(egui::vec2(ui.available_width(), 32.0));
                    if ui.add(button).clicked() {
                        self.tab = tab;
                    }
                }
                ui.add_space(12.0);
                ui.separator();
                ui.label(egui::RichText::new("Certificaciones").strong());
                ui.horizontal_wrapped(|ui| {
                    for track in &self.tracks {
                        badge(ui, &track.name);
                    }
                });
            });
    }

    fn show_active_tab(&mut self, ui: &mut egui::Ui) {
        match self.tab {
            ShellTab::Dashboard => {
                if let Some(id) =
                    dashboard::show(ui, &self.courses, &self.weekly, sample::BADGES_EARNED)
                {
                    self.open_course(id);
                }
            }
            ShellTab::Catalog => {
                let visible = self
                    .catalog_view
                    .filtered(&self.courses, &self.query, &self.facets);
                let opened = catalog::show(ui, &visible, &self.query, &mut self.facets, &self.topics);
                if let Some(id) = opened {
                    self.open_course(id);
                }
            }
            ShellTab::Course => {
                let opened = find_course(&self.courses, self.opened_course.as_ref());
                course::show(
                    ui,
                    opened,
                    &self.modules,
                    &self.resources,
                    &self.quiz_question,
                    &mut self.quiz,
                );
            }
            ShellTab::Certificate => {
                if let Some(CertificateAction::CopyVerification) =
                    certificate::show(ui, &self.certificate)
                {
                    self.copy_certificate_id();
                }
            }
            ShellTab::Admin => match admin::show(ui, &mut self.admin) {
                Some(AdminAction::PickFiles) => self.pick_uploads(),
                Some(AdminAction::Publish) => self.publish_uploads(),
                None => {}
            },
        }
    }

    fn show_shell(&mut self, ctx: &egui::Context) {
        self.show_top_bar(ctx);
        self.show_footer(ctx);
        self.show_navigation(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| self.show_active_tab(ui));
        });

        if self.tab == ShellTab::Admin {
            let dropped: Vec<PathBuf> = ctx.input(|input| {
                input
                    .raw
                    .dropped_files
                    .iter()
                    .filter_map(|file| file.path.clone())
                    .collect()
            });
            if !dropped.is_empty() {
                self.queue_uploads(dropped);
            }
        }

        let mut help_open = self.help_open;
        egui::Window::new("Ayuda")
            .open(&mut help_open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Usa la barra de búsqueda para filtrar el catálogo por título o tema.");
                ui.label("Abre un curso desde Inicio o Catálogo para verlo en la pestaña Curso.");
                ui.label(muted("Soporte: soporte@redconsult.hn"));
            });
        self.help_open = help_open;
    }

    fn show_notice_modal(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };
        let title = if notice.is_error() {
            "No se pudo completar la solicitud"
        } else {
            "Cuenta creada"
        };
        let message = notice.message().to_string();

        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("auth_notice")).show(ctx, |ui| {
            ui.set_width(340.0);
            ui.label(egui::RichText::new(title).strong().size(16.0));
            ui.add_space(6.0);
            ui.label(message);
            ui.add_space(10.0);
            if ui.button("Aceptar").clicked() {
                dismissed = true;
            }
        });
        if dismissed || modal.should_close() {
            self.notice = None;
        }
    }

    fn persisted_settings(&self) -> PersistedShellSettings {
        PersistedShellSettings {
            tab: self.tab,
            remembered_email: self.remembered_email.clone(),
            text_scale: self.text_scale,
        }
    }
}

impl eframe::App for AcademyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_theme_if_needed(ctx);

        match self.session.phase() {
            GatePhase::Loading => self.show_loading_screen(ctx),
            GatePhase::Unauthenticated => self.show_login_screen(ctx),
            GatePhase::Authenticated => self.show_shell(ctx),
        }
        self.show_notice_modal(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.persisted_settings()) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;

//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, thread, time::Duration};

use client_core::{load_settings, GoTrueClient, IdentitySettings, SessionGate};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Startup options the backend worker needs before the first command.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub config_path: Option<PathBuf>,
    pub session_file: Option<PathBuf>,
    pub ephemeral_session: bool,
}

impl BridgeConfig {
    pub fn settings(&self) -> IdentitySettings {
        let mut settings = load_settings(self.config_path.as_deref());
        if let Some(path) = &self.session_file {
            settings.session_file = Some(path.clone());
        }
        if self.ephemeral_session {
            settings.session_file = None;
        }
        settings
    }
}

fn report(ui_tx: &Sender<UiEvent>, context: UiErrorContext, message: impl Into<String>) {
    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(context, message)));
}

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, config: BridgeConfig) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                report(
                    &ui_tx,
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let settings = config.settings();
            settings.log_summary();
            for problem in settings.problems() {
                report(&ui_tx, UiErrorContext::Configuration, problem);
            }

            let client = GoTrueClient::from_settings(&settings);
            let refresher = settings.auto_refresh.then(|| {
                client.spawn_auto_refresh(Duration::from_secs(settings.refresh_check_secs))
            });

            let gate_tx = ui_tx.clone();
            let mut gate = SessionGate::start(client, move |signal| {
                gate_tx.send(UiEvent::Gate(signal)).is_ok()
            });
            let _ = ui_tx.try_send(UiEvent::Info("Servicio de identidad listo".to_string()));
            tracing::info!("backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::SignIn { email, password } => gate.sign_in(&email, &password),
                    BackendCommand::SignUp { email, password } => gate.sign_up(&email, &password),
                    BackendCommand::SignOut => gate.sign_out(),
                }
            }

            tracing::info!("ui command queue closed, stopping backend worker");
            gate.shutdown();
            if let Some(refresher) = refresher {
                refresher.abort();
            }
        });
    });
}

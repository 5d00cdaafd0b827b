//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend worker. Returns false when it was not queued;
/// `status` then explains why.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "La cola de solicitudes está llena; inténtalo de nuevo".to_string();
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "El procesador de solicitudes se desconectó; reinicia la aplicación".to_string();
            tracing::error!(command = cmd_name, "ui->backend command queue disconnected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;
    use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext};

    #[test]
    fn queues_commands_in_order() {
        let (tx, rx) = bounded(4);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, BackendCommand::SignOut, &mut status));
        assert!(dispatch_backend_command(
            &tx,
            BackendCommand::SignIn {
                email: "ana@example.com".to_string(),
                password: "secret".to_string(),
            },
            &mut status
        ));
        assert_eq!(rx.try_recv().map(|cmd| cmd.name()).ok(), Some("sign_out"));
        assert_eq!(rx.try_recv().map(|cmd| cmd.name()).ok(), Some("sign_in"));
        assert!(status.is_empty());
    }

    #[test]
    fn reports_a_full_queue() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, BackendCommand::SignOut, &mut status));
        assert!(!dispatch_backend_command(&tx, BackendCommand::SignOut, &mut status));
        assert!(status.contains("llena"));
    }

    #[test]
    fn reports_a_stopped_backend() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut status = String::new();
        assert!(!dispatch_backend_command(&tx, BackendCommand::SignOut, &mut status));
        assert!(status.contains("desconectó"));
        assert_eq!(
            UiError::from_message(UiErrorContext::General, status.as_str()).category(),
            UiErrorCategory::Transport
        );
    }
}

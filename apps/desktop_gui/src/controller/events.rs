//! UI/backend events and error modeling for desktop GUI controller.

use client_core::GateSignal;

pub enum UiEvent {
    Info(String),
    /// Output of the session gate, applied by the UI in arrival order.
    Gate(GateSignal),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Configuration,
    SessionLookup,
    General,
}

/// Short explanation shown above the raw message in the status banner.
pub fn describe_failure(error: &UiError) -> String {
    match (error.context, error.category) {
        (UiErrorContext::BackendStartup, _) => {
            "No se pudo iniciar el servicio interno; reinicia la aplicación.".to_string()
        }
        (UiErrorContext::Configuration, _) => {
            "Falta configurar el servicio de identidad (URL o clave).".to_string()
        }
        (_, UiErrorCategory::Transport) => {
            "Servicio de identidad inaccesible; revisa la conexión e inténtalo de nuevo.".to_string()
        }
        (UiErrorContext::SessionLookup, _) => {
            "No se pudo recuperar tu sesión; inicia sesión de nuevo.".to_string()
        }
        _ => format!("Error: {}", error.message),
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("invalid login credentials")
            || message_lower.contains("refresh token")
            || message_lower.contains("jwt")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("failed to reach")
            || message_lower.contains("connection")
            || message_lower.contains("timed out")
            || message_lower.contains("dns")
            || message_lower.contains("disconnected")
            || message_lower.contains("desconect")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("not configured")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth || self.context == UiErrorContext::SessionLookup
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

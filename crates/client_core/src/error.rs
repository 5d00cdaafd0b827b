use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity service rejected a sign-in, sign-up, sign-out or refresh.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },
    #[error("session lookup failed: {0}")]
    SessionLookupFailed(String),
    #[error("identity service is not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("failed to reach identity service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid identity service response: {0}")]
    InvalidResponse(String),
    #[error("session store failure: {0}")]
    Store(String),
}

impl AuthError {
    /// True when the service answered and said no, as opposed to the request
    /// never completing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AuthError::RequestFailed { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::RequestFailed { status, .. } => Some(*status),
            AuthError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(value: ApiError) -> Self {
        AuthError::RequestFailed {
            status: value.status,
            message: value.message,
        }
    }
}

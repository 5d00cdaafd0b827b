use async_trait::async_trait;
use shared::protocol::{Session, SessionChange};
use tokio::sync::broadcast;

pub mod config;
pub mod error;
mod gotrue;
pub mod session_gate;
pub mod store;

pub use config::{load_settings, IdentitySettings};
pub use error::AuthError;
pub use gotrue::GoTrueClient;
pub use session_gate::{
    AuthNotice, GateEvent, GatePhase, GateSignal, SessionGate, SessionState, SessionSubscription,
};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

/// What a successful sign-up produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account was auto-confirmed and a session is now active.
    SignedIn,
    /// The account must be confirmed out of band (email) before signing in.
    ConfirmationRequired { email: Option<String> },
}

/// The identity service as seen by the session gate.
///
/// Successful calls change the session through `subscribe` notifications; the
/// return values only report errors (and, for sign-up, whether a confirmation
/// is pending).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

//! Session gate: decides whether the protected application or the sign-in
//! form is shown.
//!
//! The decision itself is the pure [`SessionState::apply`] transition. The
//! [`SessionGate`] driver feeds it: one initial session lookup, a standing
//! subscription to session changes, and sign-in/sign-up/sign-out requests.
//! Everything the driver produces is handed to a sink as a [`GateSignal`];
//! the owner of the `SessionState` applies the transitions in arrival order.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::protocol::{Session, SessionChange};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{error::AuthError, IdentityProvider, SignUpOutcome};

pub const CONFIRMATION_PROMPT: &str = "Revisa tu correo para confirmar la cuenta.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Loading,
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// The initial lookup finished.
    LookupResolved(Option<Session>),
    /// The initial lookup could not be completed.
    LookupFailed(String),
    SessionChanged(SessionChange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    phase: GatePhase,
    session: Option<Session>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: GatePhase::Loading,
            session: None,
        }
    }
}

fn phase_for(session: &Option<Session>) -> GatePhase {
    if session.is_some() {
        GatePhase::Authenticated
    } else {
        GatePhase::Unauthenticated
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn should_show_protected_content(&self) -> bool {
        self.phase == GatePhase::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.phase == GatePhase::Loading
    }

    pub fn apply(self, event: GateEvent) -> Self {
        match (self.phase, event) {
            (GatePhase::Loading, GateEvent::LookupResolved(session)) => Self {
                phase: phase_for(&session),
                session,
            },
            (GatePhase::Loading, GateEvent::LookupFailed(_)) => Self {
                phase: GatePhase::Unauthenticated,
                session: None,
            },
            // Changes seen before the lookup resolves are recorded but the
            // lookup result decides when loading ends.
            (GatePhase::Loading, GateEvent::SessionChanged(change)) => Self {
                phase: GatePhase::Loading,
                session: change.session,
            },
            (_, GateEvent::SessionChanged(change)) => Self {
                phase: phase_for(&change.session),
                session: change.session,
            },
            // The lookup resolves once; anything later is stale.
            (_, GateEvent::LookupResolved(_) | GateEvent::LookupFailed(_)) => self,
        }
    }

    pub fn apply_in_place(&mut self, event: GateEvent) {
        *self = std::mem::take(self).apply(event);
    }
}

/// User-facing outcome of a sign-in, sign-up or sign-out request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthNotice {
    SignInFailed(String),
    SignUpFailed(String),
    SignOutFailed(String),
    ConfirmationSent,
}

impl AuthNotice {
    pub fn message(&self) -> &str {
        match self {
            AuthNotice::SignInFailed(message)
            | AuthNotice::SignUpFailed(message)
            | AuthNotice::SignOutFailed(message) => message,
            AuthNotice::ConfirmationSent => CONFIRMATION_PROMPT,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, AuthNotice::ConfirmationSent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateSignal {
    Transition(GateEvent),
    Notice(AuthNotice),
}

/// Receives gate output. Returning `false` means the receiver is gone.
pub trait GateSink: Send + Sync + 'static {
    fn deliver(&self, signal: GateSignal) -> bool;
}

impl<F> GateSink for F
where
    F: Fn(GateSignal) -> bool + Send + Sync + 'static,
{
    fn deliver(&self, signal: GateSignal) -> bool {
        self(signal)
    }
}

#[derive(Clone)]
struct Outlet {
    sink: Arc<dyn GateSink>,
    alive: Arc<AtomicBool>,
}

impl Outlet {
    /// Drops the signal when the gate has been torn down.
    fn send(&self, signal: GateSignal) {
        if !self.alive.load(Ordering::Acquire) {
            debug!("gate torn down, dropping {signal:?}");
            return;
        }
        if !self.sink.deliver(signal) {
            self.alive.store(false, Ordering::Release);
        }
    }
}

/// Standing subscription to session changes. Released on `unsubscribe` or
/// drop, whichever comes first.
pub struct SessionSubscription {
    task: Option<JoinHandle<()>>,
}

impl SessionSubscription {
    fn forward(provider: &dyn IdentityProvider, outlet: Outlet) -> Self {
        let mut changes = provider.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        outlet.send(GateSignal::Transition(GateEvent::SessionChanged(change)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session change subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { task: Some(task) }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("session change subscription released");
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Drives a [`SessionState`] owner through a sink.
///
/// Must be started from within a tokio runtime. Dropping the gate aborts the
/// lookup, the subscription and every in-flight request; results that race
/// the teardown are discarded.
pub struct SessionGate {
    provider: Arc<dyn IdentityProvider>,
    outlet: Outlet,
    lookup: Option<JoinHandle<()>>,
    subscription: Option<SessionSubscription>,
    requests: Vec<JoinHandle<()>>,
}

impl SessionGate {
    pub fn start(provider: Arc<dyn IdentityProvider>, sink: impl GateSink) -> Self {
        let outlet = Outlet {
            sink: Arc::new(sink),
            alive: Arc::new(AtomicBool::new(true)),
        };

        // Subscribe before looking up so no change can fall in between.
        let subscription = SessionSubscription::forward(provider.as_ref(), outlet.clone());

        let lookup = {
            let provider = Arc::clone(&provider);
            let outlet = outlet.clone();
            tokio::spawn(async move {
                let event = match provider.get_session().await {
                    Ok(session) => {
                        info!(present = session.is_some(), "initial session lookup resolved");
                        GateEvent::LookupResolved(session)
                    }
                    Err(err) => {
                        warn!("initial session lookup failed, treating as signed out: {err}");
                        GateEvent::LookupFailed(err.to_string())
                    }
                };
                outlet.send(GateSignal::Transition(event));
            })
        };

        Self {
            provider,
            outlet,
            lookup: Some(lookup),
            subscription: Some(subscription),
            requests: Vec::new(),
        }
    }

    fn spawn_request<F>(&mut self, label: &'static str, request: F)
    where
        F: std::future::Future<Output = Option<AuthNotice>> + Send + 'static,
    {
        self.requests.retain(|task| !task.is_finished());
        let outlet = self.outlet.clone();
        self.requests.push(tokio::spawn(async move {
            if let Some(notice) = request.await {
                debug!(request = label, ?notice, "auth request finished");
                outlet.send(GateSignal::Notice(notice));
            }
        }));
    }

    pub fn sign_in(&mut self, email: &str, password: &str) {
        let provider = Arc::clone(&self.provider);
        let (email, password) = (email.to_string(), password.to_string());
        self.spawn_request("sign_in", async move {
            match provider.sign_in_with_password(&email, &password).await {
                Ok(()) => None,
                Err(err) => Some(AuthNotice::SignInFailed(user_message(&err))),
            }
        });
    }

    pub fn sign_up(&mut self, email: &str, password: &str) {
        let provider = Arc::clone(&self.provider);
        let (email, password) = (email.to_string(), password.to_string());
        self.spawn_request("sign_up", async move {
            match provider.sign_up(&email, &password).await {
                Ok(SignUpOutcome::ConfirmationRequired { .. }) => Some(AuthNotice::ConfirmationSent),
                Ok(SignUpOutcome::SignedIn) => None,
                Err(err) => Some(AuthNotice::SignUpFailed(user_message(&err))),
            }
        });
    }

    pub fn sign_out(&mut self) {
        let provider = Arc::clone(&self.provider);
        self.spawn_request("sign_out", async move {
            match provider.sign_out().await {
                Ok(()) => None,
                Err(err) => Some(AuthNotice::SignOutFailed(user_message(&err))),
            }
        });
    }

    /// Requests that have not finished yet.
    pub fn pending_requests(&mut self) -> usize {
        self.requests.retain(|task| !task.is_finished());
        self.requests.len()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(SessionSubscription::is_active)
    }

    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        self.outlet.alive.store(false, Ordering::Release);
        if let Some(lookup) = self.lookup.take() {
            lookup.abort();
        }
        for task in self.requests.drain(..) {
            task.abort();
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

fn user_message(err: &AuthError) -> String {
    match err {
        AuthError::RequestFailed { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/session_gate_tests.rs"]
mod tests;

use super::*;

use std::time::Duration;

use async_trait::async_trait;
use shared::{
    domain::UserId,
    protocol::{AuthChangeEvent, AuthUser},
};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex, Notify};

type LookupResult = Result<Option<Session>, AuthError>;

fn session(id: &str) -> Session {
    Session {
        access_token: format!("access-{id}"),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: None,
        refresh_token: format!("refresh-{id}"),
        user: AuthUser {
            id: UserId::from(id),
            email: Some(format!("{id}@example.com")),
            email_confirmed_at: None,
        },
    }
}

fn changed(event: AuthChangeEvent, session: Option<Session>) -> GateEvent {
    GateEvent::SessionChanged(SessionChange::new(event, session))
}

struct FakeIdentity {
    lookup: Mutex<Option<oneshot::Receiver<LookupResult>>>,
    events: broadcast::Sender<SessionChange>,
    hold_sign_in: bool,
    release_sign_in: Notify,
    sign_in_error: Option<String>,
    sign_up_needs_confirmation: bool,
}

impl FakeIdentity {
    fn new() -> (Self, oneshot::Sender<LookupResult>) {
        let (lookup_tx, lookup_rx) = oneshot::channel();
        let (events, _) = broadcast::channel(16);
        (
            Self {
                lookup: Mutex::new(Some(lookup_rx)),
                events,
                hold_sign_in: false,
                release_sign_in: Notify::new(),
                sign_in_error: None,
                sign_up_needs_confirmation: true,
            },
            lookup_tx,
        )
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        let _ = self.events.send(SessionChange::new(event, session));
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let rx = self.lookup.lock().await.take();
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(AuthError::SessionLookupFailed("lookup dropped".into()))),
            None => Ok(None),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<(), AuthError> {
        if self.hold_sign_in {
            self.release_sign_in.notified().await;
        }
        if let Some(message) = &self.sign_in_error {
            return Err(AuthError::RequestFailed {
                status: 400,
                message: message.clone(),
            });
        }
        self.emit(AuthChangeEvent::SignedIn, Some(session(email)));
        Ok(())
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome, AuthError> {
        if self.sign_up_needs_confirmation {
            return Ok(SignUpOutcome::ConfirmationRequired {
                email: Some(email.to_string()),
            });
        }
        self.emit(AuthChangeEvent::SignedIn, Some(session(email)));
        Ok(SignUpOutcome::SignedIn)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.emit(AuthChangeEvent::SignedOut, None);
        Ok(())
    }
}

fn channel_sink() -> (
    impl GateSink,
    mpsc::UnboundedReceiver<GateSignal>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (move |signal| tx.send(signal).is_ok(), rx)
}

async fn next_signal(rx: &mut mpsc::UnboundedReceiver<GateSignal>) -> GateSignal {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("gate signal in time")
        .expect("gate channel open")
}

async fn apply_next(rx: &mut mpsc::UnboundedReceiver<GateSignal>, state: &mut SessionState) {
    match next_signal(rx).await {
        GateSignal::Transition(event) => state.apply_in_place(event),
        other => panic!("expected a transition, got {other:?}"),
    }
}

async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<GateSignal>) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "no further gate signal expected");
}

#[test]
fn starts_loading_and_hides_everything() {
    let state = SessionState::new();
    assert_eq!(state.phase(), GatePhase::Loading);
    assert!(state.is_loading());
    assert!(!state.should_show_protected_content());
}

#[test]
fn lookup_result_decides_the_first_phase() {
    let state = SessionState::new().apply(GateEvent::LookupResolved(None));
    assert_eq!(state.phase(), GatePhase::Unauthenticated);

    let state = SessionState::new().apply(GateEvent::LookupResolved(Some(session("ana"))));
    assert_eq!(state.phase(), GatePhase::Authenticated);
    assert!(state.should_show_protected_content());
}

#[test]
fn lookup_failure_defaults_to_unauthenticated() {
    let state = SessionState::new().apply(GateEvent::LookupFailed("offline".into()));
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
    assert!(state.session().is_none());
}

#[test]
fn changes_before_lookup_keep_loading_and_lookup_wins() {
    let state = SessionState::new()
        .apply(changed(AuthChangeEvent::SignedIn, Some(session("ana"))));
    assert_eq!(state.phase(), GatePhase::Loading);
    assert!(state.session().is_some());

    let state = state.apply(GateEvent::LookupResolved(None));
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
    assert!(state.session().is_none());
}

#[test]
fn session_changes_never_reenter_loading() {
    let state = SessionState::new()
        .apply(GateEvent::LookupResolved(Some(session("ana"))))
        .apply(changed(AuthChangeEvent::TokenRefreshed, Some(session("ana"))));
    assert_eq!(state.phase(), GatePhase::Authenticated);

    let state = state.apply(changed(AuthChangeEvent::SignedOut, None));
    assert_eq!(state.phase(), GatePhase::Unauthenticated);

    let state = state.apply(changed(AuthChangeEvent::SignedIn, Some(session("luis"))));
    assert_eq!(state.phase(), GatePhase::Authenticated);
    assert_eq!(
        state.session().and_then(Session::email),
        Some("luis@example.com")
    );
}

#[test]
fn late_lookup_results_are_ignored() {
    let state = SessionState::new()
        .apply(GateEvent::LookupResolved(Some(session("ana"))))
        .apply(GateEvent::LookupResolved(None))
        .apply(GateEvent::LookupFailed("late".into()));
    assert_eq!(state.phase(), GatePhase::Authenticated);
}

#[tokio::test]
async fn gate_stays_loading_until_the_lookup_resolves() {
    let (fake, lookup_tx) = FakeIdentity::new();
    let (sink, mut rx) = channel_sink();
    let _gate = SessionGate::start(Arc::new(fake), sink);
    let mut state = SessionState::new();

    assert_quiet(&mut rx).await;
    assert_eq!(state.phase(), GatePhase::Loading);

    lookup_tx.send(Ok(None)).expect("lookup pending");
    apply_next(&mut rx, &mut state).await;
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
}

#[tokio::test]
async fn gate_authenticates_from_a_restored_session() {
    let (fake, lookup_tx) = FakeIdentity::new();
    let (sink, mut rx) = channel_sink();
    let _gate = SessionGate::start(Arc::new(fake), sink);
    let mut state = SessionState::new();

    lookup_tx.send(Ok(Some(session("ana")))).expect("lookup pending");
    apply_next(&mut rx, &mut state).await;
    assert_eq!(state.phase(), GatePhase::Authenticated);
}

#[tokio::test]
async fn gate_reports_lookup_failure_as_a_transition() {
    let (fake, lookup_tx) = FakeIdentity::new();
    let (sink, mut rx) = channel_sink();
    let _gate = SessionGate::start(Arc::new(fake), sink);
    let mut state = SessionState::new();

    drop(lookup_tx);
    match next_signal(&mut rx).await {
        GateSignal::Transition(event @ GateEvent::LookupFailed(_)) => state.apply_in_place(event),
        other => panic!("unexpected signal {other:?}"),
    }
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
}

#[tokio::test]
async fn sign_out_event_wins_over_pending_sign_in() {
    let (mut fake, lookup_tx) = FakeIdentity::new();
    fake.hold_sign_in = true;
    let fake = Arc::new(fake);
    let (sink, mut rx) = channel_sink();
    let mut gate = SessionGate::start(fake.clone(), sink);
    let mut state = SessionState::new();

    lookup_tx.send(Ok(Some(session("ana")))).expect("lookup pending");
    apply_next(&mut rx, &mut state).await;
    assert_eq!(state.phase(), GatePhase::Authenticated);

    gate.sign_in("luis", "secret");
    fake.emit(AuthChangeEvent::SignedOut, None);
    apply_next(&mut rx, &mut state).await;
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
    assert_eq!(gate.pending_requests(), 1);

    fake.release_sign_in.notify_one();
    apply_next(&mut rx, &mut state).await;
    assert_eq!(state.phase(), GatePhase::Authenticated);
    assert_eq!(
        state.session().and_then(Session::email),
        Some("luis@example.com")
    );
}

#[tokio::test]
async fn failed_sign_in_surfaces_a_notice_without_transition() {
    let (mut fake, lookup_tx) = FakeIdentity::new();
    fake.sign_in_error = Some("Invalid login credentials".to_string());
    let (sink, mut rx) = channel_sink();
    let mut gate = SessionGate::start(Arc::new(fake), sink);
    let mut state = SessionState::new();

    lookup_tx.send(Ok(None)).expect("lookup pending");
    apply_next(&mut rx, &mut state).await;

    gate.sign_in("ana@example.com", "wrong");
    let signal = next_signal(&mut rx).await;
    assert_eq!(
        signal,
        GateSignal::Notice(AuthNotice::SignInFailed(
            "Invalid login credentials".to_string()
        ))
    );
    assert_quiet(&mut rx).await;
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
}

#[tokio::test]
async fn successful_sign_up_only_prompts_for_confirmation() {
    let (fake, lookup_tx) = FakeIdentity::new();
    let (sink, mut rx) = channel_sink();
    let mut gate = SessionGate::start(Arc::new(fake), sink);
    let mut state = SessionState::new();

    lookup_tx.send(Ok(None)).expect("lookup pending");
    apply_next(&mut rx, &mut state).await;

    gate.sign_up("nuevo@example.com", "secret123");
    match next_signal(&mut rx).await {
        GateSignal::Notice(notice) => {
            assert_eq!(notice, AuthNotice::ConfirmationSent);
            assert!(!notice.is_error());
            assert_eq!(notice.message(), CONFIRMATION_PROMPT);
        }
        other => panic!("unexpected signal {other:?}"),
    }
    assert_quiet(&mut rx).await;
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
}

#[tokio::test]
async fn sign_out_transitions_through_the_subscription() {
    let (fake, lookup_tx) = FakeIdentity::new();
    let (sink, mut rx) = channel_sink();
    let mut gate = SessionGate::start(Arc::new(fake), sink);
    let mut state = SessionState::new();

    lookup_tx.send(Ok(Some(session("ana")))).expect("lookup pending");
    apply_next(&mut rx, &mut state).await;

    gate.sign_out();
    apply_next(&mut rx, &mut state).await;
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
}

#[tokio::test]
async fn dropping_the_gate_releases_the_subscription() {
    let (fake, lookup_tx) = FakeIdentity::new();
    let fake = Arc::new(fake);
    let (sink, _rx) = channel_sink();
    let gate = SessionGate::start(fake.clone(), sink);

    assert!(gate.is_subscribed());
    assert_eq!(fake.events.receiver_count(), 1);

    gate.shutdown();
    drop(lookup_tx);

    let mut released = false;
    for _ in 0..100 {
        if fake.events.receiver_count() == 0 {
            released = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(released, "subscription receiver should be dropped");
}

#[tokio::test]
async fn results_arriving_after_teardown_are_discarded() {
    let (mut fake, lookup_tx) = FakeIdentity::new();
    fake.hold_sign_in = true;
    fake.sign_in_error = Some("too late".to_string());
    let fake = Arc::new(fake);
    let (sink, mut rx) = channel_sink();
    let mut gate = SessionGate::start(fake.clone(), sink);
    let mut state = SessionState::new();

    lookup_tx.send(Ok(None)).expect("lookup pending");
    apply_next(&mut rx, &mut state).await;

    gate.sign_in("ana@example.com", "secret");
    drop(gate);
    fake.release_sign_in.notify_one();
    fake.emit(AuthChangeEvent::SignedIn, Some(session("ana")));

    match tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
        Ok(Some(signal)) => panic!("signal delivered after teardown: {signal:?}"),
        Ok(None) | Err(_) => {}
    }
    assert_eq!(state.phase(), GatePhase::Unauthenticated);
}

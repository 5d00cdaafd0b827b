use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ApiError,
    protocol::{
        AuthChangeEvent, PasswordCredentials, RefreshTokenRequest, Session, SessionChange,
        SignUpResponse,
    },
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    config::IdentitySettings,
    error::AuthError,
    store::{FileSessionStore, MemorySessionStore, SessionStore},
    IdentityProvider, SignUpOutcome,
};

/// Refresh this long before the access token expires.
const REFRESH_MARGIN_SECS: i64 = 60;
const AUTH_PATH: &str = "auth/v1";

struct ClientState {
    session: Option<Session>,
    restored: bool,
    /// Bumped by every sign-in, sign-up and sign-out.
    generation: u64,
}

/// What a background update (restore or refresh) started from. The update is
/// dropped if the user signed in or out meanwhile or the tokens were rotated.
struct Basis {
    generation: u64,
    refresh_token: Option<String>,
}

impl ClientState {
    fn basis(&self) -> Basis {
        Basis {
            generation: self.generation,
            refresh_token: self.session.as_ref().map(|s| s.refresh_token.clone()),
        }
    }

    fn matches(&self, basis: &Basis) -> bool {
        self.generation == basis.generation
            && self.session.as_ref().map(|s| s.refresh_token.as_str())
                == basis.refresh_token.as_deref()
    }
}

/// Client for a GoTrue-compatible identity service.
pub struct GoTrueClient {
    http: Client,
    base_url: Option<String>,
    anon_key: Option<String>,
    store: Arc<dyn SessionStore>,
    inner: Mutex<ClientState>,
    events: broadcast::Sender<SessionChange>,
}

impl GoTrueClient {
    pub fn new(
        base_url: Option<String>,
        anon_key: Option<String>,
        store: Arc<dyn SessionStore>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            http: Client::new(),
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            anon_key,
            store,
            inner: Mutex::new(ClientState {
                session: None,
                restored: false,
                generation: 0,
            }),
            events,
        })
    }

    pub fn from_settings(settings: &IdentitySettings) -> Arc<Self> {
        let store: Arc<dyn SessionStore> = match &settings.session_file {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };
        Self::new(
            settings.supabase_url.clone(),
            settings.supabase_anon_key.clone(),
            store,
        )
    }

    fn endpoint(&self, path: &str) -> Result<String, AuthError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(AuthError::NotConfigured("identity service URL"))?;
        Ok(format!("{base}/{AUTH_PATH}/{path}"))
    }

    fn authorized(
        &self,
        request: RequestBuilder,
        bearer: Option<&str>,
    ) -> Result<RequestBuilder, AuthError> {
        let anon_key = self
            .anon_key
            .as_deref()
            .ok_or(AuthError::NotConfigured("identity service access key"))?;
        Ok(request
            .header("apikey", anon_key)
            .bearer_auth(bearer.unwrap_or(anon_key)))
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.endpoint(path)?).query(query).json(body);
        let response = self.authorized(request, None)?.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &text).into());
        }
        serde_json::from_str(&text).map_err(|err| {
            AuthError::InvalidResponse(format!("{path}: {err}"))
        })
    }

    /// Replaces the session on behalf of the user (sign-in, sign-up,
    /// sign-out), superseding any background update still in flight.
    async fn set_session(&self, session: Option<Session>, event: AuthChangeEvent) {
        let mut guard = self.inner.lock().await;
        guard.generation += 1;
        self.commit(&mut guard, session, event);
    }

    /// Replaces the session only if nothing changed since `basis` was taken.
    async fn set_session_if(
        &self,
        basis: &Basis,
        session: Option<Session>,
        event: AuthChangeEvent,
    ) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.matches(basis) {
            debug!(?event, "session changed meanwhile, dropping stale update");
            return false;
        }
        self.commit(&mut guard, session, event);
        true
    }

    /// Stores, persists and broadcasts under the state lock so concurrent
    /// updates reach the store and subscribers in the same order.
    fn commit(&self, state: &mut ClientState, session: Option<Session>, event: AuthChangeEvent) {
        state.session = session.clone();
        state.restored = true;

        let persisted = match &session {
            Some(session) => self.store.save(session),
            None => self.store.clear(),
        };
        if let Err(err) = persisted {
            warn!("session change not persisted: {err}");
        }

        debug!(?event, present = session.is_some(), "session changed");
        let _ = self.events.send(SessionChange::new(event, session));
    }

    async fn current_session(&self) -> Option<Session> {
        self.inner.lock().await.session.clone()
    }

    /// Exchanges the refresh token for a new session.
    ///
    /// A rejected refresh token ends the session (`SignedOut`); transport
    /// errors keep it so a later attempt can succeed.
    pub async fn refresh_session(&self) -> Result<Option<Session>, AuthError> {
        let (current, basis) = {
            let guard = self.inner.lock().await;
            (guard.session.clone(), guard.basis())
        };
        let Some(current) = current else {
            return Ok(None);
        };

        let result: Result<Session, AuthError> = self
            .post_json(
                "token",
                &[("grant_type", "refresh_token")],
                &RefreshTokenRequest {
                    refresh_token: current.refresh_token.clone(),
                },
            )
            .await;

        match result {
            Ok(session) => {
                let session = session.with_expiry_from(Utc::now());
                let committed = self
                    .set_session_if(
                        &basis,
                        Some(session.clone()),
                        AuthChangeEvent::TokenRefreshed,
                    )
                    .await;
                if committed {
                    Ok(Some(session))
                } else {
                    Ok(self.current_session().await)
                }
            }
            Err(err) if err.is_rejection() => {
                if self
                    .set_session_if(&basis, None, AuthChangeEvent::SignedOut)
                    .await
                {
                    warn!("refresh token rejected, signing out locally: {err}");
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Refreshes when the access token is about to expire. Returns whether a
    /// refresh was attempted.
    pub async fn refresh_if_expiring(&self) -> Result<bool, AuthError> {
        let expiring = match self.current_session().await {
            Some(session) => session.expires_within(Utc::now(), REFRESH_MARGIN_SECS),
            None => false,
        };
        if !expiring {
            return Ok(false);
        }
        self.refresh_session().await?;
        Ok(true)
    }

    /// Background task that keeps the access token fresh. Abort the handle to
    /// stop it.
    pub fn spawn_auto_refresh(self: &Arc<Self>, check_every: Duration) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(check_every).await;
                match client.refresh_if_expiring().await {
                    Ok(true) => info!("access token refreshed"),
                    Ok(false) => {}
                    Err(err) => warn!("automatic token refresh failed: {err}"),
                }
            }
        })
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let basis = {
            let guard = self.inner.lock().await;
            if guard.restored {
                return Ok(guard.session.clone());
            }
            guard.basis()
        };

        let stored = self
            .store
            .load()
            .map_err(|err| AuthError::SessionLookupFailed(err.to_string()))?;
        if !self
            .set_session_if(&basis, stored.clone(), AuthChangeEvent::InitialSession)
            .await
        {
            return Ok(self.current_session().await);
        }

        let Some(session) = stored else {
            return Ok(None);
        };
        if !session.expires_within(Utc::now(), REFRESH_MARGIN_SECS) {
            return Ok(Some(session));
        }

        info!("stored session is expiring, refreshing before use");
        match self.refresh_session().await {
            Ok(refreshed) => Ok(refreshed),
            Err(err) if err.is_rejection() => Ok(self.current_session().await),
            Err(err) => Err(AuthError::SessionLookupFailed(err.to_string())),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let session: Session = self
            .post_json(
                "token",
                &[("grant_type", "password")],
                &PasswordCredentials {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        info!(user = %session.user.id, "signed in");
        self.set_session(
            Some(session.with_expiry_from(Utc::now())),
            AuthChangeEvent::SignedIn,
        )
        .await;
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let response: SignUpResponse = self
            .post_json(
                "signup",
                &[],
                &PasswordCredentials {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;

        match response {
            SignUpResponse::Session(session) => {
                info!(user = %session.user.id, "signed up with auto-confirmation");
                self.set_session(
                    Some(session.with_expiry_from(Utc::now())),
                    AuthChangeEvent::SignedIn,
                )
                .await;
                Ok(SignUpOutcome::SignedIn)
            }
            SignUpResponse::User(user) => {
                info!(user = %user.id, "sign-up pending email confirmation");
                Ok(SignUpOutcome::ConfirmationRequired { email: user.email })
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.current_session().await {
            let request = self.http.post(self.endpoint("logout")?);
            let response = self
                .authorized(request, Some(&session.access_token))?
                .send()
                .await?;
            let status = response.status();
            // The token is already unusable on the server for these.
            let already_gone = matches!(
                status,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
            );
            if !status.is_success() && !already_gone {
                let text = response.text().await.unwrap_or_default();
                return Err(ApiError::from_response(status.as_u16(), &text).into());
            }
        }

        self.set_session(None, AuthChangeEvent::SignedOut).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gotrue_tests.rs"]
mod tests;

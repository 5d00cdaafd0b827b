//! Wire types of the identity service (GoTrue `/auth/v1`).

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

fn default_expires_in() -> i64 {
    3600
}

/// Proof of authentication issued by the identity service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    /// Unix seconds. Filled in by the client when the service omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

impl Session {
    /// Stamps `expires_at` from `expires_in` when the service left it out.
    pub fn with_expiry_from(mut self, issued_at: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(issued_at.timestamp() + self.expires_in);
        }
        self
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// True when the token is expired or will be within `margin_secs`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - margin_secs <= now.timestamp(),
            None => false,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /signup`: a full session when the project auto-confirms
/// accounts, otherwise only the pending user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    User(AuthUser),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// One session-change notification: what happened and the session after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn new(event: AuthChangeEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_json() -> serde_json::Value {
        serde_json::json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": { "id": "u-1", "email": "ana@example.com" }
        })
    }

    #[test]
    fn sign_up_body_with_tokens_parses_as_session() {
        let parsed: SignUpResponse = serde_json::from_value(session_json()).expect("parse");
        assert!(matches!(parsed, SignUpResponse::Session(_)));
    }

    #[test]
    fn sign_up_body_without_tokens_parses_as_pending_user() {
        let parsed: SignUpResponse = serde_json::from_value(serde_json::json!({
            "id": "u-2",
            "email": "luis@example.com",
            "confirmation_sent_at": "2025-08-26T10:00:00Z"
        }))
        .expect("parse");
        match parsed {
            SignUpResponse::User(user) => assert_eq!(user.id, UserId::from("u-2")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn expiry_is_stamped_from_expires_in() {
        let session: Session = serde_json::from_value(session_json()).expect("parse");
        let issued = Utc.timestamp_opt(1_000, 0).single().expect("ts");
        let session = session.with_expiry_from(issued);
        assert_eq!(session.expires_at, Some(4_600));
        assert!(!session.expires_within(issued, 60));
        let later = Utc.timestamp_opt(4_550, 0).single().expect("ts");
        assert!(session.expires_within(later, 60));
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let session: Session = serde_json::from_value(session_json()).expect("parse");
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("\"at\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn change_events_use_screaming_snake_case() {
        let raw = serde_json::to_string(&AuthChangeEvent::TokenRefreshed).expect("ser");
        assert_eq!(raw, "\"TOKEN_REFRESHED\"");
    }
}

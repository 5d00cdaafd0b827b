//! Where the identity client keeps the current session between launches.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use shared::protocol::Session;

use crate::error::AuthError;

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, AuthError>;
    fn save(&self, session: &Session) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        let guard = self
            .session
            .lock()
            .map_err(|_| AuthError::Store("memory store poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| AuthError::Store("memory store poisoned".to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| AuthError::Store("memory store poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// JSON file holding the last session.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AuthError::Store(format!(
                    "could not read '{}': {err}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // A corrupt file is treated as signed out rather than blocking startup.
                tracing::warn!(
                    path = %self.path.display(),
                    "discarding unreadable session file: {err}"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                AuthError::Store(format!(
                    "could not create session directory '{}': {err}",
                    parent.display()
                ))
            })?;
        }
        let serialized = serde_json::to_string(session)
            .map_err(|err| AuthError::Store(format!("could not serialize session: {err}")))?;
        fs::write(&self.path, serialized).map_err(|err| {
            AuthError::Store(format!("could not write '{}': {err}", self.path.display()))
        })
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Store(format!(
                "could not remove '{}': {err}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use shared::{domain::UserId, protocol::AuthUser};

    use super::*;

    fn session() -> Session {
        Session {
            access_token: "at".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: Some(4_600),
            refresh_token: "rt".to_string(),
            user: AuthUser {
                id: UserId::from("u-1"),
                email: Some("ana@example.com".to_string()),
                email_confirmed_at: None,
            },
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        env::temp_dir()
            .join(format!("academy_store_test_{suffix}"))
            .join(name)
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let path = temp_path("session.json");
        let store = FileSessionStore::new(&path);

        assert!(store.load().expect("load empty").is_none());
        store.save(&session()).expect("save");
        assert_eq!(store.load().expect("load"), Some(session()));

        store.clear().expect("clear");
        assert!(!path.exists());
        store.clear().expect("clearing twice is fine");

        if let Some(parent) = path.parent() {
            fs::remove_dir_all(parent).expect("cleanup");
        }
    }

    #[test]
    fn corrupt_file_reads_as_no_session() {
        let path = temp_path("session.json");
        let parent = path.parent().expect("parent").to_path_buf();
        fs::create_dir_all(&parent).expect("dir");
        fs::write(&path, "{not json").expect("write");

        let store = FileSessionStore::new(&path);
        assert!(store.load().expect("load").is_none());

        fs::remove_dir_all(parent).expect("cleanup");
    }

    #[test]
    fn memory_store_holds_the_last_saved_session() {
        let store = MemorySessionStore::new();
        store.save(&session()).expect("save");
        assert!(store.load().expect("load").is_some());
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }
}

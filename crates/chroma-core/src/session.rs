use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::CoreError;

/// The single back-office account. Only the Argon2 hash is kept in memory.
pub struct AdminCredentials {
    email: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn from_password(email: &str, password: &str) -> Result<Self, CoreError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CoreError::Validation(format!("cannot hash admin password: {}", e)))?
            .to_string();

        Ok(Self {
            email: email.trim().to_string(),
            password_hash,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    fn verify(&self, email: &str, password: &str) -> bool {
        if !self.email.eq_ignore_ascii_case(email.trim()) {
            return false;
        }
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// An authenticated back-office session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Sessions are created at login, removed at logout, and checked on every
/// protected request.
pub struct SessionStore {
    credentials: AdminCredentials,
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new(credentials: AdminCredentials, ttl: Duration) -> Self {
        Self {
            credentials,
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, CoreError> {
        if !self.credentials.verify(email, password) {
            warn!("Rejected admin login for '{}'", email.trim());
            return Err(CoreError::Unauthorized("invalid email or password".into()));
        }

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| CoreError::Validation("session lifetime is out of range".into()))?;
        let session = Session {
            token: Uuid::new_v4(),
            email: self.credentials.email().to_string(),
            created_at: now,
            expires_at,
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.token, session.clone());

        info!("Admin session opened for {}", session.email);
        Ok(session)
    }

    /// Returns false if the token was not an open session.
    pub fn logout(&self, token: Uuid) -> bool {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token);
        if let Some(session) = &removed {
            info!("Admin session closed for {}", session.email);
        }
        removed.is_some()
    }

    pub fn authorize(&self, token: Uuid) -> Result<Session, CoreError> {
        self.authorize_at(token, Utc::now())
    }

    fn authorize_at(&self, token: Uuid, now: DateTime<Utc>) -> Result<Session, CoreError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(session) = sessions.get(&token).cloned() else {
            return Err(CoreError::Unauthorized("no such session".into()));
        };
        if session.is_expired_at(now) {
            sessions.remove(&token);
            return Err(CoreError::Unauthorized("session expired".into()));
        }
        Ok(session)
    }

    pub fn active_sessions(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|s| !s.is_expired_at(now))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        let creds = AdminCredentials::from_password("admin@chroma.local", "correct horse").unwrap();
        SessionStore::new(creds, Duration::hours(1))
    }

    #[test]
    fn login_authorize_logout() {
        let store = store();
        let session = store.login("Admin@Chroma.local ", "correct horse").unwrap();
        assert_eq!(session.email, "admin@chroma.local");

        assert_eq!(store.authorize(session.token).unwrap(), session);
        assert_eq!(store.active_sessions(), 1);

        assert!(store.logout(session.token));
        assert!(!store.logout(session.token));
        assert!(matches!(
            store.authorize(session.token),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn each_hash_gets_a_fresh_salt() {
        let a = AdminCredentials::from_password("admin@chroma.local", "correct horse").unwrap();
        let b = AdminCredentials::from_password("admin@chroma.local", "correct horse").unwrap();
        assert_ne!(a.password_hash, b.password_hash);
        assert!(a.verify("admin@chroma.local", "correct horse"));
        assert!(b.verify("admin@chroma.local", "correct horse"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = store();
        assert!(matches!(
            store.login("admin@chroma.local", "wrong"),
            Err(CoreError::Unauthorized(_))
        ));
        assert!(store.login("someone@else", "correct horse").is_err());
        assert_eq!(store.active_sessions(), 0);
    }

    #[test]
    fn unrepresentable_lifetime_fails_login_instead_of_panicking() {
        let creds = AdminCredentials::from_password("admin@chroma.local", "correct horse").unwrap();
        let store = SessionStore::new(creds, Duration::MAX);
        assert!(matches!(
            store.login("admin@chroma.local", "correct horse"),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(store.active_sessions(), 0);
    }

    #[test]
    fn expired_sessions_are_evicted() {
        let store = store();
        let session = store.login("admin@chroma.local", "correct horse").unwrap();

        let later = session.expires_at + Duration::seconds(1);
        assert!(store.authorize_at(session.token, later).is_err());
        // Evicted, so even a valid clock no longer finds it
        assert!(matches!(
            store.authorize(session.token),
            Err(CoreError::Unauthorized(msg)) if msg == "no such session"
        ));
    }
}

//! # Session store
//!
//! The single owner of "who is signed in". State moves through three phases:
//!
//! * [`AuthState::Unknown`] until [`SessionStore::hydrate`] has read storage,
//! * [`AuthState::Authenticated`] once a complete session exists,
//! * [`AuthState::Unauthenticated`] after logout, expiry, or a failed hydration.
//!
//! A session is persisted as five flat keys. They are written together and
//! discarded together: if any one is missing or malformed at hydration, all
//! of them are removed.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use shared::models::{AuthenticatedUser, Credential, Session, UserRole};
use tokio::sync::watch;

use crate::{
    error::{ClientError, ClientResult},
    storage::KeyValueStore,
};

/// Storage key of the user id.
pub const KEY_USER_ID: &str = "userId";
/// Storage key of the display name.
pub const KEY_USER_NAME: &str = "userName";
/// Storage key of the email.
pub const KEY_USER_EMAIL: &str = "userEmail";
/// Storage key of the role.
pub const KEY_USER_ROLE: &str = "userRole";
/// Storage key of the `Authorization` header value.
pub const KEY_CREDENTIALS: &str = "credentials";
/// Bearer token key written by older clients; migrated to [`KEY_CREDENTIALS`].
pub const LEGACY_KEY_TOKEN: &str = "token";

const SESSION_KEYS: [&str; 6] = [
    KEY_USER_ID,
    KEY_USER_NAME,
    KEY_USER_EMAIL,
    KEY_USER_ROLE,
    KEY_CREDENTIALS,
    LEGACY_KEY_TOKEN,
];

/// Who is signed in, as far as the client knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Persisted state has not been read yet.
    Unknown,
    /// A complete session exists.
    Authenticated(AuthenticatedUser),
    /// Nobody is signed in.
    Unauthenticated,
}

impl AuthState {
    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Owns the session and its persisted copy. Share it as an `Arc`.
#[derive(Debug)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<AuthState>,
    credential: Mutex<Option<Credential>>,
    hydrated: AtomicBool,
}

impl SessionStore {
    /// A store in [`AuthState::Unknown`]. Nothing is read until [`SessionStore::hydrate`].
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            storage,
            state,
            credential: Mutex::new(None),
            hydrated: AtomicBool::new(false),
        }
    }

    /// Reads persisted state. Only the first call does any work; later calls
    /// return the current state.
    pub fn hydrate(&self) -> AuthState {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        match self.read_persisted() {
            Some(session) => {
                tracing::debug!(user_id = session.user.id, "restored session");
                self.set_credential(Some(session.credential));
                self.state
                    .send_replace(AuthState::Authenticated(session.user));
            }
            None => {
                if let Err(err) = self.clear_persisted() {
                    tracing::warn!(error = %err, "failed to clear incomplete session");
                }
                self.set_credential(None);
                self.state.send_replace(AuthState::Unauthenticated);
            }
        }
        self.state()
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read session key");
                None
            }
        }
    }

    fn read_persisted(&self) -> Option<Session> {
        let id = self.read(KEY_USER_ID)?.trim().parse().ok()?;
        let name = self.read(KEY_USER_NAME)?;
        let email = self.read(KEY_USER_EMAIL)?;
        let role: UserRole = self.read(KEY_USER_ROLE)?.parse().ok()?;
        let credential = match self.read(KEY_CREDENTIALS) {
            Some(stored) => Credential::parse(&stored)?,
            None => self.migrate_legacy_token()?,
        };
        let user = AuthenticatedUser {
            id,
            name,
            email,
            role,
        };
        Some(Session::new(user, credential))
    }

    fn migrate_legacy_token(&self) -> Option<Credential> {
        let token = self.read(LEGACY_KEY_TOKEN)?;
        let credential = Credential::Bearer(token.trim().to_string());
        let migrated = self
            .storage
            .set(KEY_CREDENTIALS, &credential.header_value())
            .and_then(|()| self.storage.remove(LEGACY_KEY_TOKEN));
        match migrated {
            Ok(()) => tracing::info!("migrated legacy session token"),
            Err(err) => tracing::warn!(error = %err, "failed to migrate legacy session token"),
        }
        Some(credential)
    }

    fn clear_persisted(&self) -> ClientResult<()> {
        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(err) = self.storage.remove(key) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn set_credential(&self, credential: Option<Credential>) {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    /// Persists a complete session and transitions to `Authenticated`.
    ///
    /// # Errors
    /// Returns [`ClientError::Storage`] if the session could not be written;
    /// the state is left unchanged in that case.
    pub fn login(&self, session: Session) -> ClientResult<()> {
        let Session { user, credential } = session;
        let writes = [
            (KEY_USER_ID, user.id.to_string()),
            (KEY_USER_NAME, user.name.clone()),
            (KEY_USER_EMAIL, user.email.clone()),
            (KEY_USER_ROLE, user.role.as_str().to_string()),
            (KEY_CREDENTIALS, credential.header_value()),
        ];
        for (key, value) in &writes {
            if let Err(err) = self.storage.set(key, value) {
                if let Err(cleanup) = self.clear_persisted() {
                    tracing::warn!(error = %cleanup, "failed to discard partial session");
                }
                return Err(err);
            }
        }
        if let Err(err) = self.storage.remove(LEGACY_KEY_TOKEN) {
            tracing::warn!(error = %err, "failed to remove legacy session token");
        }

        tracing::info!(user_id = user.id, scheme = %credential.scheme(), "signed in");
        self.hydrated.store(true, Ordering::SeqCst);
        self.set_credential(Some(credential));
        self.state.send_replace(AuthState::Authenticated(user));
        Ok(())
    }

    /// Clears the session at the user's request.
    ///
    /// # Errors
    /// Returns [`ClientError::Storage`] if persisted keys could not be
    /// removed. The in-memory state is `Unauthenticated` regardless.
    pub fn logout(&self) -> ClientResult<()> {
        tracing::info!("signed out");
        self.end_session()
    }

    /// Clears the session because the server rejected its credential.
    ///
    /// # Errors
    /// As [`SessionStore::logout`].
    pub fn expire(&self) -> ClientResult<()> {
        tracing::warn!("session rejected by server; clearing credentials");
        self.end_session()
    }

    fn end_session(&self) -> ClientResult<()> {
        self.hydrated.store(true, Ordering::SeqCst);
        self.set_credential(None);
        self.state.send_replace(AuthState::Unauthenticated);
        self.clear_persisted()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthenticatedUser> {
        self.state.borrow().user().cloned()
    }

    /// The signed-in user, or [`ClientError::NotAuthenticated`].
    ///
    /// # Errors
    /// Returns [`ClientError::NotAuthenticated`] when nobody is signed in.
    pub fn require_user(&self) -> ClientResult<AuthenticatedUser> {
        self.current_user().ok_or(ClientError::NotAuthenticated)
    }

    /// True once a session exists.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Authenticated(_))
    }

    /// True only until hydration completes.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Unknown)
    }

    /// Credential of the current session.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receives every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

//! Session lifecycle: sign-up, sign-in, sign-out, persisted session with
//! automatic refresh, and auth-state-change notifications.

use crate::backend::Backend;
use crate::db::{mirror, notes, session as store};
use crate::errors::{AppError, AppResult};
use crate::models::session::{AuthEvent, Session};
use rusqlite::Connection;
use tracing::{debug, info, warn};

type Listener<'a> = Box<dyn Fn(AuthEvent, Option<&Session>) + 'a>;

pub struct SessionManager<'a> {
    backend: &'a dyn Backend,
    conn: &'a Connection,
    storage_key: String,
    listeners: Vec<Listener<'a>>,
}

impl<'a> SessionManager<'a> {
    pub fn new(backend: &'a dyn Backend, conn: &'a Connection, storage_key: &str) -> Self {
        Self {
            backend,
            conn,
            storage_key: storage_key.to_string(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener called on every sign-in, sign-out and token refresh.
    pub fn on_auth_state_change<F>(&mut self, listener: F)
    where
        F: Fn(AuthEvent, Option<&Session>) + 'a,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, event: AuthEvent, session: Option<&Session>) {
        debug!(event = event.as_str(), "auth state change");
        for l in &self.listeners {
            l(event, session);
        }
    }

    /// Persisted session, refreshed first when it is about to expire.
    pub fn current(&self) -> AppResult<Option<Session>> {
        let Some(session) = store::load_session(self.conn, &self.storage_key)? else {
            return Ok(None);
        };

        if !session.needs_refresh() {
            return Ok(Some(session));
        }

        match self.backend.refresh_session(&session.refresh_token) {
            Ok(fresh) => {
                store::save_session(self.conn, &self.storage_key, &fresh)?;
                info!(user = %fresh.user_id, "session refreshed");
                self.emit(AuthEvent::TokenRefreshed, Some(&fresh));
                Ok(Some(fresh))
            }
            Err(AppError::Backend { status, message }) => {
                // The refresh token was rejected: the session is gone for good.
                warn!(status, %message, "session refresh rejected");
                store::clear_session(self.conn, &self.storage_key)?;
                self.emit(AuthEvent::SignedOut, None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Like `current`, but a missing session is an error.
    pub fn require(&self) -> AppResult<Session> {
        self.current()?.ok_or(AppError::NotAuthenticated)
    }

    pub fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        let (email, password) = validate_credentials(email, password)?;
        let session = self.backend.sign_up(email, password)?;
        self.establish(&session)?;
        Ok(session)
    }

    /// Sign in; with `create_on_failure` a rejected sign-in falls back to sign-up.
    pub fn sign_in(&self, email: &str, password: &str, create_on_failure: bool) -> AppResult<Session> {
        let (email, password) = validate_credentials(email, password)?;

        let session = match self.backend.sign_in(email, password) {
            Ok(s) => s,
            Err(e @ (AppError::Backend { .. } | AppError::Auth(_))) if create_on_failure => {
                info!(error = %e, "sign-in failed, creating the account");
                self.backend.sign_up(email, password)?
            }
            Err(e) => return Err(e),
        };

        self.establish(&session)?;
        Ok(session)
    }

    /// Sign out remotely (best effort) and forget the local session.
    /// Returns `false` when nobody was signed in.
    pub fn sign_out(&self) -> AppResult<bool> {
        let Some(session) = store::load_session(self.conn, &self.storage_key)? else {
            return Ok(false);
        };

        if let Err(e) = self.backend.sign_out(&session) {
            warn!(error = %e, "remote sign-out failed; clearing the local session anyway");
        }

        store::clear_session(self.conn, &self.storage_key)?;
        self.emit(AuthEvent::SignedOut, None);
        Ok(true)
    }

    /// Persist the new session. A different user gets an empty mirror.
    fn establish(&self, session: &Session) -> AppResult<()> {
        let previous = mirror::mirror_owner(self.conn)?;
        if previous.as_deref().is_some_and(|owner| owner != session.user_id) {
            info!("different user signed in, clearing local data");
            mirror::clear(self.conn)?;
            notes::clear_all_notes(self.conn)?;
        }
        mirror::set_mirror_owner(self.conn, &session.user_id)?;

        store::save_session(self.conn, &self.storage_key, session)?;
        self.emit(AuthEvent::SignedIn, Some(session));
        Ok(())
    }
}

fn validate_credentials<'s>(email: &'s str, password: &'s str) -> AppResult<(&'s str, &'s str)> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("Please enter a valid email address".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Please enter a password".into()));
    }
    Ok((email, password))
}

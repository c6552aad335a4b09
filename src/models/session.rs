use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An authenticated backend session, persisted locally between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub user_id: String,
    pub email: Option<String>,
}

/// Seconds before expiry at which a session is refreshed eagerly.
pub const REFRESH_MARGIN_SECS: i64 = 60;

impl Session {
    pub fn expires_within(&self, now: i64, margin: i64) -> bool {
        self.expires_at - margin <= now
    }

    pub fn needs_refresh(&self) -> bool {
        self.expires_within(Utc::now().timestamp(), REFRESH_MARGIN_SECS)
    }

    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.user_id)
    }
}

/// Transitions reported to `on_auth_state_change` listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn => "SIGNED_IN",
            AuthEvent::SignedOut => "SIGNED_OUT",
            AuthEvent::TokenRefreshed => "TOKEN_REFRESHED",
        }
    }
}

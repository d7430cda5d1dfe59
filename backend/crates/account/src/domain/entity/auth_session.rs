//! Auth Session Entity
//!
//! Server-side session referenced by a signed cookie token.
//! Sessions are opened by the sign-in flow; this service checks and ends them.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::user_id::{SessionId, UserId};

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: SessionId::new(),
            user_id,
            expires_at: now + ttl,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Cookie token: session id sealed with the server secret
    pub fn token(&self, secret: &[u8]) -> String {
        platform::crypto::seal(secret, &self.session_id.to_string())
    }

    /// Recover the session id from a cookie token
    pub fn parse_token(secret: &[u8], token: &str) -> Option<SessionId> {
        platform::crypto::open(secret, token).ok()?.parse().ok()
    }
}

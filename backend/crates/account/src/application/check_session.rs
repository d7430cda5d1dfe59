//! Check Session Use Case
//!
//! Verifies and retrieves session information.

use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::SessionRepository;
use crate::error::{AccountError, AccountResult};

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    config: Arc<AccountConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AccountConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Just check if session is valid (returns bool)
    pub async fn is_valid(&self, session_token: &str) -> bool {
        self.get_session(session_token).await.is_ok()
    }

    /// Get session and update last activity
    pub async fn get_session(&self, session_token: &str) -> AccountResult<AuthSession> {
        let session_id = AuthSession::parse_token(&self.config.session_secret, session_token)
            .ok_or(AccountError::SessionInvalid)?;

        let mut session = self
            .session_repo
            .find_by_id(&session_id)
            .await?
            .ok_or(AccountError::SessionInvalid)?;

        if session.is_expired() {
            self.session_repo.delete(&session_id).await?;
            return Err(AccountError::SessionInvalid);
        }

        session.touch();

        // Update in background
        let repo = Arc::clone(&self.session_repo);
        tokio::spawn(async move {
            if let Err(e) = repo.touch(&session_id).await {
                tracing::warn!(error = %e, "Failed to update session activity");
            }
        });

        Ok(session)
    }
}

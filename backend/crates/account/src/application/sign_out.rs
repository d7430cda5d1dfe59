//! Sign Out Use Case
//!
//! Invalidates a user session.

use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::SessionRepository;
use crate::error::{AccountError, AccountResult};

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AccountConfig>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AccountConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Sign out from current session
    pub async fn execute(&self, session_token: &str) -> AccountResult<()> {
        let session_id = AuthSession::parse_token(&self.config.session_secret, session_token)
            .ok_or(AccountError::SessionInvalid)?;
        self.session_repo.delete(&session_id).await?;

        tracing::info!(session_id = %session_id, "User signed out");
        Ok(())
    }
}

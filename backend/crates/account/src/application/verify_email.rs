//! Verify Email Use Case
//!
//! Consumes a link sent after an email change.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AccountConfig;
use crate::domain::entity::verification_link::{LinkError, VerificationLink};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AccountError, AccountResult};

/// Verify email input
pub struct VerifyEmailInput {
    pub user_id: String,
    pub email_hash: String,
    pub expires: i64,
    pub signature: String,
}

/// Verify email use case
pub struct VerifyEmailUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AccountConfig>,
}

impl<U> VerifyEmailUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AccountConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Returns whether the address was newly verified
    pub async fn execute(&self, input: VerifyEmailInput) -> AccountResult<bool> {
        let user_id: UserId = input
            .user_id
            .parse()
            .map_err(|_| AccountError::InvalidVerificationLink)?;

        let link = VerificationLink {
            user_id,
            email_hash: input.email_hash,
            expires: input.expires,
            signature: input.signature,
        };

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let now = Utc::now();
        link.check(&self.config.verification_key(), &user.email, now)
            .map_err(|e| match e {
                LinkError::Expired => AccountError::VerificationLinkExpired,
                LinkError::BadSignature | LinkError::EmailMismatch => {
                    AccountError::InvalidVerificationLink
                }
            })?;

        let verified = self.user_repo.mark_email_verified(&user_id, now).await?;
        if verified {
            tracing::info!(user_id = %user_id, "Email address verified");
        }

        Ok(verified)
    }
}

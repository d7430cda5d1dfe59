//! Update Profile Use Case
//!
//! Completes a user's profile and moves the account towards approval.
//!
//! ## Flow
//! 1. Validate the form (uniqueness of the email excludes the user itself)
//! 2. Store the photo, if one was uploaded
//! 3. Advance `first_login` / `status`
//! 4. Write profile fields and approval columns in one statement
//! 5. Queue a verification mail when a verification-capable user changed
//!    their address (`email_verified_at` is cleared in step 4)
//! 6. End the caller's session; the client is sent back to the login page

use std::sync::Arc;

use chrono::Utc;
use kernel::error::validation::FieldRule;

use crate::application::config::AccountConfig;
use crate::domain::entity::{
    auth_session::AuthSession,
    user::{ProfileChanges, VerifiedAtChange},
    verification_link::{VerificationLink, VerificationNotice},
};
use crate::domain::profile_form::{ProfileSubmission, ProfileValidation};
use crate::domain::repository::{
    ProfilePhotoStore, SessionRepository, UserRepository, VerificationNotifier,
};
use crate::domain::value_object::approval::{AccountStatus, FirstLogin};
use crate::error::{AccountError, AccountResult};

/// Shown after every successful update
pub const ACKNOWLEDGMENT: &str = "Thank you, everything is set! Please wait for the approval of your account by one of our administrators. We will notify you via email once it is done.";

/// Update profile input
pub type UpdateProfileInput = ProfileSubmission;

/// Where the client goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
}

impl RedirectTarget {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RedirectTarget::Login => "login",
        }
    }
}

/// Update profile output
#[derive(Debug, Clone)]
pub struct UpdateProfileOutput {
    pub acknowledgment: &'static str,
    pub redirect: RedirectTarget,
    pub verification_sent: bool,
    pub status: AccountStatus,
    pub first_login: FirstLogin,
}

/// Update profile use case
pub struct UpdateProfileUseCase<U, S, N, P>
where
    U: UserRepository,
    S: SessionRepository,
    N: VerificationNotifier,
    P: ProfilePhotoStore,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    notifier: Arc<N>,
    photos: Arc<P>,
    config: Arc<AccountConfig>,
}

impl<U, S, N, P> UpdateProfileUseCase<U, S, N, P>
where
    U: UserRepository,
    S: SessionRepository,
    N: VerificationNotifier,
    P: ProfilePhotoStore,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        notifier: Arc<N>,
        photos: Arc<P>,
        config: Arc<AccountConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            notifier,
            photos,
            config,
        }
    }

    pub async fn execute(
        &self,
        session: &AuthSession,
        input: UpdateProfileInput,
    ) -> AccountResult<UpdateProfileOutput> {
        let mut user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        // Validate
        let mut validation = ProfileValidation::new(input, self.config.photo_max_kilobytes);
        let taken = match validation.email() {
            Some(email) => {
                self.user_repo
                    .email_taken_by_other(email, &user.user_id)
                    .await?
            }
            None => false,
        };
        if taken {
            validation.reject_email_taken();
        }
        let mut profile = validation.finish().map_err(|errors| {
            if errors.only_rule(FieldRule::Unique) {
                AccountError::EmailTaken(errors)
            } else {
                AccountError::Validation(errors)
            }
        })?;

        // Photo
        if let Some(photo) = profile.take_photo() {
            let path = self
                .photos
                .store(&user.user_id, &photo, user.profile_photo_path.as_deref())
                .await?;
            self.user_repo
                .update_photo_path(&user.user_id, &path)
                .await?;
            user.set_profile_photo_path(path);
        }

        let reverify = user.requires_reverification(profile.email());

        let changes = ProfileChanges {
            firstname: profile.firstname().clone(),
            middlename: profile.middlename().clone(),
            lastname: profile.lastname().clone(),
            username: profile.username().clone(),
            email: profile.email().clone(),
            landlinetel: profile.landlinetel().clone(),
            mobiletel: profile.mobiletel().clone(),
            approval: user.approval().advance(),
            email_verified_at: if reverify {
                VerifiedAtChange::Clear
            } else {
                VerifiedAtChange::Keep
            },
        };

        let now = Utc::now();
        self.user_repo
            .apply_profile_changes(&user.user_id, &changes)
            .await?;
        user.apply(&changes, now);

        if reverify {
            let link = VerificationLink::issue(
                &self.config.verification_key(),
                user.user_id,
                &user.email,
                self.config.verification_ttl(),
                now,
            );
            let notice = VerificationNotice::new(&link, user.email.clone(), &self.config.app_url);
            self.notifier.notify(&notice).await?;
        }

        self.session_repo.delete(&session.session_id).await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            status = %user.status,
            verification_sent = reverify,
            "Profile information updated"
        );

        Ok(UpdateProfileOutput {
            acknowledgment: ACKNOWLEDGMENT,
            redirect: RedirectTarget::Login,
            verification_sent: reverify,
            status: user.status,
            first_login: user.first_login,
        })
    }
}

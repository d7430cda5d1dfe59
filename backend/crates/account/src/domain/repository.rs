//! Repository Traits
//!
//! Interfaces for persistence and side effects. Implementations live in the
//! infrastructure layer.

use crate::domain::entity::{
    auth_session::AuthSession,
    user::{ProfileChanges, User},
    verification_link::VerificationNotice,
};
use crate::domain::value_object::{
    email::Email,
    profile_photo::ProfilePhoto,
    user_id::{SessionId, UserId},
};
use crate::error::AccountResult;
use chrono::{DateTime, Utc};

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>>;

    /// Check whether any user other than `except` holds the address
    async fn email_taken_by_other(&self, email: &Email, except: &UserId) -> AccountResult<bool>;

    async fn update_photo_path(&self, user_id: &UserId, path: &str) -> AccountResult<()>;

    /// Write the profile fields and approval columns in one statement
    async fn apply_profile_changes(
        &self,
        user_id: &UserId,
        changes: &ProfileChanges,
    ) -> AccountResult<()>;

    /// Set `email_verified_at` if it is still NULL; returns whether it changed
    async fn mark_email_verified(&self, user_id: &UserId, at: DateTime<Utc>)
    -> AccountResult<bool>;
}

/// Auth session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn find_by_id(&self, session_id: &SessionId) -> AccountResult<Option<AuthSession>>;

    /// Update last activity
    async fn touch(&self, session_id: &SessionId) -> AccountResult<()>;

    async fn delete(&self, session_id: &SessionId) -> AccountResult<()>;

    /// Clean up expired sessions
    async fn delete_expired(&self) -> AccountResult<u64>;
}

/// Queues verification mail for delivery by another process
#[trait_variant::make(VerificationNotifier: Send)]
pub trait LocalVerificationNotifier {
    async fn notify(&self, notice: &VerificationNotice) -> AccountResult<()>;
}

/// Profile photo storage
#[trait_variant::make(ProfilePhotoStore: Send)]
pub trait LocalProfilePhotoStore {
    /// Store the photo and return its path; `previous` is removed on success
    async fn store(
        &self,
        user_id: &UserId,
        photo: &ProfilePhoto,
        previous: Option<&str>,
    ) -> AccountResult<String>;
}

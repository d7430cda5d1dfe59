//! User Entity
//!
//! The account row as this service sees it. Users are created by the
//! registration flow; here they are only read and updated through
//! [`ProfileChanges`].

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    approval::{AccountStatus, ApprovalState, FirstLogin},
    bounded_text::{ProfileText, Telephone},
    email::Email,
    user_id::UserId,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: Email,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub firstname: Option<String>,
    pub middlename: Option<String>,
    pub lastname: Option<String>,
    pub landlinetel: Option<String>,
    pub mobiletel: Option<String>,
    pub profile_photo_path: Option<String>,
    pub first_login: FirstLogin,
    pub status: AccountStatus,
    /// Whether a change of address must be re-confirmed
    pub must_verify_email: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user: no profile, status 1, email unverified
    pub fn new(username: impl Into<String>, email: Email, must_verify_email: bool) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            username: username.into(),
            email,
            email_verified_at: None,
            firstname: None,
            middlename: None,
            lastname: None,
            landlinetel: None,
            mobiletel: None,
            profile_photo_path: None,
            first_login: FirstLogin::Unset,
            status: AccountStatus::Registered,
            must_verify_email,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn must_verify_email(&self) -> bool {
        self.must_verify_email
    }

    #[inline]
    pub fn approval(&self) -> ApprovalState {
        ApprovalState::new(self.first_login, self.status)
    }

    #[inline]
    pub fn has_verified_email(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// A new address needs confirming only for verification-capable users
    ///
    /// Addresses are compared exactly; a change of case counts as a change.
    pub fn requires_reverification(&self, new_email: &Email) -> bool {
        &self.email != new_email && self.must_verify_email
    }

    /// Mirror a persisted [`ProfileChanges`] in memory
    pub fn apply(&mut self, changes: &ProfileChanges, now: DateTime<Utc>) {
        self.firstname = Some(changes.firstname.to_string());
        self.middlename = Some(changes.middlename.to_string());
        self.lastname = Some(changes.lastname.to_string());
        self.username = changes.username.to_string();
        self.email = changes.email.clone();
        self.landlinetel = Some(changes.landlinetel.to_string());
        self.mobiletel = Some(changes.mobiletel.to_string());
        self.first_login = changes.approval.first_login;
        self.status = changes.approval.status;
        if changes.email_verified_at == VerifiedAtChange::Clear {
            self.email_verified_at = None;
        }
        self.updated_at = now;
    }

    pub fn set_profile_photo_path(&mut self, path: impl Into<String>) {
        self.profile_photo_path = Some(path.into());
        self.updated_at = Utc::now();
    }

    /// Returns false when the address was already verified
    pub fn verify_email(&mut self, at: DateTime<Utc>) -> bool {
        if self.email_verified_at.is_some() {
            return false;
        }
        self.email_verified_at = Some(at);
        self.updated_at = at;
        true
    }
}

/// What happens to `email_verified_at` on a profile write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifiedAtChange {
    Keep,
    Clear,
}

/// The complete set of columns a profile update may write
///
/// Nothing outside this struct can be changed by the profile workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    pub firstname: ProfileText,
    pub middlename: ProfileText,
    pub lastname: ProfileText,
    pub username: ProfileText,
    pub email: Email,
    pub landlinetel: Telephone,
    pub mobiletel: Telephone,
    pub approval: ApprovalState,
    pub email_verified_at: VerifiedAtChange,
}

//! Approval Value Objects
//!
//! Two integer columns track how far a user got through onboarding:
//! - `first_login`: NULL until the first profile completion, then 1
//! - `status`: 1 when registered, 2 once waiting for an administrator
//!
//! Values outside the known set are carried through untouched so that
//! states written by administrative tooling survive a round trip.
//!
//! ## Transition
//! ```text
//! first_login: Unset ──▶ One
//! status:      (first_login == One) ──▶ PendingApproval
//! ```
//! Both steps run in the same profile update, so a brand-new user goes
//! straight to `PendingApproval`. There is no path backwards.

use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// FirstLogin
// ============================================================================

/// State of the `first_login` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FirstLogin {
    /// Column is NULL: profile never completed
    #[default]
    Unset,
    /// Column is 1: profile completed once
    One,
    /// Any other value
    Other(i32),
}

impl FirstLogin {
    pub const fn from_db(value: Option<i32>) -> Self {
        match value {
            None => Self::Unset,
            Some(1) => Self::One,
            Some(other) => Self::Other(other),
        }
    }

    pub const fn to_db(self) -> Option<i32> {
        match self {
            Self::Unset => None,
            Self::One => Some(1),
            Self::Other(value) => Some(value),
        }
    }

    #[inline]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl Serialize for FirstLogin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_db().serialize(serializer)
    }
}

// ============================================================================
// AccountStatus
// ============================================================================

/// State of the `status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccountStatus {
    /// 1: registered, profile not yet submitted for review (column default)
    #[default]
    Registered,
    /// 2: waiting for administrative approval
    PendingApproval,
    /// Any other value
    Other(i32),
}

impl AccountStatus {
    pub const REGISTERED_ID: i32 = 1;
    pub const PENDING_APPROVAL_ID: i32 = 2;

    pub const fn from_id(id: i32) -> Self {
        match id {
            Self::REGISTERED_ID => Self::Registered,
            Self::PENDING_APPROVAL_ID => Self::PendingApproval,
            other => Self::Other(other),
        }
    }

    pub const fn id(&self) -> i32 {
        match self {
            Self::Registered => Self::REGISTERED_ID,
            Self::PendingApproval => Self::PENDING_APPROVAL_ID,
            Self::Other(id) => *id,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::PendingApproval => "pending_approval",
            Self::Other(_) => "other",
        }
    }

    #[inline]
    pub const fn is_pending_approval(&self) -> bool {
        matches!(self, Self::PendingApproval)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(id) => write!(f, "other({})", id),
            known => f.write_str(known.code()),
        }
    }
}

impl Serialize for AccountStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.id())
    }
}

// ============================================================================
// ApprovalState
// ============================================================================

/// Pair of onboarding columns, advanced together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApprovalState {
    pub first_login: FirstLogin,
    pub status: AccountStatus,
}

impl ApprovalState {
    pub const fn new(first_login: FirstLogin, status: AccountStatus) -> Self {
        Self {
            first_login,
            status,
        }
    }

    /// Apply the profile-completion transition
    pub fn advance(self) -> Self {
        let mut next = self;
        if next.first_login.is_unset() {
            next.first_login = FirstLogin::One;
        }
        if next.first_login == FirstLogin::One {
            next.status = AccountStatus::PendingApproval;
        }
        next
    }
}

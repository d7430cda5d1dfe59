//! Account Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, form rules, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database and file storage implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Profile completion with field-level validation errors
//! - Approval workflow (`first_login` / `status`) advanced on every update
//! - Re-verification of changed email addresses through signed links
//! - Server-side sessions with cookie-based tokens
//! - Static onboarding instructions
//!
//! ## Approval Model
//! - New users start with `first_login = NULL`, `status = 1`
//! - Completing the profile sets `first_login = 1` and `status = 2`
//!   (waiting for an administrator)
//! - The session ends after each update; the user signs in again

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AccountConfig;
pub use error::{AccountError, AccountResult};
pub use infra::{photo_store::FsPhotoStore, postgres::PgAccountRepository};
pub use presentation::router::account_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgAccountRepository as AccountStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

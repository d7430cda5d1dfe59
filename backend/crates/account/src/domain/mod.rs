//! Domain Layer
//!
//! Contains entities, value objects, form rules and repository traits.

pub mod entity;
pub mod profile_form;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{auth_session::AuthSession, user::User};
pub use repository::{ProfilePhotoStore, SessionRepository, UserRepository, VerificationNotifier};

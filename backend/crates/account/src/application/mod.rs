//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod onboarding;
pub mod sign_out;
pub mod update_profile;
pub mod verify_email;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::AccountConfig;
pub use onboarding::{OnboardingUseCase, OnboardingView};
pub use sign_out::SignOutUseCase;
pub use update_profile::{
    RedirectTarget, UpdateProfileInput, UpdateProfileOutput, UpdateProfileUseCase,
};
pub use verify_email::{VerifyEmailInput, VerifyEmailUseCase};

//! Account Middleware
//!
//! Middleware for requiring authentication on protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::CheckSessionUseCase;
use crate::domain::repository::{
    ProfilePhotoStore, SessionRepository, UserRepository, VerificationNotifier,
};
use crate::error::{AccountError, AccountResult};
use crate::presentation::handlers::AccountAppState;

/// Middleware that requires a valid auth session
///
/// The verified [`AuthSession`](crate::domain::AuthSession) is placed in the
/// request extensions for downstream handlers.
pub async fn require_session<R, P>(
    State(state): State<AccountAppState<R, P>>,
    mut req: Request<Body>,
    next: Next,
) -> AccountResult<Response>
where
    R: UserRepository + SessionRepository + VerificationNotifier + Clone + Send + Sync + 'static,
    P: ProfilePhotoStore + Clone + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name)
        .ok_or(AccountError::SessionInvalid)?;

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    let session = use_case.get_session(&token).await?;

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

//! HTTP Handlers

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::application::{
    OnboardingUseCase, OnboardingView, SignOutUseCase, UpdateProfileUseCase, VerifyEmailInput,
    VerifyEmailUseCase,
};
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{
    ProfilePhotoStore, SessionRepository, UserRepository, VerificationNotifier,
};
use crate::error::AccountResult;
use crate::presentation::dto::{UpdateProfileResponse, VerifyEmailQuery, read_profile_form};

/// Shared state for account handlers
#[derive(Clone)]
pub struct AccountAppState<R, P>
where
    R: UserRepository + SessionRepository + VerificationNotifier + Clone + Send + Sync + 'static,
    P: ProfilePhotoStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub photos: Arc<P>,
    pub config: Arc<AccountConfig>,
}

// ============================================================================
// Profile Information (requires authentication)
// ============================================================================

/// PUT /api/user/profile-information
pub async fn update_profile<R, P>(
    State(state): State<AccountAppState<R, P>>,
    Extension(session): Extension<AuthSession>,
    multipart: Multipart,
) -> AccountResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + VerificationNotifier + Clone + Send + Sync + 'static,
    P: ProfilePhotoStore + Clone + Send + Sync + 'static,
{
    let input = read_profile_form(multipart).await?;

    let use_case = UpdateProfileUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.photos.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(&session, input).await?;

    // The session is gone; make the browser forget it too
    let cookie = platform::cookie::delete_cookie_header(&state.config.session_cookie());

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UpdateProfileResponse::from(output)),
    ))
}

// ============================================================================
// Email Verification
// ============================================================================

/// GET /api/email/verify/{user_id}/{hash}
pub async fn verify_email<R, P>(
    State(state): State<AccountAppState<R, P>>,
    Path((user_id, email_hash)): Path<(String, String)>,
    Query(query): Query<VerifyEmailQuery>,
) -> AccountResult<StatusCode>
where
    R: UserRepository + SessionRepository + VerificationNotifier + Clone + Send + Sync + 'static,
    P: ProfilePhotoStore + Clone + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(state.repo.clone(), state.config.clone());

    use_case
        .execute(VerifyEmailInput {
            user_id,
            email_hash,
            expires: query.expires,
            signature: query.signature,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/signout
pub async fn sign_out<R, P>(
    State(state): State<AccountAppState<R, P>>,
    headers: HeaderMap,
) -> AccountResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + VerificationNotifier + Clone + Send + Sync + 'static,
    P: ProfilePhotoStore + Clone + Send + Sync + 'static,
{
    let cookie_config = state.config.session_cookie();
    let token = platform::cookie::extract_cookie(&headers, &cookie_config.name);

    if let Some(token) = token {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // Ignore errors - just clear the cookie
        let _ = use_case.execute(&token).await;
    }

    let cookie = platform::cookie::delete_cookie_header(&cookie_config);

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Onboarding
// ============================================================================

/// GET /api/onboarding
pub async fn onboarding() -> Json<&'static OnboardingView> {
    Json(OnboardingUseCase::execute())
}

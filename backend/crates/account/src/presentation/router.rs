//! Account Router

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::domain::repository::{
    ProfilePhotoStore, SessionRepository, UserRepository, VerificationNotifier,
};
use crate::infra::{photo_store::FsPhotoStore, postgres::PgAccountRepository};
use crate::presentation::handlers::{self, AccountAppState};
use crate::presentation::middleware::require_session;

/// Create the Account router with PostgreSQL repository and filesystem photos
pub fn account_router(
    repo: PgAccountRepository,
    photos: FsPhotoStore,
    config: AccountConfig,
) -> Router {
    account_router_generic(repo, photos, config)
}

/// Create a generic Account router for any repository implementation
pub fn account_router_generic<R, P>(repo: R, photos: P, config: AccountConfig) -> Router
where
    R: UserRepository + SessionRepository + VerificationNotifier + Clone + Send + Sync + 'static,
    P: ProfilePhotoStore + Clone + Send + Sync + 'static,
{
    let body_limit = config.upload_body_limit;
    let state = AccountAppState {
        repo: Arc::new(repo),
        photos: Arc::new(photos),
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route(
            "/user/profile-information",
            put(handlers::update_profile::<R, P>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<R, P>,
        ));

    Router::new()
        .route(
            "/email/verify/{user_id}/{hash}",
            get(handlers::verify_email::<R, P>),
        )
        .route("/signout", post(handlers::sign_out::<R, P>))
        .route("/onboarding", get(handlers::onboarding))
        .merge(protected)
        .with_state(state)
}

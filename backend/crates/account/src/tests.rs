//! Use case and router tests against in-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::application::{
    AccountConfig, CheckSessionUseCase, SignOutUseCase, UpdateProfileInput, UpdateProfileUseCase,
    VerifyEmailInput, VerifyEmailUseCase,
};
use crate::domain::entity::{
    auth_session::AuthSession,
    user::{ProfileChanges, User},
    verification_link::{VerificationLink, VerificationNotice},
};
use crate::domain::repository::{
    ProfilePhotoStore, SessionRepository, UserRepository, VerificationNotifier,
};
use crate::domain::value_object::{
    approval::{AccountStatus, FirstLogin},
    email::Email,
    profile_photo::ProfilePhoto,
    user_id::{SessionId, UserId},
};
use crate::error::{AccountError, AccountResult};
use crate::presentation::router::account_router_generic;
use kernel::error::validation::FieldRule;

// ============================================================================
// In-memory collaborators
// ============================================================================

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    sessions: HashMap<SessionId, AuthSession>,
    notices: Vec<VerificationNotice>,
    profile_writes: usize,
}

#[derive(Clone, Default)]
struct InMemoryAccounts {
    store: Arc<Mutex<Store>>,
}

impl InMemoryAccounts {
    fn insert_user(&self, user: User) -> UserId {
        let user_id = user.user_id;
        self.store.lock().unwrap().users.insert(user_id, user);
        user_id
    }

    fn insert_session(&self, session: AuthSession) {
        self.store
            .lock()
            .unwrap()
            .sessions
            .insert(session.session_id, session);
    }

    fn user(&self, user_id: &UserId) -> User {
        self.store.lock().unwrap().users[user_id].clone()
    }

    fn has_session(&self, session_id: &SessionId) -> bool {
        self.store.lock().unwrap().sessions.contains_key(session_id)
    }

    fn notices(&self) -> Vec<VerificationNotice> {
        self.store.lock().unwrap().notices.clone()
    }

    fn profile_writes(&self) -> usize {
        self.store.lock().unwrap().profile_writes
    }
}

impl UserRepository for InMemoryAccounts {
    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        Ok(self.store.lock().unwrap().users.get(user_id).cloned())
    }

    async fn email_taken_by_other(&self, email: &Email, except: &UserId) -> AccountResult<bool> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .users
            .values()
            .any(|u| {
                u.email.as_str().to_lowercase() == email.as_str().to_lowercase()
                    && &u.user_id != except
            }))
    }

    async fn update_photo_path(&self, user_id: &UserId, path: &str) -> AccountResult<()> {
        let mut store = self.store.lock().unwrap();
        let user = store
            .users
            .get_mut(user_id)
            .ok_or(AccountError::UserNotFound)?;
        user.set_profile_photo_path(path);
        Ok(())
    }

    async fn apply_profile_changes(
        &self,
        user_id: &UserId,
        changes: &ProfileChanges,
    ) -> AccountResult<()> {
        let mut store = self.store.lock().unwrap();
        let user = store
            .users
            .get_mut(user_id)
            .ok_or(AccountError::UserNotFound)?;
        user.apply(changes, Utc::now());
        store.profile_writes += 1;
        Ok(())
    }

    async fn mark_email_verified(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> AccountResult<bool> {
        let mut store = self.store.lock().unwrap();
        let user = store
            .users
            .get_mut(user_id)
            .ok_or(AccountError::UserNotFound)?;
        Ok(user.verify_email(at))
    }
}

impl SessionRepository for InMemoryAccounts {
    async fn find_by_id(&self, session_id: &SessionId) -> AccountResult<Option<AuthSession>> {
        Ok(self.store.lock().unwrap().sessions.get(session_id).cloned())
    }

    async fn touch(&self, session_id: &SessionId) -> AccountResult<()> {
        if let Some(session) = self.store.lock().unwrap().sessions.get_mut(session_id) {
            session.touch();
        }
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> AccountResult<()> {
        self.store.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn delete_expired(&self) -> AccountResult<u64> {
        let mut store = self.store.lock().unwrap();
        let before = store.sessions.len();
        store.sessions.retain(|_, s| !s.is_expired());
        Ok((before - store.sessions.len()) as u64)
    }
}

impl VerificationNotifier for InMemoryAccounts {
    async fn notify(&self, notice: &VerificationNotice) -> AccountResult<()> {
        self.store.lock().unwrap().notices.push(notice.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct InMemoryPhotoStore {
    stored: Arc<Mutex<Vec<(UserId, usize, Option<String>)>>>,
    fail: bool,
}

impl InMemoryPhotoStore {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn stored(&self) -> Vec<(UserId, usize, Option<String>)> {
        self.stored.lock().unwrap().clone()
    }
}

impl ProfilePhotoStore for InMemoryPhotoStore {
    async fn store(
        &self,
        user_id: &UserId,
        photo: &ProfilePhoto,
        previous: Option<&str>,
    ) -> AccountResult<String> {
        if self.fail {
            return Err(AccountError::PhotoStorage("disk full".into()));
        }
        let mut stored = self.stored.lock().unwrap();
        stored.push((*user_id, photo.len(), previous.map(str::to_owned)));
        Ok(format!(
            "profile-photos/{}.{}",
            stored.len(),
            photo.extension()
        ))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    repo: InMemoryAccounts,
    photos: InMemoryPhotoStore,
    config: Arc<AccountConfig>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_photos(InMemoryPhotoStore::default())
    }

    fn with_photos(photos: InMemoryPhotoStore) -> Self {
        let config = AccountConfig {
            app_url: "https://ambulanc.test".to_string(),
            ..AccountConfig::development()
        };
        Self {
            repo: InMemoryAccounts::default(),
            photos,
            config: Arc::new(config),
        }
    }

    /// Registered, verified user that never completed the profile
    fn add_user(&self, email: &str, must_verify_email: bool) -> UserId {
        let mut user = User::new("registered", Email::new(email).unwrap(), must_verify_email);
        user.email_verified_at = Some(Utc::now() - Duration::days(1));
        self.repo.insert_user(user)
    }

    fn sign_in(&self, user_id: UserId) -> AuthSession {
        let session = AuthSession::new(user_id, Duration::hours(2));
        self.repo.insert_session(session.clone());
        session
    }

    fn token(&self, session: &AuthSession) -> String {
        session.token(&self.config.session_secret)
    }

    fn update_use_case(
        &self,
    ) -> UpdateProfileUseCase<InMemoryAccounts, InMemoryAccounts, InMemoryAccounts, InMemoryPhotoStore>
    {
        UpdateProfileUseCase::new(
            Arc::new(self.repo.clone()),
            Arc::new(self.repo.clone()),
            Arc::new(self.repo.clone()),
            Arc::new(self.photos.clone()),
            self.config.clone(),
        )
    }

    fn verify_use_case(&self) -> VerifyEmailUseCase<InMemoryAccounts> {
        VerifyEmailUseCase::new(Arc::new(self.repo.clone()), self.config.clone())
    }

    fn router(&self) -> Router {
        account_router_generic(
            self.repo.clone(),
            self.photos.clone(),
            (*self.config).clone(),
        )
    }
}

fn form(email: &str) -> UpdateProfileInput {
    UpdateProfileInput {
        firstname: Some("Jane".into()),
        middlename: Some("Quinn".into()),
        lastname: Some("Doe".into()),
        username: Some("jdoe".into()),
        email: Some(email.into()),
        landlinetel: Some("0611234567".into()),
        mobiletel: Some("06301234567".into()),
        photo: None,
        first_login: None,
    }
}

fn png(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len, 7);
    bytes
}

/// Split a verification URL back into its parts
fn link_input(url: &str) -> VerifyEmailInput {
    let (path, query) = url.split_once('?').unwrap();
    let mut segments = path.rsplit('/');
    let email_hash = segments.next().unwrap().to_string();
    let user_id = segments.next().unwrap().to_string();

    let mut expires = 0;
    let mut signature = String::new();
    for pair in query.split('&') {
        match pair.split_once('=').unwrap() {
            ("expires", v) => expires = v.parse().unwrap(),
            ("signature", v) => signature = v.to_string(),
            _ => {}
        }
    }

    VerifyEmailInput {
        user_id,
        email_hash,
        expires,
        signature,
    }
}

// ============================================================================
// Update profile
// ============================================================================

mod update_profile {
    use super::*;

    #[tokio::test]
    async fn test_unchanged_email_keeps_verification() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let verified_at = fx.repo.user(&user_id).email_verified_at;
        let session = fx.sign_in(user_id);

        let output = fx
            .update_use_case()
            .execute(&session, form("jane@example.com"))
            .await
            .unwrap();

        assert!(!output.verification_sent);
        let user = fx.repo.user(&user_id);
        assert_eq!(user.email_verified_at, verified_at);
        assert_eq!(user.firstname.as_deref(), Some("Jane"));
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.landlinetel.as_deref(), Some("0611234567"));
        assert!(fx.repo.notices().is_empty());
    }

    #[tokio::test]
    async fn test_email_case_change_requires_reverification() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let output = fx
            .update_use_case()
            .execute(&session, form("  Jane@Example.COM "))
            .await
            .unwrap();

        assert!(output.verification_sent);
        let user = fx.repo.user(&user_id);
        assert_eq!(user.email.as_str(), "Jane@Example.COM");
        assert!(user.email_verified_at.is_none());

        let notices = fx.repo.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].recipient.as_str(), "Jane@Example.COM");
    }

    #[tokio::test]
    async fn test_email_taken_ignores_case() {
        let fx = Fixture::new();
        fx.add_user("taken@example.com", true);
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let err = fx
            .update_use_case()
            .execute(&session, form("Taken@Example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn test_changed_email_clears_verification_and_notifies_once() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let output = fx
            .update_use_case()
            .execute(&session, form("jane.doe@example.org"))
            .await
            .unwrap();

        assert!(output.verification_sent);
        let user = fx.repo.user(&user_id);
        assert_eq!(user.email.as_str(), "jane.doe@example.org");
        assert!(user.email_verified_at.is_none());

        let notices = fx.repo.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].user_id, user_id);
        assert_eq!(notices[0].recipient.as_str(), "jane.doe@example.org");
        assert!(notices[0].verification_url.starts_with(&format!(
            "https://ambulanc.test/api/email/verify/{}/",
            user_id
        )));
    }

    #[tokio::test]
    async fn test_changed_email_without_verification_capability() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", false);
        let session = fx.sign_in(user_id);

        let output = fx
            .update_use_case()
            .execute(&session, form("jane.doe@example.org"))
            .await
            .unwrap();

        assert!(!output.verification_sent);
        let user = fx.repo.user(&user_id);
        assert_eq!(user.email.as_str(), "jane.doe@example.org");
        assert!(user.email_verified_at.is_some());
        assert!(fx.repo.notices().is_empty());
    }

    #[tokio::test]
    async fn test_first_completion_goes_straight_to_pending_approval() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let output = fx
            .update_use_case()
            .execute(&session, form("jane@example.com"))
            .await
            .unwrap();

        assert_eq!(output.first_login, FirstLogin::One);
        assert_eq!(output.status, AccountStatus::PendingApproval);
        let user = fx.repo.user(&user_id);
        assert_eq!(user.first_login, FirstLogin::One);
        assert_eq!(user.status, AccountStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_first_login_one_sets_pending_approval() {
        let fx = Fixture::new();
        let mut user = User::new("u", Email::new("jane@example.com").unwrap(), true);
        user.first_login = FirstLogin::One;
        user.status = AccountStatus::Registered;
        let user_id = fx.repo.insert_user(user);
        let session = fx.sign_in(user_id);

        fx.update_use_case()
            .execute(&session, form("jane@example.com"))
            .await
            .unwrap();

        let user = fx.repo.user(&user_id);
        assert_eq!(user.first_login, FirstLogin::One);
        assert_eq!(user.status, AccountStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_unexpected_first_login_leaves_status() {
        let fx = Fixture::new();
        let mut user = User::new("u", Email::new("jane@example.com").unwrap(), true);
        user.first_login = FirstLogin::Other(0);
        user.status = AccountStatus::Other(3);
        let user_id = fx.repo.insert_user(user);
        let session = fx.sign_in(user_id);

        fx.update_use_case()
            .execute(&session, form("jane@example.com"))
            .await
            .unwrap();

        let user = fx.repo.user(&user_id);
        assert_eq!(user.first_login, FirstLogin::Other(0));
        assert_eq!(user.status, AccountStatus::Other(3));
    }

    #[tokio::test]
    async fn test_session_ends_after_update() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let output = fx
            .update_use_case()
            .execute(&session, form("jane@example.com"))
            .await
            .unwrap();

        assert!(!fx.repo.has_session(&session.session_id));
        assert_eq!(output.redirect.as_str(), "login");
        assert!(output.acknowledgment.starts_with("Thank you, everything is set!"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_without_mutation() {
        let fx = Fixture::new();
        fx.add_user("taken@example.com", true);
        let user_id = fx.add_user("jane@example.com", true);
        let before = fx.repo.user(&user_id);
        let session = fx.sign_in(user_id);

        let err = fx
            .update_use_case()
            .execute(&session, form("taken@example.com"))
            .await
            .unwrap_err();

        match err {
            AccountError::EmailTaken(errors) => {
                assert_eq!(errors.bag(), "updateProfileInformation");
                assert!(errors.has("email", FieldRule::Unique));
            }
            other => panic!("expected EmailTaken, got {other:?}"),
        }

        let after = fx.repo.user(&user_id);
        assert_eq!(after.email, before.email);
        assert_eq!(after.status, before.status);
        assert_eq!(after.first_login, before.first_login);
        assert_eq!(fx.repo.profile_writes(), 0);
        assert!(fx.repo.has_session(&session.session_id));
        assert!(fx.repo.notices().is_empty());
    }

    #[tokio::test]
    async fn test_taken_email_with_other_failures_is_plain_validation() {
        let fx = Fixture::new();
        fx.add_user("taken@example.com", true);
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let err = fx
            .update_use_case()
            .execute(
                &session,
                UpdateProfileInput {
                    firstname: None,
                    ..form("taken@example.com")
                },
            )
            .await
            .unwrap_err();

        let AccountError::Validation(errors) = err else {
            panic!("expected Validation");
        };
        assert!(errors.has("firstname", FieldRule::Required));
        assert!(errors.has("email", FieldRule::Unique));
    }

    #[tokio::test]
    async fn test_username_length_boundary() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);

        let session = fx.sign_in(user_id);
        let err = fx
            .update_use_case()
            .execute(
                &session,
                UpdateProfileInput {
                    username: Some("u".repeat(256)),
                    ..form("jane@example.com")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(ref e) if e.has("username", FieldRule::Max)));
        assert_eq!(fx.repo.profile_writes(), 0);

        let session = fx.sign_in(user_id);
        fx.update_use_case()
            .execute(
                &session,
                UpdateProfileInput {
                    username: Some("u".repeat(255)),
                    ..form("jane@example.com")
                },
            )
            .await
            .unwrap();
        assert_eq!(fx.repo.user(&user_id).username.chars().count(), 255);
    }

    #[tokio::test]
    async fn test_photo_is_stored_before_profile_write() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        fx.update_use_case()
            .execute(
                &session,
                UpdateProfileInput {
                    photo: Some(png(2048)),
                    ..form("jane@example.com")
                },
            )
            .await
            .unwrap();

        assert_eq!(fx.photos.stored(), vec![(user_id, 2048, None)]);
        assert_eq!(
            fx.repo.user(&user_id).profile_photo_path.as_deref(),
            Some("profile-photos/1.png")
        );

        // A second upload hands over the previous path
        let session = fx.sign_in(user_id);
        fx.update_use_case()
            .execute(
                &session,
                UpdateProfileInput {
                    photo: Some(png(4096)),
                    ..form("jane@example.com")
                },
            )
            .await
            .unwrap();
        assert_eq!(
            fx.photos.stored()[1].2.as_deref(),
            Some("profile-photos/1.png")
        );
    }

    #[tokio::test]
    async fn test_invalid_photo_is_a_validation_error() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let err = fx
            .update_use_case()
            .execute(
                &session,
                UpdateProfileInput {
                    photo: Some(b"%PDF-1.7".to_vec()),
                    ..form("jane@example.com")
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::Validation(ref e) if e.has("photo", FieldRule::Image)));
        assert!(fx.photos.stored().is_empty());
    }

    #[tokio::test]
    async fn test_photo_storage_failure_propagates() {
        let fx = Fixture::with_photos(InMemoryPhotoStore::failing());
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let err = fx
            .update_use_case()
            .execute(
                &session,
                UpdateProfileInput {
                    photo: Some(png(64)),
                    ..form("jane@example.com")
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::PhotoStorage(_)));
        assert_eq!(fx.repo.profile_writes(), 0);
        assert!(fx.repo.has_session(&session.session_id));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let fx = Fixture::new();
        let session = AuthSession::new(UserId::new(), Duration::hours(1));

        let err = fx
            .update_use_case()
            .execute(&session, form("jane@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::UserNotFound));
    }
}

// ============================================================================
// Sessions
// ============================================================================

mod sessions {
    use super::*;

    fn check(fx: &Fixture) -> CheckSessionUseCase<InMemoryAccounts> {
        CheckSessionUseCase::new(Arc::new(fx.repo.clone()), fx.config.clone())
    }

    #[tokio::test]
    async fn test_valid_session() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        let found = check(&fx).get_session(&fx.token(&session)).await.unwrap();
        assert_eq!(found.session_id, session.session_id);
        assert_eq!(found.user_id, user_id);
    }

    #[tokio::test]
    async fn test_forged_token() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);
        let forged = session.token(&[42u8; 32]);

        assert!(!check(&fx).is_valid(&forged).await);
        assert!(!check(&fx).is_valid("not-a-token").await);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = AuthSession::new(user_id, Duration::seconds(-5));
        fx.repo.insert_session(session.clone());

        let err = check(&fx)
            .get_session(&fx.token(&session))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::SessionInvalid));
        assert!(!fx.repo.has_session(&session.session_id));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);

        SignOutUseCase::new(Arc::new(fx.repo.clone()), fx.config.clone())
            .execute(&fx.token(&session))
            .await
            .unwrap();

        assert!(!fx.repo.has_session(&session.session_id));
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let live = fx.sign_in(user_id);
        let dead = AuthSession::new(user_id, Duration::seconds(-1));
        fx.repo.insert_session(dead.clone());

        let deleted = SessionRepository::delete_expired(&fx.repo).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(fx.repo.has_session(&live.session_id));
        assert!(!fx.repo.has_session(&dead.session_id));
    }
}

// ============================================================================
// Email verification
// ============================================================================

mod verify_email {
    use super::*;

    async fn change_email(fx: &Fixture) -> (UserId, String) {
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);
        fx.update_use_case()
            .execute(&session, form("jane.doe@example.org"))
            .await
            .unwrap();
        let url = fx.repo.notices()[0].verification_url.clone();
        (user_id, url)
    }

    #[tokio::test]
    async fn test_link_verifies_once() {
        let fx = Fixture::new();
        let (user_id, url) = change_email(&fx).await;

        assert!(fx.verify_use_case().execute(link_input(&url)).await.unwrap());
        assert!(fx.repo.user(&user_id).email_verified_at.is_some());

        // Already verified
        assert!(!fx.verify_use_case().execute(link_input(&url)).await.unwrap());
    }

    #[tokio::test]
    async fn test_tampered_signature() {
        let fx = Fixture::new();
        let (_, url) = change_email(&fx).await;

        let mut input = link_input(&url);
        input.expires += 60;

        let err = fx.verify_use_case().execute(input).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidVerificationLink));
    }

    #[tokio::test]
    async fn test_link_for_superseded_address() {
        let fx = Fixture::new();
        let (user_id, url) = change_email(&fx).await;

        let session = fx.sign_in(user_id);
        fx.update_use_case()
            .execute(&session, form("third@example.net"))
            .await
            .unwrap();

        let err = fx
            .verify_use_case()
            .execute(link_input(&url))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidVerificationLink));
    }

    #[tokio::test]
    async fn test_expired_link() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let email = fx.repo.user(&user_id).email;
        let link = VerificationLink::issue(
            &fx.config.verification_key(),
            user_id,
            &email,
            Duration::minutes(60),
            Utc::now() - Duration::minutes(61),
        );

        let err = fx
            .verify_use_case()
            .execute(link_input(&link.url(&fx.config.app_url)))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::VerificationLinkExpired));
    }

    #[tokio::test]
    async fn test_link_signed_with_session_secret_is_rejected() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let email = fx.repo.user(&user_id).email;
        let link = VerificationLink::issue(
            &fx.config.session_secret,
            user_id,
            &email,
            Duration::minutes(60),
            Utc::now(),
        );

        let err = fx
            .verify_use_case()
            .execute(link_input(&link.url(&fx.config.app_url)))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidVerificationLink));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let fx = Fixture::new();
        let err = fx
            .verify_use_case()
            .execute(VerifyEmailInput {
                user_id: UserId::new().to_string(),
                email_hash: "x".into(),
                expires: 0,
                signature: "y".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserNotFound));

        let err = fx
            .verify_use_case()
            .execute(VerifyEmailInput {
                user_id: "not-a-uuid".into(),
                email_hash: "x".into(),
                expires: 0,
                signature: "y".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidVerificationLink));
    }
}

// ============================================================================
// Router
// ============================================================================

mod router {
    use super::*;

    const BOUNDARY: &str = "----profile-form-boundary";

    fn multipart(fields: &[(&str, &str)], photo: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(bytes) = photo {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn complete_form(email: &str) -> Vec<(&'static str, String)> {
        vec![
            ("firstname", "Jane".into()),
            ("middlename", "Quinn".into()),
            ("lastname", "Doe".into()),
            ("username", "jdoe".into()),
            ("email", email.into()),
            ("landlinetel", "0611234567".into()),
            ("mobiletel", "06301234567".into()),
        ]
    }

    fn put_profile(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("PUT")
            .uri("/user/profile-information")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("account_session={token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_onboarding() {
        let fx = Fixture::new();
        let response = fx
            .router()
            .oneshot(
                Request::builder()
                    .uri("/onboarding")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["title"], "Welcome to Ambulánc!");
        assert_eq!(body["steps"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_profile_update_requires_session() {
        let fx = Fixture::new();
        let fields = complete_form("jane@example.com");
        let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response = fx
            .router()
            .oneshot(put_profile(None, multipart(&fields, None)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_update_success() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);
        let token = fx.token(&session);
        let fields = complete_form("jane.doe@example.org");
        let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response = fx
            .router()
            .oneshot(put_profile(
                Some(&token),
                multipart(&fields, Some(png(512).as_slice())),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("account_session=;"));
        assert!(cookie.contains("Max-Age=0"));

        let body = json(response).await;
        assert_eq!(body["redirect"], "login");
        assert_eq!(body["verificationSent"], true);
        assert_eq!(body["status"], 2);
        assert_eq!(body["firstLogin"], 1);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("approval of your account")
        );

        let user = fx.repo.user(&user_id);
        assert_eq!(user.email.as_str(), "jane.doe@example.org");
        assert!(user.profile_photo_path.is_some());
        assert!(!fx.repo.has_session(&session.session_id));
    }

    #[tokio::test]
    async fn test_profile_update_validation_errors() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);
        let token = fx.token(&session);

        let response = fx
            .router()
            .oneshot(put_profile(
                Some(&token),
                multipart(&[("email", "not-an-email"), ("first_login", "2")], None),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json(response).await;
        let bag = &body["errors"]["updateProfileInformation"];
        assert_eq!(bag["firstname"][0], "The firstname field is required.");
        assert_eq!(bag["email"][0], "The email must be a valid email address.");
        assert_eq!(bag["first_login"][0], "The first login must not be greater than 1.");
        assert!(fx.repo.has_session(&session.session_id));
    }

    #[tokio::test]
    async fn test_verify_link_route() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);
        fx.update_use_case()
            .execute(&session, form("jane.doe@example.org"))
            .await
            .unwrap();
        let url = fx.repo.notices()[0].verification_url.clone();
        let (_, path) = url.split_once("/api").unwrap();

        let response = fx
            .router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(fx.repo.user(&user_id).email_verified_at.is_some());
    }

    #[tokio::test]
    async fn test_sign_out_route() {
        let fx = Fixture::new();
        let user_id = fx.add_user("jane@example.com", true);
        let session = fx.sign_in(user_id);
        let token = fx.token(&session);

        let response = fx
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/signout")
                    .header(header::COOKIE, format!("account_session={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        assert!(!fx.repo.has_session(&session.session_id));
    }
}

//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    auth_session::AuthSession,
    user::{ProfileChanges, User, VerifiedAtChange},
    verification_link::VerificationNotice,
};
use crate::domain::profile_form;
use crate::domain::repository::{SessionRepository, UserRepository, VerificationNotifier};
use crate::domain::value_object::{
    approval::{AccountStatus, FirstLogin},
    email::Email,
    user_id::{NotificationId, SessionId, UserId},
};
use crate::error::{AccountError, AccountResult};

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
    must_verify_email: bool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            must_verify_email: true,
        }
    }

    /// Whether loaded users must re-confirm a changed address
    pub fn verifying_email(mut self, must_verify_email: bool) -> Self {
        self.must_verify_email = must_verify_email;
        self
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AccountResult<u64> {
        let deleted = self.delete_expired().await?;

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAccountRepository {
    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                email,
                email_verified_at,
                firstname,
                middlename,
                lastname,
                landlinetel,
                mobiletel,
                profile_photo_path,
                first_login,
                status,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_user(self.must_verify_email)))
    }

    async fn email_taken_by_other(&self, email: &Email, except: &UserId) -> AccountResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND user_id <> $2)",
        )
        .bind(email.as_str())
        .bind(except.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update_photo_path(&self, user_id: &UserId, path: &str) -> AccountResult<()> {
        sqlx::query("UPDATE users SET profile_photo_path = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(path)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn apply_profile_changes(
        &self,
        user_id: &UserId,
        changes: &ProfileChanges,
    ) -> AccountResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                firstname = $2,
                middlename = $3,
                lastname = $4,
                username = $5,
                email = $6,
                landlinetel = $7,
                mobiletel = $8,
                first_login = $9,
                status = $10,
                email_verified_at = CASE WHEN $11 THEN NULL ELSE email_verified_at END,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(changes.firstname.as_str())
        .bind(changes.middlename.as_str())
        .bind(changes.lastname.as_str())
        .bind(changes.username.as_str())
        .bind(changes.email.as_str())
        .bind(changes.landlinetel.as_str())
        .bind(changes.mobiletel.as_str())
        .bind(changes.approval.first_login.to_db())
        .bind(changes.approval.status.id())
        .bind(changes.email_verified_at == VerifiedAtChange::Clear)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(AccountError::UserNotFound),
            Ok(_) => Ok(()),
            // Lost a race with another user claiming the same address
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AccountError::EmailTaken(profile_form::email_taken()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn mark_email_verified(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> AccountResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET email_verified_at = $2, updated_at = $2
            WHERE user_id = $1 AND email_verified_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAccountRepository {
    async fn find_by_id(&self, session_id: &SessionId) -> AccountResult<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                expires_at,
                created_at,
                last_activity_at
            FROM auth_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }

    async fn touch(&self, session_id: &SessionId) -> AccountResult<()> {
        sqlx::query("UPDATE auth_sessions SET last_activity_at = NOW() WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> AccountResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self) -> AccountResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Verification Outbox
// ============================================================================

impl VerificationNotifier for PgAccountRepository {
    async fn notify(&self, notice: &VerificationNotice) -> AccountResult<()> {
        let payload = serde_json::to_value(notice)
            .map_err(|e| AccountError::Internal(format!("Invalid notice payload: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO notification_outbox (
                notification_id,
                user_id,
                kind,
                recipient,
                payload
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(NotificationId::new().into_uuid())
        .bind(notice.user_id.as_uuid())
        .bind(VerificationNotice::KIND)
        .bind(notice.recipient.as_str())
        .bind(payload)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %notice.user_id, "Verification notice queued");

        Ok(())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    email_verified_at: Option<DateTime<Utc>>,
    firstname: Option<String>,
    middlename: Option<String>,
    lastname: Option<String>,
    landlinetel: Option<String>,
    mobiletel: Option<String>,
    profile_photo_path: Option<String>,
    first_login: Option<i32>,
    status: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, must_verify_email: bool) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            username: self.username,
            email: Email::from_db(self.email),
            email_verified_at: self.email_verified_at,
            firstname: self.firstname,
            middlename: self.middlename,
            lastname: self.lastname,
            landlinetel: self.landlinetel,
            mobiletel: self.mobiletel,
            profile_photo_path: self.profile_photo_path,
            first_login: FirstLogin::from_db(self.first_login),
            status: AccountStatus::from_id(self.status),
            must_verify_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: UserId::from_uuid(self.user_id),
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}

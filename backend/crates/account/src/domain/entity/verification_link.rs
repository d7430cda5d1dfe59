//! Verification Link
//!
//! Signed, expiring URL that confirms a user owns an email address.
//!
//! ```text
//! {app_url}/api/email/verify/{user_id}/{email_hash}?expires={unix}&signature={sig}
//!
//! email_hash = base64url(sha256(email))
//! sig        = base64url(hmac_sha256(secret, "{user_id}.{email_hash}.{expires}"))
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::value_object::{email::Email, user_id::UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Verification link signature is invalid")]
    BadSignature,
    #[error("Verification link has expired")]
    Expired,
    #[error("Verification link does not match the current email address")]
    EmailMismatch,
}

/// Hash identifying an address inside a link without exposing it
pub fn email_hash(email: &Email) -> String {
    platform::crypto::to_base64url(&platform::crypto::sha256(email.as_str().as_bytes()))
}

fn signed_payload(user_id: &UserId, email_hash: &str, expires: i64) -> String {
    format!("{}.{}.{}", user_id, email_hash, expires)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationLink {
    pub user_id: UserId,
    pub email_hash: String,
    pub expires: i64,
    pub signature: String,
}

impl VerificationLink {
    pub fn issue(
        secret: &[u8],
        user_id: UserId,
        email: &Email,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let email_hash = email_hash(email);
        let expires = (now + ttl).timestamp();
        let signature =
            platform::crypto::sign(secret, &signed_payload(&user_id, &email_hash, expires));
        Self {
            user_id,
            email_hash,
            expires,
            signature,
        }
    }

    pub fn url(&self, app_url: &str) -> String {
        format!(
            "{}/api/email/verify/{}/{}?expires={}&signature={}",
            app_url.trim_end_matches('/'),
            self.user_id,
            self.email_hash,
            self.expires,
            self.signature
        )
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires, 0).single()
    }

    /// Signature first, then expiry, then the address itself
    pub fn check(&self, secret: &[u8], email: &Email, now: DateTime<Utc>) -> Result<(), LinkError> {
        let payload = signed_payload(&self.user_id, &self.email_hash, self.expires);
        if !platform::crypto::verify(secret, &payload, &self.signature) {
            return Err(LinkError::BadSignature);
        }
        if now.timestamp() > self.expires {
            return Err(LinkError::Expired);
        }
        if self.email_hash != email_hash(email) {
            return Err(LinkError::EmailMismatch);
        }
        Ok(())
    }
}

/// Payload queued for the notification worker
#[derive(Debug, Clone, Serialize)]
pub struct VerificationNotice {
    #[serde(skip)]
    pub user_id: UserId,
    #[serde(skip)]
    pub recipient: Email,
    pub verification_url: String,
    pub expires_at: DateTime<Utc>,
}

impl VerificationNotice {
    pub const KIND: &'static str = "verify_email";

    pub fn new(link: &VerificationLink, recipient: Email, app_url: &str) -> Self {
        Self {
            user_id: link.user_id,
            recipient,
            verification_url: link.url(app_url),
            expires_at: link.expires_at().unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"verification-secret";

    fn email(s: &str) -> Email {
        Email::new(s).unwrap()
    }

    #[test]
    fn test_issue_and_check() {
        let now = Utc::now();
        let address = email("jane@example.com");
        let link = VerificationLink::issue(SECRET, UserId::new(), &address, Duration::minutes(60), now);

        assert_eq!(link.expires, (now + Duration::minutes(60)).timestamp());
        assert_eq!(link.check(SECRET, &address, now), Ok(()));
    }

    #[test]
    fn test_expired() {
        let now = Utc::now();
        let address = email("jane@example.com");
        let link = VerificationLink::issue(SECRET, UserId::new(), &address, Duration::minutes(60), now);

        let later = now + Duration::minutes(61);
        assert_eq!(link.check(SECRET, &address, later), Err(LinkError::Expired));
    }

    #[test]
    fn test_tampered() {
        let now = Utc::now();
        let address = email("jane@example.com");
        let mut link =
            VerificationLink::issue(SECRET, UserId::new(), &address, Duration::minutes(60), now);
        link.expires += 3600;

        assert_eq!(
            link.check(SECRET, &address, now),
            Err(LinkError::BadSignature)
        );
    }

    #[test]
    fn test_email_changed_since_issue() {
        let now = Utc::now();
        let link = VerificationLink::issue(
            SECRET,
            UserId::new(),
            &email("jane@example.com"),
            Duration::minutes(60),
            now,
        );

        assert_eq!(
            link.check(SECRET, &email("other@example.com"), now),
            Err(LinkError::EmailMismatch)
        );
    }

    #[test]
    fn test_url_shape() {
        let now = Utc::now();
        let user_id = UserId::new();
        let link =
            VerificationLink::issue(SECRET, user_id, &email("a@b.co"), Duration::minutes(60), now);
        let url = link.url("https://app.test/");

        assert!(url.starts_with(&format!("https://app.test/api/email/verify/{}/", user_id)));
        assert!(url.contains(&format!("?expires={}&signature=", link.expires)));
    }

    #[test]
    fn test_notice_payload() {
        let now = Utc::now();
        let link =
            VerificationLink::issue(SECRET, UserId::new(), &email("a@b.co"), Duration::minutes(60), now);
        let notice = VerificationNotice::new(&link, email("a@b.co"), "https://app.test");
        let json = serde_json::to_value(&notice).unwrap();

        assert_eq!(json["verification_url"], link.url("https://app.test"));
        assert!(json.get("recipient").is_none());
    }
}

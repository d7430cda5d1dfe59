//! Application Configuration
//!
//! Configuration for the Account application layer.

use std::path::PathBuf;
use std::time::Duration;

use platform::cookie::CookieConfig;

const VERIFICATION_KEY_LABEL: &str = "verify-email";

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Account application configuration
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Secret key for session tokens and verification links (32 bytes)
    pub session_secret: [u8; 32],
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Cookie path
    pub cookie_path: String,
    /// Public base URL used in verification links
    pub app_url: String,
    /// Verification link lifetime (60 minutes)
    pub verification_ttl: Duration,
    /// Root directory for stored profile photos
    pub photo_dir: PathBuf,
    /// Largest accepted profile photo
    pub photo_max_kilobytes: u64,
    /// Request body limit for the profile form
    pub upload_body_limit: usize,
    /// Whether users must re-confirm a changed email address
    pub must_verify_email: bool,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "account_session".to_string(),
            session_secret: [0u8; 32],
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            cookie_path: "/".to_string(),
            app_url: "http://localhost:3000".to_string(),
            verification_ttl: Duration::from_secs(60 * 60), // 60 minutes
            photo_dir: PathBuf::from("storage/public"),
            photo_max_kilobytes: 1024,
            upload_body_limit: 8 * 1024 * 1024, // 8 MiB
            must_verify_email: true,
        }
    }
}

impl AccountConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_bytes(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Cookie attributes for the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: self.cookie_path.clone(),
            max_age_secs: None,
        }
    }

    /// Key for signing email verification links, derived from the session secret
    pub fn verification_key(&self) -> [u8; 32] {
        platform::crypto::derive_key(&self.session_secret, VERIFICATION_KEY_LABEL)
    }

    /// Verification link TTL as a chrono duration
    pub fn verification_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.verification_ttl)
            .unwrap_or_else(|_| chrono::Duration::minutes(60))
    }
}

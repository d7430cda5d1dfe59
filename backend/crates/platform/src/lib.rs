//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC-signed tokens, Base64url)
//! - Cookie management
//! - Image format detection for uploads (`image` crate)

pub mod cookie;
pub mod crypto;
pub mod image;

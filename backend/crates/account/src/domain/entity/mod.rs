//! Entity Module

pub mod auth_session;
pub mod user;
pub mod verification_link;

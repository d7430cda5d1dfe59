//! Value Object Module

pub mod approval;
pub mod bounded_text;
pub mod email;
pub mod profile_photo;
pub mod user_id;

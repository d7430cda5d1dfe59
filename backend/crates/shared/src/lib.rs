//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every backend crate agrees on:
//! - Unified error type, error classification and result alias
//! - Field-level validation reports (named error bags)
//! - Typed ID wrappers
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
    pub mod validation;
}
pub mod id;

//! Infrastructure Layer
//!
//! Database implementations and file storage.

pub mod photo_store;
pub mod postgres;

pub use photo_store::FsPhotoStore;
pub use postgres::PgAccountRepository;

//! Filesystem Profile Photo Store
//!
//! Photos are content addressed inside a per-user directory:
//! `{root}/profile-photos/{user_id}/{base64url(sha256(bytes))}.{ext}`.
//! The stored path is relative to `root`. Files are written to a temporary
//! name first and renamed into place. A replaced photo is removed only from
//! the uploader's own directory, so identical uploads never share a file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::repository::ProfilePhotoStore;
use crate::domain::value_object::{profile_photo::ProfilePhoto, user_id::UserId};
use crate::error::{AccountError, AccountResult};

/// Subdirectory holding profile photos
pub const PHOTO_DIR: &str = "profile-photos";

/// Profile photos on the local filesystem
#[derive(Debug, Clone)]
pub struct FsPhotoStore {
    root: PathBuf,
}

impl FsPhotoStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(user_id: &UserId) -> String {
        format!("{}/{}", PHOTO_DIR, user_id)
    }

    fn relative_path(user_id: &UserId, photo: &ProfilePhoto) -> String {
        let digest = platform::crypto::sha256(photo.bytes());
        format!(
            "{}/{}.{}",
            Self::user_dir(user_id),
            platform::crypto::to_base64url(&digest),
            photo.extension()
        )
    }

    /// Only paths this store produced for `user_id` are ever removed
    fn owned(&self, user_id: &UserId, relative: &str) -> Option<PathBuf> {
        let name = relative
            .strip_prefix(&Self::user_dir(user_id))?
            .strip_prefix('/')?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> AccountError {
    AccountError::PhotoStorage(format!("{} {}: {}", action, path.display(), e))
}

impl ProfilePhotoStore for FsPhotoStore {
    async fn store(
        &self,
        user_id: &UserId,
        photo: &ProfilePhoto,
        previous: Option<&str>,
    ) -> AccountResult<String> {
        let dir = self.root.join(Self::user_dir(user_id));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("create", &dir, e))?;

        let relative = Self::relative_path(user_id, photo);
        let target = self.root.join(&relative);
        let staging = dir.join(format!(".{}.upload", uuid::Uuid::new_v4()));

        tokio::fs::write(&staging, photo.bytes())
            .await
            .map_err(|e| storage_error("write", &staging, e))?;
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(storage_error("rename", &target, e));
        }

        if let Some(old) = previous
            .filter(|p| *p != relative)
            .and_then(|p| self.owned(user_id, p))
        {
            match tokio::fs::remove_file(&old).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %e,
                        "Failed to remove previous profile photo"
                    );
                }
            }
        }

        tracing::debug!(
            user_id = %user_id,
            path = %relative,
            bytes = photo.len(),
            "Profile photo stored"
        );

        Ok(relative)
    }
}

//! Profile Photo Value Object
//!
//! An uploaded image whose format was recognised from its bytes and whose
//! size is within the configured limit.

use platform::image::{self, ImageFormat};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProfilePhotoError {
    #[error("Upload is not a supported image")]
    NotAnImage,
    #[error("Image must be at most {max_kilobytes} KiB")]
    TooLarge { max_kilobytes: u64 },
}

/// Validated image payload
#[derive(Clone, PartialEq, Eq)]
pub struct ProfilePhoto {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ProfilePhoto {
    /// Size is compared in whole kilobytes, rounded up
    pub fn new(bytes: Vec<u8>, max_kilobytes: u64) -> Result<Self, ProfilePhotoError> {
        let format = image::sniff(&bytes).ok_or(ProfilePhotoError::NotAnImage)?;

        let kilobytes = (bytes.len() as u64).div_ceil(1024);
        if kilobytes > max_kilobytes {
            return Err(ProfilePhotoError::TooLarge { max_kilobytes });
        }

        Ok(Self { bytes, format })
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// File extension for the detected format
    #[inline]
    pub fn extension(&self) -> &'static str {
        image::extension(self.format)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ProfilePhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilePhoto")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(total_len: usize) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(total_len, 0);
        bytes
    }

    #[test]
    fn test_accepts_image_at_limit() {
        let photo = ProfilePhoto::new(png(1024 * 1024), 1024).unwrap();
        assert_eq!(photo.format(), ImageFormat::Png);
        assert_eq!(photo.len(), 1024 * 1024);
    }

    #[test]
    fn test_rejects_image_over_limit() {
        assert_eq!(
            ProfilePhoto::new(png(1024 * 1024 + 1), 1024),
            Err(ProfilePhotoError::TooLarge { max_kilobytes: 1024 })
        );
    }

    #[test]
    fn test_extension_follows_detected_format() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
        jpeg.resize(128, 0);
        let photo = ProfilePhoto::new(jpeg, 1024).unwrap();
        assert_eq!(photo.format(), ImageFormat::Jpeg);
        assert_eq!(photo.extension(), "jpg");
    }

    #[test]
    fn test_rejects_non_image() {
        assert_eq!(
            ProfilePhoto::new(b"just some text".to_vec(), 1024),
            Err(ProfilePhotoError::NotAnImage)
        );
    }

    #[test]
    fn test_debug_omits_bytes() {
        let photo = ProfilePhoto::new(png(64), 1024).unwrap();
        let debug = format!("{:?}", photo);
        assert!(debug.contains("len: 64"));
    }
}

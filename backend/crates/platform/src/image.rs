//! Image Payload Detection
//!
//! Uploads are classified by their leading bytes through `image::guess_format`,
//! never by the file name or the client-declared content type.

pub use ::image::ImageFormat;

/// Formats accepted as profile images
pub const ACCEPTED_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::WebP,
];

/// Detect an accepted image format from the payload
pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
    let format = ::image::guess_format(bytes).ok()?;
    ACCEPTED_FORMATS.contains(&format).then_some(format)
}

/// File extension used when storing the image
pub fn extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}

pub fn mime(format: ImageFormat) -> &'static str {
    format.to_mime_type()
}

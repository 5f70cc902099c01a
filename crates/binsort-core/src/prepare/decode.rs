//! Image decoding with content-based format detection.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::error::ImageError;

/// Decode an in-memory image, guessing the format from its bytes.
///
/// Synchronous; callers run it inside `spawn_blocking`.
pub fn decode_bytes(bytes: &[u8], name: &str) -> Result<DynamicImage, ImageError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode {
            name: name.to_string(),
            message: format!("Cannot detect image format: {e}"),
        })?;
    if reader.format().is_none() {
        return Err(ImageError::UnsupportedFormat {
            name: name.to_string(),
        });
    }
    reader.decode().map_err(|e| ImageError::Decode {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Convert an ImageFormat to the identifier used by [`crate::vision::ImageInput`].
pub fn format_to_string(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        _ => "unknown",
    }
}

//! Downscaling and JPEG re-encoding of decoded images.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::ImageError;

/// Shrinks an image to a bounding box and re-encodes it as baseline JPEG.
pub struct JpegNormalizer {
    max_size: u32,
    quality: u8,
}

impl JpegNormalizer {
    pub fn new(max_size: u32, quality: u8) -> Self {
        Self { max_size, quality }
    }

    /// Fit the image inside `max_size` x `max_size` (never upscaling),
    /// drop alpha, and encode as JPEG.
    pub fn normalize(&self, image: &DynamicImage, name: &str) -> Result<Vec<u8>, ImageError> {
        let resized;
        let image = if image.width() > self.max_size || image.height() > self.max_size {
            resized = image.thumbnail(self.max_size, self.max_size);
            &resized
        } else {
            image
        };

        let rgb = image.to_rgb8();
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.quality)
            .encode_image(&rgb)
            .map_err(|e| ImageError::Encode {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(buffer)
    }
}

//! Image preparation before detection.
//!
//! - **validate**: size limit and format sniffing on raw bytes
//! - **decode**: content-based decoding
//! - **encode**: downscale + JPEG re-encode
//! - **files**: collecting image files from disk

pub mod decode;
pub mod encode;
pub mod files;
pub mod validate;

pub use encode::JpegNormalizer;
pub use files::{read_upload, FileCollector};
pub use validate::Validator;

use std::time::Duration;
use tokio::time::timeout;

use crate::config::{ImageConfig, LimitsConfig};
use crate::error::ImageError;
use crate::types::UploadedFile;
use crate::vision::ImageInput;

use decode::{decode_bytes, format_to_string};

/// Turns uploaded bytes into the payload sent to the vision service.
///
/// With optimization on, uploads are decoded, bounded to `max_size` on the
/// longest edge and re-encoded as JPEG; otherwise the validated bytes are
/// forwarded unchanged.
pub struct ImagePreparer {
    image: ImageConfig,
    limits: LimitsConfig,
    validator: Validator,
}

impl ImagePreparer {
    pub fn new(image: ImageConfig, limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            image,
            limits,
        }
    }

    /// Validate and (optionally) normalize one upload.
    pub async fn prepare(&self, file: &UploadedFile) -> Result<ImageInput, ImageError> {
        let format = self.validator.validate(&file.name, &file.bytes)?;

        if !self.image.optimize {
            return Ok(ImageInput::from_bytes(&file.bytes, format_to_string(format)));
        }

        let bytes = file.bytes.clone();
        let name = file.name.clone();
        let max_dim = self.limits.max_image_dimension;
        let normalizer = JpegNormalizer::new(self.image.max_size, self.image.quality);
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let start = std::time::Instant::now();
        let result = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || {
                let image = decode_bytes(&bytes, &name)?;
                if image.width() > max_dim || image.height() > max_dim {
                    return Err(ImageError::ImageTooLarge {
                        name,
                        width: image.width(),
                        height: image.height(),
                        max_dim,
                    });
                }
                normalizer.normalize(&image, &name)
            }),
        )
        .await;

        let jpeg = match result {
            Ok(Ok(inner)) => inner?,
            Ok(Err(e)) => {
                return Err(ImageError::Decode {
                    name: file.name.clone(),
                    message: format!("Task join error: {e}"),
                })
            }
            Err(_) => {
                return Err(ImageError::Timeout {
                    name: file.name.clone(),
                    timeout_ms: self.limits.decode_timeout_ms,
                })
            }
        };

        tracing::debug!(
            "Prepared {}: {} -> {} bytes in {:?}",
            file.name,
            file.bytes.len(),
            jpeg.len(),
            start.elapsed()
        );
        Ok(ImageInput::from_bytes(&jpeg, "jpeg"))
    }
}

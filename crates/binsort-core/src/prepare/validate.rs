//! Cheap checks on raw upload bytes before any decoding.

use image::ImageFormat;

use crate::config::LimitsConfig;
use crate::error::ImageError;

/// Validates uploads before they are decoded or sent out.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check the upload size and sniff its format from the leading bytes.
    pub fn validate(&self, name: &str, bytes: &[u8]) -> Result<ImageFormat, ImageError> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes.len() as u64 > max_bytes {
            return Err(ImageError::FileTooLarge {
                name: name.to_string(),
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if bytes.len() < 4 {
            return Err(ImageError::Decode {
                name: name.to_string(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniffs_png() {
        let validator = Validator::new(LimitsConfig::default());
        let format = validator.validate("a.png", &PNG_HEADER).unwrap();
        assert_eq!(format, ImageFormat::Png);
    }

    #[test]
    fn test_sniffs_jpeg_regardless_of_name() {
        let validator = Validator::new(LimitsConfig::default());
        let format = validator
            .validate("upload.bin", &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0])
            .unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_rejects_unknown_bytes() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate("notes.txt", b"hello world").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_rejects_tiny_file() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate("x.jpg", &[0xFF]).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_huge_limit_does_not_overflow() {
        let limits = LimitsConfig {
            max_file_size_mb: u64::MAX,
            ..LimitsConfig::default()
        };
        let validator = Validator::new(limits);
        assert_eq!(
            validator.validate("a.png", &PNG_HEADER).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let validator = Validator::new(limits);
        let mut bytes = vec![0u8; 2 * 1024 * 1024];
        bytes[..8].copy_from_slice(&PNG_HEADER);
        let err = validator.validate("big.png", &bytes).unwrap_err();
        assert!(matches!(
            err,
            ImageError::FileTooLarge {
                size_mb: 2,
                max_mb: 1,
                ..
            }
        ));
    }
}

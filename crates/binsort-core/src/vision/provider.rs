//! Vision provider trait and the factory that builds providers from config.

use crate::config::DetectionConfig;
use crate::error::{DetectionError, DetectionResult};
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to a vision API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tiff" => "image/tiff",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }
}

/// Trait that all vision backends implement.
///
/// Object localization and label detection are two vocabularies served by the
/// same backend; callers never mix their results within one decision.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "google").
    fn name(&self) -> &str;

    /// Names of objects localized in the image, in the order reported.
    async fn object_localization(&self, image: &ImageInput) -> DetectionResult;

    /// Whole-image descriptive labels, in the order reported.
    async fn label_detection(&self, image: &ImageInput) -> DetectionResult;

    /// Transport-level timeout for this provider's HTTP client.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Name of the environment variable a `${VAR}` reference points at.
fn env_var_name(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        value[2..value.len() - 1].to_string()
    } else {
        "GOOGLE_VISION_API_KEY".to_string()
    }
}

/// Factory that creates the configured provider.
pub struct VisionProviderFactory;

impl VisionProviderFactory {
    /// Create a vision provider from the detection config.
    ///
    /// `provider_override` replaces `config.provider` when given.
    pub fn create(
        config: &DetectionConfig,
        provider_override: Option<&str>,
    ) -> Result<Box<dyn VisionProvider>, DetectionError> {
        let provider = provider_override.unwrap_or(&config.provider);
        match provider {
            "google" => {
                let cfg = &config.google;
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    DetectionError::MissingApiKey {
                        provider: "google".to_string(),
                        env_var: env_var_name(&cfg.api_key),
                    }
                })?;
                Ok(Box::new(super::google::GoogleVisionProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    config.max_results,
                )))
            }
            other => Err(DetectionError::UnknownProvider(other.to_string())),
        }
    }
}

//! Detection gateway: one bounded call per invocation, failures as values.

use super::provider::{ImageInput, VisionProvider};
use crate::error::{DetectionError, DetectionResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wraps a [`VisionProvider`] with a per-call timeout and logging.
///
/// Every method issues exactly one provider call and never retries; a timeout
/// becomes [`DetectionError::Timeout`] like any other failure.
#[derive(Clone)]
pub struct DetectionGateway {
    provider: Arc<dyn VisionProvider>,
    timeout_ms: u64,
}

impl DetectionGateway {
    pub fn new(provider: Box<dyn VisionProvider>, timeout_ms: u64) -> Self {
        Self {
            provider: Arc::from(provider),
            timeout_ms,
        }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Spatially localized object names.
    pub async fn detect_objects(&self, image: &ImageInput) -> DetectionResult {
        self.bounded(
            "object_localization",
            image,
            self.provider.object_localization(image),
        )
        .await
    }

    /// Whole-image descriptive labels.
    pub async fn detect_labels(&self, image: &ImageInput) -> DetectionResult {
        self.bounded("label_detection", image, self.provider.label_detection(image))
            .await
    }

    async fn bounded<F>(&self, stage: &str, image: &ImageInput, call: F) -> DetectionResult
    where
        F: std::future::Future<Output = DetectionResult>,
    {
        let start = Instant::now();
        let result = match tokio::time::timeout(Duration::from_millis(self.timeout_ms), call).await
        {
            Ok(result) => result,
            Err(_) => Err(DetectionError::Timeout {
                stage: stage.to_string(),
                timeout_ms: self.timeout_ms,
            }),
        };

        match &result {
            Ok(labels) => tracing::debug!(
                "{} {stage} on {} ({} bytes base64): {} result(s) in {:?}",
                self.provider.name(),
                image.media_type,
                image.data.len(),
                labels.len(),
                start.elapsed()
            ),
            Err(e) => tracing::debug!("{} {stage} failed: {e}", self.provider.name()),
        }
        result
    }
}

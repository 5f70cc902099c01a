//! Google Cloud Vision provider using the `images:annotate` REST endpoint.
//!
//! Sends the base64 image inline with a single feature per request, so each
//! gateway call maps to exactly one HTTP round trip.

use super::provider::{ImageInput, VisionProvider};
use crate::error::{DetectionError, DetectionResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const PROVIDER: &str = "google";

/// Google Cloud Vision provider authenticated with an API key.
pub struct GoogleVisionProvider {
    endpoint: String,
    api_key: String,
    max_results: u32,
    client: reqwest::Client,
}

impl GoogleVisionProvider {
    pub fn new(endpoint: &str, api_key: &str, max_results: u32) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_results,
            client: reqwest::Client::new(),
        }
    }

    async fn annotate(
        &self,
        image: &ImageInput,
        feature: Feature,
    ) -> Result<AnnotateImageResponse, DetectionError> {
        let url = format!("{}/images:annotate", self.endpoint);
        let start = Instant::now();

        let body = BatchAnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: RequestImage {
                    content: image.data.clone(),
                },
                features: vec![FeatureRequest {
                    feature_type: feature,
                    max_results: self.max_results,
                }],
            }],
        };

        let resp = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| DetectionError::Transport {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or(text);
            return Err(DetectionError::Service {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {status}: {message}"),
                status_code: Some(status.as_u16()),
            });
        }

        let batch: BatchAnnotateResponse =
            resp.json().await.map_err(|e| DetectionError::MalformedResponse {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;

        let response = batch.responses.into_iter().next().ok_or_else(|| {
            DetectionError::MalformedResponse {
                provider: PROVIDER.to_string(),
                message: "empty responses array".to_string(),
            }
        })?;

        if let Some(error) = response.error.as_ref().filter(|e| !e.message.is_empty()) {
            return Err(DetectionError::Service {
                provider: PROVIDER.to_string(),
                message: error.message.clone(),
                status_code: None,
            });
        }

        tracing::debug!(
            "{} {:?} answered in {:?}",
            PROVIDER,
            feature,
            start.elapsed()
        );
        Ok(response)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct BatchAnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: RequestImage,
    features: Vec<FeatureRequest>,
}

#[derive(Serialize)]
struct RequestImage {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureRequest {
    #[serde(rename = "type")]
    feature_type: Feature,
    max_results: u32,
}

#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Feature {
    ObjectLocalization,
    LabelDetection,
}

// --- Response types ---

#[derive(Deserialize)]
struct BatchAnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AnnotateImageResponse {
    localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    label_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct LocalizedObjectAnnotation {
    name: String,
}

#[derive(Deserialize)]
struct EntityAnnotation {
    description: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Status,
}

#[async_trait]
impl VisionProvider for GoogleVisionProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn object_localization(&self, image: &ImageInput) -> DetectionResult {
        let response = self.annotate(image, Feature::ObjectLocalization).await?;
        Ok(response
            .localized_object_annotations
            .into_iter()
            .map(|o| o.name)
            .collect())
    }

    async fn label_detection(&self, image: &ImageInput) -> DetectionResult {
        let response = self.annotate(image, Feature::LabelDetection).await?;
        Ok(response
            .label_annotations
            .into_iter()
            .map(|l| l.description)
            .collect())
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = BatchAnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: RequestImage {
                    content: "AAAA".to_string(),
                },
                features: vec![FeatureRequest {
                    feature_type: Feature::ObjectLocalization,
                    max_results: 7,
                }],
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"type\":\"OBJECT_LOCALIZATION\""));
        assert!(json.contains("\"maxResults\":7"));
        assert!(json.contains("\"content\":\"AAAA\""));
    }

    #[test]
    fn test_parse_object_response() {
        let json = r#"{"responses":[{"localizedObjectAnnotations":[
            {"mid":"/m/04dr76w","name":"Bottle","score":0.91,"boundingPoly":{}},
            {"mid":"/m/02jvh9","name":"Cup","score":0.64,"boundingPoly":{}}
        ]}]}"#;
        let batch: BatchAnnotateResponse = serde_json::from_str(json).unwrap();
        let names: Vec<_> = batch.responses[0]
            .localized_object_annotations
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bottle", "Cup"]);
        assert!(batch.responses[0].label_annotations.is_empty());
    }

    #[test]
    fn test_parse_label_response_with_error() {
        let json = r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#;
        let batch: BatchAnnotateResponse = serde_json::from_str(json).unwrap();
        let error = batch.responses[0].error.as_ref().unwrap();
        assert_eq!(error.message, "Bad image data.");
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"{"error":{"code":403,"message":"API key not valid.","status":"PERMISSION_DENIED"}}"#;
        let env: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.error.message, "API key not valid.");
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let provider = GoogleVisionProvider::new("http://localhost:9000/v1/", "k", 10);
        assert_eq!(provider.endpoint, "http://localhost:9000/v1");
    }
}

//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Vocabulary (category map) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// JSON file holding the category -> terms mapping
    pub path: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            path: "~/.binsort/category_map.json".to_string(),
        }
    }
}

/// Discovery log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryLogConfig {
    /// Append-only log file
    pub path: String,

    /// Log format: "text" or "jsonl"
    pub format: String,
}

impl Default for DiscoveryLogConfig {
    fn default() -> Self {
        Self {
            path: "~/.binsort/labels.txt".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Vision service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Provider identifier ("google")
    pub provider: String,

    /// Maximum objects/labels requested per call
    pub max_results: u32,

    /// Google Cloud Vision settings
    pub google: GoogleVisionConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            max_results: 10,
            google: GoogleVisionConfig::default(),
        }
    }
}

/// Google Cloud Vision configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleVisionConfig {
    /// API endpoint (without the `/images:annotate` suffix)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for GoogleVisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1".to_string(),
            api_key: "${GOOGLE_VISION_API_KEY}".to_string(),
        }
    }
}

/// Image normalization applied before detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Downscale and re-encode uploads before sending them out
    pub optimize: bool,

    /// Longest edge in pixels after downscaling
    pub max_size: u32,

    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            optimize: true,
            max_size: 800,
            quality: 85,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Per-call vision service timeout in milliseconds
    pub detection_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            detection_timeout_ms: 15000,
        }
    }
}

/// Input collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Extensions picked up when walking directories
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

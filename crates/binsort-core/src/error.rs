//! Error types for binsort.
//!
//! Errors are organized by component so messages carry the context a caller
//! needs (file name, stage, HTTP status) without inspecting strings.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for binsort operations.
#[derive(Error, Debug)]
pub enum SorterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The vision service failed during primary classification
    #[error("Detection failed: {0}")]
    Detection(#[from] DetectionError),

    /// Vocabulary load/save errors
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// Image preparation errors
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// No usable files or labels were submitted
    #[error("No usable input: {0}")]
    EmptyInput(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures reported by (or on the way to) the external vision capability.
///
/// These are ordinary values: the gateway hands them back to the caller, which
/// decides whether the failure ends the request or only degrades the outcome.
#[derive(Error, Debug, Clone)]
pub enum DetectionError {
    /// The service answered but reported an error
    #[error("{provider} error: {message}")]
    Service {
        provider: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The request never produced a response (DNS, connect, TLS, ...)
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// The response body could not be understood
    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse { provider: String, message: String },

    /// The call exceeded the configured detection timeout
    #[error("{stage} timed out after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// No credentials were configured for the provider
    #[error("{provider} API key not set. Set {env_var} or configure the key explicitly.")]
    MissingApiKey { provider: String, env_var: String },

    /// The configured provider name is not known
    #[error("Unknown vision provider: {0}")]
    UnknownProvider(String),
}

impl DetectionError {
    /// Whether a caller-level retry could plausibly succeed.
    ///
    /// Transient: timeouts, rate limits (429), server errors (5xx), transport
    /// failures. The core never retries on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            DetectionError::Timeout { .. } | DetectionError::Transport { .. } => true,
            DetectionError::Service { status_code, .. } => {
                matches!(status_code, Some(code) if *code == 429 || (500..=599).contains(code))
            }
            _ => false,
        }
    }
}

/// Vocabulary persistence errors.
#[derive(Error, Debug)]
pub enum VocabularyError {
    /// Failed to read the vocabulary file
    #[error("Failed to read vocabulary {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Vocabulary file is not a category -> terms JSON object
    #[error("Failed to parse vocabulary {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A category lists the same term twice
    #[error("Category '{category}' lists term '{term}' more than once")]
    DuplicateTerm { category: String, term: String },

    /// Failed to write the vocabulary snapshot
    #[error("Failed to write vocabulary {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Image preparation errors.
#[derive(Error, Debug)]
pub enum ImageError {
    /// Image decoding failed
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Re-encoding the normalized image failed
    #[error("Encode error for {name}: {message}")]
    Encode { name: String, message: String },

    /// Upload exceeds size limit
    #[error("File too large: {name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unrecognized image format
    #[error("Unsupported format for {name}")]
    UnsupportedFormat { name: String },

    /// Decoding took too long
    #[error("Decoding {name} timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },
}

/// Convenience type alias for binsort results.
pub type Result<T> = std::result::Result<T, SorterError>;

/// Result of a single call to the vision capability.
pub type DetectionResult = std::result::Result<Vec<String>, DetectionError>;

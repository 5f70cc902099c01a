//! Access to the external vision capability.
//!
//! Provides a provider abstraction over vision backends (currently Google
//! Cloud Vision) and a gateway that bounds every call with a timeout and
//! hands failures back as values.

pub(crate) mod gateway;
pub(crate) mod google;
pub(crate) mod provider;

pub use gateway::DetectionGateway;
pub use google::GoogleVisionProvider;
pub use provider::{resolve_env_var, ImageInput, VisionProvider, VisionProviderFactory};

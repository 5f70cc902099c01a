//! binsort core: classify photos of waste into recyclable categories.
//!
//! An image is sent to a vision service for object localization; the detected
//! object names are matched against a vocabulary of category terms. When
//! several categories match equally well, a second label-detection pass on
//! the same image breaks the tie. The vocabulary grows by ingesting labelled
//! example images, and every newly seen label is recorded in an append-only
//! discovery log.
//!
//! ```text
//! bytes → prepare → detect objects → score → [tie → detect labels] → outcome
//! bytes → prepare → detect labels → diff vs vocabulary → persist + log
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use binsort_core::{Config, Sorter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sorter = Sorter::new(Config::load()?).await?;
//!
//!     let bytes = std::fs::read("./bottle.jpg")?;
//!     let outcome = sorter.analyze_image("bottle.jpg", bytes).await?;
//!     println!("{}: {}", outcome.category, outcome.items.join(", "));
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod prepare;
pub mod types;
pub mod vision;
pub mod vocabulary;

use std::sync::Arc;

pub use classify::CategoryResolver;
pub use config::Config;
pub use discovery::{
    DiscoveryEntry, DiscoverySink, FileDiscoveryLog, LogFormat, MemoryDiscoveryLog,
};
pub use error::{
    ConfigError, DetectionError, DetectionResult, ImageError, Result, SorterError,
    VocabularyError,
};
pub use output::{OutputFormat, OutputWriter};
pub use prepare::{FileCollector, ImagePreparer};
pub use types::{
    ClassificationOutcome, Decision, FileOutcome, IngestReport, UploadedFile, NO_MATCH,
};
pub use vision::{DetectionGateway, ImageInput, VisionProvider, VisionProviderFactory};
pub use vocabulary::{Vocabulary, VocabularyStore, VocabularyUpdater};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point tying preparation, detection, resolution and ingestion together.
pub struct Sorter {
    store: Arc<VocabularyStore>,
    gateway: DetectionGateway,
    preparer: Arc<ImagePreparer>,
    resolver: CategoryResolver,
    updater: VocabularyUpdater,
}

impl Sorter {
    /// Build a sorter from configuration: load the vocabulary, create the
    /// vision provider and open the discovery log.
    pub async fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing binsort v{}", VERSION);

        let store = VocabularyStore::open(config.vocabulary_path()).await?;
        let provider = VisionProviderFactory::create(&config.detection, None)?;
        let gateway = DetectionGateway::new(provider, config.limits.detection_timeout_ms);
        tracing::info!(
            "Vision provider: {} (timeout {}ms)",
            gateway.provider_name(),
            config.limits.detection_timeout_ms
        );
        let log = FileDiscoveryLog::from_config(config.discovery_log_path(), &config.discovery_log)?;
        let preparer = ImagePreparer::new(config.image.clone(), config.limits.clone());

        Ok(Self::from_parts(
            gateway,
            Arc::new(store),
            Arc::new(log),
            Arc::new(preparer),
        ))
    }

    /// Assemble a sorter from already-built components.
    pub fn from_parts(
        gateway: DetectionGateway,
        store: Arc<VocabularyStore>,
        log: Arc<dyn DiscoverySink>,
        preparer: Arc<ImagePreparer>,
    ) -> Self {
        Self {
            resolver: CategoryResolver::new(gateway.clone(), store.clone(), log.clone()),
            updater: VocabularyUpdater::new(
                gateway.clone(),
                store.clone(),
                log,
                preparer.clone(),
            ),
            store,
            gateway,
            preparer,
        }
    }

    /// Classify one image.
    ///
    /// Fails only if the image cannot be prepared or object detection fails;
    /// everything after that resolves to an outcome.
    pub async fn analyze_image(&self, name: &str, bytes: Vec<u8>) -> Result<ClassificationOutcome> {
        let upload = UploadedFile::new(name, bytes);
        let image = self.preparer.prepare(&upload).await?;
        let objects = self.gateway.detect_objects(&image).await?;
        tracing::debug!("{name}: detected {:?}", objects);

        let outcome = self.resolver.classify(objects, &image).await;
        tracing::info!(
            "{name}: {} ({:?})",
            outcome.category,
            outcome.decision
        );
        Ok(outcome)
    }

    /// Ingest labelled example images, optionally into `target`.
    pub async fn ingest_batch(
        &self,
        files: Vec<UploadedFile>,
        target: Option<&str>,
    ) -> Result<IngestReport> {
        self.updater.ingest_batch(files, target).await
    }

    /// Batch ingestion with a per-file progress callback.
    pub async fn ingest_batch_with<F>(
        &self,
        files: Vec<UploadedFile>,
        target: Option<&str>,
        progress: F,
    ) -> Result<IngestReport>
    where
        F: FnMut(&FileOutcome),
    {
        self.updater.ingest_batch_with(files, target, progress).await
    }

    /// Shared handle to the vocabulary store.
    pub fn vocabulary(&self) -> Arc<VocabularyStore> {
        self.store.clone()
    }
}

//! Growing the vocabulary from freshly labelled images.

use std::sync::Arc;

use super::{Vocabulary, VocabularyStore};
use crate::discovery::{DiscoveryEntry, DiscoverySink};
use crate::error::{Result, SorterError};
use crate::prepare::ImagePreparer;
use crate::types::{DiscoveryBatch, FileLabelCount, FileOutcome, IngestReport, UploadedFile};
use crate::vision::DetectionGateway;

/// Append every label not yet in `category`.
///
/// Returns the labels that were added; repeats within `labels` are added once.
/// A missing category is created together with its first new term, so a file
/// that adds nothing leaves the vocabulary untouched.
pub fn ingest_targeted(
    vocabulary: &mut Vocabulary,
    file_name: &str,
    labels: &[String],
    category: &str,
) -> DiscoveryBatch {
    let new_labels = labels
        .iter()
        .filter(|label| vocabulary.add_term(category, label))
        .cloned()
        .collect();
    DiscoveryBatch {
        file_name: file_name.to_string(),
        new_labels,
    }
}

/// Labels absent from every category. The vocabulary is left untouched.
pub fn find_novel(vocabulary: &Vocabulary, file_name: &str, labels: &[String]) -> DiscoveryBatch {
    let mut new_labels: Vec<String> = Vec::new();
    for label in labels {
        if !vocabulary.contains_term(label) && !new_labels.contains(label) {
            new_labels.push(label.clone());
        }
    }
    DiscoveryBatch {
        file_name: file_name.to_string(),
        new_labels,
    }
}

/// Runs batch ingestion: label detection per file, one vocabulary commit.
pub struct VocabularyUpdater {
    gateway: DetectionGateway,
    store: Arc<VocabularyStore>,
    log: Arc<dyn DiscoverySink>,
    preparer: Arc<ImagePreparer>,
}

impl VocabularyUpdater {
    pub fn new(
        gateway: DetectionGateway,
        store: Arc<VocabularyStore>,
        log: Arc<dyn DiscoverySink>,
        preparer: Arc<ImagePreparer>,
    ) -> Self {
        Self {
            gateway,
            store,
            log,
            preparer,
        }
    }

    /// Ingest `files`, optionally scoped to `target`.
    pub async fn ingest_batch(
        &self,
        files: Vec<UploadedFile>,
        target: Option<&str>,
    ) -> Result<IngestReport> {
        self.ingest_batch_with(files, target, |_| {}).await
    }

    /// Like [`ingest_batch`](Self::ingest_batch), reporting each file as it completes.
    pub async fn ingest_batch_with<F>(
        &self,
        files: Vec<UploadedFile>,
        target: Option<&str>,
        mut progress: F,
    ) -> Result<IngestReport>
    where
        F: FnMut(&FileOutcome),
    {
        if files.iter().all(|f| f.name.is_empty()) {
            return Err(SorterError::EmptyInput("no files uploaded".to_string()));
        }
        let target = target.filter(|t| !t.is_empty());

        let mut report = IngestReport {
            category: target.map(String::from),
            received_count: files.len(),
            ..Default::default()
        };

        // Network calls happen here, outside any vocabulary lock.
        let mut fetched: Vec<(String, Vec<String>)> = Vec::new();
        for file in &files {
            if file.name.is_empty() {
                progress(&FileOutcome::Skipped);
                continue;
            }

            let labels = match self.preparer.prepare(file).await {
                Ok(image) => self.gateway.detect_labels(&image).await.map_err(SorterError::from),
                Err(e) => Err(SorterError::from(e)),
            };

            match labels {
                Ok(labels) => {
                    progress(&FileOutcome::Fetched {
                        file_name: file.name.clone(),
                        labels: labels.len(),
                    });
                    fetched.push((file.name.clone(), labels));
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {e}", file.name);
                    progress(&FileOutcome::Failed {
                        file_name: file.name.clone(),
                        reason: e.to_string(),
                    });
                    report.error_files.push(file.name.clone());
                }
            }
        }

        let batches: Vec<DiscoveryBatch> = match target {
            Some(category) => {
                let applied = self
                    .store
                    .apply(|vocabulary| {
                        fetched
                            .iter()
                            .map(|(name, labels)| {
                                ingest_targeted(vocabulary, name, labels, category)
                            })
                            .collect::<Vec<_>>()
                    })
                    .await?;
                report.persisted = applied.persisted;
                applied.value
            }
            None => {
                let vocabulary = self.store.read().await;
                let batches = fetched
                    .iter()
                    .map(|(name, labels)| find_novel(&vocabulary, name, labels))
                    .collect();
                batches
            }
        };

        for batch in &batches {
            report.success_count += 1;
            report.total_new_labels += batch.new_labels.len();
            report.new_label_counts.push(FileLabelCount {
                file_name: batch.file_name.clone(),
                new_labels: batch.new_labels.len(),
            });
        }

        for batch in batches.into_iter().filter(|b| !b.new_labels.is_empty()) {
            let entry = DiscoveryEntry::NewLabels {
                file_name: batch.file_name,
                labels: batch.new_labels,
            };
            if let Err(e) = self.log.append(&entry) {
                tracing::warn!("Failed to append to discovery log: {e}");
            }
        }

        tracing::info!(
            "Ingested {}/{} file(s), {} new label(s){}",
            report.success_count,
            report.received_count,
            report.total_new_labels,
            target.map(|c| format!(" into {c}")).unwrap_or_default()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageConfig, LimitsConfig};
    use crate::discovery::MemoryDiscoveryLog;
    use crate::vision::gateway::testing::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::atomic::Ordering;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn recyclables() -> Vocabulary {
        Vocabulary::from_iter([
            ("Plastic", vec!["Bottle", "Cup"]),
            ("Glass", vec!["Jar"]),
        ])
    }

    fn png(name: &str) -> UploadedFile {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(8, 8)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        UploadedFile::new(name, buffer.into_inner())
    }

    struct Harness {
        updater: VocabularyUpdater,
        store: Arc<VocabularyStore>,
        log: Arc<MemoryDiscoveryLog>,
        _dir: tempfile::TempDir,
    }

    fn harness(provider: ScriptedProvider) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(VocabularyStore::with_vocabulary(
            dir.path().join("category_map.json"),
            recyclables(),
        ));
        let log = Arc::new(MemoryDiscoveryLog::new());
        let updater = VocabularyUpdater::new(
            DetectionGateway::new(Box::new(provider), 1000),
            store.clone(),
            log.clone(),
            Arc::new(ImagePreparer::new(ImageConfig::default(), LimitsConfig::default())),
        );
        Harness {
            updater,
            store,
            log,
            _dir: dir,
        }
    }

    #[test]
    fn test_targeted_appends_only_new() {
        let mut vocabulary = recyclables();
        let batch = ingest_targeted(
            &mut vocabulary,
            "a.jpg",
            &names(&["Bottle", "Tray", "Tray"]),
            "Plastic",
        );
        assert_eq!(batch.new_labels, names(&["Tray"]));
        assert_eq!(
            vocabulary.terms("Plastic").unwrap(),
            &names(&["Bottle", "Cup", "Tray"])[..]
        );
    }

    #[test]
    fn test_targeted_is_idempotent() {
        let mut vocabulary = recyclables();
        let labels = names(&["Tin", "Lid"]);
        ingest_targeted(&mut vocabulary, "a.jpg", &labels, "Metal");
        let after_first = vocabulary.clone();

        let second = ingest_targeted(&mut vocabulary, "a.jpg", &labels, "Metal");
        assert!(second.new_labels.is_empty());
        assert_eq!(vocabulary, after_first);
    }

    #[test]
    fn test_targeted_checks_only_target_category() {
        let mut vocabulary = recyclables();
        let batch = ingest_targeted(&mut vocabulary, "a.jpg", &names(&["Bottle"]), "Glass");
        assert_eq!(batch.new_labels, names(&["Bottle"]));
        assert!(vocabulary.category_contains("Plastic", "Bottle"));
        assert!(vocabulary.category_contains("Glass", "Bottle"));
    }

    #[test]
    fn test_find_novel_checks_all_categories() {
        let vocabulary = recyclables();
        let batch = find_novel(
            &vocabulary,
            "a.jpg",
            &names(&["Jar", "Box", "Cup", "Box"]),
        );
        assert_eq!(batch.new_labels, names(&["Box"]));
        assert_eq!(vocabulary, recyclables());
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let h = harness(ScriptedProvider::new());
        let err = h.updater.ingest_batch(vec![], None).await.unwrap_err();
        assert!(matches!(err, SorterError::EmptyInput(_)));

        let err = h
            .updater
            .ingest_batch(vec![UploadedFile::new("", vec![1, 2, 3])], Some("Metal"))
            .await
            .unwrap_err();
        assert!(matches!(err, SorterError::EmptyInput(_)));
    }

    #[tokio::test]
    async fn test_batch_with_one_failure_persists_once() {
        let provider = ScriptedProvider::new()
            .labels(ok(&["Tin", "Bottle"]))
            .labels(service_error("quota exceeded"))
            .labels(ok(&["Lid"]));
        let h = harness(provider);

        let files = vec![png("one.png"), png("two.png"), png("three.png")];
        let report = h.updater.ingest_batch(files, Some("Metal")).await.unwrap();

        assert_eq!(report.category.as_deref(), Some("Metal"));
        assert_eq!(report.received_count, 3);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_files, names(&["two.png"]));
        assert_eq!(report.total_new_labels, 3);
        assert_eq!(
            report.new_label_counts,
            vec![
                FileLabelCount {
                    file_name: "one.png".into(),
                    new_labels: 2
                },
                FileLabelCount {
                    file_name: "three.png".into(),
                    new_labels: 1
                },
            ]
        );
        assert!(report.persisted);

        let on_disk = VocabularyStore::open(h.store.path()).await.unwrap();
        let terms = on_disk.snapshot().await.terms("Metal").map(<[String]>::to_vec);
        assert_eq!(terms, Some(names(&["Tin", "Bottle", "Lid"])));
        assert_eq!(h.log.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_global_mode_never_mutates() {
        let provider = ScriptedProvider::new().labels(ok(&["Box", "Jar"]));
        let h = harness(provider);

        let report = h.updater.ingest_batch(vec![png("a.png")], None).await.unwrap();

        assert!(report.category.is_none());
        assert_eq!(report.total_new_labels, 1);
        assert!(!report.persisted);
        assert_eq!(h.store.snapshot().await, recyclables());
        assert!(!h.store.path().exists());
        assert_eq!(
            h.log.entries(),
            vec![DiscoveryEntry::NewLabels {
                file_name: "a.png".into(),
                labels: names(&["Box"]),
            }]
        );
    }

    #[tokio::test]
    async fn test_no_labels_into_new_category_writes_nothing() {
        let provider = ScriptedProvider::new().labels(ok(&[]));
        let h = harness(provider);

        let report = h
            .updater
            .ingest_batch(vec![png("a.png")], Some("Metal"))
            .await
            .unwrap();

        assert_eq!(report.success_count, 1);
        assert_eq!(report.total_new_labels, 0);
        assert!(!report.persisted);
        assert!(!h.store.snapshot().await.has_category("Metal"));
        assert!(!h.store.path().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_batches_never_duplicate_terms() {
        let mut provider = ScriptedProvider::new();
        for _ in 0..8 {
            provider = provider.labels(ok(&["Tin", "Lid", "Can"]));
        }
        let h = harness(provider);
        let updater = Arc::new(h.updater);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let updater = updater.clone();
                tokio::spawn(async move {
                    updater
                        .ingest_batch(vec![png(&format!("{i}.png"))], Some("Metal"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut total_new = 0;
        for task in tasks {
            total_new += task.await.unwrap().total_new_labels;
        }
        assert_eq!(total_new, 3);

        let in_memory = h.store.snapshot().await;
        assert_eq!(
            in_memory.terms("Metal").unwrap(),
            &names(&["Tin", "Lid", "Can"])[..]
        );
        let on_disk = VocabularyStore::open(h.store.path()).await.unwrap();
        assert_eq!(on_disk.snapshot().await, in_memory);
    }

    #[tokio::test]
    async fn test_nothing_new_skips_persist_and_log() {
        let provider = ScriptedProvider::new().labels(ok(&["Jar"]));
        let h = harness(provider);

        let report = h
            .updater
            .ingest_batch(vec![png("a.png")], Some("Glass"))
            .await
            .unwrap();
        assert_eq!(report.total_new_labels, 0);
        assert!(!report.persisted);
        assert!(h.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_image_counts_as_error_without_detection() {
        let provider = ScriptedProvider::new();
        let calls = provider.label_calls.clone();
        let h = harness(provider);

        let files = vec![UploadedFile::new("notes.txt", b"not an image".to_vec())];
        let report = h.updater.ingest_batch(files, Some("Metal")).await.unwrap();

        assert_eq!(report.error_files, names(&["notes.txt"]));
        assert_eq!(report.success_count, 0);
        assert!(!report.persisted);
        assert!(!h.store.snapshot().await.has_category("Metal"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_progress_sees_every_file() {
        let provider = ScriptedProvider::new()
            .labels(ok(&["Tin"]))
            .labels(service_error("boom"));
        let h = harness(provider);

        let files = vec![png("a.png"), UploadedFile::new("", vec![]), png("b.png")];
        let mut seen = Vec::new();
        h.updater
            .ingest_batch_with(files, Some("Metal"), |outcome| {
                seen.push(match outcome {
                    FileOutcome::Fetched { .. } => "fetched",
                    FileOutcome::Failed { .. } => "failed",
                    FileOutcome::Skipped => "skipped",
                })
            })
            .await
            .unwrap();
        assert_eq!(seen, vec!["fetched", "skipped", "failed"]);
    }
}

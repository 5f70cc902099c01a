//! Choosing one category for a set of detected objects.

use std::sync::Arc;

use super::scoring::{candidate_scores, pick_winner, score, top_tied, CategoryScores};
use crate::discovery::{DiscoveryEntry, DiscoverySink};
use crate::types::{ClassificationOutcome, Decision};
use crate::vision::{DetectionGateway, ImageInput};
use crate::vocabulary::VocabularyStore;

/// Maps detected object names onto vocabulary categories.
///
/// Categories are scored by how many detected objects appear in their term
/// lists. When several share the best score, a second label-detection pass on
/// the same image decides between them.
pub struct CategoryResolver {
    gateway: DetectionGateway,
    store: Arc<VocabularyStore>,
    log: Arc<dyn DiscoverySink>,
}

impl CategoryResolver {
    pub fn new(
        gateway: DetectionGateway,
        store: Arc<VocabularyStore>,
        log: Arc<dyn DiscoverySink>,
    ) -> Self {
        Self { gateway, store, log }
    }

    /// Classify `objects` detected in `image`.
    ///
    /// Never fails: an unresolvable tie or a failed label pass yields a
    /// "No match" outcome.
    pub async fn classify(&self, objects: Vec<String>, image: &ImageInput) -> ClassificationOutcome {
        if objects.is_empty() {
            return ClassificationOutcome::no_match(objects, Decision::NoObjects);
        }

        // Term lists are copied out so the lock is released before any I/O.
        let mut tied: Vec<(String, Vec<String>)> = {
            let vocabulary = self.store.read().await;
            let scores = candidate_scores(&vocabulary, &objects);
            tracing::debug!("Coarse scores: {:?}", scores);
            let tied = top_tied(&scores)
                .into_iter()
                .map(|category| {
                    let terms = vocabulary
                        .terms(&category)
                        .map(<[String]>::to_vec)
                        .unwrap_or_default();
                    (category, terms)
                })
                .collect();
            tied
        };

        match tied.len() {
            0 => ClassificationOutcome::no_match(objects, Decision::NoCandidate),
            1 => {
                let (category, _) = tied.remove(0);
                ClassificationOutcome::matched(category, objects, Decision::Unique)
            }
            _ => match self.break_tie(tied, image).await {
                Some(category) => {
                    ClassificationOutcome::matched(category, objects, Decision::TieBroken)
                }
                None => ClassificationOutcome::no_match(objects, Decision::TieUnresolved),
            },
        }
    }

    /// Score the tied categories against whole-image labels.
    async fn break_tie(&self, tied: Vec<(String, Vec<String>)>, image: &ImageInput) -> Option<String> {
        let names: Vec<String> = tied.iter().map(|(c, _)| c.clone()).collect();

        let labels = match self.gateway.detect_labels(image).await {
            Ok(labels) => labels,
            Err(e) => {
                tracing::warn!("Tie-break label detection failed for {:?}: {e}", names);
                self.record(DiscoveryEntry::TieBreak {
                    tied: names,
                    labels: Vec::new(),
                    scores: CategoryScores::new(),
                    winner: None,
                    error: Some(e.to_string()),
                });
                return None;
            }
        };

        let scores: CategoryScores = tied
            .iter()
            .map(|(category, terms)| (category.clone(), score(terms, &labels)))
            .collect();
        let winner = pick_winner(&scores);
        tracing::debug!("Tie-break {:?} -> {:?}", scores, winner);

        self.record(DiscoveryEntry::TieBreak {
            tied: names,
            labels,
            scores,
            winner: winner.clone(),
            error: None,
        });
        winner
    }

    fn record(&self, entry: DiscoveryEntry) {
        if let Err(e) = self.log.append(&entry) {
            tracing::warn!("Failed to write tie-break diagnostic: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::MemoryDiscoveryLog;
    use crate::vision::gateway::testing::*;
    use crate::vocabulary::Vocabulary;
    use std::sync::atomic::Ordering;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn store(vocabulary: Vocabulary) -> Arc<VocabularyStore> {
        Arc::new(VocabularyStore::with_vocabulary(
            "unused-category-map.json",
            vocabulary,
        ))
    }

    fn recyclables() -> Vocabulary {
        Vocabulary::from_iter([
            ("Plastic", vec!["Bottle", "Cup"]),
            ("Glass", vec!["Bottle", "Jar"]),
        ])
    }

    struct Harness {
        resolver: CategoryResolver,
        label_calls: Arc<std::sync::atomic::AtomicU32>,
        log: Arc<MemoryDiscoveryLog>,
    }

    fn harness(provider: ScriptedProvider, vocabulary: Vocabulary) -> Harness {
        let label_calls = provider.label_calls.clone();
        let log = Arc::new(MemoryDiscoveryLog::new());
        let resolver = CategoryResolver::new(
            DetectionGateway::new(Box::new(provider), 1000),
            store(vocabulary),
            log.clone(),
        );
        Harness {
            resolver,
            label_calls,
            log,
        }
    }

    #[tokio::test]
    async fn test_empty_objects_is_no_match_without_calls() {
        let h = harness(ScriptedProvider::new(), recyclables());
        let outcome = h.resolver.classify(vec![], &image()).await;

        assert!(!outcome.matched);
        assert_eq!(outcome.category, "No match");
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.decision, Decision::NoObjects);
        assert_eq!(h.label_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_overlap_is_no_match() {
        let h = harness(ScriptedProvider::new(), recyclables());
        let outcome = h.resolver.classify(names(&["Banana"]), &image()).await;

        assert!(!outcome.matched);
        assert_eq!(outcome.items, names(&["Banana"]));
        assert_eq!(outcome.decision, Decision::NoCandidate);
    }

    #[tokio::test]
    async fn test_strict_best_needs_no_label_pass() {
        let h = harness(ScriptedProvider::new(), recyclables());
        let outcome = h
            .resolver
            .classify(names(&["Bottle", "Cup"]), &image())
            .await;

        assert!(outcome.matched);
        assert_eq!(outcome.category, "Plastic");
        assert_eq!(outcome.items, names(&["Bottle", "Cup"]));
        assert_eq!(outcome.decision, Decision::Unique);
        assert_eq!(h.label_calls.load(Ordering::SeqCst), 0);
        assert!(h.log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_tie_broken_by_labels() {
        let provider = ScriptedProvider::new().labels(ok(&["Jar", "Glass"]));
        let h = harness(provider, recyclables());
        let outcome = h.resolver.classify(names(&["Bottle"]), &image()).await;

        assert!(outcome.matched);
        assert_eq!(outcome.category, "Glass");
        assert_eq!(outcome.items, names(&["Bottle"]));
        assert_eq!(outcome.decision, Decision::TieBroken);
        assert_eq!(h.label_calls.load(Ordering::SeqCst), 1);

        match &h.log.entries()[..] {
            [DiscoveryEntry::TieBreak {
                tied, scores, winner, ..
            }] => {
                assert_eq!(tied, &names(&["Glass", "Plastic"]));
                assert_eq!(scores.get("Glass"), Some(&1));
                assert_eq!(scores.get("Plastic"), Some(&0));
                assert_eq!(winner.as_deref(), Some("Glass"));
            }
            other => panic!("unexpected log entries: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_uninformative_labels_are_no_match() {
        let provider = ScriptedProvider::new().labels(ok(&["Table", "Kitchen"]));
        let h = harness(provider, recyclables());
        let outcome = h.resolver.classify(names(&["Bottle"]), &image()).await;

        assert!(!outcome.matched);
        assert_eq!(outcome.category, "No match");
        assert_eq!(outcome.decision, Decision::TieUnresolved);
    }

    #[tokio::test]
    async fn test_second_pass_tie_goes_to_smallest_name() {
        let provider = ScriptedProvider::new().labels(ok(&["Bottle"]));
        let h = harness(provider, recyclables());
        let outcome = h.resolver.classify(names(&["Bottle"]), &image()).await;

        assert_eq!(outcome.category, "Glass");
        assert_eq!(outcome.decision, Decision::TieBroken);
    }

    #[tokio::test]
    async fn test_tie_break_independent_of_insertion_order() {
        let reversed = Vocabulary::from_iter([
            ("Glass", vec!["Jar", "Bottle"]),
            ("Plastic", vec!["Cup", "Bottle"]),
        ]);
        for vocabulary in [recyclables(), reversed] {
            let provider = ScriptedProvider::new().labels(ok(&["Bottle", "Cup", "Jar"]));
            let h = harness(provider, vocabulary);
            let outcome = h.resolver.classify(names(&["Bottle"]), &image()).await;
            assert_eq!(outcome.category, "Glass");
        }
    }

    #[tokio::test]
    async fn test_label_failure_degrades_to_no_match() {
        let provider = ScriptedProvider::new().labels(service_error("backend unavailable"));
        let h = harness(provider, recyclables());
        let outcome = h.resolver.classify(names(&["Bottle"]), &image()).await;

        assert!(!outcome.matched);
        assert_eq!(outcome.decision, Decision::TieUnresolved);
        assert_eq!(h.label_calls.load(Ordering::SeqCst), 1);

        match &h.log.entries()[..] {
            [DiscoveryEntry::TieBreak { winner, error, .. }] => {
                assert!(winner.is_none());
                assert!(error
                    .as_deref()
                    .is_some_and(|e| e.contains("backend unavailable")));
            }
            other => panic!("unexpected log entries: {other:?}"),
        }
    }
}

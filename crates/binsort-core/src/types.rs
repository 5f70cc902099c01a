//! Core data types exchanged between binsort and its callers.

use serde::{Deserialize, Serialize};

/// Category reported when no category can be chosen.
pub const NO_MATCH: &str = "No match";

/// How a classification outcome was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// One candidate had a strictly higher coarse score
    Unique,
    /// Several candidates tied and the label pass picked one
    TieBroken,
    /// The vision service found no objects
    NoObjects,
    /// No category's terms matched any detected object
    NoCandidate,
    /// Tied candidates could not be separated (uninformative or failed label pass)
    TieUnresolved,
}

/// The answer for one analyzed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    /// Whether a category was chosen
    pub matched: bool,

    /// Winning category, or [`NO_MATCH`]
    pub category: String,

    /// Objects reported by the vision service, in detection order
    pub items: Vec<String>,

    /// Path through the decision procedure
    pub decision: Decision,
}

impl ClassificationOutcome {
    /// A successful match.
    pub fn matched(category: impl Into<String>, items: Vec<String>, decision: Decision) -> Self {
        Self {
            matched: true,
            category: category.into(),
            items,
            decision,
        }
    }

    /// No category could be chosen.
    pub fn no_match(items: Vec<String>, decision: Decision) -> Self {
        Self {
            matched: false,
            category: NO_MATCH.to_string(),
            items,
            decision,
        }
    }
}

/// An uploaded image: client-side file name plus raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Labels from one file that were not yet known to the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryBatch {
    pub file_name: String,
    pub new_labels: Vec<String>,
}

/// Per-file count of newly discovered labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLabelCount {
    pub file_name: String,
    pub new_labels: usize,
}

/// Summary of a batch ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Target category, if the batch was scoped to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Files submitted, including ones skipped or failed
    pub received_count: usize,

    /// Files whose labels were fetched and diffed
    pub success_count: usize,

    /// Files whose preparation or detection failed
    pub error_files: Vec<String>,

    /// New-label counts for every successful file, in submission order
    pub new_label_counts: Vec<FileLabelCount>,

    /// Sum of `new_label_counts`
    pub total_new_labels: usize,

    /// Whether the vocabulary snapshot was written
    pub persisted: bool,
}

/// What happened to one file of a batch; handed to progress callbacks.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Labels were fetched
    Fetched { file_name: String, labels: usize },
    /// Preparation or detection failed
    Failed { file_name: String, reason: String },
    /// The file had an empty name
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_outcome_shape() {
        let outcome = ClassificationOutcome::no_match(vec![], Decision::NoObjects);
        assert!(!outcome.matched);
        assert_eq!(outcome.category, NO_MATCH);
        assert!(outcome.items.is_empty());
    }

    #[test]
    fn test_outcome_serializes_decision_snake_case() {
        let outcome = ClassificationOutcome::matched(
            "Glass",
            vec!["Bottle".to_string()],
            Decision::TieBroken,
        );
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"matched\":true"));
        assert!(json.contains("\"category\":\"Glass\""));
        assert!(json.contains("\"decision\":\"tie_broken\""));
    }

    #[test]
    fn test_report_skips_missing_category() {
        let report = IngestReport {
            received_count: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("category"));
        assert!(json.contains("\"received_count\":1"));
    }
}

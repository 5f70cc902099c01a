//! The category vocabulary: in-memory terms, durable store, and ingestion.

mod store;
mod terms;
pub mod updater;

pub use store::{Applied, VocabularyStore};
pub use terms::Vocabulary;
pub use updater::VocabularyUpdater;

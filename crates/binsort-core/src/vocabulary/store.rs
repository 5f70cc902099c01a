//! Shared, persisted vocabulary.
//!
//! The store owns the in-memory vocabulary behind an async read/write lock and
//! the path of its JSON snapshot. Mutations go through [`VocabularyStore::apply`],
//! which writes the snapshot before releasing the write lock, so readers never
//! see in-memory state that is ahead of what is on disk.

use std::path::{Path, PathBuf};

use tokio::sync::{RwLock, RwLockReadGuard};

use crate::error::VocabularyError;

use super::terms::Vocabulary;

/// Outcome of [`VocabularyStore::apply`].
#[derive(Debug)]
pub struct Applied<T> {
    /// Whatever the mutation returned
    pub value: T,
    /// Whether the vocabulary changed and a snapshot was written
    pub persisted: bool,
}

/// The process-wide vocabulary, shared as `Arc<VocabularyStore>`.
pub struct VocabularyStore {
    path: PathBuf,
    inner: RwLock<Vocabulary>,
}

impl VocabularyStore {
    /// Load the vocabulary at `path`.
    ///
    /// A missing file yields an empty vocabulary; the file is created on the
    /// first persisted mutation.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, VocabularyError> {
        let path = path.into();
        let vocabulary = match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse(&path, &content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No vocabulary at {:?}, starting empty", path);
                Vocabulary::new()
            }
            Err(source) => return Err(VocabularyError::Read { path, source }),
        };

        tracing::info!(
            "Loaded vocabulary: {} categories, {} terms",
            vocabulary.len(),
            vocabulary.term_count()
        );

        Ok(Self::with_vocabulary(path, vocabulary))
    }

    /// Wrap an already-built vocabulary persisted at `path`.
    pub fn with_vocabulary(path: impl Into<PathBuf>, vocabulary: Vocabulary) -> Self {
        Self {
            path: path.into(),
            inner: RwLock::new(vocabulary),
        }
    }

    /// Location of the JSON snapshot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared read access. Do not hold the guard across network calls.
    pub async fn read(&self) -> RwLockReadGuard<'_, Vocabulary> {
        self.inner.read().await
    }

    /// Owned copy of the current vocabulary.
    pub async fn snapshot(&self) -> Vocabulary {
        self.inner.read().await.clone()
    }

    /// Category names in lexicographic order.
    pub async fn categories(&self) -> Vec<String> {
        self.inner
            .read()
            .await
            .category_names()
            .map(String::from)
            .collect()
    }

    /// Run `mutation` under the write lock and persist if it changed anything.
    ///
    /// On a failed write the in-memory vocabulary is restored to its state
    /// before the mutation and the error is returned.
    pub async fn apply<T>(
        &self,
        mutation: impl FnOnce(&mut Vocabulary) -> T,
    ) -> Result<Applied<T>, VocabularyError> {
        let mut guard = self.inner.write().await;
        let before = guard.clone();
        let value = mutation(&mut *guard);

        if *guard == before {
            return Ok(Applied {
                value,
                persisted: false,
            });
        }

        if let Err(e) = save(&self.path, &*guard).await {
            tracing::error!("Vocabulary write failed, discarding batch: {e}");
            *guard = before;
            return Err(e);
        }

        tracing::info!(
            "Vocabulary saved to {:?} ({} categories, {} terms)",
            self.path,
            guard.len(),
            guard.term_count()
        );
        Ok(Applied {
            value,
            persisted: true,
        })
    }
}

fn parse(path: &Path, content: &str) -> Result<Vocabulary, VocabularyError> {
    let vocabulary: Vocabulary =
        serde_json::from_str(content).map_err(|source| VocabularyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    vocabulary.check()?;
    Ok(vocabulary)
}

/// Write the whole vocabulary to a sibling temp file, then rename over `path`.
async fn save(path: &Path, vocabulary: &Vocabulary) -> Result<(), VocabularyError> {
    let write_err = |message: String| VocabularyError::Write {
        path: path.to_path_buf(),
        message,
    };

    let json = serde_json::to_string_pretty(vocabulary).map_err(|e| write_err(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_err(e.to_string()))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json.as_bytes())
        .await
        .map_err(|e| write_err(e.to_string()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(e.to_string()));
    }
    Ok(())
}

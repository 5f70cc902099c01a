//! Collecting image files from paths given on the command line.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::types::UploadedFile;

/// Finds image files by extension.
pub struct FileCollector {
    config: ProcessingConfig,
}

impl FileCollector {
    /// Create a new collector instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Expand `paths` into a list of supported image files.
    ///
    /// Files given explicitly are kept in argument order; directories are
    /// walked recursively and their contents sorted by path.
    pub fn collect(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_file() {
                if self.is_supported(path) {
                    files.push(path.clone());
                } else {
                    tracing::warn!("Skipping unsupported file: {:?}", path);
                }
                continue;
            }

            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        }
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

/// Read a file into an [`UploadedFile`] named after its final path component.
pub async fn read_upload(path: &Path) -> std::io::Result<UploadedFile> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(UploadedFile::new(name, bytes))
}

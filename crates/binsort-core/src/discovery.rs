//! Discovery log: append-only record of newly seen labels.
//!
//! Each ingested file that contributed at least one new label gets an entry,
//! and every tie-break leaves a diagnostic entry. Entries are never rewritten.
//!
//! Two on-disk layouts are supported:
//!
//! ```text
//! New labels for bottle.jpg: { "Bottle", "Plastic" }
//!
//! Tie-break between { "Glass", "Plastic" }: labels { "Jar" }, scores { Glass: 1, Plastic: 0 }, winner Glass
//!
//! ```
//!
//! and JSON Lines, one object per entry tagged with `"type"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::DiscoveryLogConfig;
use crate::error::ConfigError;
use crate::output::{OutputFormat, OutputWriter};

/// One record in the discovery log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscoveryEntry {
    /// Labels from `file_name` that the vocabulary did not know yet
    NewLabels {
        file_name: String,
        labels: Vec<String>,
    },
    /// Outcome of a secondary label pass between tied categories
    TieBreak {
        tied: Vec<String>,
        labels: Vec<String>,
        scores: BTreeMap<String, usize>,
        winner: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Destination for discovery entries.
pub trait DiscoverySink: Send + Sync {
    /// Append one entry. The entry must be durable once this returns `Ok`.
    fn append(&self, entry: &DiscoveryEntry) -> io::Result<()>;
}

/// On-disk layout of a [`FileDiscoveryLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines, each entry followed by a blank line
    Text,
    /// One tagged JSON object per line
    JsonLines,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            other => OutputFormat::parse(other)
                .filter(|f| *f == OutputFormat::JsonLines)
                .map(|_| Self::JsonLines),
        }
    }
}

/// Appends entries to a file, opening and closing it for every entry.
pub struct FileDiscoveryLog {
    path: PathBuf,
    format: LogFormat,
    lock: Mutex<()>,
}

impl FileDiscoveryLog {
    pub fn new(path: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            path: path.into(),
            format,
            lock: Mutex::new(()),
        }
    }

    /// Build from the `[discovery_log]` section; `path` is the expanded file path.
    pub fn from_config(path: PathBuf, config: &DiscoveryLogConfig) -> Result<Self, ConfigError> {
        let format = LogFormat::parse(&config.format).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "unknown discovery log format \"{}\"",
                config.format
            ))
        })?;
        Ok(Self::new(path, format))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entry<W: Write>(&self, mut writer: W, entry: &DiscoveryEntry) -> io::Result<()> {
        match self.format {
            LogFormat::Text => {
                write!(writer, "{}\n\n", render_text(entry))?;
                writer.flush()
            }
            LogFormat::JsonLines => {
                let mut out = OutputWriter::new(writer, OutputFormat::JsonLines, false);
                out.write(entry)?;
                out.flush()
            }
        }
    }
}

impl DiscoverySink for FileDiscoveryLog {
    fn append(&self, entry: &DiscoveryEntry) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.write_entry(BufWriter::new(file), entry)
    }
}

/// Collects entries in memory.
#[derive(Default)]
pub struct MemoryDiscoveryLog {
    entries: Mutex<Vec<DiscoveryEntry>>,
}

impl MemoryDiscoveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far, in order.
    pub fn entries(&self) -> Vec<DiscoveryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DiscoverySink for MemoryDiscoveryLog {
    fn append(&self, entry: &DiscoveryEntry) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.clone());
        Ok(())
    }
}

fn quoted_set<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let quoted: Vec<String> = items.into_iter().map(|s| format!("\"{s}\"")).collect();
    format!("{{ {} }}", quoted.join(", "))
}

fn render_text(entry: &DiscoveryEntry) -> String {
    match entry {
        DiscoveryEntry::NewLabels { file_name, labels } => {
            format!("New labels for {file_name}: {}", quoted_set(labels))
        }
        DiscoveryEntry::TieBreak {
            tied,
            labels,
            scores,
            winner,
            error,
        } => {
            let scores: Vec<String> = scores.iter().map(|(c, s)| format!("{c}: {s}")).collect();
            let mut line = format!(
                "Tie-break between {}: labels {}, scores {{ {} }}, winner {}",
                quoted_set(tied),
                quoted_set(labels),
                scores.join(", "),
                winner.as_deref().unwrap_or("none")
            );
            if let Some(error) = error {
                line.push_str(&format!(" (label detection failed: {error})"));
            }
            line
        }
    }
}

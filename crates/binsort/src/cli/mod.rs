//! Command handlers.

pub mod analyze;
pub mod config;
pub mod populate;
pub mod vocab;

use binsort_core::Config;
use std::path::Path;

/// Load the configuration for this run.
///
/// An explicit `--config` path must load cleanly; a broken default config
/// only produces a warning and falls back to defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let config = Config::load_from(Path::new(&expanded))
            .map_err(|e| anyhow::anyhow!("Failed to load config {expanded}: {e}"))?;
        return Ok(config);
    }

    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `binsort config path`."
            );
            Ok(Config::default())
        }
    }
}

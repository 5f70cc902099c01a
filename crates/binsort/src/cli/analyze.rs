//! The `binsort analyze` command.

use anyhow::Context;
use binsort_core::{Config, OutputFormat, OutputWriter, Sorter};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image to classify
    pub image: PathBuf,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Cannot read image {:?}", args.image))?;
    let name = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sorter = Sorter::new(config).await?;
    let outcome = sorter.analyze_image(&name, bytes).await?;

    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), OutputFormat::Json, args.pretty);
    writer.write(&outcome)?;
    writer.flush()?;
    Ok(())
}

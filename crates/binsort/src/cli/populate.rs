//! The `binsort populate` command: grow the vocabulary from example images.

use binsort_core::prepare::read_upload;
use binsort_core::types::{FileOutcome, IngestReport, UploadedFile};
use binsort_core::{Config, FileCollector, OutputFormat, OutputWriter, Sorter};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the `populate` command.
#[derive(Args, Debug)]
pub struct PopulateArgs {
    /// Image files or directories to learn from
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Add new labels to this category (created if missing).
    /// Without it, labels are only checked for novelty and nothing is saved.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the populate command.
pub async fn execute(args: PopulateArgs, config: Config) -> anyhow::Result<()> {
    for path in &args.paths {
        if !path.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                path
            );
        }
    }

    let files = FileCollector::new(config.processing.clone()).collect(&args.paths);
    if files.is_empty() {
        anyhow::bail!(
            "No supported images found.\n\n  Supported extensions: {}",
            config.processing.supported_formats.join(", ")
        );
    }
    tracing::info!("Found {} image(s)", files.len());

    let uploads = read_uploads(&files).await;
    let sorter = Sorter::new(config).await?;

    let progress = create_progress_bar(uploads.len() as u64)?;
    let start = std::time::Instant::now();
    let report = sorter
        .ingest_batch_with(uploads, args.category.as_deref(), |outcome| {
            match outcome {
                FileOutcome::Fetched { file_name, .. } => progress.set_message(file_name.clone()),
                FileOutcome::Failed { file_name, .. } => {
                    progress.set_message(format!("{file_name} (failed)"))
                }
                FileOutcome::Skipped => {}
            }
            progress.inc(1);
        })
        .await?;
    progress.finish_and_clear();

    print_summary(&report, start.elapsed());

    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), OutputFormat::Json, args.pretty);
    writer.write(&report)?;
    writer.flush()?;
    Ok(())
}

/// Read every file; unreadable ones are reported and left out.
async fn read_uploads(files: &[PathBuf]) -> Vec<UploadedFile> {
    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        match read_upload(path).await {
            Ok(upload) => uploads.push(upload),
            Err(e) => tracing::warn!("Cannot read {:?}: {e}", path),
        }
    }
    uploads
}

/// Create a progress bar for batch ingestion.
fn create_progress_bar(total: u64) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("fetching labels...");
    Ok(pb)
}

/// Print a short summary table to stderr.
fn print_summary(report: &IngestReport, elapsed: std::time::Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    if let Some(category) = &report.category {
        eprintln!("    Category:     {:>8}", category);
    }
    eprintln!("    Succeeded:    {:>8}", report.success_count);
    if !report.error_files.is_empty() {
        eprintln!("    Failed:       {:>8}", report.error_files.len());
    }
    eprintln!("    New labels:   {:>8}", report.total_new_labels);
    eprintln!("  ------------------------------------");
    eprintln!("    Received:     {:>8}", report.received_count);
    eprintln!("    Saved:        {:>8}", if report.persisted { "yes" } else { "no" });
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}

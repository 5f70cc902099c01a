//! binsort CLI - classify photos of waste into recyclable categories.
//!
//! Detected objects are matched against a category vocabulary that can be
//! grown from labelled example images.
//!
//! # Usage
//!
//! ```bash
//! # Classify one photo
//! binsort analyze bottle.jpg
//!
//! # Teach the "Glass" category from a folder of examples
//! binsort populate ./examples/glass --category Glass
//!
//! # Inspect the vocabulary
//! binsort vocab categories
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// binsort - classify photos of waste into recyclable categories.
#[derive(Parser, Debug)]
#[command(name = "binsort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "BINSORT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify an image into a recyclable category
    Analyze(cli::analyze::AnalyzeArgs),

    /// Learn new labels from example images
    Populate(cli::populate::PopulateArgs),

    /// Inspect the category vocabulary
    Vocab(cli::vocab::VocabArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = cli::load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("binsort v{}", binsort_core::VERSION);

    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Populate(args) => cli::populate::execute(args, config).await,
        Commands::Vocab(args) => cli::vocab::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref()).await,
    }
}

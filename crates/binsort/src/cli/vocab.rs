//! The `binsort vocab` command: read-only views of the vocabulary.

use binsort_core::{Config, OutputFormat, OutputWriter, Vocabulary, VocabularyStore};
use clap::{Args, Subcommand};

/// Arguments for the `vocab` command.
#[derive(Args, Debug)]
pub struct VocabArgs {
    #[command(subcommand)]
    pub command: VocabCommand,
}

/// Subcommands for vocabulary inspection.
#[derive(Subcommand, Debug)]
pub enum VocabCommand {
    /// Print the vocabulary (or one category) as JSON
    Show {
        /// Only show this category's terms
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List categories with their term counts
    Categories,

    /// Show the vocabulary file path
    Path,
}

/// Execute the vocab command.
pub async fn execute(args: VocabArgs, config: &Config) -> anyhow::Result<()> {
    let path = config.vocabulary_path();

    match args.command {
        VocabCommand::Path => {
            println!("{}", path.display());
        }

        VocabCommand::Show { category } => {
            let vocabulary = VocabularyStore::open(&path).await?.snapshot().await;
            let stdout = std::io::stdout();
            let mut writer = OutputWriter::new(stdout.lock(), OutputFormat::Json, true);
            match category {
                Some(name) => {
                    let Some(terms) = vocabulary.terms(&name) else {
                        anyhow::bail!("Unknown category: {name}");
                    };
                    writer.write(&terms)?;
                }
                None => writer.write(&vocabulary)?,
            }
            writer.flush()?;
        }

        VocabCommand::Categories => {
            let vocabulary = VocabularyStore::open(&path).await?.snapshot().await;
            for line in category_lines(&vocabulary) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn category_lines(vocabulary: &Vocabulary) -> Vec<String> {
    let width = vocabulary.category_names().map(str::len).max().unwrap_or(0);
    vocabulary
        .iter()
        .map(|(name, terms)| format!("{name:<width$}  {} term(s)", terms.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lines_are_aligned_and_sorted() {
        let vocabulary = Vocabulary::from_iter([
            ("Plastic", vec!["Bottle", "Cup"]),
            ("Can", vec!["Tin"]),
        ]);
        assert_eq!(
            category_lines(&vocabulary),
            vec!["Can      1 term(s)", "Plastic  2 term(s)"]
        );
    }

    #[test]
    fn test_category_lines_empty() {
        assert!(category_lines(&Vocabulary::new()).is_empty());
    }
}

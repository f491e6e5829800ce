//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod show;
pub(crate) mod watch;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_site::{DocumentSummary, Library, sorted_for_index};
use quire_storage::FsStorage;

use crate::error::CliError;

pub(crate) use list::ListArgs;
pub(crate) use show::ShowArgs;
pub(crate) use watch::WatchArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Document source directory (overrides config).
    #[arg(short, long, global = true, env = "QUIRE_SOURCE_DIR")]
    source_dir: Option<PathBuf>,

    /// Enable verbose output (cache and invalidation logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Load configuration with the global overrides and any command-specific ones.
    pub(crate) fn load_config(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        if settings.source_dir.is_none() {
            settings.source_dir.clone_from(&self.source_dir);
        }
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        match &config.config_path {
            Some(path) => tracing::info!(path = %path.display(), "Loaded configuration"),
            None => tracing::info!("No quire.toml found, using defaults"),
        }
        Ok(config)
    }
}

/// Open the document library described by `config`.
pub(crate) fn open_library(config: &Config) -> Library {
    let docs = &config.docs_resolved;
    let storage = FsStorage::with_extension(docs.source_dir.clone(), docs.extension.as_str());
    Library::new(Arc::new(storage))
}

/// Write the index in display order, one document per line.
pub(crate) fn write_index(out: &mut impl Write, summaries: &[DocumentSummary]) -> io::Result<()> {
    if summaries.is_empty() {
        return writeln!(out, "No documents found.");
    }
    for summary in sorted_for_index(summaries) {
        writeln!(out, "{}  [{}]", summary.title, summary.id)?;
        if let Some(description) = &summary.description {
            writeln!(out, "    {description}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quire_storage::DocumentId;

    use super::*;

    fn summary(stem: &str, title: &str, order: Option<f64>) -> DocumentSummary {
        DocumentSummary {
            id: DocumentId::from_file_stem(stem),
            title: title.to_owned(),
            description: None,
            order,
        }
    }

    #[test]
    fn test_write_index_sorted() {
        let mut described = summary("intro", "Introduction", Some(1.0));
        described.description = Some("Start here".to_owned());
        let summaries = vec![summary("appendix a", "Appendix", None), described];
        let mut out = Vec::new();

        write_index(&mut out, &summaries).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Introduction  [intro]\n    Start here\nAppendix  [appendix%20a]\n"
        );
    }

    #[test]
    fn test_write_index_empty() {
        let mut out = Vec::new();

        write_index(&mut out, &[]).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "No documents found.\n");
    }
}

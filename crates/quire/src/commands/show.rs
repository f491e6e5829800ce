//! `quire show` command implementation.

use std::io::{self, Write};

use clap::Args;
use quire_config::CliSettings;
use quire_site::LibraryError;
use quire_storage::DocumentId;

use super::{GlobalArgs, open_library};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Document identifier as printed by `quire list`.
    id: String,

    /// Print the whole document as JSON instead of the HTML body.
    #[arg(long)]
    json: bool,
}

impl ShowArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(CliSettings::default())?;
        let library = open_library(&config);

        let content = match library.content(&DocumentId::new(self.id)) {
            Ok(content) => content,
            Err(err @ LibraryError::DocumentNotFound(_)) => {
                output.notice("Unable to load document content.");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &*content)?;
            writeln!(stdout)?;
        } else {
            write!(stdout, "{}", content.rendered_body)?;
        }
        Ok(())
    }
}

//! `quire list` command implementation.

use std::io::{self, Write};

use clap::Args;
use quire_config::CliSettings;

use super::{GlobalArgs, open_library, write_index};
use crate::error::CliError;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Print summaries as JSON in enumeration order.
    #[arg(long)]
    json: bool,
}

impl ListArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let config = global.load_config(CliSettings::default())?;
        let library = open_library(&config);
        let summaries = library.summaries()?;

        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &*summaries)?;
            writeln!(stdout)?;
        } else {
            write_index(&mut stdout, &summaries)?;
        }
        Ok(())
    }
}

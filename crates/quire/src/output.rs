//! Status lines on stderr.
//!
//! Document output (the index, rendered bodies, JSON) goes to stdout so it
//! can be piped; everything here is for the person at the terminal.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};
use quire_storage::{StorageEvent, StorageEventKind};

pub(crate) struct Output {
    term: Term,
    tag: Style,
    notice: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            tag: Style::new().cyan().bold(),
            notice: Style::new().yellow(),
            failure: Style::new().red().bold(),
        }
    }

    /// Header printed once when `quire watch` starts.
    pub(crate) fn banner(&self, source_dir: &Path, interval_secs: u64, watching: bool) {
        let mode = if watching {
            "on file change and"
        } else {
            "only"
        };
        self.line(&format!(
            "{} {} (refreshing {mode} every {interval_secs}s)",
            self.tag.apply_to("watching"),
            source_dir.display(),
        ));
    }

    /// One line per document change reported by the store.
    pub(crate) fn document_changed(&self, event: &StorageEvent) {
        self.line(&format!(
            "{} {}",
            self.tag.apply_to(change_label(event.kind)),
            event.id.display_name(),
        ));
    }

    /// Something the user should know about that is not fatal on its own.
    pub(crate) fn notice(&self, msg: &str) {
        self.line(&self.notice.apply_to(msg).to_string());
    }

    pub(crate) fn failure(&self, err: &dyn Display) {
        self.line(&format!("{} {err}", self.failure.apply_to("error:")));
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}

/// Past-tense label for a change, padded so document names line up.
fn change_label(kind: StorageEventKind) -> &'static str {
    match kind {
        StorageEventKind::Created => "added  ",
        StorageEventKind::Modified => "changed",
        StorageEventKind::Removed => "removed",
    }
}

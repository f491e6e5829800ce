//! `quire watch` command implementation.
//!
//! Acts as the revalidation scheduler for a [`Library`]: the caches are
//! invalidated when a document file changes and whenever the revalidation
//! interval elapses, and the index is printed again after each refresh.

use std::io;
use std::time::{Duration, Instant};

use clap::Args;
use quire_config::CliSettings;
use quire_site::Library;
use quire_storage::{RecvTimeoutError, StorageEvent, StorageEventReceiver};

use super::{GlobalArgs, open_library, write_index};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Seconds between scheduled revalidations (overrides config).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Only revalidate on schedule, ignore file changes.
    #[arg(long)]
    no_watch: bool,
}

impl WatchArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(CliSettings {
            interval_secs: self.interval,
            watch_enabled: self.no_watch.then_some(false),
            ..CliSettings::default()
        })?;
        let library = open_library(&config);

        // The handle must outlive the loop or the watcher stops
        let (events, _handle) = if config.watch.enabled {
            let (events, handle) = library.watch()?;
            (Some(events), Some(handle))
        } else {
            (None, None)
        };

        output.banner(
            &config.docs_resolved.source_dir,
            config.revalidate.interval_secs,
            config.watch.enabled,
        );
        print_index(&library, &output)?;

        let mut scheduler = Scheduler::new(events, config.revalidate.interval());
        loop {
            match scheduler.next_trigger()? {
                Trigger::Changed(event) => output.document_changed(&event),
                Trigger::Interval => tracing::info!("Scheduled revalidation"),
            }
            library.invalidate();
            print_index(&library, &output)?;
        }
    }
}

/// Print the index, reporting store errors without stopping the loop.
fn print_index(library: &Library, output: &Output) -> Result<(), CliError> {
    match library.summaries() {
        Ok(summaries) => write_index(&mut io::stdout().lock(), &summaries)?,
        Err(err) => output.failure(&err),
    }
    Ok(())
}

/// Reason for a revalidation.
#[derive(Debug)]
enum Trigger {
    Changed(StorageEvent),
    Interval,
}

/// Waits for the next document change or the end of the current interval.
struct Scheduler {
    events: Option<StorageEventReceiver>,
    interval: Duration,
    deadline: Instant,
}

impl Scheduler {
    fn new(events: Option<StorageEventReceiver>, interval: Duration) -> Self {
        Self {
            events,
            interval,
            deadline: Instant::now() + interval,
        }
    }

    /// Block until the next trigger.
    ///
    /// The store debounces each document, so a save arrives as one event.
    /// Events for other documents already queued behind it are drained into
    /// the same revalidation.
    fn next_trigger(&mut self) -> Result<Trigger, CliError> {
        let timeout = self.deadline.saturating_duration_since(Instant::now());

        let Some(events) = &self.events else {
            std::thread::sleep(timeout);
            self.deadline = Instant::now() + self.interval;
            return Ok(Trigger::Interval);
        };

        match events.recv_timeout(timeout) {
            Ok(event) => {
                while events.try_recv().is_some() {}
                Ok(Trigger::Changed(event))
            }
            Err(RecvTimeoutError::Timeout) => {
                self.deadline = Instant::now() + self.interval;
                Ok(Trigger::Interval)
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(CliError::Watch("file watcher stopped".to_owned()))
            }
        }
    }
}

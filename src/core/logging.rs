//! Leveled logging on `tracing`, with a console sink and an optional file sink.
//!
//! A `Logger` is built once in `main` and handed to the runner and to every
//! tester through their context. It owns a `tracing::Dispatch` instead of
//! installing a global subscriber; events are emitted under that dispatcher
//! with `dispatcher::with_default`.

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use tracing::dispatcher::{self, Dispatch};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub console: bool,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            console: true,
            file: None,
        }
    }
}

struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format(TIMESTAMP_FORMAT))
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Opens the file sink (append mode) if one is configured.
    pub fn new(config: &LogConfig) -> io::Result<Self> {
        // Warnings and errors go to stderr, everything else to stdout.
        let console = config.console.then(|| {
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTimestamp)
                .with_target(false)
                .with_writer(io::stderr.with_max_level(Level::WARN).or_else(io::stdout))
        });

        let file = match &config.file {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_timer(LocalTimestamp)
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry()
            .with(config.level)
            .with(console)
            .with(file);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// A logger that drops every event.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Runs `f` with this logger's subscriber as the thread's default, so
    /// `tracing` events raised inside land in the same sinks.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.scope(|| tracing::error!("{}", args));
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.scope(|| tracing::warn!("{}", args));
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.scope(|| tracing::info!("{}", args));
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.scope(|| tracing::debug!("{}", args));
    }
}

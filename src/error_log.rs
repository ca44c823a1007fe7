//! Console and file reporting for failed fetches
//!
//! Every failure is shown on the console with a pointer to the log file and
//! appended to that file as `[<timestamp>] <message>`. Writing the log never
//! fails the caller.
//!
//! When a progress bar is attached, console lines are printed while the bar is
//! suspended so they never land in the middle of a redraw.

use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Line printed before the log file path
pub const LOG_HINT: &str = "A log of this run can be found in:";

/// Timestamp format, e.g. `Sat Oct 17 2026 03:04:05 PM +0200`
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %I:%M:%S %p %z";

/// Appends failures to an error log
#[derive(Debug, Clone)]
pub struct ErrorLogger {
    path: PathBuf,
    progress_bar: Option<ProgressBar>,
}

impl ErrorLogger {
    /// Create a logger writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            progress_bar: None,
        }
    }

    /// Print console lines around `progress_bar` instead of through it
    pub fn with_progress_bar(mut self, progress_bar: ProgressBar) -> Self {
        self.progress_bar = Some(progress_bar);
        self
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format a single log line, newline included
    pub fn format_line(now: DateTime<Local>, message: &str) -> String {
        format!("[{}] {}\n", now.format(TIMESTAMP_FORMAT), message)
    }

    /// Report a failure on the console and append it to the log file
    pub async fn log(&self, error: &impl Display) {
        let message = error.to_string();
        debug!(log_file = %self.path.display(), "{}", message);

        match &self.progress_bar {
            Some(progress_bar) => progress_bar.suspend(|| self.print(&message)),
            None => self.print(&message),
        }

        if let Err(e) = self.append(&message).await {
            warn!("Failed to write {}: {}", self.path.display(), e);
        }
    }

    fn print(&self, message: &str) {
        eprintln!("{}", message);
        println!("{}", LOG_HINT);
        let shown = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        println!("{}", shown.display());
    }

    async fn append(&self, message: &str) -> std::io::Result<()> {
        let line = Self::format_line(Local::now(), message);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

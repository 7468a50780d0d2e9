//! Append-only job log file.
//!
//! Every line written to the log is also mirrored to `tracing` so the
//! worker's structured log stream carries the same story as the per-job
//! file the scheduler collects.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Severity attached to a job-log line.
///
/// `Debug` is the default; the command line and timing lines go out at
/// `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
}

/// Plain-text log for one job step.
///
/// Each append opens the file, writes one newline-terminated line, and
/// closes it again, so a crashed worker leaves a readable partial log
/// behind. A failed append is reported via `tracing` and otherwise ignored;
/// the log must never take a job step down with it.
#[derive(Debug, Clone)]
pub struct JobLog {
    path: PathBuf,
}

impl JobLog {
    /// Create a log handle for the given file path. The file itself is
    /// created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a line at `Debug` severity.
    pub fn append(&self, line: &str) {
        self.append_at(LogLevel::Debug, line);
    }

    /// Append a line at the given severity.
    pub fn append_at(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{line}"),
            LogLevel::Info => tracing::info!("{line}"),
        }

        if let Err(e) = self.write_line(line) {
            tracing::warn!(
                "failed to append to job log {}: {e}",
                self.path.display()
            );
        }
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")
    }

    /// Full log contents; an empty string when nothing was written yet.
    pub fn read(&self) -> kiln_core::Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_newline_terminated_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = JobLog::new(dir.path().join("job.log"));

        log.append("first line");
        log.append_at(LogLevel::Info, "second line");

        let contents = log.read().unwrap();
        assert_eq!(contents, "first line\nsecond line\n");
    }

    #[test]
    fn read_before_first_append_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = JobLog::new(dir.path().join("never-written.log"));
        assert_eq!(log.read().unwrap(), "");
    }

    #[test]
    fn survives_unwritable_path() {
        // Appending under a directory that does not exist must not panic.
        let log = JobLog::new("/nonexistent-dir-xyz/job.log");
        log.append("dropped");
        assert_eq!(log.read().unwrap(), "");
    }
}

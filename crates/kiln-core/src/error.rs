//! Unified error type for the kiln conversion crates.
//!
//! Only fatal conditions live here: a missing input file, a wrong input
//! format, and a tool failure that the operator does not tolerate. A
//! pass-through on an optional operator is a success outcome carrying a
//! warning, and media-info inspection failures are absorbed into the job
//! log, so neither appears as a variant.

use std::path::PathBuf;

/// Errors that unwind out of a job step.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file was absent when the operation started.
    #[error("input file [{}] does not exist", .path.display())]
    MissingInput {
        /// The path that was checked.
        path: PathBuf,
    },

    /// The conversion tool exited non-zero and the operator is not optional.
    #[error("engine [{engine}] failed with return value [{}]", exit_label(*.exit_code))]
    ToolExecution {
        /// Name of the engine kind that ran the tool.
        engine: String,
        /// Process exit code; `None` when the tool was killed by a signal.
        exit_code: Option<i32>,
    },

    /// The detected input type differs from what the backend requires.
    #[error(
        "file [{}] is of wrong format [{}], expecting [{expected}]",
        .path.display(),
        .detected.as_deref().unwrap_or("unknown")
    )]
    FormatMismatch {
        /// The inspected input file.
        path: PathBuf,
        /// Type reported by the inspection tool; `None` when detection failed.
        detected: Option<String>,
        /// Type the backend insists on.
        expected: String,
    },

    /// An external tool could not be located, spawned, or completed in time.
    #[error("tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool involved.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration or call-contract violation.
    #[error("validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Render an exit code for log lines and error messages: the numeric code,
/// or `"signal"` when the process was killed before it could exit.
pub fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

impl Error {
    /// Convenience constructor for [`Error::MissingInput`].
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Error::MissingInput { path: path.into() }
    }

    /// Convenience constructor for [`Error::ToolExecution`].
    pub fn tool_execution(engine: impl Into<String>, exit_code: Option<i32>) -> Self {
        Error::ToolExecution {
            engine: engine.into(),
            exit_code,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_display() {
        let err = Error::missing_input("/tmp/in.avi");
        assert_eq!(err.to_string(), "input file [/tmp/in.avi] does not exist");
    }

    #[test]
    fn tool_execution_display() {
        let err = Error::tool_execution("ffmpeg", Some(3));
        assert_eq!(
            err.to_string(),
            "engine [ffmpeg] failed with return value [3]"
        );
    }

    #[test]
    fn tool_execution_signal_display() {
        let err = Error::tool_execution("mencoder", None);
        assert_eq!(
            err.to_string(),
            "engine [mencoder] failed with return value [signal]"
        );
    }

    #[test]
    fn format_mismatch_display() {
        let err = Error::FormatMismatch {
            path: "/tmp/in.avi".into(),
            detected: Some("AVI".into()),
            expected: "Macromedia Flash Video".into(),
        };
        assert_eq!(
            err.to_string(),
            "file [/tmp/in.avi] is of wrong format [AVI], expecting [Macromedia Flash Video]"
        );
    }

    #[test]
    fn format_mismatch_unknown_display() {
        let err = Error::FormatMismatch {
            path: "/tmp/in.avi".into(),
            detected: None,
            expected: "AVI".into(),
        };
        assert!(err.to_string().contains("wrong format [unknown]"));
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("mediainfo", "failed to spawn");
        assert_eq!(err.to_string(), "tool error [mediainfo]: failed to spawn");
    }

    #[test]
    fn exit_label_renders_code_or_signal() {
        assert_eq!(exit_label(Some(0)), "0");
        assert_eq!(exit_label(Some(137)), "137");
        assert_eq!(exit_label(None), "signal");
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
    }
}

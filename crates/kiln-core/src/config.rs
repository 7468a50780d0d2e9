//! Task configuration handed to the engine by the scheduler.
//!
//! [`TaskConfig`] is deserialized from JSON and every section defaults
//! sensibly, so a completely empty `{}` document is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Configuration for one conversion task, as dispatched by the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub params: TaskParams,
    pub tools: ToolsConfig,
}

/// Engine behavior knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskParams {
    /// When `true`, media-info inspection output for the input and output
    /// files is appended to the job log.
    pub media_info_enabled: bool,
    /// Maximum subprocess runtime in seconds. `None` preserves the historic
    /// behavior of blocking until the tool exits.
    pub timeout_secs: Option<u64>,
}

/// Per-tool executable path overrides. `None` means look the tool up in
/// `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub mencoder_path: Option<PathBuf>,
    pub mediainfo_path: Option<PathBuf>,
    pub file_path: Option<PathBuf>,
}

impl TaskConfig {
    /// Deserialize a `TaskConfig` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("task config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse task config {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No task config at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read task config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.params.timeout_secs == Some(0) {
            warnings.push("params.timeout_secs is 0; every tool run will be killed".into());
        }

        for (name, path) in [
            ("ffmpeg_path", &self.tools.ffmpeg_path),
            ("mencoder_path", &self.tools.mencoder_path),
            ("mediainfo_path", &self.tools.mediainfo_path),
            ("file_path", &self.tools.file_path),
        ] {
            if let Some(p) = path {
                if !p.exists() {
                    warnings.push(format!("tools.{name} [{}] does not exist", p.display()));
                }
            }
        }

        warnings
    }
}

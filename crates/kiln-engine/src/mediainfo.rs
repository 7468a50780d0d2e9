//! Media-info inspection appended to the job log.
//!
//! Diagnostic only: nothing in this module can fail a job step. Every
//! failure mode is written to the job log and swallowed.

use std::path::Path;

use crate::joblog::JobLog;
use crate::tools::ToolRegistry;

/// Run the discovered `mediainfo` binary over `path` and append its output
/// to the job log.
///
/// The path is canonicalized first; when it cannot be resolved (typically
/// because the file does not exist) a note is logged and the inspection is
/// skipped.
pub async fn log_media_info(registry: &ToolRegistry, path: &Path, log: &JobLog) {
    let resolved = match tokio::fs::canonicalize(path).await {
        Ok(p) => p,
        Err(_) => {
            log.append(&format!("Cannot find file [{}]", path.display()));
            return;
        }
    };

    let tool = match registry.require("mediainfo") {
        Ok(cfg) => cfg.path.clone(),
        Err(e) => {
            log.append(&format!("media info skipped: {e}"));
            return;
        }
    };

    match tokio::process::Command::new(&tool)
        .arg(&resolved)
        .output()
        .await
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.trim().is_empty() {
                log.append(stdout.trim_end());
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                log.append(stderr.trim_end());
            }
            if !output.status.success() {
                log.append(&format!(
                    "mediainfo on [{}] exited with [{}]",
                    resolved.display(),
                    output.status
                ));
            }
        }
        Err(e) => {
            log.append(&format!("mediainfo failed on [{}]: {e}", resolved.display()));
        }
    }
}

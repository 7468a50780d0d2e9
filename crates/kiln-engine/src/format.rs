//! Input container/codec validation via `file(1)`.

use std::path::Path;

use kiln_core::{Error, Result};

use crate::tools::ToolRegistry;

/// Run `file` on `path` and return the detected type.
///
/// Returns `None` when the tool is unavailable, exits non-zero, or its
/// output is unparsable. A `None` never matches any expected format, so
/// detection failures surface as a mismatch downstream.
pub async fn detect_format(registry: &ToolRegistry, path: &Path) -> Option<String> {
    let tool = registry.require("file").ok()?;
    tracing::debug!("executing: {} {}", tool.path.display(), path.display());

    let output = tokio::process::Command::new(&tool.path)
        .arg(path)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let detected = parse_file_type(stdout.lines().next()?)?;
    tracing::debug!("file [{}] type [{detected}]", path.display());
    Some(detected)
}

/// Fail with [`Error::FormatMismatch`] unless the detected type equals
/// `expected`.
pub async fn validate_format(
    registry: &ToolRegistry,
    path: &Path,
    expected: &str,
) -> Result<()> {
    let detected = detect_format(registry, path).await;
    if detected.as_deref() == Some(expected) {
        return Ok(());
    }
    Err(Error::FormatMismatch {
        path: path.to_path_buf(),
        detected,
        expected: expected.to_string(),
    })
}

/// Parse the type token out of one line of `file` output.
///
/// `"/tmp/a.avi: RIFF (little-endian) data, AVI, 320 x 240"` yields `RIFF
/// (little-endian) data`: the first colon-delimited field after the file
/// name, up to the first comma. A line without a comma after the type is
/// unparsable, matching the original tooling.
fn parse_file_type(line: &str) -> Option<String> {
    let (_, rest) = line.split_once(':')?;
    let (detected, _) = rest.split_once(',')?;
    let detected = detected.trim();
    if detected.is_empty() {
        return None;
    }
    Some(detected.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_token() {
        assert_eq!(
            parse_file_type("/tmp/a.flv: Macromedia Flash Video, 320 x 240").as_deref(),
            Some("Macromedia Flash Video")
        );
    }

    #[test]
    fn parses_type_with_parenthesised_detail() {
        assert_eq!(
            parse_file_type("clip.avi: RIFF (little-endian) data, AVI").as_deref(),
            Some("RIFF (little-endian) data")
        );
    }

    #[test]
    fn line_without_comma_is_unparsable() {
        assert_eq!(parse_file_type("/tmp/a: data"), None);
    }

    #[test]
    fn line_without_colon_is_unparsable() {
        assert_eq!(parse_file_type("garbage output"), None);
    }

    #[test]
    fn empty_type_is_unparsable() {
        assert_eq!(parse_file_type("/tmp/a: , trailing"), None);
    }
}

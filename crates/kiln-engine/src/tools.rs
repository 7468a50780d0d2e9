//! External tool detection and management.
//!
//! The [`ToolRegistry`] resolves and caches the locations of the external
//! CLI tools the engine shells out to (ffmpeg, mencoder, mediainfo, file).

use std::collections::HashMap;
use std::path::PathBuf;

use kiln_core::ToolsConfig;

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &["ffmpeg", "mencoder", "mediainfo", "file"];

/// Resolved location of a single external tool.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Human-readable tool name (e.g. "ffmpeg").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
}

/// Registry holding discovered tool locations.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides from config).
    ///
    /// For each known tool, if the [`ToolsConfig`] supplies a custom path
    /// **and** that path exists, it is used directly. Otherwise
    /// [`which::which`] is used to locate the tool in `PATH`. Tools that are
    /// not found are silently omitted from the registry.
    pub fn discover(tools_config: &ToolsConfig) -> Self {
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            let custom_path = match name {
                "ffmpeg" => tools_config.ffmpeg_path.as_deref(),
                "mencoder" => tools_config.mencoder_path.as_deref(),
                "mediainfo" => tools_config.mediainfo_path.as_deref(),
                "file" => tools_config.file_path.as_deref(),
                _ => None,
            };

            let resolved = if let Some(p) = custom_path {
                if p.exists() {
                    Some(p.to_path_buf())
                } else {
                    // Custom path does not exist; fall back to PATH.
                    which::which(name).ok()
                }
            } else {
                which::which(name).ok()
            };

            if let Some(path) = resolved {
                tools.insert(
                    name.to_string(),
                    ToolConfig {
                        name: name.to_string(),
                        path,
                    },
                );
            }
        }

        Self { tools }
    }

    /// Build a registry from pre-resolved tool locations, bypassing
    /// discovery. Any tool not in `tools` is treated as unavailable.
    pub fn with_tools(tools: impl IntoIterator<Item = ToolConfig>) -> Self {
        Self {
            tools: tools
                .into_iter()
                .map(|cfg| (cfg.name.clone(), cfg))
                .collect(),
        }
    }

    /// Return a reference to the [`ToolConfig`] for the given tool, or a
    /// [`kiln_core::Error::Tool`] if the tool was not found during discovery.
    pub fn require(&self, name: &str) -> kiln_core::Result<&ToolConfig> {
        self.tools.get(name).ok_or_else(|| kiln_core::Error::Tool {
            tool: name.to_string(),
            message: format!("{name} not found; is it installed and in PATH?"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_missing_tool_returns_error() {
        let registry = ToolRegistry::with_tools([]);
        let err = registry.require("nonexistent_tool_xyz").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn existing_override_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, "#!/bin/sh\n").unwrap();

        let cfg = ToolsConfig {
            ffmpeg_path: Some(fake.clone()),
            ..Default::default()
        };
        let registry = ToolRegistry::discover(&cfg);
        assert_eq!(registry.require("ffmpeg").unwrap().path, fake);
    }

    #[test]
    fn with_tools_registers_exactly_what_it_is_given() {
        let registry = ToolRegistry::with_tools([ToolConfig {
            name: "mediainfo".into(),
            path: PathBuf::from("/opt/mediainfo"),
        }]);
        assert_eq!(
            registry.require("mediainfo").unwrap().path,
            PathBuf::from("/opt/mediainfo")
        );
        assert!(registry.require("ffmpeg").is_err());
    }
}

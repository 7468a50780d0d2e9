//! Backend command construction.
//!
//! Every conversion tool has a different CLI surface but identical
//! surrounding concerns, so the engine keeps the orchestration fixed and
//! funnels all backend-specific behavior through
//! [`EngineKind::build_command_line`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which external conversion tool drives a job step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// General-purpose ffmpeg transcode.
    Ffmpeg,
    /// Mencoder transcode. Single-output: only the first variant slot
    /// (ordered by variant key) receives a file.
    Mencoder,
    /// Flash video encoder; drives the ffmpeg binary with the flv muxer.
    FlvEncoder,
}

impl EngineKind {
    /// Binary this backend runs, as registered in the
    /// [`ToolRegistry`](crate::tools::ToolRegistry).
    pub fn tool_name(&self) -> &'static str {
        match self {
            EngineKind::Ffmpeg | EngineKind::FlvEncoder => "ffmpeg",
            EngineKind::Mencoder => "mencoder",
        }
    }

    /// `file(1)` type this backend insists on before converting, if any.
    pub fn required_input_format(&self) -> Option<&'static str> {
        match self {
            EngineKind::FlvEncoder => Some("Macromedia Flash Video"),
            _ => None,
        }
    }

    /// Build the invocation for one conversion run.
    ///
    /// `config_args` are extra tool arguments read from the bound config
    /// file; they are inserted between the input and the output paths.
    pub fn build_command_line(
        &self,
        program: &Path,
        input: &Path,
        outputs: &BTreeMap<String, PathBuf>,
        config_args: &[String],
    ) -> CommandSpec {
        let mut args: Vec<String> = Vec::new();

        match self {
            EngineKind::Ffmpeg => {
                args.push("-y".into());
                args.push("-i".into());
                args.push(lossy(input));
                args.extend(config_args.iter().cloned());
                for path in outputs.values() {
                    args.push(lossy(path));
                }
            }
            EngineKind::FlvEncoder => {
                args.push("-y".into());
                args.push("-i".into());
                args.push(lossy(input));
                args.extend(config_args.iter().cloned());
                for path in outputs.values() {
                    args.push("-f".into());
                    args.push("flv".into());
                    args.push(lossy(path));
                }
            }
            EngineKind::Mencoder => {
                args.push(lossy(input));
                args.extend(config_args.iter().cloned());
                if let Some(path) = outputs.values().next() {
                    args.push("-o".into());
                    args.push(lossy(path));
                }
            }
        }

        CommandSpec {
            program: program.to_path_buf(),
            args,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Ffmpeg => "ffmpeg",
            EngineKind::Mencoder => "mencoder",
            EngineKind::FlvEncoder => "flvencoder",
        };
        f.write_str(name)
    }
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A fully resolved tool invocation: program plus discrete argv entries.
///
/// Arguments are handed to the process as separate argv entries, never
/// joined through a shell, so paths containing spaces or shell
/// metacharacters are safe.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Resolved path of the executable.
    pub program: PathBuf,
    /// Arguments in order.
    pub args: Vec<String>,
}

impl fmt::Display for CommandSpec {
    /// Render a shell-like line for logging. Arguments containing
    /// whitespace are quoted for readability only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.chars().any(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

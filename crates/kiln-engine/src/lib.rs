//! # kiln-engine
//!
//! Conversion-job execution for the kiln batch platform.
//!
//! This crate provides:
//!
//! - **The operation engine** ([`OperationEngine`]) -- runs one conversion
//!   step as an external subprocess, captures timing/output/exit code, and
//!   applies the optional-operator pass-through policy on failure.
//! - **Backends** ([`EngineKind`]) -- per-tool command construction for
//!   ffmpeg, mencoder, and the flash encoder.
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to the
//!   external CLI tools.
//! - **Job log** ([`JobLog`]) -- append-only per-step log file, mirrored to
//!   `tracing`.
//! - **Input-format validation** ([`format::validate_format`]) -- `file(1)`
//!   based container/codec checks for backends that require one.
//! - **Media-info logging** ([`mediainfo::log_media_info`]) -- diagnostic
//!   inspection appended to the job log, never affecting job outcome.
//!
//! A hung tool blocks the step indefinitely unless a timeout is configured
//! or a cancellation token is attached; both guards are opt-in so the
//! default success path is unchanged.

pub mod backend;
pub mod engine;
pub mod format;
pub mod joblog;
pub mod mediainfo;
pub mod tools;

// ---- Re-exports for convenience ----

pub use backend::{CommandSpec, EngineKind};
pub use engine::{OperationEngine, OperationOutcome};
pub use joblog::{JobLog, LogLevel};
pub use tools::{ToolConfig, ToolRegistry};

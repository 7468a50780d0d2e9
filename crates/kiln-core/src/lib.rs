//! # kiln-core
//!
//! Shared types for the kiln conversion engine:
//!
//! - **Errors** ([`Error`], [`Result`]) -- the fatal failure modes a job
//!   step can surface to the scheduler.
//! - **Configuration** ([`TaskConfig`]) -- JSON-backed task parameters and
//!   per-tool path overrides.
//! - **Job-step types** ([`Operator`], [`JobData`], [`PlatformClient`]) --
//!   scheduler-owned descriptors the engine consumes read-only.

pub mod config;
pub mod error;
pub mod job;

// ---- Re-exports for convenience ----

pub use config::{TaskConfig, TaskParams, ToolsConfig};
pub use error::{Error, Result};
pub use job::{JobData, NoopClient, Operator, PlatformClient};

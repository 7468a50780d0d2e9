//! Job-step types consumed by the engine.
//!
//! The scheduler owns these; the engine only reads them.

use serde::{Deserialize, Serialize};

/// Descriptor for one conversion step of a job.
///
/// The engine never mutates an operator; the only field it acts on is
/// [`is_optional`](Operator::is_optional).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// Human-readable operator name, used in warnings reported upward.
    pub name: String,
    /// Values above zero mark the step as optional: when the tool fails, the
    /// engine copies the source to the output instead of failing the step.
    #[serde(default)]
    pub is_optional: u32,
}

impl Operator {
    /// Create a non-optional operator.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_optional: 0,
        }
    }

    /// Create an optional operator (failure degrades to pass-through).
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_optional: 1,
        }
    }

    /// Whether failure of this step is tolerable.
    pub fn is_optional(&self) -> bool {
        self.is_optional > 0
    }
}

/// Opaque scheduler payload for the job being converted.
///
/// The engine forwards this untouched; only concrete backends or the
/// scheduler interpret it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobData(pub serde_json::Value);

/// Capability through which the engine reports back to the platform.
///
/// Bound via `configure`; replaces a process-wide client/logging singleton
/// with an injected interface.
pub trait PlatformClient: Send + Sync {
    /// Called when a step degrades to pass-through. `message` is the same
    /// warning retained on the engine for the scheduler to inspect.
    fn report_warning(&self, operator: &str, message: &str);
}

/// Client that discards all reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClient;

impl PlatformClient for NoopClient {
    fn report_warning(&self, _operator: &str, _message: &str) {}
}

//! The conversion operation engine.
//!
//! One [`OperationEngine`] is built per job step, configured from the
//! scheduler's task config, driven through [`operate`](OperationEngine::operate)
//! exactly once, and then queried for its results. The orchestration --
//! existence checks, format validation, timing, logging, the
//! optional-operator pass-through fallback -- is identical for every
//! backend; only command construction varies (see
//! [`EngineKind`](crate::backend::EngineKind)).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use kiln_core::error::exit_label;
use kiln_core::{Error, JobData, NoopClient, Operator, PlatformClient, Result, TaskConfig};

use crate::backend::{CommandSpec, EngineKind};
use crate::joblog::{JobLog, LogLevel};
use crate::tools::ToolRegistry;
use crate::{format, mediainfo};

/// Result of a completed job step: where the outputs landed and, for a
/// pass-through, the warning to surface on the platform.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    /// Output files by bitrate/variant identifier.
    pub output_file_paths: BTreeMap<String, PathBuf>,
    /// Warning message when the step degraded to pass-through.
    pub warning: Option<String>,
}

/// Executes one conversion step by shelling out to an external tool.
pub struct OperationEngine {
    kind: EngineKind,
    tools: Arc<ToolRegistry>,
    /// Target paths by variant identifier, bound at construction.
    output_spec: BTreeMap<String, PathBuf>,
    log: JobLog,

    operator: Option<Operator>,
    input_file_path: PathBuf,
    config_file_path: Option<PathBuf>,
    job_data: Option<JobData>,
    client: Arc<dyn PlatformClient>,

    /// Populated only after a successful (or pass-through) execution.
    output_file_paths: BTreeMap<String, PathBuf>,
    /// Non-empty only when a failure or pass-through occurred.
    message: Option<String>,

    media_info_enabled: bool,
    timeout: Option<Duration>,
    cancellation: CancellationToken,
}

impl OperationEngine {
    /// Create an engine for one job step.
    ///
    /// `output_spec` maps bitrate/variant identifiers to the paths the
    /// conversion should produce; `log_file_path` is the per-step log the
    /// scheduler collects afterwards.
    pub fn new(
        kind: EngineKind,
        tools: Arc<ToolRegistry>,
        output_spec: BTreeMap<String, PathBuf>,
        log_file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            tools,
            output_spec,
            log: JobLog::new(log_file_path),
            operator: None,
            input_file_path: PathBuf::new(),
            config_file_path: None,
            job_data: None,
            client: Arc::new(NoopClient),
            output_file_paths: BTreeMap::new(),
            message: None,
            media_info_enabled: false,
            timeout: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Bind the scheduler-provided task config, job data, and platform
    /// client. Field assignment only; must be called before
    /// [`operate`](Self::operate).
    pub fn configure(
        &mut self,
        task_config: &TaskConfig,
        data: JobData,
        client: Arc<dyn PlatformClient>,
    ) {
        self.client = client;
        self.job_data = Some(data);
        self.media_info_enabled = task_config.params.media_info_enabled;
        self.timeout = task_config.params.timeout_secs.map(Duration::from_secs);
    }

    /// Builder: attach a cancellation token. Cancelling it kills a running
    /// subprocess and fails the step with [`Error::Tool`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Run the conversion step.
    ///
    /// Stores the arguments, then executes the shared operation flow. Fails
    /// with [`Error::MissingInput`] if `input_file_path` does not exist on
    /// disk at invocation time.
    pub async fn operate(
        &mut self,
        operator: Option<Operator>,
        input_file_path: impl Into<PathBuf>,
        config_file_path: Option<PathBuf>,
    ) -> Result<OperationOutcome> {
        self.operator = operator;
        self.input_file_path = input_file_path.into();
        self.config_file_path = config_file_path;

        self.do_operation().await
    }

    async fn do_operation(&mut self) -> Result<OperationOutcome> {
        if !self.input_file_path.exists() {
            return Err(Error::missing_input(&self.input_file_path));
        }

        if let Some(expected) = self.kind.required_input_format() {
            format::validate_format(&self.tools, &self.input_file_path, expected).await?;
        }

        let program = self.tools.require(self.kind.tool_name())?.path.clone();
        let config_args = self.read_config_args().await?;
        let cmd = self.kind.build_command_line(
            &program,
            &self.input_file_path,
            &self.output_spec,
            &config_args,
        );

        self.log.append(&format!(
            "Executed by [{}] on input file [{}]",
            self.kind,
            self.input_file_path.display()
        ));
        self.log.append_at(LogLevel::Info, &cmd.to_string());

        if self.media_info_enabled {
            mediainfo::log_media_info(&self.tools, &self.input_file_path, &self.log).await;
        }

        let start = Instant::now();
        let (exit_code, captured) = self.run(&cmd).await?;
        let elapsed = start.elapsed();

        self.log.append_at(
            LogLevel::Info,
            &format!(
                "{}: [{}] took [{:.3}] seconds",
                self.kind,
                exit_label(exit_code),
                elapsed.as_secs_f64()
            ),
        );
        if !captured.is_empty() {
            self.log.append(&captured);
        }

        let result = if exit_code == Some(0) {
            self.output_file_paths = self.output_spec.clone();
            Ok(OperationOutcome {
                output_file_paths: self.output_file_paths.clone(),
                warning: None,
            })
        } else {
            self.handle_failure(exit_code).await
        };

        // Runs regardless of outcome; a fatal failure publishes no outputs,
        // so there is nothing to inspect in that case.
        if self.media_info_enabled {
            for path in self.output_file_paths.values() {
                mediainfo::log_media_info(&self.tools, path, &self.log).await;
            }
        }

        result
    }

    /// Spawn the tool and wait for it, racing the cancellation token and
    /// honoring the configured timeout (the default is to wait forever).
    ///
    /// Returns the exit code (`None` when killed by a signal) and the
    /// captured stdout+stderr text.
    async fn run(&self, cmd: &CommandSpec) -> Result<(Option<i32>, String)> {
        let mut command = tokio::process::Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| Error::tool(self.kind.tool_name(), format!("failed to spawn: {e}")))?;

        let wait = child.wait_with_output();
        tokio::pin!(wait);

        let waited = if let Some(limit) = self.timeout {
            tokio::select! {
                res = tokio::time::timeout(limit, &mut wait) => match res {
                    Ok(r) => r,
                    Err(_) => {
                        return Err(Error::tool(
                            self.kind.tool_name(),
                            format!("timed out after {limit:?}"),
                        ));
                    }
                },
                _ = self.cancellation.cancelled() => {
                    return Err(Error::tool(self.kind.tool_name(), "cancelled"));
                }
            }
        } else {
            tokio::select! {
                res = &mut wait => res,
                _ = self.cancellation.cancelled() => {
                    return Err(Error::tool(self.kind.tool_name(), "cancelled"));
                }
            }
        };

        let output = waited.map_err(|e| {
            Error::tool(
                self.kind.tool_name(),
                format!("I/O error waiting for process: {e}"),
            )
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim_end();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }

        Ok((output.status.code(), text))
    }

    /// Apply the failure policy for a non-zero exit code.
    ///
    /// An optional operator degrades the step to pass-through: the source is
    /// copied to every bound output slot and the composed warning is stored
    /// and reported through the platform client. Anything else is fatal.
    async fn handle_failure(&mut self, exit_code: Option<i32>) -> Result<OperationOutcome> {
        let optional = self
            .operator
            .as_ref()
            .is_some_and(Operator::is_optional);

        if !optional {
            return Err(Error::tool_execution(self.kind.to_string(), exit_code));
        }

        if self.output_spec.is_empty() {
            self.log
                .append("operator is optional but no output slot is bound; cannot pass through");
            return Err(Error::tool_execution(self.kind.to_string(), exit_code));
        }

        let mut msg = format!(
            "Operator failed with return value: [{}]",
            exit_label(exit_code)
        );
        if let Some(prior) = &self.message {
            msg.push_str(&format!(", message: [{prior}]"));
        }
        msg.push_str(
            ". Operator is defined as optional, therefore switching to passthrough mode - \
             copy the source to output.",
        );

        for path in self.output_spec.values() {
            tokio::fs::copy(&self.input_file_path, path).await?;
        }

        self.log.append(&msg);
        if let Some(op) = &self.operator {
            self.client.report_warning(&op.name, &msg);
        }

        self.message = Some(msg.clone());
        self.output_file_paths = self.output_spec.clone();

        Ok(OperationOutcome {
            output_file_paths: self.output_file_paths.clone(),
            warning: Some(msg),
        })
    }

    /// Read extra tool arguments from the bound config file, one per line.
    /// Blank lines and `#` comments are skipped.
    async fn read_config_args(&self) -> Result<Vec<String>> {
        let Some(path) = &self.config_file_path else {
            return Ok(Vec::new());
        };
        let contents = tokio::fs::read_to_string(path).await?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect())
    }

    // ---- Post-execution accessors --------------------------------------

    /// Output files by variant identifier; empty until a successful or
    /// pass-through execution.
    pub fn output_file_paths(&self) -> &BTreeMap<String, PathBuf> {
        &self.output_file_paths
    }

    /// Last warning message; `None` unless a pass-through occurred.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Full contents of the job log.
    pub fn log_data(&self) -> Result<String> {
        self.log.read()
    }

    /// Path of the job log file.
    pub fn log_file_path(&self) -> &Path {
        self.log.path()
    }

    /// The opaque job payload bound by `configure`.
    pub fn job_data(&self) -> Option<&JobData> {
        self.job_data.as_ref()
    }
}

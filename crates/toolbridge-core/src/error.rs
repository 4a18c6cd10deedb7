use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors that abort a single invocation before a verdict can exist.
///
/// None of these are ever turned into a [`crate::Verdict`]; the caller
/// decides how to report a run that could not be started.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(
        "no launcher artifact found in {} (tried: {})",
        dir.display(),
        candidates.join(", ")
    )]
    LauncherNotFound { dir: PathBuf, candidates: Vec<String> },

    #[error(
        "could not determine the tool version of {} ({} attempt(s) failed)",
        executable.display(),
        attempts.len()
    )]
    VersionNegotiationFailed {
        executable: PathBuf,
        attempts: Vec<ProbeFailure>,
    },

    #[error("no runtime reporting {marker:?} found (tried: {})", candidates.join(", "))]
    RuntimeNotFound { candidates: Vec<String>, marker: String },

    #[error("unsupported invocation: {0}")]
    UnsupportedInvocation(String),

    #[error("command line contains an empty argument: {argv:?}")]
    MalformedCommandLine { argv: Vec<String> },

    #[error("unknown tool: {0:?}")]
    UnknownTool(String),
}

/// Diagnostics of one failed probe (a single negotiation attempt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFailure {
    /// Generation or candidate the probe was testing, e.g. `"API 2"`.
    pub attempt: String,
    /// The full command line that was run.
    pub command: Vec<String>,
    /// Exit code, if the process ran to completion.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Why this attempt was rejected.
    pub reason: String,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (command: {}, exit code: {})",
            self.attempt,
            self.reason,
            self.command.join(" "),
            self.exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_owned()),
        )
    }
}

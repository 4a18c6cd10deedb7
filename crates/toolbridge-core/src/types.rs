//! Values exchanged between the harness and the adapters.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the memory limit (in bytes) inside [`ResourceLimits`].
pub const MEMLIMIT: &str = "memlimit";
/// Name of the CPU-time limit (in seconds) inside [`ResourceLimits`].
pub const TIMELIMIT: &str = "timelimit";

/// Named resource limits for a run, e.g. `memlimit -> bytes`.
///
/// Adapters only read these to shape a command line; enforcement belongs
/// to the harness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLimits(BTreeMap<String, u64>);

impl ResourceLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a limit, replacing any earlier value.
    pub fn with(mut self, name: impl Into<String>, value: u64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    /// The memory limit in bytes, if one was given.
    pub fn memory_bytes(&self) -> Option<u64> {
        self.get(MEMLIMIT)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the harness knows about one run before it starts.
///
/// Use [`InvocationRequest::new`] and chain the builder-style setters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Input artifacts, in order.
    pub inputs: Vec<String>,
    /// Tool-specific options, in order. Duplicates are kept.
    pub options: Vec<String>,
    /// Property (specification) file, if any.
    pub property_file: Option<String>,
    pub limits: ResourceLimits,
}

impl InvocationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.inputs.push(input.into());
        self
    }

    pub fn inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn property_file(mut self, path: impl Into<String>) -> Self {
        self.property_file = Some(path.into());
        self
    }

    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Whether `option` appears verbatim in the option list.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Termination evidence of a finished run, as captured by the harness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutcome {
    pub exit_code: i32,
    /// Terminating signal, `0` if the process exited normally.
    pub signal: i32,
    /// Captured stdout, one entry per line, in order.
    pub lines: Vec<String>,
    /// Whether the harness killed the run for exceeding its time limit.
    pub timed_out: bool,
}

impl RawOutcome {
    pub fn new(exit_code: i32, signal: i32, lines: Vec<String>, timed_out: bool) -> Self {
        Self {
            exit_code,
            signal,
            lines,
            timed_out,
        }
    }

    /// The captured lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// The last line that is not blank, trimmed.
    pub fn last_line(&self) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
    }
}

/// The command-line grammar a run was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    /// Frozen competition release with its own fixed grammar.
    Legacy,
    /// Wrapper script driven by a property file.
    PropertyFile,
    /// Tool started directly through its runtime with an explicit toolchain.
    Direct,
    /// Plain `exe options inputs` call without a property file.
    Plain,
}

/// Facts about the build step that classification of the same run needs.
///
/// Returned inside [`PreparedInvocation`] and handed back to
/// `classify` by the caller; adapters never keep it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationContext {
    /// Name of the tool the run was built for.
    pub tool: String,
    pub mode: InvocationMode,
    /// Options as they ended up on the command line.
    pub options: Vec<String>,
    pub uses_property_file: bool,
    /// Whether the tool was asked for machine-readable (XML) output.
    pub structured_output: bool,
    /// Negotiated tool generation.
    pub generation: u32,
}

impl ClassificationContext {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// A ready-to-spawn command line plus the context needed to classify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedInvocation {
    /// Correlates log lines of the build and classify steps.
    pub request_id: Uuid,
    /// Program followed by its arguments. Never contains an empty element.
    pub argv: Vec<String>,
    /// Directory the tool expects to be started from, if it matters.
    pub working_dir: Option<PathBuf>,
    pub context: ClassificationContext,
}

/// What negotiation found out about one tool installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// API generation; higher is newer. `0` means "not negotiated".
    pub generation: u32,
    pub version: String,
    /// Launcher artifact the tool is started through in direct mode.
    pub launcher: Option<PathBuf>,
    /// Whether direct mode must pass an explicit data directory.
    pub requires_data_dir: bool,
    /// Auxiliary runtime (e.g. a JVM) used for direct mode.
    pub runtime: Option<PathBuf>,
    /// Frozen competition release with hard-coded capabilities.
    pub legacy: bool,
}

impl Capabilities {
    /// Capabilities of a tool that needs no negotiation.
    pub fn fixed(generation: u32) -> Self {
        Self {
            generation,
            version: String::new(),
            launcher: None,
            requires_data_dir: false,
            runtime: None,
            legacy: false,
        }
    }

    /// Capabilities of a frozen competition release.
    pub fn legacy(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            legacy: true,
            ..Self::fixed(0)
        }
    }
}

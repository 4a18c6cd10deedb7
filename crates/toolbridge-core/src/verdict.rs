//! The verdict taxonomy.
//!
//! A [`Verdict`] is the single value the classifier produces for one
//! verification run. The canonical verdicts are the ones a benchmark
//! scores. The remaining variants are diagnostics that explain why no
//! canonical answer could be given.

use std::fmt;

use serde::{Serialize, Serializer};

/// Outcome of one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The property holds.
    True,
    /// A reachability (unreach-call) violation was found.
    FalseReach,
    /// An invalid pointer dereference was found.
    FalseDeref,
    /// An invalid free was found.
    FalseFree,
    /// Allocated memory is not tracked until program exit.
    FalseMemtrack,
    /// Allocated memory is not released before program exit.
    FalseMemcleanup,
    /// A signed integer overflow was found.
    FalseOverflow,
    /// A non-terminating execution was found.
    FalseTermination,
    /// An LTL property is violated.
    FalseLtl,
    /// The tool gave up without an answer.
    Unknown,
    /// The tool gave up and named a reason (e.g. an over-approximated
    /// counterexample).
    Inconclusive(String),
    /// The tool finished a run that has no true/false answer (e.g. witness
    /// validation).
    Done,
    /// Horn-clause satisfiability result.
    Sat,
    /// Horn-clause unsatisfiability result.
    Unsat,

    /// The run was stopped because it hit its time limit.
    Timeout,
    /// The run exhausted its memory.
    OutOfMemory,
    /// The tool produced output that could not be interpreted.
    InvalidOutput,
    /// The tool rejected its command line.
    InvalidArguments,
    /// The run failed; the detail, if any, names the failure.
    Error(Option<String>),
    /// The tool reported a terminal status that contradicts its exit code.
    InconsistentStatus { status: String, exit_code: i32 },
}

/// Coarse grouping of verdicts, used for scoring and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictClass {
    True,
    False,
    Unknown,
    Error,
}

impl Verdict {
    /// Build an error verdict carrying a detail message.
    pub fn error(detail: impl Into<String>) -> Self {
        Verdict::Error(Some(detail.into()))
    }

    /// Error verdict for a run that was terminated by a signal.
    pub fn signal(signal: i32) -> Self {
        Verdict::Error(Some(format!("signal {signal}")))
    }

    pub fn class(&self) -> VerdictClass {
        match self {
            Verdict::True => VerdictClass::True,
            Verdict::FalseReach
            | Verdict::FalseDeref
            | Verdict::FalseFree
            | Verdict::FalseMemtrack
            | Verdict::FalseMemcleanup
            | Verdict::FalseOverflow
            | Verdict::FalseTermination
            | Verdict::FalseLtl => VerdictClass::False,
            Verdict::Unknown
            | Verdict::Inconclusive(_)
            | Verdict::Done
            | Verdict::Sat
            | Verdict::Unsat => VerdictClass::Unknown,
            Verdict::Timeout
            | Verdict::OutOfMemory
            | Verdict::InvalidOutput
            | Verdict::InvalidArguments
            | Verdict::Error(_)
            | Verdict::InconsistentStatus { .. } => VerdictClass::Error,
        }
    }

    /// Whether this verdict belongs to the closed set a benchmark scores.
    pub fn is_canonical(&self) -> bool {
        matches!(
            self,
            Verdict::True
                | Verdict::FalseReach
                | Verdict::FalseDeref
                | Verdict::FalseFree
                | Verdict::FalseMemtrack
                | Verdict::FalseMemcleanup
                | Verdict::FalseOverflow
                | Verdict::FalseTermination
                | Verdict::Unknown
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::True => f.write_str("TRUE"),
            Verdict::FalseReach => f.write_str("FALSE(unreach-call)"),
            Verdict::FalseDeref => f.write_str("FALSE(valid-deref)"),
            Verdict::FalseFree => f.write_str("FALSE(valid-free)"),
            Verdict::FalseMemtrack => f.write_str("FALSE(valid-memtrack)"),
            Verdict::FalseMemcleanup => f.write_str("FALSE(valid-memcleanup)"),
            Verdict::FalseOverflow => f.write_str("FALSE(no-overflow)"),
            Verdict::FalseTermination => f.write_str("FALSE(termination)"),
            Verdict::FalseLtl => f.write_str("FALSE(valid-ltl)"),
            Verdict::Unknown => f.write_str("UNKNOWN"),
            Verdict::Inconclusive(reason) => write!(f, "UNKNOWN: {reason}"),
            Verdict::Done => f.write_str("DONE"),
            Verdict::Sat => f.write_str("sat"),
            Verdict::Unsat => f.write_str("unsat"),
            Verdict::Timeout => f.write_str("TIMEOUT"),
            Verdict::OutOfMemory => f.write_str("OUT OF MEMORY"),
            Verdict::InvalidOutput => f.write_str("INVALID OUTPUT"),
            Verdict::InvalidArguments => f.write_str("INVALID ARGUMENTS"),
            Verdict::Error(None) => f.write_str("ERROR"),
            Verdict::Error(Some(detail)) => write!(f, "ERROR({detail})"),
            Verdict::InconsistentStatus { status, exit_code } => {
                write!(f, "ERROR(status {status} inconsistent with exit code {exit_code})")
            }
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

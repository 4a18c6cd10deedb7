//! Adapters between a benchmarking harness and verification tools.
//!
//! For every supported tool the crate can negotiate which interface an
//! installation speaks, build the command line for a run, and classify the
//! run's termination evidence into a [`Verdict`].
//!
//! ```text
//! ToolRegistry::builtin(config)
//!     .require("cbmc")?                      -> &dyn ToolAdapter
//!     .build_command(exe, &request).await?   -> PreparedInvocation
//!     ... the harness runs prepared.argv ...
//!     .classify(&outcome, &prepared.context) -> Verdict
//! ```

pub mod adapter;
pub mod classify;
pub mod cmdline;
pub mod config;
pub mod error;
pub mod negotiate;
pub mod probe;
pub mod tools;
pub mod types;
pub mod verdict;

pub use adapter::{ToolAdapter, ToolDescription, ToolProfile, ToolRegistry, VerifierAdapter};
pub use config::NegotiationConfig;
pub use error::{AdapterError, ProbeFailure};
pub use types::{
    Capabilities, ClassificationContext, InvocationMode, InvocationRequest, MEMLIMIT,
    PreparedInvocation, RawOutcome, ResourceLimits, TIMELIMIT,
};
pub use verdict::{Verdict, VerdictClass};

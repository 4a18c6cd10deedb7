//! Tool adapter interface.
//!
//! ```text
//! Harness
//!     |
//!     v
//! ToolRegistry --get("ultimate")--> &dyn ToolAdapter
//!     |                                   |
//!     |   negotiate(exe) -> Arc<Capabilities>
//!     |   build_command(exe, request) -> PreparedInvocation { argv, context }
//!     |        ... harness runs argv ...
//!     |   classify(outcome, context) -> Verdict
//! ```

pub mod registry;
pub mod trait_def;
pub mod verifier;

pub use registry::ToolRegistry;
pub use trait_def::{ToolAdapter, ToolDescription};
pub use verifier::{ToolProfile, VerifierAdapter};

//! The `ToolAdapter` trait -- the contract between a harness and one
//! verification tool.
//!
//! The trait is object-safe so adapters can be stored as
//! `Box<dyn ToolAdapter>` in the [`super::ToolRegistry`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AdapterError;
use crate::types::{
    Capabilities, ClassificationContext, InvocationRequest, PreparedInvocation, RawOutcome,
};
use crate::verdict::Verdict;

/// Static facts about an adapter, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub homepage: String,
    /// How the adapter finds out which interface an installation speaks.
    pub negotiation: String,
    /// Command-line grammar family.
    pub grammar: String,
}

/// Adapter interface for one verification tool.
///
/// A harness drives an adapter in three steps: [`negotiate`] (optional, and
/// implied by [`build_command`]), [`build_command`], then [`classify`] with
/// the [`ClassificationContext`] returned by the build step.
///
/// Adapters keep no per-run state, so one adapter can serve concurrent
/// runs.
///
/// [`negotiate`]: ToolAdapter::negotiate
/// [`build_command`]: ToolAdapter::build_command
/// [`classify`]: ToolAdapter::classify
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Registry key, e.g. `"cbmc"`.
    fn name(&self) -> &str;

    fn describe(&self) -> ToolDescription;

    /// Version string of the installation at `executable`, or `None` if it
    /// cannot be determined.
    async fn version(&self, executable: &Path) -> Option<String>;

    /// Capabilities of the installation at `executable`. Cached per path.
    async fn negotiate(&self, executable: &Path) -> Result<Arc<Capabilities>, AdapterError>;

    /// Command line for one run. Negotiates first if needed.
    async fn build_command(
        &self,
        executable: &Path,
        request: &InvocationRequest,
    ) -> Result<PreparedInvocation, AdapterError>;

    /// Verdict for a finished run. Never fails.
    fn classify(&self, outcome: &RawOutcome, ctx: &ClassificationContext) -> Verdict;
}

// Compile-time assertion: ToolAdapter must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ToolAdapter) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvocationMode;
    use uuid::Uuid;

    /// Answers TRUE for everything.
    struct Optimist;

    #[async_trait]
    impl ToolAdapter for Optimist {
        fn name(&self) -> &str {
            "optimist"
        }

        fn describe(&self) -> ToolDescription {
            ToolDescription {
                name: "optimist".into(),
                homepage: String::new(),
                negotiation: "static".into(),
                grammar: "plain".into(),
            }
        }

        async fn version(&self, _executable: &Path) -> Option<String> {
            Some("1.0".into())
        }

        async fn negotiate(&self, _executable: &Path) -> Result<Arc<Capabilities>, AdapterError> {
            Ok(Arc::new(Capabilities::fixed(0)))
        }

        async fn build_command(
            &self,
            executable: &Path,
            request: &InvocationRequest,
        ) -> Result<PreparedInvocation, AdapterError> {
            let mut argv = vec![executable.display().to_string()];
            argv.extend(request.inputs.iter().cloned());
            Ok(PreparedInvocation {
                request_id: Uuid::nil(),
                argv,
                working_dir: None,
                context: ClassificationContext {
                    tool: "optimist".into(),
                    mode: InvocationMode::Plain,
                    options: request.options.clone(),
                    uses_property_file: false,
                    structured_output: false,
                    generation: 0,
                },
            })
        }

        fn classify(&self, _outcome: &RawOutcome, _ctx: &ClassificationContext) -> Verdict {
            Verdict::True
        }
    }

    #[tokio::test]
    async fn adapter_is_usable_as_trait_object() {
        let adapter: Box<dyn ToolAdapter> = Box::new(Optimist);
        assert_eq!(adapter.name(), "optimist");
        assert_eq!(adapter.version(Path::new("x")).await.as_deref(), Some("1.0"));

        let prepared = adapter
            .build_command(Path::new("/bin/opt"), &InvocationRequest::new().input("a.c"))
            .await
            .unwrap();
        assert_eq!(prepared.argv, vec!["/bin/opt", "a.c"]);
        assert_eq!(
            adapter.classify(&RawOutcome::default(), &prepared.context),
            Verdict::True
        );
    }
}

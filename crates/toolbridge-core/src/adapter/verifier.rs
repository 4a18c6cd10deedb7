//! Data-driven [`ToolAdapter`] implementation.
//!
//! Every built-in tool is a [`VerifierAdapter`] over a [`ToolProfile`];
//! the tools differ only in the tables their profile carries.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::classify::Classifier;
use crate::cmdline::{self, Grammar};
use crate::config::NegotiationConfig;
use crate::error::AdapterError;
use crate::negotiate::{NegotiationPlan, Negotiator};
use crate::probe;
use crate::types::{
    Capabilities, ClassificationContext, InvocationRequest, PreparedInvocation, RawOutcome,
};
use crate::verdict::Verdict;

use super::trait_def::{ToolAdapter, ToolDescription};

/// Everything that distinguishes one tool from another.
#[derive(Debug, Clone)]
pub struct ToolProfile {
    pub name: &'static str,
    pub homepage: &'static str,
    /// Flag that makes the executable print its version.
    pub version_flag: &'static str,
    pub negotiation: NegotiationPlan,
    pub grammar: Grammar,
    pub classifier: Classifier,
}

impl ToolProfile {
    pub fn describe(&self) -> ToolDescription {
        let negotiation = match &self.negotiation {
            NegotiationPlan::Static { .. } => "static",
            NegotiationPlan::MarkerFile { .. } => "marker-file",
            NegotiationPlan::Launcher(_) => "launcher",
        };
        let grammar = match &self.grammar {
            Grammar::Cprover { .. } => "cprover",
            Grammar::PropertyFirst { .. } => "property-first",
            Grammar::PropertyLast { .. } => "property-last",
            Grammar::Ultimate(_) => "launcher",
        };

        ToolDescription {
            name: self.name.to_owned(),
            homepage: self.homepage.to_owned(),
            negotiation: negotiation.to_owned(),
            grammar: grammar.to_owned(),
        }
    }
}

/// A [`ToolAdapter`] driven entirely by a [`ToolProfile`].
#[derive(Debug)]
pub struct VerifierAdapter {
    profile: ToolProfile,
    negotiator: Negotiator,
}

impl VerifierAdapter {
    pub fn new(profile: ToolProfile, config: NegotiationConfig) -> Self {
        let negotiator = Negotiator::new(profile.negotiation.clone(), config);
        Self {
            profile,
            negotiator,
        }
    }

    pub fn profile(&self) -> &ToolProfile {
        &self.profile
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }
}

#[async_trait]
impl ToolAdapter for VerifierAdapter {
    fn name(&self) -> &str {
        self.profile.name
    }

    fn describe(&self) -> ToolDescription {
        self.profile.describe()
    }

    async fn version(&self, executable: &Path) -> Option<String> {
        if let NegotiationPlan::Launcher(_) = self.profile.negotiation {
            return match self.negotiator.negotiate(executable).await {
                Ok(caps) => Some(caps.version.clone()),
                Err(e) => {
                    debug!(tool = self.profile.name, error = %e, "no version without negotiation");
                    None
                }
            };
        }

        let timeout = self.negotiator.config().probe_timeout();
        probe::version_from_tool(executable, self.profile.version_flag, timeout).await
    }

    async fn negotiate(&self, executable: &Path) -> Result<Arc<Capabilities>, AdapterError> {
        self.negotiator.negotiate(executable).await
    }

    async fn build_command(
        &self,
        executable: &Path,
        request: &InvocationRequest,
    ) -> Result<PreparedInvocation, AdapterError> {
        let caps = self.negotiator.negotiate(executable).await?;
        let built = cmdline::build(
            self.profile.name,
            &self.profile.grammar,
            executable,
            &caps,
            request,
        )?;

        let request_id = Uuid::new_v4();
        info!(
            %request_id,
            tool = self.profile.name,
            mode = ?built.context.mode,
            generation = caps.generation,
            argv = %built.argv.join(" "),
            "built command line"
        );

        Ok(PreparedInvocation {
            request_id,
            argv: built.argv,
            working_dir: built.working_dir,
            context: built.context,
        })
    }

    fn classify(&self, outcome: &RawOutcome, ctx: &ClassificationContext) -> Verdict {
        self.profile.classifier.classify(outcome, ctx)
    }
}

//! Output classification.
//!
//! [`Classifier::classify`] turns a [`RawOutcome`] into a [`Verdict`]. It is
//! total: malformed, truncated or empty output degrades to a diagnostic
//! verdict instead of an error.
//!
//! Every run passes the [`ExitGate`] first. Only when the termination
//! signature leaves the answer open is the output read, in the dialect the
//! [`DialectSelector`] picks for the run's [`ClassificationContext`].

pub mod gate;
pub mod lines;
pub mod rules;
pub mod structured;
pub mod text;

use tracing::debug;

use crate::types::{ClassificationContext, RawOutcome};
use crate::verdict::Verdict;

pub use gate::{AbnormalExit, ExitGate};
pub use lines::{ExitCodeDialect, LineDialect, Scope};
pub use rules::{Matcher, Rule, RuleTable, Shadowed};
pub use structured::StructuredDialect;
pub use text::TextDialect;

/// What to answer when no rule matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    /// Verdict for output without a single non-blank line. When set it is
    /// answered even for timed-out runs.
    pub empty: Option<Verdict>,
    /// Report `TIMEOUT` for timed-out runs.
    pub on_timeout: bool,
    /// Output ending in this marker is a generic `ERROR`.
    pub error_suffix: Option<&'static str>,
    pub default: Verdict,
}

impl Fallback {
    /// Fallback answering `default`, or `TIMEOUT` once `on_timeout` is set.
    pub fn new(default: Verdict) -> Self {
        Self {
            empty: None,
            on_timeout: false,
            error_suffix: None,
            default,
        }
    }

    pub fn empty(mut self, verdict: Verdict) -> Self {
        self.empty = Some(verdict);
        self
    }

    pub fn on_timeout(mut self) -> Self {
        self.on_timeout = true;
        self
    }

    pub fn error_suffix(mut self, suffix: &'static str) -> Self {
        self.error_suffix = Some(suffix);
        self
    }

    pub fn resolve(&self, outcome: &RawOutcome) -> Verdict {
        if let Some(empty) = &self.empty {
            if outcome.last_line().is_none() {
                return empty.clone();
            }
        }
        if self.on_timeout && outcome.timed_out {
            return Verdict::Timeout;
        }
        if let Some(suffix) = self.error_suffix {
            if outcome.text().trim_end().ends_with(suffix) {
                return Verdict::Error(None);
            }
        }
        self.default.clone()
    }
}

/// One way of reading tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Structured(StructuredDialect),
    Lines(LineDialect),
    Text(TextDialect),
    ExitCode(ExitCodeDialect),
}

impl Dialect {
    pub fn classify(&self, outcome: &RawOutcome, ctx: &ClassificationContext) -> Verdict {
        match self {
            Dialect::Structured(d) => d.classify(outcome, ctx),
            Dialect::Lines(d) => d.classify(outcome),
            Dialect::Text(d) => d.classify(outcome),
            Dialect::ExitCode(d) => d.classify(outcome),
        }
    }

    /// Rule tables this dialect evaluates.
    pub fn rule_tables(&self) -> Vec<&RuleTable> {
        match self {
            Dialect::Structured(_) => Vec::new(),
            Dialect::Lines(d) => vec![&d.rules, &d.any_line],
            Dialect::Text(d) => vec![&d.rules],
            Dialect::ExitCode(d) => vec![&d.violation.rules, &d.violation.any_line],
        }
    }
}

/// Picks the dialect for a run from its build-time context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialectSelector {
    Fixed(Dialect),
    /// Depends on whether the run asked for machine-readable output.
    StructuredOutput { structured: Dialect, plain: Dialect },
    /// Depends on whether the run was driven by a property file.
    PropertyFile { with: Dialect, without: Dialect },
    /// Generations up to `legacy_up_to` use `legacy`.
    Generation {
        legacy_up_to: u32,
        legacy: Dialect,
        current: Dialect,
    },
}

impl DialectSelector {
    pub fn select(&self, ctx: &ClassificationContext) -> &Dialect {
        match self {
            DialectSelector::Fixed(d) => d,
            DialectSelector::StructuredOutput { structured, plain } => {
                if ctx.structured_output {
                    structured
                } else {
                    plain
                }
            }
            DialectSelector::PropertyFile { with, without } => {
                if ctx.uses_property_file {
                    with
                } else {
                    without
                }
            }
            DialectSelector::Generation {
                legacy_up_to,
                legacy,
                current,
            } => {
                if ctx.generation <= *legacy_up_to {
                    legacy
                } else {
                    current
                }
            }
        }
    }

    pub fn dialects(&self) -> Vec<&Dialect> {
        match self {
            DialectSelector::Fixed(d) => vec![d],
            DialectSelector::StructuredOutput { structured, plain } => vec![structured, plain],
            DialectSelector::PropertyFile { with, without } => vec![with, without],
            DialectSelector::Generation {
                legacy, current, ..
            } => vec![legacy, current],
        }
    }
}

/// Exit gate plus dialect selection for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    pub gate: ExitGate,
    pub dialects: DialectSelector,
}

impl Classifier {
    pub fn new(gate: ExitGate, dialects: DialectSelector) -> Self {
        Self { gate, dialects }
    }

    pub fn classify(&self, outcome: &RawOutcome, ctx: &ClassificationContext) -> Verdict {
        if let Some(verdict) = self.gate.check(outcome) {
            debug!(
                tool = %ctx.tool,
                exit_code = outcome.exit_code,
                signal = outcome.signal,
                timed_out = outcome.timed_out,
                verdict = %verdict,
                "verdict from termination signature"
            );
            return verdict;
        }

        let verdict = self.dialects.select(ctx).classify(outcome, ctx);
        debug!(
            tool = %ctx.tool,
            lines = outcome.lines.len(),
            verdict = %verdict,
            "verdict from output"
        );
        verdict
    }

    /// Shadowed rules across every table of every dialect.
    pub fn shadowed_rules(&self) -> Vec<Shadowed> {
        self.dialects
            .dialects()
            .into_iter()
            .flat_map(Dialect::rule_tables)
            .flat_map(RuleTable::shadowed_rules)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvocationMode;

    fn ctx(structured_output: bool) -> ClassificationContext {
        ClassificationContext {
            tool: "t".into(),
            mode: InvocationMode::Plain,
            options: Vec::new(),
            uses_property_file: false,
            structured_output,
            generation: 0,
        }
    }

    fn fixed(verdict: Verdict) -> Dialect {
        Dialect::Lines(LineDialect::new(
            Scope::LastLine,
            RuleTable::default(),
            Fallback::new(verdict),
        ))
    }

    #[test]
    fn fallback_order() {
        let fb = Fallback::new(Verdict::Unknown)
            .empty(Verdict::FalseReach)
            .on_timeout()
            .error_suffix("error");

        assert_eq!(fb.resolve(&RawOutcome::new(0, 0, vec!["  ".into()], true)), Verdict::FalseReach);
        assert_eq!(fb.resolve(&RawOutcome::new(0, 0, vec!["x error".into()], true)), Verdict::Timeout);
        assert_eq!(
            fb.resolve(&RawOutcome::new(0, 0, vec!["x error".into(), "".into()], false)),
            Verdict::Error(None)
        );
        assert_eq!(fb.resolve(&RawOutcome::new(0, 0, vec!["x".into()], false)), Verdict::Unknown);
    }

    #[test]
    fn timeout_beats_empty_output_unless_overridden() {
        let silent = RawOutcome::new(0, 0, Vec::new(), true);

        let fb = Fallback::new(Verdict::Unknown).on_timeout();
        assert_eq!(fb.resolve(&silent), Verdict::Timeout);
        assert_eq!(fb.resolve(&RawOutcome::default()), Verdict::Unknown);

        let fb = Fallback::new(Verdict::Error(None)).empty(Verdict::Unknown).on_timeout();
        assert_eq!(fb.resolve(&silent), Verdict::Unknown);
    }

    #[test]
    fn selector_follows_context() {
        let selector = DialectSelector::StructuredOutput {
            structured: fixed(Verdict::True),
            plain: fixed(Verdict::Unknown),
        };
        let classifier = Classifier::new(ExitGate::default(), selector);
        let out = RawOutcome::new(0, 0, vec!["x".into()], false);

        assert_eq!(classifier.classify(&out, &ctx(true)), Verdict::True);
        assert_eq!(classifier.classify(&out, &ctx(false)), Verdict::Unknown);
    }

    #[test]
    fn gate_runs_before_dialect() {
        let classifier = Classifier::new(ExitGate::default(), DialectSelector::Fixed(fixed(Verdict::True)));
        let killed = RawOutcome::new(0, 9, vec!["TRUE".into()], false);
        assert_eq!(classifier.classify(&killed, &ctx(false)), Verdict::OutOfMemory);
    }
}

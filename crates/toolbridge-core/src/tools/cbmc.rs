//! CBMC, the C bounded model checker.
//!
//! Without a property file CBMC is asked for `--xml-ui` output and the
//! status document is read. With a property file it runs under competition
//! conditions and only the last output line counts.

use crate::adapter::ToolProfile;
use crate::classify::{
    Classifier, Dialect, DialectSelector, ExitGate, Fallback, LineDialect, Matcher, Rule,
    RuleTable, Scope, StructuredDialect,
};
use crate::cmdline::Grammar;
use crate::negotiate::NegotiationPlan;
use crate::verdict::Verdict;

pub const NAME: &str = "cbmc";

const OOM_MESSAGES: &[&str] = &["Out of memory", "SAT checker ran out of memory"];

pub fn profile() -> ToolProfile {
    ToolProfile {
        name: NAME,
        homepage: "http://www.cprover.org/cbmc/",
        version_flag: "--version",
        negotiation: NegotiationPlan::Static { generation: 0 },
        grammar: Grammar::Cprover {
            property_flag: "--propertyfile",
            structured_flag: Some("--xml-ui"),
        },
        classifier: Classifier::new(
            gate(),
            DialectSelector::StructuredOutput {
                structured: Dialect::Structured(status_document()),
                plain: Dialect::Lines(competition_lines()),
            },
        ),
    }
}

/// Exit codes 0 (property holds) and 10 (violation) are the only normal
/// ones; everything else is a crash unless its output explains it.
fn gate() -> ExitGate {
    let mut gate = ExitGate::default()
        .normal_exit_codes([0, 10])
        .abnormal_exit(64, "Usage error!", Verdict::InvalidArguments);
    for &message in OOM_MESSAGES {
        gate = gate.abnormal_exit(6, message, Verdict::OutOfMemory);
    }
    gate
}

fn status_document() -> StructuredDialect {
    StructuredDialect {
        status_element: "cprover-status",
        failure_status: "FAILURE",
        failure_exit_code: 10,
        success_status: "SUCCESS",
        success_exit_code: 0,
        unwinding_reason: "unwinding assertion",
        unwinding_option: "--unwinding-assertions",
        oom_messages: OOM_MESSAGES,
        oom_marker: "Minisat::OutOfMemoryException",
    }
}

/// Competition output: the verdict is the last line, though an `UNKNOWN`
/// line may be followed by trailing log output.
fn competition_lines() -> LineDialect {
    LineDialect::new(
        Scope::LastLine,
        RuleTable::new(vec![
            Rule::new(Matcher::Exact("TRUE"), Verdict::True),
            Rule::new(Matcher::Exact("FALSE(valid-memtrack)"), Verdict::FalseMemtrack),
            Rule::new(Matcher::Exact("FALSE(valid-deref)"), Verdict::FalseDeref),
            Rule::new(Matcher::Exact("FALSE(valid-free)"), Verdict::FalseFree),
            Rule::new(Matcher::Exact("FALSE(no-overflow)"), Verdict::FalseOverflow),
            Rule::new(Matcher::Exact("FALSE(valid-memcleanup)"), Verdict::FalseMemcleanup),
            Rule::new(Matcher::Contains("FALSE"), Verdict::FalseReach),
        ]),
        Fallback::new(Verdict::Error(None)).on_timeout(),
    )
    .any_line(RuleTable::new(vec![Rule::new(
        Matcher::Exact("UNKNOWN"),
        Verdict::Unknown,
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationContext, InvocationMode, RawOutcome};

    fn competition_ctx() -> ClassificationContext {
        ClassificationContext {
            tool: NAME.into(),
            mode: InvocationMode::PropertyFile,
            options: vec!["--propertyfile".into(), "p.prp".into()],
            uses_property_file: true,
            structured_output: false,
            generation: 0,
        }
    }

    fn classify(exit_code: i32, lines: &[&str]) -> Verdict {
        let out = RawOutcome::new(
            exit_code,
            0,
            lines.iter().map(|l| l.to_string()).collect(),
            false,
        );
        profile().classifier.classify(&out, &competition_ctx())
    }

    #[test]
    fn tables_have_no_shadowed_rules() {
        assert!(profile().classifier.shadowed_rules().is_empty());
    }

    #[test]
    fn competition_last_line() {
        assert_eq!(classify(0, &["CBMC version 5.11", "TRUE"]), Verdict::True);
        assert_eq!(classify(10, &["FALSE(valid-memtrack)"]), Verdict::FalseMemtrack);
        assert_eq!(classify(10, &["FALSE(valid-memcleanup)"]), Verdict::FalseMemcleanup);
        assert_eq!(classify(10, &["FALSE(unreach-call)"]), Verdict::FalseReach);
        assert_eq!(classify(0, &["UNKNOWN"]), Verdict::Unknown);
        assert_eq!(classify(0, &["something odd"]), Verdict::Error(None));
        assert_eq!(classify(0, &[]), Verdict::Error(None));
    }

    #[test]
    fn unknown_line_before_trailing_output() {
        assert_eq!(classify(0, &["UNKNOWN", "trailing log"]), Verdict::Unknown);
        assert_eq!(classify(0, &["UNKNOWN", "TRUE"]), Verdict::True);
        assert_eq!(classify(0, &["UNKNOWN reason", "log"]), Verdict::Error(None));
    }

    #[test]
    fn abnormal_exits() {
        assert_eq!(classify(64, &["Usage error!"]), Verdict::InvalidArguments);
        assert_eq!(classify(6, &["SAT checker ran out of memory"]), Verdict::OutOfMemory);
        assert_eq!(classify(6, &["Out of memory"]), Verdict::OutOfMemory);
        assert_eq!(classify(1, &["TRUE"]), Verdict::Error(None));
    }
}

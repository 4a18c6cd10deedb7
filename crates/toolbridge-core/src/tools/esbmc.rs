//! ESBMC, driven through its `esbmc-wrapper.py` competition wrapper.

use crate::adapter::ToolProfile;
use crate::classify::{
    Classifier, Dialect, DialectSelector, ExitGate, Fallback, Matcher, Rule, RuleTable,
    TextDialect,
};
use crate::cmdline::Grammar;
use crate::negotiate::NegotiationPlan;
use crate::verdict::Verdict;

pub const NAME: &str = "esbmc";

pub fn profile() -> ToolProfile {
    ToolProfile {
        name: NAME,
        homepage: "http://www.esbmc.org/",
        version_flag: "-v",
        negotiation: NegotiationPlan::Static { generation: 0 },
        grammar: Grammar::PropertyFirst { property_flag: "-p" },
        classifier: Classifier::new(
            ExitGate::default(),
            DialectSelector::Fixed(Dialect::Text(wrapper_output())),
        ),
    }
}

fn wrapper_output() -> TextDialect {
    TextDialect::new(
        RuleTable::new(vec![
            Rule::new(Matcher::Sequence(&["FALSE_DEREF"]), Verdict::FalseDeref),
            Rule::new(Matcher::Sequence(&["FALSE_FREE"]), Verdict::FalseFree),
            Rule::new(Matcher::Sequence(&["FALSE_MEMTRACK"]), Verdict::FalseMemtrack),
            Rule::new(Matcher::Sequence(&["FALSE_OVERFLOW"]), Verdict::FalseOverflow),
            Rule::new(Matcher::Sequence(&["FALSE_TERMINATION"]), Verdict::FalseTermination),
            Rule::new(Matcher::Sequence(&["FALSE"]), Verdict::FalseReach),
            Rule::new(Matcher::Contains("TRUE"), Verdict::True),
            Rule::new(Matcher::Contains("DONE"), Verdict::Done),
        ]),
        Fallback::new(Verdict::Unknown)
            .on_timeout()
            .error_suffix("error"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationContext, InvocationMode, RawOutcome};

    fn classify(lines: &[&str], timed_out: bool) -> Verdict {
        let ctx = ClassificationContext {
            tool: NAME.into(),
            mode: InvocationMode::PropertyFile,
            options: Vec::new(),
            uses_property_file: true,
            structured_output: false,
            generation: 0,
        };
        let out = RawOutcome::new(0, 0, lines.iter().map(|l| l.to_string()).collect(), timed_out);
        profile().classifier.classify(&out, &ctx)
    }

    #[test]
    fn tables_have_no_shadowed_rules() {
        assert!(profile().classifier.shadowed_rules().is_empty());
    }

    #[test]
    fn compound_markers_win_over_bare_false() {
        assert_eq!(classify(&["FALSE_DEREF", "FALSE"], false), Verdict::FalseDeref);
        assert_eq!(classify(&["FALSE", "FALSE_TERMINATION"], false), Verdict::FalseTermination);
        assert_eq!(classify(&["FALSE"], false), Verdict::FalseReach);
    }

    #[test]
    fn false_beats_true() {
        assert_eq!(classify(&["TRUE", "FALSE"], false), Verdict::FalseReach);
        assert_eq!(classify(&["TRUE"], false), Verdict::True);
        assert_eq!(classify(&["DONE"], false), Verdict::Done);
    }

    #[test]
    fn fallbacks() {
        assert_eq!(classify(&["running"], true), Verdict::Timeout);
        assert_eq!(classify(&["parsing", "parse error"], false), Verdict::Error(None));
        assert_eq!(classify(&["parsing"], false), Verdict::Unknown);
    }

    #[test]
    fn silent_timeout_is_timeout() {
        assert_eq!(classify(&[], true), Verdict::Timeout);
        assert_eq!(classify(&[], false), Verdict::Unknown);
    }
}

//! Map2Check. Release 6 ships `map2check-wrapper.sh` and takes the property
//! file after `-c`; later releases use `-p` and report compound markers
//! such as `FALSE_MEMTRACK`.

use crate::adapter::ToolProfile;
use crate::classify::{
    Classifier, Dialect, DialectSelector, ExitGate, Fallback, LineDialect, Matcher, Rule,
    RuleTable, Scope,
};
use crate::cmdline::Grammar;
use crate::negotiate::NegotiationPlan;
use crate::verdict::Verdict;

pub const NAME: &str = "map2check";

const LEGACY_GENERATION: u32 = 6;
const CURRENT_GENERATION: u32 = 7;

pub fn profile() -> ToolProfile {
    ToolProfile {
        name: NAME,
        homepage: "https://github.com/hbgit/Map2Check",
        version_flag: "--version",
        negotiation: NegotiationPlan::MarkerFile {
            marker: "map2check-wrapper.sh",
            present: LEGACY_GENERATION,
            absent: CURRENT_GENERATION,
        },
        grammar: Grammar::PropertyLast {
            legacy_generation: LEGACY_GENERATION,
            legacy_flag: "-c",
            property_flag: "-p",
        },
        classifier: Classifier::new(
            ExitGate::default(),
            DialectSelector::Generation {
                legacy_up_to: LEGACY_GENERATION,
                legacy: Dialect::Lines(legacy_lines()),
                current: Dialect::Lines(current_lines()),
            },
        ),
    }
}

fn fallback() -> Fallback {
    Fallback::new(Verdict::Error(None))
        .empty(Verdict::Unknown)
        .on_timeout()
}

fn current_lines() -> LineDialect {
    LineDialect::new(
        Scope::LastLine,
        RuleTable::new(vec![
            Rule::new(Matcher::Suffix("TRUE"), Verdict::True),
            Rule::new(Matcher::Contains("FALSE_MEMTRACK"), Verdict::FalseMemtrack),
            Rule::new(Matcher::Contains("FALSE_MEMCLEANUP"), Verdict::FalseMemcleanup),
            Rule::new(Matcher::Contains("FALSE_DEREF"), Verdict::FalseDeref),
            Rule::new(Matcher::Contains("FALSE_FREE"), Verdict::FalseFree),
            Rule::new(Matcher::Contains("FALSE_OVERFLOW"), Verdict::FalseOverflow),
            Rule::new(Matcher::Contains("FALSE"), Verdict::FalseReach),
            Rule::new(Matcher::Suffix("UNKNOWN"), Verdict::Unknown),
        ]),
        fallback(),
    )
}

/// Release 6 only names memory-safety violations; a bare `FALSE` carries no
/// usable answer.
fn legacy_lines() -> LineDialect {
    LineDialect::new(
        Scope::LastLine,
        RuleTable::new(vec![
            Rule::new(Matcher::Suffix("TRUE"), Verdict::True),
            Rule::new(Matcher::Contains("FALSE(valid-memtrack)"), Verdict::FalseMemtrack),
            Rule::new(Matcher::Contains("FALSE(valid-deref)"), Verdict::FalseDeref),
            Rule::new(Matcher::Contains("FALSE(valid-free)"), Verdict::FalseFree),
            Rule::new(Matcher::Contains("FALSE"), Verdict::Unknown),
            Rule::new(Matcher::Suffix("UNKNOWN"), Verdict::Unknown),
        ]),
        fallback(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationContext, InvocationMode, RawOutcome};

    fn run(generation: u32, lines: &[&str], timed_out: bool) -> Verdict {
        let ctx = ClassificationContext {
            tool: NAME.into(),
            mode: InvocationMode::PropertyFile,
            options: Vec::new(),
            uses_property_file: true,
            structured_output: false,
            generation,
        };
        let out = RawOutcome::new(0, 0, lines.iter().map(|l| l.to_string()).collect(), timed_out);
        profile().classifier.classify(&out, &ctx)
    }

    fn classify(generation: u32, lines: &[&str]) -> Verdict {
        run(generation, lines, false)
    }

    #[test]
    fn tables_have_no_shadowed_rules() {
        assert!(profile().classifier.shadowed_rules().is_empty());
    }

    #[test]
    fn current_release() {
        assert_eq!(classify(7, &["Result: TRUE"]), Verdict::True);
        assert_eq!(classify(7, &["FALSE_MEMCLEANUP"]), Verdict::FalseMemcleanup);
        assert_eq!(classify(7, &["FALSE_OVERFLOW"]), Verdict::FalseOverflow);
        assert_eq!(classify(7, &["FALSE"]), Verdict::FalseReach);
        assert_eq!(classify(7, &["Result: UNKNOWN"]), Verdict::Unknown);
        assert_eq!(classify(7, &["crashed"]), Verdict::Error(None));
    }

    #[test]
    fn legacy_release() {
        assert_eq!(classify(6, &["FALSE(valid-free)"]), Verdict::FalseFree);
        assert_eq!(classify(6, &["FALSE"]), Verdict::Unknown);
        assert_eq!(classify(6, &["FALSE_MEMTRACK"]), Verdict::Unknown);
    }

    #[test]
    fn empty_and_timed_out() {
        assert_eq!(run(7, &[], true), Verdict::Unknown);
        assert_eq!(run(7, &["checking"], true), Verdict::Timeout);
    }
}

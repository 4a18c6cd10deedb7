//! 2LS. The exit code says whether the property holds; the last line says
//! which property failed.

use crate::adapter::ToolProfile;
use crate::classify::{
    Classifier, Dialect, DialectSelector, ExitCodeDialect, ExitGate, Fallback, LineDialect,
    Matcher, Rule, RuleTable, Scope,
};
use crate::cmdline::Grammar;
use crate::negotiate::NegotiationPlan;
use crate::verdict::Verdict;

pub const NAME: &str = "2ls";

pub fn profile() -> ToolProfile {
    ToolProfile {
        name: NAME,
        homepage: "http://www.cprover.org/2LS",
        version_flag: "--version",
        negotiation: NegotiationPlan::Static { generation: 0 },
        grammar: Grammar::Cprover {
            property_flag: "--propertyfile",
            structured_flag: None,
        },
        classifier: Classifier::new(
            ExitGate::default(),
            DialectSelector::Fixed(Dialect::ExitCode(ExitCodeDialect {
                proven: 0,
                violated: 10,
                violation: violated_property(),
                otherwise: Verdict::Unknown,
            })),
        ),
    }
}

fn violated_property() -> LineDialect {
    LineDialect::new(
        Scope::LastLine,
        RuleTable::new(vec![
            Rule::new(Matcher::Exact("FALSE(valid-memtrack)"), Verdict::FalseMemtrack),
            Rule::new(Matcher::Exact("FALSE(valid-deref)"), Verdict::FalseDeref),
            Rule::new(Matcher::Exact("FALSE(valid-free)"), Verdict::FalseFree),
            Rule::new(Matcher::Exact("FALSE(no-overflow)"), Verdict::FalseOverflow),
            Rule::new(Matcher::Exact("FALSE(termination)"), Verdict::FalseTermination),
            Rule::new(Matcher::Exact("FALSE(valid-memcleanup)"), Verdict::FalseMemcleanup),
        ]),
        Fallback::new(Verdict::FalseReach),
    )
}

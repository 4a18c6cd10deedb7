//! Ultimate (Automizer, Taipan, Kojak, ...).
//!
//! The most demanding adapter. An installation is one of:
//!
//! - a frozen competition release, recognised by its wrapper version;
//! - a launcher-based release speaking API 1 or API 2, found out by asking
//!   a JVM to run the launcher jar with `--version`.
//!
//! Runs with a property file go through the `Ultimate.py` wrapper and print
//! competition verdicts. Runs with an explicit toolchain (`-tc`) start the
//! JVM directly and print Ultimate's own result descriptions.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::adapter::ToolProfile;
use crate::classify::{
    Classifier, Dialect, DialectSelector, ExitGate, Fallback, LineDialect, Matcher, Rule,
    RuleTable, Scope,
};
use crate::cmdline::{Grammar, UltimateGrammar};
use crate::negotiate::{GenerationProbe, LauncherPlan, NegotiationPlan};
use crate::verdict::Verdict;

pub const NAME: &str = "ultimate";

const STACK_FLAG: &str = "-Xss4m";

static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Version is (.*)$").expect("Invalid version regex"));

static GENERATIONS: [GenerationProbe; 2] = [
    GenerationProbe {
        generation: 2,
        version_args: api2_version_args,
    },
    GenerationProbe {
        generation: 1,
        version_args: api1_version_args,
    },
];

const GRAMMAR: UltimateGrammar = UltimateGrammar {
    no_wrapper_option: "--force-no-wrapper",
    legacy_forbidden: &["--full-output", "--architecture"],
    legacy_output_flag: "--full-output",
    toolchain_options: &["-tc", "--toolchain"],
    runtime_options: &["-ea"],
    stack_flag: STACK_FLAG,
    data_dir_name: "data",
    data_dir_generation: 2,
};

pub fn profile() -> ToolProfile {
    ToolProfile {
        name: NAME,
        homepage: "https://ultimate.informatik.uni-freiburg.de",
        version_flag: "--version",
        negotiation: NegotiationPlan::Launcher(LauncherPlan {
            wrapper_version_flag: "--version",
            version_line: &VERSION_LINE,
            data_dir_since: (0, 1, 24),
            data_dir_name: "data",
            generations: &GENERATIONS,
        }),
        grammar: Grammar::Ultimate(GRAMMAR),
        classifier: Classifier::new(
            ExitGate::default(),
            DialectSelector::PropertyFile {
                with: Dialect::Lines(wrapper_lines()),
                without: Dialect::Lines(result_descriptions()),
            },
        ),
    }
}

fn api2_version_args(launcher: &Path, data_dir: &Path) -> Vec<String> {
    vec![
        STACK_FLAG.to_owned(),
        "-jar".to_owned(),
        launcher.display().to_string(),
        "-data".to_owned(),
        "@noDefault".to_owned(),
        "-ultimatedata".to_owned(),
        data_dir.display().to_string(),
        "--version".to_owned(),
    ]
}

fn api1_version_args(launcher: &Path, data_dir: &Path) -> Vec<String> {
    vec![
        STACK_FLAG.to_owned(),
        "-jar".to_owned(),
        launcher.display().to_string(),
        "-data".to_owned(),
        data_dir.display().to_string(),
        "--version".to_owned(),
    ]
}

/// Competition verdicts printed by the wrapper, one per line.
fn wrapper_lines() -> LineDialect {
    LineDialect::new(
        Scope::EveryLine,
        RuleTable::new(vec![
            Rule::new(Matcher::Prefix("FALSE(valid-free)"), Verdict::FalseFree),
            Rule::new(Matcher::Prefix("FALSE(valid-deref)"), Verdict::FalseDeref),
            Rule::new(Matcher::Prefix("FALSE(valid-memtrack)"), Verdict::FalseMemtrack),
            Rule::new(Matcher::Prefix("FALSE(valid-memcleanup)"), Verdict::FalseMemcleanup),
            Rule::new(Matcher::Prefix("FALSE(TERM)"), Verdict::FalseTermination),
            Rule::new(Matcher::Prefix("FALSE(OVERFLOW)"), Verdict::FalseOverflow),
            Rule::new(Matcher::Prefix("FALSE"), Verdict::FalseReach),
            Rule::new(Matcher::Prefix("TRUE"), Verdict::True),
            Rule::new(Matcher::Prefix("UNKNOWN"), Verdict::Unknown),
            Rule::new(
                Matcher::Prefix("ERROR: INVALID WITNESS FILE"),
                Verdict::error("invalid witness file"),
            ),
            Rule::new(Matcher::Prefix("ERROR"), Verdict::Error(None)),
        ]),
        Fallback::new(Verdict::Unknown)
            .on_timeout()
            .error_suffix("error"),
    )
}

/// Result descriptions Ultimate prints when started without the wrapper.
fn result_descriptions() -> LineDialect {
    LineDialect::new(
        Scope::EveryLine,
        RuleTable::new(vec![
            Rule::new(
                Matcher::Contains("ShortDescription: Unsupported Syntax"),
                Verdict::error("UNSUPPORTED SYNTAX"),
            ),
            Rule::new(
                Matcher::Contains("ShortDescription: Incorrect Syntax"),
                Verdict::error("INCORRECT SYNTAX"),
            ),
            Rule::new(Matcher::Contains("Type Error"), Verdict::error("TYPE ERROR")),
            Rule::new(
                Matcher::Contains("InvalidWitnessErrorResult"),
                Verdict::error("INVALID WITNESS FILE"),
            ),
            Rule::new(
                Matcher::Contains("ExceptionOrErrorResult"),
                Verdict::error("EXCEPTION"),
            ),
            Rule::new(
                Matcher::Contains("Reason: overapproximation of"),
                Verdict::Inconclusive("OverapproxCex".to_owned()),
            ),
            Rule::new(
                Matcher::Contains(
                    "Found a nonterminating execution for the following lasso shaped sequence of statements",
                ),
                Verdict::FalseTermination,
            ),
            Rule::new(
                Matcher::Contains("TerminationAnalysisResult: Termination proven"),
                Verdict::True,
            ),
            Rule::new(
                Matcher::Contains("execution that violates the LTL property"),
                Verdict::FalseLtl,
            ),
            Rule::new(
                Matcher::Contains("Buchi Automizer proved that the LTL property"),
                Verdict::True,
            ),
            Rule::new(
                Matcher::Contains("Ultimate proved your program to be incorrect"),
                Verdict::FalseReach,
            ),
            Rule::new(Matcher::Contains("pointer dereference may fail"), Verdict::FalseDeref),
            Rule::new(Matcher::Contains("array index can be out of bounds"), Verdict::FalseDeref),
            Rule::new(
                Matcher::Contains("free of unallocated memory possible"),
                Verdict::FalseFree,
            ),
            Rule::new(
                Matcher::Contains("not all allocated memory was freed"),
                Verdict::FalseMemtrack,
            ),
            Rule::new(Matcher::Contains("overflow possible"), Verdict::FalseOverflow),
            Rule::new(
                Matcher::Contains("Ultimate proved your program to be correct"),
                Verdict::True,
            ),
            Rule::new(Matcher::Contains("AllSpecificationsHoldResult"), Verdict::True),
            Rule::new(Matcher::Contains("TreeAutomizerUnsatResult"), Verdict::Unsat),
            Rule::new(Matcher::Contains("TreeAutomizerSatResult"), Verdict::Sat),
        ]),
        Fallback::new(Verdict::Unknown).on_timeout(),
    )
}

//! Ordered `(matcher, verdict)` tables.
//!
//! A table is evaluated top to bottom and the first matching rule wins, so
//! a specific marker has to come before any generic marker that would also
//! match it. [`RuleTable::shadowed_rules`] finds violations of that order.

use std::fmt;

use crate::verdict::Verdict;

/// Predicate over one piece of tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Prefix(&'static str),
    Exact(&'static str),
    Contains(&'static str),
    Suffix(&'static str),
    /// Every marker occurs, each one after the end of the previous one.
    Sequence(&'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Prefix(p) => text.starts_with(p),
            Matcher::Exact(e) => text == *e,
            Matcher::Contains(c) => text.contains(c),
            Matcher::Suffix(s) => text.ends_with(s),
            Matcher::Sequence(markers) => {
                let mut rest = text;
                for marker in *markers {
                    match rest.find(marker) {
                        Some(at) => rest = &rest[at + marker.len()..],
                        None => return false,
                    }
                }
                true
            }
        }
    }

    /// Whether `self` matches every text that `other` matches.
    ///
    /// Conservative: `false` means "could not prove it", not "no".
    pub fn subsumes(&self, other: &Matcher) -> bool {
        use Matcher::*;

        match (self, other) {
            (Exact(a), Exact(b)) => a == b,
            (Exact(_), _) => false,

            (Prefix(a), Prefix(b) | Exact(b)) => b.starts_with(a),
            (Prefix(a), _) => a.is_empty(),

            (Suffix(a), Suffix(b) | Exact(b)) => b.ends_with(a),
            (Suffix(a), _) => a.is_empty(),

            (Contains(a), Prefix(b) | Exact(b) | Contains(b) | Suffix(b)) => b.contains(a),
            (Contains(a), Sequence(bs)) => bs.iter().any(|b| b.contains(a)),

            (Sequence(xs), _) => {
                let bs: &[&str] = match other {
                    Sequence(bs) => *bs,
                    Prefix(b) | Exact(b) | Contains(b) | Suffix(b) => std::slice::from_ref(b),
                };
                sequence_embeds(xs, bs)
            }
        }
    }
}

/// `xs` can be matched inside any text that matches `bs`: the markers of
/// `xs` fit, in order, into the markers of `bs`.
fn sequence_embeds(xs: &[&str], bs: &[&str]) -> bool {
    let mut bs = bs.iter();
    let mut current: Option<&str> = bs.next().copied();

    for x in xs {
        loop {
            let Some(b) = current else {
                return false;
            };
            if let Some(at) = b.find(x) {
                current = Some(&b[at + x.len()..]);
                break;
            }
            current = bs.next().copied();
        }
    }
    true
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Prefix(p) => write!(f, "prefix {p:?}"),
            Matcher::Exact(e) => write!(f, "exactly {e:?}"),
            Matcher::Contains(c) => write!(f, "contains {c:?}"),
            Matcher::Suffix(s) => write!(f, "suffix {s:?}"),
            Matcher::Sequence(ms) => write!(f, "sequence {ms:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Matcher,
    pub verdict: Verdict,
}

impl Rule {
    pub fn new(matcher: Matcher, verdict: Verdict) -> Self {
        Self { matcher, verdict }
    }
}

/// Pair of rule indices where the earlier rule hides the later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadowed {
    pub earlier: usize,
    pub later: usize,
}

/// First-match-wins rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        let table = Self { rules };
        debug_assert!(
            table.shadowed_rules().is_empty(),
            "rule table has shadowed rules: {:?}",
            table.shadowed_rules()
        );
        table
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Verdict of the first rule matching `text`.
    pub fn first_match(&self, text: &str) -> Option<&Verdict> {
        self.rules
            .iter()
            .find(|r| r.matcher.matches(text))
            .map(|r| &r.verdict)
    }

    /// Every pair where an earlier rule matches everything a later rule
    /// matches but yields a different verdict.
    pub fn shadowed_rules(&self) -> Vec<Shadowed> {
        let mut found = Vec::new();
        for (later, rule) in self.rules.iter().enumerate() {
            for (earlier, before) in self.rules[..later].iter().enumerate() {
                if before.verdict != rule.verdict && before.matcher.subsumes(&rule.matcher) {
                    found.push(Shadowed { earlier, later });
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_requires_order() {
        let m = Matcher::Sequence(&["VERIFICATION", "FALSE"]);
        assert!(m.matches("VERIFICATION ... FALSE"));
        assert!(!m.matches("FALSE ... VERIFICATION"));
        // Markers may not overlap.
        assert!(!Matcher::Sequence(&["AB", "BC"]).matches("ABC"));
        assert!(Matcher::Sequence(&[]).matches(""));
    }

    #[test]
    fn prefix_subsumption() {
        assert!(Matcher::Prefix("FALSE").subsumes(&Matcher::Prefix("FALSE(valid-free)")));
        assert!(!Matcher::Prefix("FALSE(valid-free)").subsumes(&Matcher::Prefix("FALSE")));
        assert!(Matcher::Prefix("ERROR").subsumes(&Matcher::Exact("ERROR: x")));
        assert!(!Matcher::Prefix("ERROR").subsumes(&Matcher::Contains("ERROR")));
    }

    #[test]
    fn contains_subsumes_anything_containing_its_marker() {
        let generic = Matcher::Contains("FALSE");
        assert!(generic.subsumes(&Matcher::Exact("FALSE(valid-deref)")));
        assert!(generic.subsumes(&Matcher::Suffix("FALSE_DEREF")));
        assert!(generic.subsumes(&Matcher::Sequence(&["x", "FALSE_FREE"])));
        assert!(!generic.subsumes(&Matcher::Prefix("TRUE")));
    }

    #[test]
    fn sequence_subsumption_embeds_in_order() {
        let generic = Matcher::Sequence(&["FALSE"]);
        assert!(generic.subsumes(&Matcher::Sequence(&["FALSE_DEREF"])));
        assert!(generic.subsumes(&Matcher::Contains("FALSE_FREE")));
        assert!(Matcher::Sequence(&["A", "B"]).subsumes(&Matcher::Sequence(&["xA", "Bx"])));
        assert!(Matcher::Sequence(&["A", "B"]).subsumes(&Matcher::Contains("AB")));
        assert!(!Matcher::Sequence(&["B", "A"]).subsumes(&Matcher::Contains("AB")));
    }

    #[test]
    fn generic_before_specific_is_reported() {
        let table = RuleTable {
            rules: vec![
                Rule::new(Matcher::Prefix("FALSE"), Verdict::FalseReach),
                Rule::new(Matcher::Prefix("FALSE(valid-free)"), Verdict::FalseFree),
                Rule::new(Matcher::Prefix("TRUE"), Verdict::True),
            ],
        };
        assert_eq!(table.shadowed_rules(), vec![Shadowed { earlier: 0, later: 1 }]);
    }

    #[test]
    fn same_verdict_is_not_shadowing() {
        let table = RuleTable::new(vec![
            Rule::new(Matcher::Contains("correct"), Verdict::True),
            Rule::new(Matcher::Contains("proved correct"), Verdict::True),
        ]);
        assert!(table.shadowed_rules().is_empty());
    }

    #[test]
    fn first_match_wins() {
        let table = RuleTable::new(vec![
            Rule::new(Matcher::Prefix("FALSE(valid-free)"), Verdict::FalseFree),
            Rule::new(Matcher::Prefix("FALSE"), Verdict::FalseReach),
        ]);
        assert_eq!(table.first_match("FALSE(valid-free)"), Some(&Verdict::FalseFree));
        assert_eq!(table.first_match("FALSE"), Some(&Verdict::FalseReach));
        assert_eq!(table.first_match("TRUE"), None);
    }
}

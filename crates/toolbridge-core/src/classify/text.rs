//! Ordered-substring dialect over the whole output.

use crate::types::RawOutcome;
use crate::verdict::Verdict;

use super::Fallback;
use super::rules::RuleTable;

/// Matches the joined output as one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDialect {
    pub rules: RuleTable,
    pub fallback: Fallback,
}

impl TextDialect {
    pub fn new(rules: RuleTable, fallback: Fallback) -> Self {
        Self { rules, fallback }
    }

    pub fn classify(&self, outcome: &RawOutcome) -> Verdict {
        let text = outcome.text();
        match self.rules.first_match(&text) {
            Some(verdict) => verdict.clone(),
            None => self.fallback.resolve(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::rules::{Matcher, Rule};

    #[test]
    fn markers_may_span_lines() {
        let dialect = TextDialect::new(
            RuleTable::new(vec![
                Rule::new(Matcher::Sequence(&["VERIFICATION", "FAILED"]), Verdict::FalseReach),
                Rule::new(Matcher::Contains("SUCCESSFUL"), Verdict::True),
            ]),
            Fallback::new(Verdict::Unknown).on_timeout().error_suffix("error"),
        );

        let out = RawOutcome::new(10, 0, vec!["VERIFICATION".into(), "FAILED".into()], false);
        assert_eq!(dialect.classify(&out), Verdict::FalseReach);

        let out = RawOutcome::new(1, 0, vec!["parse error".into(), "".into()], false);
        assert_eq!(dialect.classify(&out), Verdict::Error(None));
    }
}

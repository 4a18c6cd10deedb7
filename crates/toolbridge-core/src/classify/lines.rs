//! Line-oriented dialects.

use crate::types::RawOutcome;
use crate::verdict::Verdict;

use super::Fallback;
use super::rules::RuleTable;

/// Which lines a [`LineDialect`] looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every line in output order; the first line any rule matches wins.
    EveryLine,
    /// Only the last non-blank line.
    LastLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDialect {
    pub scope: Scope,
    pub rules: RuleTable,
    /// Tried against every line once `rules` found nothing in scope.
    pub any_line: RuleTable,
    pub fallback: Fallback,
}

impl LineDialect {
    pub fn new(scope: Scope, rules: RuleTable, fallback: Fallback) -> Self {
        Self {
            scope,
            rules,
            any_line: RuleTable::default(),
            fallback,
        }
    }

    pub fn any_line(mut self, rules: RuleTable) -> Self {
        self.any_line = rules;
        self
    }

    pub fn classify(&self, outcome: &RawOutcome) -> Verdict {
        let matched = match self.scope {
            Scope::EveryLine => outcome
                .lines
                .iter()
                .find_map(|line| self.rules.first_match(line.trim())),
            Scope::LastLine => outcome
                .last_line()
                .and_then(|line| self.rules.first_match(line)),
        }
        .or_else(|| {
            outcome
                .lines
                .iter()
                .find_map(|line| self.any_line.first_match(line.trim()))
        });

        match matched {
            Some(verdict) => verdict.clone(),
            None => self.fallback.resolve(outcome),
        }
    }
}

/// Dialect of tools whose exit code carries the answer.
///
/// `proven` means the property holds, `violated` hands the output to
/// `violation` to find out which property failed, and any other exit code
/// gives `otherwise`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodeDialect {
    pub proven: i32,
    pub violated: i32,
    pub violation: LineDialect,
    pub otherwise: Verdict,
}

impl ExitCodeDialect {
    pub fn classify(&self, outcome: &RawOutcome) -> Verdict {
        if outcome.exit_code == self.proven {
            Verdict::True
        } else if outcome.exit_code == self.violated {
            self.violation.classify(outcome)
        } else {
            self.otherwise.clone()
        }
    }
}

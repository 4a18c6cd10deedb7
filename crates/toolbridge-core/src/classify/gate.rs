//! Termination signatures that decide a verdict before any text is read.

use crate::types::RawOutcome;
use crate::verdict::Verdict;

/// A non-normal exit code together with the output line that explains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbnormalExit {
    pub exit_code: i32,
    pub line: &'static str,
    pub verdict: Verdict,
}

/// Signal and exit-code checks shared by every dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitGate {
    /// Signals that mean "killed for exceeding the time limit" when the
    /// harness reports a timeout.
    pub timeout_signals: Vec<i32>,
    /// Signal that means the run was killed for exceeding its memory limit.
    pub oom_signal: Option<i32>,
    /// Exit codes after which the output is worth reading. `None` accepts
    /// every exit code.
    pub normal_exit_codes: Option<Vec<i32>>,
    /// Checked in order for exit codes outside `normal_exit_codes`.
    pub abnormal_exits: Vec<AbnormalExit>,
}

impl Default for ExitGate {
    fn default() -> Self {
        Self {
            timeout_signals: vec![9, 15],
            oom_signal: Some(9),
            normal_exit_codes: None,
            abnormal_exits: Vec::new(),
        }
    }
}

impl ExitGate {
    pub fn normal_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.normal_exit_codes = Some(codes.into_iter().collect());
        self
    }

    pub fn abnormal_exit(mut self, exit_code: i32, line: &'static str, verdict: Verdict) -> Self {
        self.abnormal_exits.push(AbnormalExit {
            exit_code,
            line,
            verdict,
        });
        self
    }

    /// Verdict decided by the termination signature alone, or `None` when
    /// the output has to be inspected.
    ///
    /// A timed-out run goes to text inspection unless its signal is one of
    /// the timeout signals; exit codes of timed-out runs are ignored.
    pub fn check(&self, outcome: &RawOutcome) -> Option<Verdict> {
        let signal = outcome.signal;

        if outcome.timed_out {
            if self.timeout_signals.contains(&signal) {
                return Some(Verdict::Timeout);
            }
            return None;
        }

        if signal != 0 {
            if self.oom_signal == Some(signal) {
                return Some(Verdict::OutOfMemory);
            }
            return Some(Verdict::signal(signal));
        }

        let normal = match &self.normal_exit_codes {
            None => return None,
            Some(codes) => codes.contains(&outcome.exit_code),
        };
        if normal {
            return None;
        }

        let verdict = self
            .abnormal_exits
            .iter()
            .find(|a| {
                a.exit_code == outcome.exit_code
                    && outcome.lines.iter().any(|l| l.trim_end() == a.line)
            })
            .map(|a| a.verdict.clone())
            .unwrap_or(Verdict::Error(None));
        Some(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(exit_code: i32, signal: i32, timed_out: bool, lines: &[&str]) -> RawOutcome {
        RawOutcome::new(
            exit_code,
            signal,
            lines.iter().map(|l| l.to_string()).collect(),
            timed_out,
        )
    }

    fn cprover_gate() -> ExitGate {
        ExitGate::default()
            .normal_exit_codes([0, 10])
            .abnormal_exit(64, "Usage error!", Verdict::InvalidArguments)
            .abnormal_exit(6, "Out of memory", Verdict::OutOfMemory)
    }

    #[test]
    fn signals_decide_first() {
        let gate = ExitGate::default();
        assert_eq!(gate.check(&outcome(0, 9, true, &[])), Some(Verdict::Timeout));
        assert_eq!(gate.check(&outcome(0, 15, true, &[])), Some(Verdict::Timeout));
        assert_eq!(gate.check(&outcome(0, 9, false, &[])), Some(Verdict::OutOfMemory));
        assert_eq!(gate.check(&outcome(0, 11, false, &[])), Some(Verdict::signal(11)));
    }

    #[test]
    fn timed_out_run_without_kill_signal_is_inspected() {
        assert_eq!(cprover_gate().check(&outcome(137, 0, true, &["<cprover>"])), None);
        assert_eq!(ExitGate::default().check(&outcome(0, 6, true, &[])), None);
    }

    #[test]
    fn clean_run_without_exit_table_is_inspected() {
        assert_eq!(ExitGate::default().check(&outcome(3, 0, false, &[])), None);
    }

    #[test]
    fn abnormal_exit_needs_matching_line() {
        let gate = cprover_gate();
        assert_eq!(gate.check(&outcome(10, 0, false, &[])), None);
        assert_eq!(
            gate.check(&outcome(64, 0, false, &["Usage error!"])),
            Some(Verdict::InvalidArguments)
        );
        assert_eq!(
            gate.check(&outcome(6, 0, false, &["Out of memory\n"])),
            Some(Verdict::OutOfMemory)
        );
        assert_eq!(
            gate.check(&outcome(64, 0, false, &["something else"])),
            Some(Verdict::Error(None))
        );
        assert_eq!(gate.check(&outcome(1, 0, false, &[])), Some(Verdict::Error(None)));
    }
}

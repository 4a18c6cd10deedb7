//! XML status documents (CBMC's `--xml-ui`).

use roxmltree::{Document, Node};
use tracing::{error, warn};

use crate::types::{ClassificationContext, RawOutcome};
use crate::verdict::Verdict;

/// Where the verdict lives in the status document and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredDialect {
    /// Child of the root element holding the terminal status.
    pub status_element: &'static str,
    pub failure_status: &'static str,
    pub failure_exit_code: i32,
    pub success_status: &'static str,
    pub success_exit_code: i32,
    /// Failure reasons containing this are bounded-unwinding artefacts.
    pub unwinding_reason: &'static str,
    /// Option without which a success only means "no bug within the bound".
    pub unwinding_option: &'static str,
    /// Error messages that mean the tool ran out of memory.
    pub oom_messages: &'static [&'static str],
    /// Raw-output marker of an out-of-memory crash that left no document.
    pub oom_marker: &'static str,
}

#[derive(Debug, thiserror::Error)]
enum Malformed {
    #[error("not a well-formed document: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("failure status without goto_trace/failure element")]
    MissingFailure,
    #[error("failure element without a reason")]
    MissingReason,
}

impl StructuredDialect {
    pub fn classify(&self, outcome: &RawOutcome, ctx: &ClassificationContext) -> Verdict {
        let raw = outcome.text();

        match self.interpret(&raw, outcome.exit_code, ctx) {
            Ok(verdict) => verdict,
            Err(_) if outcome.timed_out => Verdict::Timeout,
            Err(_) if raw.contains(self.oom_marker) => Verdict::OutOfMemory,
            Err(e) => {
                warn!(
                    tool = %ctx.tool,
                    exit_code = outcome.exit_code,
                    error = %e,
                    "cannot interpret structured tool output"
                );
                Verdict::InvalidOutput
            }
        }
    }

    fn interpret(
        &self,
        raw: &str,
        exit_code: i32,
        ctx: &ClassificationContext,
    ) -> Result<Verdict, Malformed> {
        let sanitized = sanitize(raw);
        let doc = Document::parse(sanitized.trim())?;
        let root = doc.root_element();

        let Some(status) = child(root, self.status_element) else {
            return Ok(self.error_message_verdict(root));
        };
        let status = status.text().unwrap_or_default().trim();

        if status == self.failure_status {
            let reason = failure_reason(root)?;
            if exit_code != self.failure_exit_code {
                return Ok(inconsistent(ctx, status, exit_code));
            }
            if reason.contains(self.unwinding_reason) {
                return Ok(Verdict::Unknown);
            }
            return Ok(Verdict::FalseReach);
        }

        if status == self.success_status {
            if exit_code != self.success_exit_code {
                return Ok(inconsistent(ctx, status, exit_code));
            }
            if ctx.has_option(self.unwinding_option) {
                return Ok(Verdict::True);
            }
            return Ok(Verdict::Unknown);
        }

        Ok(Verdict::Unknown)
    }

    fn error_message_verdict(&self, root: Node<'_, '_>) -> Verdict {
        let first_error = root
            .descendants()
            .find(|n| n.has_tag_name("message") && n.attribute("type") == Some("ERROR"));

        let Some(message) = first_error else {
            return Verdict::InvalidOutput;
        };

        let text = child(message, "text")
            .and_then(|t| t.text())
            .unwrap_or_default()
            .trim();

        if self.oom_messages.iter().any(|m| *m == text) {
            Verdict::OutOfMemory
        } else if text.is_empty() {
            Verdict::Error(None)
        } else {
            Verdict::error(text)
        }
    }
}

/// Empty tags are not well-formed XML.
fn sanitize(raw: &str) -> String {
    raw.replace("<>", "<emptyTag>").replace("</>", "</emptyTag>")
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn failure_reason<'a>(root: Node<'a, '_>) -> Result<&'a str, Malformed> {
    let failure = child(root, "goto_trace")
        .and_then(|trace| child(trace, "failure"))
        .ok_or(Malformed::MissingFailure)?;

    child(failure, "reason")
        .and_then(|r| r.text())
        .filter(|t| !t.trim().is_empty())
        .or_else(|| failure.attribute("reason"))
        .ok_or(Malformed::MissingReason)
}

fn inconsistent(ctx: &ClassificationContext, status: &str, exit_code: i32) -> Verdict {
    error!(
        tool = %ctx.tool,
        status,
        exit_code,
        "terminal status contradicts exit code"
    );
    Verdict::InconsistentStatus {
        status: status.to_owned(),
        exit_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvocationMode;

    fn dialect() -> StructuredDialect {
        StructuredDialect {
            status_element: "cprover-status",
            failure_status: "FAILURE",
            failure_exit_code: 10,
            success_status: "SUCCESS",
            success_exit_code: 0,
            unwinding_reason: "unwinding assertion",
            unwinding_option: "--unwinding-assertions",
            oom_messages: &["Out of memory", "SAT checker ran out of memory"],
            oom_marker: "Minisat::OutOfMemoryException",
        }
    }

    fn ctx(options: &[&str]) -> ClassificationContext {
        ClassificationContext {
            tool: "cbmc".into(),
            mode: InvocationMode::Plain,
            options: options.iter().map(|o| o.to_string()).collect(),
            uses_property_file: false,
            structured_output: true,
            generation: 0,
        }
    }

    fn run(xml: &str, exit_code: i32, options: &[&str]) -> Verdict {
        let outcome = RawOutcome::new(exit_code, 0, xml.lines().map(str::to_owned).collect(), false);
        dialect().classify(&outcome, &ctx(options))
    }

    #[test]
    fn failure_reason_as_attribute() {
        let xml = r#"<cprover><goto_trace><failure reason="assertion x > 0"/></goto_trace>
            <cprover-status>FAILURE</cprover-status></cprover>"#;
        assert_eq!(run(xml, 10, &[]), Verdict::FalseReach);
    }

    #[test]
    fn failure_reason_as_child_text() {
        let xml = "<cprover><goto_trace><failure><reason>unwinding assertion loop 0</reason>\
                   </failure></goto_trace><cprover-status>FAILURE</cprover-status></cprover>";
        assert_eq!(run(xml, 10, &[]), Verdict::Unknown);
    }

    #[test]
    fn failure_without_trace_is_invalid_output() {
        let xml = "<cprover><cprover-status>FAILURE</cprover-status></cprover>";
        assert_eq!(run(xml, 10, &[]), Verdict::InvalidOutput);
    }

    #[test]
    fn success_needs_unwinding_assertions_for_true() {
        let xml = "<cprover><cprover-status>SUCCESS</cprover-status></cprover>";
        assert_eq!(run(xml, 0, &["--unwinding-assertions"]), Verdict::True);
        assert_eq!(run(xml, 0, &[]), Verdict::Unknown);
    }

    #[test]
    fn status_exit_code_mismatch_is_reported() {
        let xml = "<cprover><cprover-status>SUCCESS</cprover-status></cprover>";
        assert_eq!(
            run(xml, 10, &[]),
            Verdict::InconsistentStatus {
                status: "SUCCESS".into(),
                exit_code: 10
            }
        );
    }

    #[test]
    fn error_messages_without_status() {
        let oom = r#"<cprover><message type="STATUS-MESSAGE"><text>x</text></message>
            <message type="ERROR"><text>Out of memory</text></message></cprover>"#;
        assert_eq!(run(oom, 0, &[]), Verdict::OutOfMemory);

        let other = r#"<cprover><message type="ERROR"><text>bad input</text></message></cprover>"#;
        assert_eq!(run(other, 0, &[]), Verdict::error("bad input"));

        let empty = r#"<cprover><message type="ERROR"><text></text></message></cprover>"#;
        assert_eq!(run(empty, 0, &[]), Verdict::Error(None));

        assert_eq!(run("<cprover></cprover>", 0, &[]), Verdict::InvalidOutput);
    }

    #[test]
    fn empty_tags_are_sanitized() {
        let xml = "<cprover><x><></></x><cprover-status>SUCCESS</cprover-status></cprover>";
        assert_eq!(run(xml, 0, &["--unwinding-assertions"]), Verdict::True);
    }

    #[test]
    fn unparsable_output_with_oom_marker() {
        let out = "<cprover><message>\nterminate called after Minisat::OutOfMemoryException";
        assert_eq!(run(out, 0, &[]), Verdict::OutOfMemory);
        assert_eq!(run("garbage", 0, &[]), Verdict::InvalidOutput);
    }
}

//! `classify` command: turn a finished run's evidence into a verdict.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;

use toolbridge_core::{ClassificationContext, RawOutcome, ToolRegistry, Verdict, VerdictClass};

pub struct ClassifyArgs {
    pub context: PathBuf,
    pub exit_code: i32,
    pub signal: i32,
    pub timed_out: bool,
    /// Output file, `-` for stdin.
    pub output: String,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ClassifyReport<'a> {
    tool: &'a str,
    verdict: &'a Verdict,
    class: VerdictClass,
}

pub fn run_classify(registry: &ToolRegistry, tool: &str, args: &ClassifyArgs) -> Result<()> {
    let adapter = registry.require(tool)?;
    let ctx = load_context(&args.context)?;
    if ctx.tool != tool {
        bail!(
            "context in {} was built for {}, not {tool}",
            args.context.display(),
            ctx.tool
        );
    }

    let outcome = RawOutcome::new(
        args.exit_code,
        args.signal,
        read_lines(&args.output)?,
        args.timed_out,
    );
    let verdict = adapter.classify(&outcome, &ctx);

    if args.json {
        let report = ClassifyReport {
            tool,
            verdict: &verdict,
            class: verdict.class(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize verdict")?
        );
    } else {
        println!("{verdict}");
    }
    Ok(())
}

fn load_context(path: &Path) -> Result<ClassificationContext> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read context file at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse context file at {}", path.display()))
}

fn read_lines(source: &str) -> Result<Vec<String>> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read output from stdin")?;
        buf
    } else {
        let bytes = std::fs::read(source)
            .with_context(|| format!("failed to read output file {source}"))?;
        String::from_utf8_lossy(&bytes).into_owned()
    };
    Ok(text.lines().map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_lines_splits_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.log");
        std::fs::write(&path, "CBMC version 5.11\r\nTRUE\n").unwrap();

        let lines = read_lines(path.to_str().unwrap()).unwrap();
        assert_eq!(lines, vec!["CBMC version 5.11", "TRUE"]);
    }

    #[test]
    fn load_context_reports_bad_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ctx.json");
        std::fs::write(&path, "{").unwrap();

        let msg = format!("{:#}", load_context(&path).unwrap_err());
        assert!(msg.contains("failed to parse context file"), "unexpected error: {msg}");
    }
}

//! Short-lived probe processes used during negotiation.
//!
//! A probe runs a tool (or its runtime) with a version flag, captures both
//! output streams, and gives up after a bounded wait.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a probe process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Exit code, or `None` if the process was killed (signal or timeout).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Whether the probe was killed for exceeding its wait bound.
    pub timed_out: bool,
    pub duration_ms: u64,
}

impl ProbeOutput {
    /// A probe counts as clean when it exited with 0 and wrote nothing to
    /// stderr.
    pub fn is_clean(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0) && self.stderr.trim().is_empty()
    }
}

/// Run `program args..` and capture its output, killing it after `timeout`.
///
/// Fails only when the process cannot be spawned at all; every other
/// outcome is reported through [`ProbeOutput`].
pub async fn run_probe<S: AsRef<str>>(
    program: &Path,
    args: &[S],
    timeout: Duration,
) -> std::io::Result<ProbeOutput> {
    let start = Instant::now();

    let mut child = Command::new(program)
        .args(args.iter().map(AsRef::as_ref))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    // Drain both pipes while waiting so a chatty child cannot block on a
    // full pipe buffer.
    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();

    let read_stdout = async {
        let mut buf = Vec::new();
        if let Some(ref mut pipe) = stdout_pipe {
            pipe.read_to_end(&mut buf).await.ok();
        }
        String::from_utf8_lossy(&buf).into_owned()
    };

    let read_stderr = async {
        let mut buf = Vec::new();
        if let Some(ref mut pipe) = stderr_pipe {
            pipe.read_to_end(&mut buf).await.ok();
        }
        String::from_utf8_lossy(&buf).into_owned()
    };

    let waited = tokio::time::timeout(timeout, async {
        tokio::join!(child.wait(), read_stdout, read_stderr)
    })
    .await;

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    match waited {
        Ok((status, stdout, stderr)) => {
            let status = status?;
            debug!(
                program = %program.display(),
                exit_code = ?status.code(),
                duration_ms,
                "probe finished"
            );
            Ok(ProbeOutput {
                exit_code: status.code(),
                stdout,
                stderr,
                timed_out: false,
                duration_ms,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            debug!(program = %program.display(), duration_ms, "probe timed out");
            Ok(ProbeOutput {
                exit_code: None,
                stdout: String::new(),
                stderr: format!("probe timed out after {}s", timeout.as_secs()),
                timed_out: true,
                duration_ms,
            })
        }
    }
}

/// First non-blank stdout line of `executable <flag>`, or `None` if the
/// tool cannot be run or prints nothing.
pub async fn version_from_tool(executable: &Path, flag: &str, timeout: Duration) -> Option<String> {
    let output = match run_probe(executable, &[flag], timeout).await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(
                executable = %executable.display(),
                error = %e,
                "cannot run tool to determine its version"
            );
            return None;
        }
    };

    if output.timed_out {
        tracing::warn!(executable = %executable.display(), "version query timed out");
        return None;
    }

    output
        .stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_owned)
}

//! Generation detection for tools started through a launcher artifact.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::NegotiationConfig;
use crate::error::{AdapterError, ProbeFailure};
use crate::probe::{self, ProbeOutput};
use crate::types::Capabilities;

use super::{runtime, tool_dir};

/// One candidate interface generation and how to ask for its version.
#[derive(Debug, Clone, Copy)]
pub struct GenerationProbe {
    pub generation: u32,
    /// Runtime arguments for the version query, given the launcher artifact
    /// and the tool's data directory.
    pub version_args: fn(launcher: &Path, data_dir: &Path) -> Vec<String>,
}

/// Negotiation recipe for launcher-based tools.
#[derive(Debug, Clone)]
pub struct LauncherPlan {
    /// Flag that makes the wrapper executable print its own version.
    pub wrapper_version_flag: &'static str,
    /// Extracts the version from a generation probe's stdout (group 1).
    pub version_line: &'static LazyLock<Regex>,
    /// First tool version that needs an explicit data directory.
    pub data_dir_since: (u64, u64, u64),
    /// Name of the data directory next to the executable.
    pub data_dir_name: &'static str,
    /// Generations to try; probed newest first.
    pub generations: &'static [GenerationProbe],
}

struct FoundVersion {
    generation: u32,
    raw: String,
    parsed: Version,
}

pub(super) async fn negotiate(
    plan: &LauncherPlan,
    config: &NegotiationConfig,
    executable: &Path,
    runtime_cell: &OnceCell<PathBuf>,
) -> Result<Capabilities, AdapterError> {
    let timeout = config.probe_timeout();

    let wrapper_version =
        probe::version_from_tool(executable, plan.wrapper_version_flag, timeout).await;
    if let Some(version) = wrapper_version.as_deref() {
        if config.is_legacy_version(version) {
            info!(version, "frozen competition release; skipping generation probes");
            return Ok(Capabilities::legacy(version));
        }
    }

    let dir = tool_dir(executable);
    let launcher = find_launcher(dir, &config.launcher_candidates)?;
    let data_dir = dir.join(plan.data_dir_name);

    let runtime = runtime_cell
        .get_or_try_init(|| runtime::detect(config))
        .await?
        .clone();

    let found = probe_generations(plan, config, executable, &runtime, &launcher, &data_dir).await?;

    let requires_data_dir = release_at_least(&found.parsed, plan.data_dir_since);

    let version = match wrapper_version {
        Some(wrapper) => format!("{}-{}", found.raw, wrapper),
        None => found.raw,
    };

    info!(
        executable = %executable.display(),
        generation = found.generation,
        version = %version,
        requires_data_dir,
        "negotiated tool capabilities"
    );

    Ok(Capabilities {
        generation: found.generation,
        version,
        launcher: Some(launcher),
        requires_data_dir,
        runtime: Some(runtime),
        legacy: false,
    })
}

/// First launcher artifact that exists, in configured priority order.
pub fn find_launcher(dir: &Path, candidates: &[String]) -> Result<PathBuf, AdapterError> {
    candidates
        .iter()
        .map(|c| dir.join(c))
        .find(|p| p.is_file())
        .ok_or_else(|| AdapterError::LauncherNotFound {
            dir: dir.to_path_buf(),
            candidates: candidates.to_vec(),
        })
}

async fn probe_generations(
    plan: &LauncherPlan,
    config: &NegotiationConfig,
    executable: &Path,
    runtime: &Path,
    launcher: &Path,
    data_dir: &Path,
) -> Result<FoundVersion, AdapterError> {
    let mut generations = plan.generations.to_vec();
    generations.sort_by(|a, b| b.generation.cmp(&a.generation));

    let mut attempts = Vec::with_capacity(generations.len());

    for candidate in generations {
        let args = (candidate.version_args)(launcher, data_dir);
        let mut command = vec![runtime.display().to_string()];
        command.extend(args.iter().cloned());
        let attempt = format!("API {}", candidate.generation);

        let failure = match probe::run_probe(runtime, &args, config.probe_timeout()).await {
            Err(e) => ProbeFailure {
                attempt,
                command,
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                reason: format!("cannot run runtime: {e}"),
            },
            Ok(output) => match read_version(plan, &output) {
                Ok((raw, parsed)) => {
                    debug!(generation = candidate.generation, version = %raw, "generation supported");
                    return Ok(FoundVersion {
                        generation: candidate.generation,
                        raw,
                        parsed,
                    });
                }
                Err(reason) => ProbeFailure {
                    attempt,
                    command,
                    exit_code: output.exit_code,
                    stdout: output.stdout.trim().to_owned(),
                    stderr: output.stderr.trim().to_owned(),
                    reason,
                },
            },
        };

        warn!(
            api = candidate.generation,
            command = %failure.command.join(" "),
            exit_code = ?failure.exit_code,
            stderr = %failure.stderr,
            stdout = %failure.stdout,
            reason = %failure.reason,
            "cannot determine tool version"
        );
        attempts.push(failure);
    }

    Err(AdapterError::VersionNegotiationFailed {
        executable: executable.to_path_buf(),
        attempts,
    })
}

fn read_version(plan: &LauncherPlan, output: &ProbeOutput) -> Result<(String, Version), String> {
    if output.timed_out {
        return Err("timed out".to_owned());
    }
    if !output.is_clean() {
        return Err("non-zero exit code or error output".to_owned());
    }

    let stdout = output.stdout.trim();
    let raw = plan
        .version_line
        .captures(stdout)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| "no version line in output".to_owned())?;

    let parsed = parse_version(&raw).ok_or_else(|| format!("unparsable version {raw:?}"))?;
    Ok((raw, parsed))
}

/// Semantic version of a tool version string. Anything after the first
/// whitespace (build notes, commit dates) is ignored.
fn parse_version(raw: &str) -> Option<Version> {
    let head = raw.split_whitespace().next()?;
    Version::parse(head).ok()
}

/// Release ordering on `major.minor.patch` only. Development builds such as
/// `0.1.24-8e3c3f1` count as the release they were cut from.
fn release_at_least(version: &Version, since: (u64, u64, u64)) -> bool {
    (version.major, version.minor, version.patch) >= since
}

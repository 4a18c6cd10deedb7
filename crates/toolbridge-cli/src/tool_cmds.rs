//! `tools`, `version`, `negotiate` and `cmdline` commands.

use std::path::Path;

use anyhow::{Context, Result};

use toolbridge_core::{InvocationRequest, MEMLIMIT, ResourceLimits, ToolDescription, ToolRegistry};

/// Parse a `name=value` resource limit.
pub fn parse_limit(s: &str) -> Result<(String, u64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty limit name in {s:?}"));
    }
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for limit {name}: {e}"))?;
    Ok((name.to_owned(), value))
}

/// Assemble an [`InvocationRequest`] from command-line arguments.
///
/// `--memlimit` wins over a `memlimit=` entry in `--limit`.
pub fn build_request(
    property_file: Option<String>,
    memlimit: Option<u64>,
    limits: Vec<(String, u64)>,
    options: Vec<String>,
    inputs: Vec<String>,
) -> InvocationRequest {
    let mut resource_limits = ResourceLimits::new();
    for (name, value) in limits {
        resource_limits = resource_limits.with(name, value);
    }
    if let Some(bytes) = memlimit {
        resource_limits = resource_limits.with(MEMLIMIT, bytes);
    }

    let mut request = InvocationRequest::new()
        .options(options)
        .inputs(inputs)
        .limits(resource_limits);
    if let Some(property) = property_file {
        request = request.property_file(property);
    }
    request
}

pub fn run_tools(registry: &ToolRegistry) -> Result<()> {
    let descriptions: Vec<ToolDescription> = registry
        .list()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .map(|adapter| adapter.describe())
        .collect();
    print_json(&descriptions)
}

pub async fn run_version(registry: &ToolRegistry, tool: &str, executable: &Path) -> Result<()> {
    let adapter = registry.require(tool)?;
    let version = adapter.version(executable).await.with_context(|| {
        format!(
            "could not determine the version of {tool} at {}",
            executable.display()
        )
    })?;
    println!("{version}");
    Ok(())
}

pub async fn run_negotiate(registry: &ToolRegistry, tool: &str, executable: &Path) -> Result<()> {
    let adapter = registry.require(tool)?;
    let caps = adapter
        .negotiate(executable)
        .await
        .with_context(|| format!("capability negotiation for {tool} failed"))?;
    print_json(&*caps)
}

pub async fn run_cmdline(
    registry: &ToolRegistry,
    tool: &str,
    executable: &Path,
    request: &InvocationRequest,
) -> Result<()> {
    let adapter = registry.require(tool)?;
    let prepared = adapter
        .build_command(executable, request)
        .await
        .with_context(|| format!("cannot build a {tool} command line"))?;
    print_json(&prepared)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_limit_accepts_name_value() {
        assert_eq!(parse_limit("timelimit=900"), Ok(("timelimit".into(), 900)));
        assert_eq!(parse_limit(" memlimit = 42 "), Ok(("memlimit".into(), 42)));
    }

    #[test]
    fn parse_limit_rejects_garbage() {
        assert!(parse_limit("timelimit").is_err());
        assert!(parse_limit("=5").is_err());
        assert!(parse_limit("timelimit=-1").is_err());
    }

    #[test]
    fn memlimit_flag_wins_over_limit_entry() {
        let request = build_request(
            Some("p.prp".into()),
            Some(2048),
            vec![("memlimit".into(), 1024), ("timelimit".into(), 60)],
            vec!["--32".into()],
            vec!["a.c".into()],
        );
        assert_eq!(request.limits.memory_bytes(), Some(2048));
        assert_eq!(request.limits.get("timelimit"), Some(60));
        assert_eq!(request.property_file.as_deref(), Some("p.prp"));
        assert!(request.has_option("--32"));
    }
}

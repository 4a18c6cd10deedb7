//! Shared test utilities for toolbridge integration tests.
//!
//! Provides throwaway tool installations made of shell scripts, so
//! negotiation can be exercised without a real verifier or JVM, plus
//! shorthands for building [`RawOutcome`]s and [`ClassificationContext`]s.
//!
//! The fake runtime appends every invocation to a log inside the install
//! directory; [`FakeInstall::runtime_calls`] reads it back.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use toolbridge_core::{ClassificationContext, InvocationMode, NegotiationConfig, RawOutcome};

/// Launcher artifact path used by [`NegotiationConfig::default`].
pub const DEFAULT_LAUNCHER: &str =
    "plugins/org.eclipse.equinox.launcher_1.3.100.v20150511-1540.jar";

const RUNTIME_LOG: &str = "runtime-calls.log";

/// How the fake runtime answers one generation's version probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReply {
    /// Prints `Version is <v>` on stdout and exits 0.
    Version(String),
    /// Prints the message on stderr and exits 1.
    Reject(String),
}

impl ProbeReply {
    pub fn version(v: &str) -> Self {
        Self::Version(v.to_owned())
    }

    pub fn reject(message: &str) -> Self {
        Self::Reject(message.to_owned())
    }

    fn script(&self) -> String {
        match self {
            Self::Version(v) => {
                format!("  echo 'This is Ultimate'\n  echo 'Version is {v}'\n  exit 0")
            }
            Self::Reject(msg) => format!("  echo '{msg}' >&2\n  exit 1"),
        }
    }
}

/// Behaviour of the fake JVM.
#[derive(Debug, Clone)]
pub struct FakeRuntime {
    /// Printed on stderr for `-version`.
    pub banner: String,
    /// Reply to probes carrying `@noDefault` (API 2).
    pub api2: ProbeReply,
    /// Reply to every other probe (API 1).
    pub api1: ProbeReply,
    /// Seconds to sleep before answering a generation probe.
    pub delay: Option<f32>,
}

impl FakeRuntime {
    /// A Java 8 runtime whose tool speaks API 2 in `version`.
    pub fn api2(version: &str) -> Self {
        Self {
            banner: "openjdk version \"1.8.0_292\"".to_owned(),
            api2: ProbeReply::version(version),
            api1: ProbeReply::reject("Unrecognized option: -ultimatedata"),
            delay: None,
        }
    }

    /// A Java 8 runtime whose tool only understands API 1.
    pub fn api1(version: &str) -> Self {
        Self {
            api2: ProbeReply::reject("Unrecognized option: -ultimatedata"),
            api1: ProbeReply::version(version),
            ..Self::api2(version)
        }
    }

    pub fn banner(mut self, banner: &str) -> Self {
        self.banner = banner.to_owned();
        self
    }

    pub fn delay(mut self, secs: f32) -> Self {
        self.delay = Some(secs);
        self
    }
}

/// A tool installation in a temporary directory. Removed on drop.
pub struct FakeInstall {
    dir: TempDir,
}

impl FakeInstall {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an executable script `name` with `body` after the shebang.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create script dir");
        }
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("failed to write script");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("failed to make script executable");
        }
        path
    }

    /// Wrapper executable that prints `version` for `--version`, or nothing
    /// when `None`.
    pub fn wrapper(&self, name: &str, version: Option<&str>) -> PathBuf {
        let reply = version
            .map(|v| format!("  echo '{v}'\n  exit 0"))
            .unwrap_or_else(|| "  exit 1".to_owned());
        self.script(
            name,
            &format!("if [ \"$1\" = \"--version\" ]; then\n{reply}\nfi\necho \"$@\""),
        )
    }

    /// Empty file at `relative` (a launcher jar, a marker file).
    pub fn file(&self, relative: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, "").expect("failed to write file");
        path
    }

    /// The launcher artifact the default configuration looks for.
    pub fn launcher(&self) -> PathBuf {
        self.file(DEFAULT_LAUNCHER)
    }

    /// Fake runtime named `name` that logs each call.
    pub fn runtime(&self, name: &str, runtime: &FakeRuntime) -> PathBuf {
        let log = self.dir.path().join(RUNTIME_LOG);
        let delay = runtime
            .delay
            .map(|s| format!("sleep {s}\n"))
            .unwrap_or_default();
        let body = format!(
            "echo \"$*\" >> '{log}'\n\
             if [ \"$1\" = \"-version\" ]; then\n  echo '{banner}' >&2\n  exit 0\nfi\n\
             {delay}\
             case \" $* \" in\n*\" @noDefault \"*)\n{api2}\n  ;;\nesac\n{api1}",
            log = log.display(),
            banner = runtime.banner.replace('\'', "'\\''"),
            api2 = runtime.api2.script(),
            api1 = runtime.api1.script(),
        );
        self.script(name, &body)
    }

    /// Every recorded runtime invocation, one argument string per call.
    pub fn runtime_calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join(RUNTIME_LOG))
            .map(|s| s.lines().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Recorded generation probes (everything except `-version`).
    pub fn probe_calls(&self) -> Vec<String> {
        self.runtime_calls()
            .into_iter()
            .filter(|c| c != "-version")
            .collect()
    }

    /// Negotiation config pointing at `runtime` only, with a short probe
    /// timeout.
    pub fn config(&self, runtime: &Path) -> NegotiationConfig {
        NegotiationConfig::default()
            .runtime_candidates([runtime.display().to_string()])
            .probe_timeout_secs(5)
    }
}

impl Default for FakeInstall {
    fn default() -> Self {
        Self::new()
    }
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| (*l).to_owned()).collect()
}

/// A run that exited normally with `exit_code`.
pub fn outcome(exit_code: i32, lines: &[&str]) -> RawOutcome {
    RawOutcome::new(exit_code, 0, owned(lines), false)
}

/// A run terminated by `signal` without hitting the time limit.
pub fn signalled(signal: i32, lines: &[&str]) -> RawOutcome {
    RawOutcome::new(0, signal, owned(lines), false)
}

/// A run the harness killed with `signal` after the time limit.
pub fn timed_out(signal: i32, lines: &[&str]) -> RawOutcome {
    RawOutcome::new(0, signal, owned(lines), true)
}

/// Context of a run built in `mode` by `tool`.
pub fn context(tool: &str, mode: InvocationMode, generation: u32) -> ClassificationContext {
    ClassificationContext {
        tool: tool.to_owned(),
        mode,
        options: Vec::new(),
        uses_property_file: matches!(mode, InvocationMode::PropertyFile | InvocationMode::Legacy),
        structured_output: false,
        generation,
    }
}

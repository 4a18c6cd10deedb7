//! Configuration file management for toolbridge.
//!
//! Provides a TOML-based config file at `~/.config/toolbridge/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use toolbridge_core::NegotiationConfig;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "TOOLBRIDGE_CONFIG";
/// Pins the runtime candidate list to a single binary.
pub const JAVA_ENV: &str = "TOOLBRIDGE_JAVA";
/// Overrides the probe timeout, in seconds.
pub const PROBE_TIMEOUT_ENV: &str = "TOOLBRIDGE_PROBE_TIMEOUT";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub negotiation: NegotiationConfig,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the toolbridge config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/toolbridge` or
/// `~/.config/toolbridge`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("toolbridge");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("toolbridge")
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Config file to use: `cli_path` > `TOOLBRIDGE_CONFIG` > default path.
///
/// The flag is `true` when the location was chosen explicitly.
pub fn choose_path(cli_path: Option<&Path>) -> (PathBuf, bool) {
    if let Some(path) = cli_path {
        return (path.to_path_buf(), true);
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return (PathBuf::from(path), true);
    }
    (config_path(), false)
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct ToolbridgeConfig {
    pub negotiation: NegotiationConfig,
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
}

impl ToolbridgeConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - File: `cli_path` > `TOOLBRIDGE_CONFIG` > `config_path()`. An
    ///   explicitly named file must exist; a missing default file means
    ///   built-in defaults.
    /// - Runtime: `TOOLBRIDGE_JAVA` > `negotiation.runtime_candidates`.
    /// - Probe timeout: `TOOLBRIDGE_PROBE_TIMEOUT` > `negotiation.probe_timeout_secs`.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = choose_path(cli_path);

        let (file, source) = if path.exists() || explicit {
            (load_config(&path)?, Some(path))
        } else {
            debug!(path = %path.display(), "no config file; using defaults");
            (ConfigFile::default(), None)
        };

        let mut negotiation = file.negotiation;

        if let Ok(java) = std::env::var(JAVA_ENV) {
            if java.trim().is_empty() {
                bail!("{JAVA_ENV} is set but empty");
            }
            negotiation = negotiation.runtime_candidates([java]);
        }

        if let Ok(secs) = std::env::var(PROBE_TIMEOUT_ENV) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{PROBE_TIMEOUT_ENV} is not a number of seconds: {secs}"))?;
            negotiation = negotiation.probe_timeout_secs(secs);
        }

        Ok(Self {
            negotiation,
            source,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Externally supplied inputs for capability negotiation.
///
/// Every field has a default matching a stock Ultimate installation, so an
/// empty TOML table deserializes to [`NegotiationConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Launcher artifacts relative to the tool directory, most recent first.
    pub launcher_candidates: Vec<String>,
    /// Runtime binaries to try, in order. Bare names are looked up on `PATH`.
    pub runtime_candidates: Vec<String>,
    /// Substring a usable runtime prints when asked for its version.
    pub runtime_version_marker: String,
    /// Upper bound for a single probe process.
    pub probe_timeout_secs: u64,
    /// Wrapper versions of frozen competition releases.
    pub legacy_versions: Vec<String>,
}

impl NegotiationConfig {
    pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }

    /// Replace the runtime candidate list.
    pub fn runtime_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the launcher candidate list.
    pub fn launcher_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.launcher_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.probe_timeout_secs = secs;
        self
    }

    pub fn is_legacy_version(&self, version: &str) -> bool {
        self.legacy_versions.iter().any(|v| v == version)
    }
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            launcher_candidates: vec![
                "plugins/org.eclipse.equinox.launcher_1.3.100.v20150511-1540.jar".to_owned(),
            ],
            runtime_candidates: vec![
                "java".to_owned(),
                "/usr/bin/java".to_owned(),
                "/opt/oracle-jdk-bin-1.8.0.202/bin/java".to_owned(),
                "/usr/lib/jvm/java-8-openjdk-amd64/bin/java".to_owned(),
            ],
            runtime_version_marker: "1.8".to_owned(),
            probe_timeout_secs: Self::DEFAULT_PROBE_TIMEOUT_SECS,
            legacy_versions: vec!["f7c3ed31".to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_name_stock_installation() {
        let cfg = NegotiationConfig::default();
        assert_eq!(cfg.runtime_candidates[0], "java");
        assert_eq!(cfg.runtime_version_marker, "1.8");
        assert!(cfg.is_legacy_version("f7c3ed31"));
        assert!(!cfg.is_legacy_version("0.2.1"));
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cfg = NegotiationConfig::default().probe_timeout_secs(0);
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: NegotiationConfig =
            serde_json::from_str(r#"{"runtime_candidates": ["/opt/jdk/bin/java"]}"#).unwrap();
        assert_eq!(cfg.runtime_candidates, vec!["/opt/jdk/bin/java"]);
        assert_eq!(cfg.launcher_candidates, NegotiationConfig::default().launcher_candidates);
    }
}

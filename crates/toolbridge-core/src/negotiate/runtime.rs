//! Detection of the auxiliary runtime (a JVM for launcher-based tools).

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::NegotiationConfig;
use crate::error::AdapterError;
use crate::probe;

/// First configured runtime whose version banner contains the configured
/// marker.
///
/// Runtimes commonly print their banner on stderr, so both streams are
/// searched.
pub async fn detect(config: &NegotiationConfig) -> Result<PathBuf, AdapterError> {
    let marker = config.runtime_version_marker.as_str();

    for candidate in &config.runtime_candidates {
        let resolved = match which::which(candidate) {
            Ok(path) => path,
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "runtime candidate not found");
                continue;
            }
        };

        let output = match probe::run_probe(&resolved, &["-version"], config.probe_timeout()).await {
            Ok(output) => output,
            Err(e) => {
                warn!(runtime = %resolved.display(), error = %e, "cannot run runtime candidate");
                continue;
            }
        };

        let banner = format!("{}{}", output.stdout, output.stderr);
        if banner.trim().is_empty() {
            debug!(runtime = %resolved.display(), "runtime candidate printed nothing");
            continue;
        }
        if banner.contains(marker) {
            info!(runtime = %resolved.display(), "using runtime");
            return Ok(resolved);
        }

        warn!(
            runtime = %resolved.display(),
            exit_code = ?output.exit_code,
            banner = %banner.trim(),
            marker,
            "runtime candidate has the wrong version"
        );
    }

    Err(AdapterError::RuntimeNotFound {
        candidates: config.runtime_candidates.clone(),
        marker: marker.to_owned(),
    })
}

//! Capability negotiation.
//!
//! Before a command line can be built, some tools need to be asked which
//! generation of their interface they speak. A [`Negotiator`] runs the
//! tool's [`NegotiationPlan`] once per executable path and caches the
//! resulting [`Capabilities`] for the rest of the process.
//!
//! ```text
//! negotiate(exe) --cache hit--> Arc<Capabilities>
//!     |
//!     +--miss--> NegotiationPlan
//!                  Static      -> fixed generation
//!                  MarkerFile  -> generation from a sibling file
//!                  Launcher    -> wrapper version (legacy?)
//!                                 -> launcher artifact
//!                                 -> runtime (cached once)
//!                                 -> generation probes, newest first
//! ```

pub mod launcher;
pub mod runtime;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::NegotiationConfig;
use crate::error::AdapterError;
use crate::types::Capabilities;

pub use launcher::{GenerationProbe, LauncherPlan};

/// How a tool's capabilities are determined.
#[derive(Debug, Clone)]
pub enum NegotiationPlan {
    /// Nothing to negotiate; every installation speaks the same interface.
    Static { generation: u32 },
    /// The generation depends on whether a marker file sits next to the
    /// executable.
    MarkerFile {
        marker: &'static str,
        present: u32,
        absent: u32,
    },
    /// Multi-generation detection through a launcher artifact and an
    /// auxiliary runtime.
    Launcher(LauncherPlan),
}

type CacheSlot = Arc<OnceCell<Arc<Capabilities>>>;

/// Runs a [`NegotiationPlan`] and caches the result per executable path.
///
/// Safe to share between concurrent invocations: the first caller for a
/// path runs the plan while later callers for the same path wait for it.
/// Failures are not cached, so a later call tries again.
pub struct Negotiator {
    plan: NegotiationPlan,
    config: NegotiationConfig,
    cache: Mutex<HashMap<PathBuf, CacheSlot>>,
    runtime: OnceCell<PathBuf>,
}

impl Negotiator {
    pub fn new(plan: NegotiationPlan, config: NegotiationConfig) -> Self {
        Self {
            plan,
            config,
            cache: Mutex::new(HashMap::new()),
            runtime: OnceCell::new(),
        }
    }

    pub fn plan(&self) -> &NegotiationPlan {
        &self.plan
    }

    pub fn config(&self) -> &NegotiationConfig {
        &self.config
    }

    /// Capabilities of the installation at `executable`, negotiated on first
    /// use.
    pub async fn negotiate(&self, executable: &Path) -> Result<Arc<Capabilities>, AdapterError> {
        let slot = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(executable.to_path_buf()).or_default())
        };

        let caps = slot
            .get_or_try_init(|| async {
                debug!(executable = %executable.display(), "negotiating capabilities");
                self.run_plan(executable).await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(caps))
    }

    /// Cached capabilities for `executable`, without negotiating.
    pub fn cached(&self, executable: &Path) -> Option<Arc<Capabilities>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(executable).and_then(|slot| slot.get().cloned())
    }

    async fn run_plan(&self, executable: &Path) -> Result<Capabilities, AdapterError> {
        match &self.plan {
            NegotiationPlan::Static { generation } => Ok(Capabilities::fixed(*generation)),
            NegotiationPlan::MarkerFile {
                marker,
                present,
                absent,
            } => {
                let generation = if tool_dir(executable).join(marker).is_file() {
                    *present
                } else {
                    *absent
                };
                debug!(marker, generation, "generation chosen by marker file");
                Ok(Capabilities::fixed(generation))
            }
            NegotiationPlan::Launcher(plan) => {
                launcher::negotiate(plan, &self.config, executable, &self.runtime).await
            }
        }
    }
}

impl std::fmt::Debug for Negotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .cache
            .lock()
            .map(|c| c.len())
            .unwrap_or_default();
        f.debug_struct("Negotiator")
            .field("plan", &self.plan)
            .field("cached_paths", &cached)
            .finish()
    }
}

/// Directory containing `executable`, `.` for a bare file name.
pub fn tool_dir(executable: &Path) -> &Path {
    executable
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_dir_of_bare_name_is_current_dir() {
        assert_eq!(tool_dir(Path::new("Ultimate.py")), Path::new("."));
        assert_eq!(tool_dir(Path::new("/opt/ua/Ultimate.py")), Path::new("/opt/ua"));
    }

    #[tokio::test]
    async fn static_plan_needs_no_probe() {
        let negotiator = Negotiator::new(
            NegotiationPlan::Static { generation: 0 },
            NegotiationConfig::default(),
        );
        let caps = negotiator
            .negotiate(Path::new("/nonexistent/cbmc"))
            .await
            .unwrap();
        assert_eq!(*caps, Capabilities::fixed(0));
    }

    #[tokio::test]
    async fn marker_file_selects_generation() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("map2check-wrapper.py");
        let plan = NegotiationPlan::MarkerFile {
            marker: "map2check-wrapper.sh",
            present: 6,
            absent: 7,
        };

        let negotiator = Negotiator::new(plan.clone(), NegotiationConfig::default());
        assert_eq!(negotiator.negotiate(&exe).await.unwrap().generation, 7);

        std::fs::write(tmp.path().join("map2check-wrapper.sh"), "").unwrap();
        // Cached per path: the first answer sticks for this negotiator.
        assert_eq!(negotiator.negotiate(&exe).await.unwrap().generation, 7);

        let fresh = Negotiator::new(plan, NegotiationConfig::default());
        assert_eq!(fresh.negotiate(&exe).await.unwrap().generation, 6);
    }

    #[tokio::test]
    async fn cached_returns_same_arc() {
        let negotiator = Negotiator::new(
            NegotiationPlan::Static { generation: 3 },
            NegotiationConfig::default(),
        );
        let exe = Path::new("/opt/tool/bin");
        assert!(negotiator.cached(exe).is_none());

        let first = negotiator.negotiate(exe).await.unwrap();
        let second = negotiator.negotiate(exe).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &negotiator.cached(exe).unwrap()));
    }
}

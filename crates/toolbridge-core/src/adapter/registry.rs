//! Tool registry -- adapters looked up by name at runtime.

use std::collections::HashMap;

use crate::config::NegotiationConfig;
use crate::error::AdapterError;
use crate::tools;

use super::trait_def::ToolAdapter;
use super::verifier::VerifierAdapter;

/// A collection of registered [`ToolAdapter`]s, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    adapters: HashMap<String, Box<dyn ToolAdapter>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool, all sharing `config`.
    pub fn builtin(config: &NegotiationConfig) -> Self {
        let mut registry = Self::new();
        for profile in tools::builtin_profiles() {
            registry.register(VerifierAdapter::new(profile, config.clone()));
        }
        registry
    }

    /// Register an adapter under [`ToolAdapter::name`], returning the one it
    /// replaces.
    pub fn register(&mut self, adapter: impl ToolAdapter + 'static) -> Option<Box<dyn ToolAdapter>> {
        let name = adapter.name().to_string();
        self.adapters.insert(name, Box::new(adapter))
    }

    pub fn get(&self, name: &str) -> Option<&dyn ToolAdapter> {
        self.adapters.get(name).map(|b| b.as_ref())
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<&dyn ToolAdapter, AdapterError> {
        self.get(name)
            .ok_or_else(|| AdapterError::UnknownTool(name.to_owned()))
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("adapters", &self.list())
            .finish()
    }
}

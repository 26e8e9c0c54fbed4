//! In-process plugin host backed by registered factories.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{PluginHost, PluginInstance};
use crate::error::HostError;

/// Factory closure producing a fresh instance for an optional variant selector.
pub type PluginFactory =
    dyn Fn(Option<&str>) -> Result<Box<dyn PluginInstance>, HostError> + Send + Sync;

struct RegistryEntry {
    name: String,
    factory: Arc<PluginFactory>,
}

/// A [`PluginHost`] whose plugins are Rust types registered at runtime.
///
/// ```rust
/// use patchbay_core::host::{PluginHost, PluginRegistry};
///
/// let registry = PluginRegistry::new();
/// assert!(registry.load("missing", None).is_err());
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
    live: AtomicUsize,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `identifier`, replacing any previous entry.
    pub fn register<F>(&self, identifier: impl Into<String>, name: impl Into<String>, factory: F)
    where
        F: Fn(Option<&str>) -> Result<Box<dyn PluginInstance>, HostError> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        tracing::debug!(identifier = %identifier, "plugin_register");
        self.entries.write().insert(
            identifier,
            RegistryEntry {
                name: name.into(),
                factory: Arc::new(factory),
            },
        );
    }

    /// Remove a registered factory. Instances already loaded stay alive.
    pub fn unregister(&self, identifier: &str) -> bool {
        self.entries.write().remove(identifier).is_some()
    }

    /// Returns true if a factory is registered under `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }

    /// Display name registered for `identifier`.
    pub fn name(&self, identifier: &str) -> Option<String> {
        self.entries.read().get(identifier).map(|e| e.name.clone())
    }

    /// All registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Number of instances loaded and not yet unloaded.
    pub fn live_instances(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

impl PluginHost for PluginRegistry {
    fn load(
        &self,
        identifier: &str,
        variant: Option<&str>,
    ) -> Result<Box<dyn PluginInstance>, HostError> {
        // Run the factory outside the lock so it may itself consult the registry.
        let factory = self
            .entries
            .read()
            .get(identifier)
            .map(|e| Arc::clone(&e.factory))
            .ok_or_else(|| HostError::NotFound(identifier.to_owned()))?;
        let instance = factory(variant)?;
        self.live.fetch_add(1, Ordering::AcqRel);
        Ok(instance)
    }

    fn unload(&self, instance: Box<dyn PluginInstance>) {
        drop(instance);
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::MockPlugin;

    #[test]
    fn test_register_and_load() {
        let registry = PluginRegistry::new();
        registry.register("mock", "Mock", |_| Ok(Box::new(MockPlugin::new())));

        assert!(registry.contains("mock"));
        assert_eq!(registry.name("mock").as_deref(), Some("Mock"));
        assert_eq!(registry.len(), 1);

        let instance = registry.load("mock", None).unwrap();
        assert_eq!(instance.parameter_count(), 2);
        assert_eq!(registry.live_instances(), 1);

        registry.unload(instance);
        assert_eq!(registry.live_instances(), 0);
    }

    #[test]
    fn test_load_unknown() {
        let registry = PluginRegistry::new();
        let err = registry.load("nope", None).err().unwrap();
        assert_eq!(err, HostError::NotFound("nope".into()));
        assert_eq!(registry.live_instances(), 0);
    }

    #[test]
    fn test_variant_selector_reaches_factory() {
        let registry = PluginRegistry::new();
        registry.register("multi", "Multi", |variant| match variant {
            None | Some("default") => Ok(Box::new(MockPlugin::new())),
            Some(other) => Err(HostError::LoadFailure(format!("no class {other}"))),
        });

        assert!(registry.load("multi", Some("default")).is_ok());
        let err = registry.load("multi", Some("other")).err().unwrap();
        assert!(matches!(err, HostError::LoadFailure(_)));
    }

    #[test]
    fn test_identifiers_sorted_and_unregister() {
        let registry = PluginRegistry::new();
        registry.register("b", "B", |_| Ok(Box::new(MockPlugin::new())));
        registry.register("a", "A", |_| Ok(Box::new(MockPlugin::new())));
        assert_eq!(registry.identifiers(), vec!["a".to_string(), "b".to_string()]);

        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.identifiers(), vec!["b".to_string()]);
    }
}

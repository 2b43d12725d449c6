// src/plugins/registry.rs — Thread-safe plugin registry
//
// One coarse mutex guards the name → instance map for the whole of every
// operation. `execute` is the exception: it clones the instance handle under
// the lock and calls `run` after releasing it, so a long-running check never
// blocks other registry calls. An `unload` racing an in-flight `run` removes
// the entry while the caller keeps its own `Arc`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::loader::{PluginLoader, ScriptLoader};
use super::types::{PluginMeta, VulnPlugin};
use crate::infra::errors::LunaError;

pub type PluginHandle = Arc<dyn VulnPlugin>;

pub struct PluginRegistry {
    plugins: Mutex<HashMap<String, PluginHandle>>,
    loader: Box<dyn PluginLoader>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(Box::new(ScriptLoader::with_defaults()))
    }
}

impl PluginRegistry {
    pub fn new(loader: Box<dyn PluginLoader>) -> Self {
        Self {
            plugins: Mutex::new(HashMap::new()),
            loader,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PluginHandle>> {
        // A panicking plugin must not take the registry down with it.
        self.plugins.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Load a plugin from `path` and insert it under its declared name.
    /// Either the instance is inserted or the registry is left untouched.
    pub fn load(&self, path: &Path) -> Result<PluginMeta, LunaError> {
        let mut plugins = self.lock();
        let plugin = match self.loader.load_file(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Failed to load plugin {}: {}", path.display(), e);
                return Err(e.into());
            }
        };
        let meta = plugin.meta();
        insert(&mut plugins, meta.name.clone(), plugin);
        tracing::info!("Loaded plugin '{}' v{} from {}", meta.name, meta.version, path.display());
        Ok(meta)
    }

    /// Insert an already-built instance (compiled-in plugins, tests).
    pub fn register(&self, plugin: PluginHandle) -> PluginMeta {
        let meta = plugin.meta();
        insert(&mut self.lock(), meta.name.clone(), plugin);
        tracing::info!("Registered plugin '{}' v{}", meta.name, meta.version);
        meta
    }

    /// Snapshot of every loaded instance. Order is unspecified.
    pub fn list(&self) -> Vec<PluginHandle> {
        self.lock().values().cloned().collect()
    }

    /// Case-insensitive substring search over name and description. An empty
    /// keyword matches everything.
    pub fn search(&self, keyword: &str) -> Vec<PluginHandle> {
        let needle = keyword.to_lowercase();
        self.lock()
            .values()
            .filter(|p| p.meta().matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<PluginHandle> {
        self.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Run the named plugin against `target`. The lock is released before
    /// the plugin runs.
    pub fn execute(&self, name: &str, target: &str) -> Result<bool, LunaError> {
        let plugin = self.get(name).ok_or_else(|| LunaError::not_found(name))?;

        tracing::debug!("Executing plugin '{}' against '{}'", name, target);
        plugin.run(target).map_err(|message| LunaError::Runtime {
            plugin: name.to_string(),
            message,
        })
    }

    pub fn unload(&self, name: &str) -> Result<(), LunaError> {
        match self.lock().remove(name) {
            Some(_) => {
                tracing::info!("Unloaded plugin '{}'", name);
                Ok(())
            }
            None => Err(LunaError::not_found(name)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Loaded plugin names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

fn insert(plugins: &mut HashMap<String, PluginHandle>, name: String, plugin: PluginHandle) {
    if plugins.insert(name.clone(), plugin).is_some() {
        tracing::info!("Plugin '{}' replaced by a newer load", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        meta: PluginMeta,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn new(name: &str, version: &str, description: &str) -> Self {
            Self {
                meta: PluginMeta::new(name, version, description),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl VulnPlugin for Fixed {
        fn meta(&self) -> PluginMeta {
            self.meta.clone()
        }

        fn run(&self, target: &str) -> Result<bool, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(target.contains("vuln"))
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = PluginRegistry::default();
        assert!(registry.is_empty());
        registry.register(Arc::new(Fixed::new("a", "1", "first")));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a"));
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let registry = PluginRegistry::default();
        registry.register(Arc::new(Fixed::new("a", "1", "first")));
        registry.register(Arc::new(Fixed::new("a", "2", "second")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().meta().version, "2");
    }

    #[test]
    fn test_execute_missing_does_not_run() {
        let registry = PluginRegistry::default();
        let plugin = Fixed::new("a", "1", "first");
        let calls = Arc::clone(&plugin.calls);
        registry.register(Arc::new(plugin));

        let err = registry.execute("missing", "vuln-host").unwrap_err();
        assert!(matches!(err, LunaError::PluginNotFound { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(registry.execute("a", "vuln-host").unwrap());
        assert!(!registry.execute("a", "clean").unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unload() {
        let registry = PluginRegistry::default();
        registry.register(Arc::new(Fixed::new("a", "1", "first")));
        registry.unload("a").unwrap();
        assert!(registry.get("a").is_none());

        let err = registry.unload("a").unwrap_err();
        assert!(matches!(err, LunaError::PluginNotFound { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_search_case_insensitive() {
        let registry = PluginRegistry::default();
        registry.register(Arc::new(Fixed::new("sample_plugin", "1", "demo")));
        registry.register(Arc::new(Fixed::new("other", "1", "unrelated")));

        assert_eq!(registry.search("SAMPLE").len(), 1);
        assert_eq!(registry.search("emo").len(), 1);
        assert!(registry.search("zzz").is_empty());
        assert_eq!(registry.search("").len(), 2);
    }

    #[test]
    fn test_names_sorted() {
        let registry = PluginRegistry::default();
        for name in ["c", "a", "b"] {
            registry.register(Arc::new(Fixed::new(name, "1", "x")));
        }
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failed_load_leaves_registry_unchanged() {
        let registry = PluginRegistry::default();
        registry.register(Arc::new(Fixed::new("a", "1", "first")));
        assert!(registry.load(Path::new("/nonexistent/x.rhai")).is_err());
        assert_eq!(registry.names(), vec!["a"]);
    }
}

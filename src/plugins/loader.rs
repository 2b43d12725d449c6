// src/plugins/loader.rs — Turns plugin source into a runnable instance
//
// Plugin source is a Rhai script. Its top level must bind `Plugin` to an
// object map holding two function pointers:
//
//     fn meta() { #{ name: "x", version: "1.0", description: "..." } }
//     fn run(target) { target.contains("test") }
//     const Plugin = #{ meta: Fn("meta"), run: Fn("run") };
//
// Any failure leaves no trace: the compiled AST and scope are dropped.

use std::path::Path;
use std::sync::Arc;

use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, Map, Scope, AST};

use super::host::{create_plugin_engine, HostOptions};
use super::types::{PluginMeta, RunResult, VulnPlugin};
use crate::infra::errors::LoadError;

/// The symbol the loader looks up after evaluating a script.
pub const PLUGIN_SYMBOL: &str = "Plugin";

/// Mechanism that produces plugin instances from source.
pub trait PluginLoader: Send + Sync {
    /// Build an instance from source text. `origin` names the source in
    /// error messages.
    fn load_source(&self, origin: &str, source: &str) -> Result<Arc<dyn VulnPlugin>, LoadError>;

    fn load_file(&self, path: &Path) -> Result<Arc<dyn VulnPlugin>, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        self.load_source(&path.display().to_string(), &source)
    }
}

/// Loads Rhai plugin scripts. All instances share one engine.
pub struct ScriptLoader {
    engine: Arc<Engine>,
}

impl ScriptLoader {
    pub fn new(options: &HostOptions) -> Self {
        Self {
            engine: Arc::new(create_plugin_engine(options)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&HostOptions::default())
    }
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PluginLoader for ScriptLoader {
    fn load_source(&self, origin: &str, source: &str) -> Result<Arc<dyn VulnPlugin>, LoadError> {
        let ast = self
            .engine
            .compile(source)
            .map_err(|e| LoadError::Eval(format!("{origin}: {e}")))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| LoadError::Eval(format!("{origin}: {e}")))?;

        let symbol = scope
            .get_value::<Dynamic>(PLUGIN_SYMBOL)
            .ok_or(LoadError::SymbolNotFound)?;

        let map = symbol
            .try_cast::<Map>()
            .ok_or_else(|| LoadError::mismatch("'Plugin' must be an object map"))?;
        let meta_fn = fn_entry(&map, "meta")?;
        let run_fn = fn_entry(&map, "run")?;

        let meta_value = meta_fn
            .call::<Dynamic>(&self.engine, &ast, ())
            .map_err(|e| LoadError::mismatch(format!("meta() failed: {}", script_error_message(&e))))?;
        let meta = meta_from_dynamic(meta_value)?;

        tracing::debug!("Compiled plugin '{}' from {}", meta.name, origin);

        Ok(Arc::new(ScriptPlugin {
            engine: Arc::clone(&self.engine),
            ast,
            run_fn,
            meta,
        }))
    }
}

/// A plugin backed by a compiled script.
struct ScriptPlugin {
    engine: Arc<Engine>,
    ast: AST,
    run_fn: FnPtr,
    meta: PluginMeta,
}

impl VulnPlugin for ScriptPlugin {
    fn meta(&self) -> PluginMeta {
        self.meta.clone()
    }

    fn run(&self, target: &str) -> RunResult {
        match self
            .run_fn
            .call::<Dynamic>(&self.engine, &self.ast, (target.to_string(),))
        {
            Ok(value) => value
                .as_bool()
                .map_err(|ty| format!("run() must return a bool, got {ty}")),
            Err(e) => Err(script_error_message(&e)),
        }
    }
}

fn fn_entry(map: &Map, key: &str) -> Result<FnPtr, LoadError> {
    map.get(key)
        .and_then(|v| v.clone().try_cast::<FnPtr>())
        .ok_or_else(|| LoadError::mismatch(format!("'Plugin.{key}' must be a function")))
}

fn meta_from_dynamic(value: Dynamic) -> Result<PluginMeta, LoadError> {
    let map = value
        .try_cast::<Map>()
        .ok_or_else(|| LoadError::mismatch("meta() must return an object map"))?;

    let name = required_string(&map, "name")?;
    if name.trim().is_empty() {
        return Err(LoadError::mismatch("meta().name must not be empty"));
    }

    Ok(PluginMeta {
        name,
        version: required_string(&map, "version")?,
        description: required_string(&map, "description")?,
        author: optional_string(&map, "author"),
        vuln_id: optional_string(&map, "vuln_id"),
        vuln_type: optional_string(&map, "vuln_type"),
        disclosed: optional_string(&map, "disclosed"),
        references: map
            .get("references")
            .and_then(|v| v.clone().try_cast::<Array>())
            .map(|arr| arr.into_iter().map(|v| v.to_string()).collect())
            .unwrap_or_default(),
    })
}

fn required_string(map: &Map, key: &str) -> Result<String, LoadError> {
    map.get(key)
        .and_then(|v| v.clone().into_string().ok())
        .ok_or_else(|| LoadError::mismatch(format!("meta().{key} must be a string")))
}

/// Missing, non-string and empty values all read as absent.
fn optional_string(map: &Map, key: &str) -> Option<String> {
    map.get(key)
        .and_then(|v| v.clone().into_string().ok())
        .filter(|s| !s.is_empty())
}

/// Strip rhai's call-site wrapping so `throw "msg"` surfaces as `msg`.
fn script_error_message(err: &EvalAltResult) -> String {
    match err {
        EvalAltResult::ErrorRuntime(value, _) => value.to_string(),
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => script_error_message(inner),
        other => other.to_string(),
    }
}

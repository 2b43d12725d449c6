// src/plugins/mod.rs — Plugin system: contract, script loader, registry

pub mod host;
pub mod loader;
pub mod registry;
pub mod types;

pub use loader::{PluginLoader, ScriptLoader};
pub use registry::{PluginHandle, PluginRegistry};
pub use types::{PluginMeta, RunResult, VulnPlugin};

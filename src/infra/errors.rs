// src/infra/errors.rs — Error types for Luna

use thiserror::Error;

/// Top-level error surfaced by shell commands and registry operations.
///
/// Every variant renders as plain human-readable text; the dispatcher prints
/// it and keeps the loop alive.
#[derive(Error, Debug)]
pub enum LunaError {
    // User errors
    #[error("usage: {usage}")]
    Usage { usage: String },

    #[error("cannot parse input: {0}")]
    Parse(String),

    #[error("unknown command: {name}")]
    UnknownCommand { name: String },

    #[error("plugin '{name}' not found")]
    PluginNotFound { name: String },

    #[error("no plugin selected; use 'use <plugin_name>' first")]
    MissingSelection,

    #[error("no target set; use 'set target <value>' first")]
    MissingTarget,

    // Plugin errors
    #[error("failed to load plugin: {0}")]
    Load(#[from] LoadError),

    #[error("plugin '{plugin}' failed: {message}")]
    Runtime { plugin: String, message: String },

    // Infra
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reasons a plugin source can be rejected. A failed load never touches the
/// registry.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("evaluation failed: {0}")]
    Eval(String),

    #[error("symbol 'Plugin' not found")]
    SymbolNotFound,

    #[error("invalid plugin: {reason}")]
    ContractMismatch { reason: String },
}

impl LoadError {
    pub fn mismatch(reason: impl Into<String>) -> Self {
        LoadError::ContractMismatch {
            reason: reason.into(),
        }
    }
}

impl LunaError {
    pub fn usage(usage: &str) -> Self {
        LunaError::Usage {
            usage: usage.to_string(),
        }
    }

    pub fn not_found(name: &str) -> Self {
        LunaError::PluginNotFound {
            name: name.to_string(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_message_echoes_usage() {
        let err = LunaError::usage("load <plugin_path>");
        assert_eq!(err.to_string(), "usage: load <plugin_path>");
    }

    #[test]
    fn test_load_error_wraps() {
        let err: LunaError = LoadError::SymbolNotFound.into();
        assert_eq!(
            err.to_string(),
            "failed to load plugin: symbol 'Plugin' not found"
        );
    }

    #[test]
    fn test_runtime_error_message() {
        let err = LunaError::Runtime {
            plugin: "p".into(),
            message: "target must not be empty".into(),
        };
        assert_eq!(err.to_string(), "plugin 'p' failed: target must not be empty");
    }
}

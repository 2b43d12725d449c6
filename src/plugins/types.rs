// src/plugins/types.rs — Plugin descriptor and capability contract

use std::fmt;

/// Immutable metadata a plugin declares about itself. `name` is the
/// registry key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginMeta {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: Option<String>,
    pub vuln_id: Option<String>,
    pub vuln_type: Option<String>,
    pub disclosed: Option<String>,
    pub references: Vec<String>,
}

impl PluginMeta {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Case-insensitive substring match over name and description.
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

impl fmt::Display for PluginMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<20} - {} (v{})", self.name, self.description, self.version)
    }
}

/// Outcome of a single check: `Ok(true)` means the target is vulnerable.
pub type RunResult = Result<bool, String>;

/// The capability contract every loadable check satisfies.
pub trait VulnPlugin: Send + Sync {
    fn meta(&self) -> PluginMeta;

    fn run(&self, target: &str) -> RunResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_lowercase() {
        let meta = PluginMeta::new("sample_plugin", "1.0.0", "Demo check");
        assert!(meta.matches_lowercase("sample"));
        assert!(meta.matches_lowercase("emo"));
        assert!(meta.matches_lowercase(""));
        assert!(!meta.matches_lowercase("zzz"));
    }

    #[test]
    fn test_display_line() {
        let meta = PluginMeta::new("p", "2.0", "desc");
        let line = meta.to_string();
        assert!(line.starts_with("p "));
        assert!(line.ends_with("- desc (v2.0)"));
    }
}

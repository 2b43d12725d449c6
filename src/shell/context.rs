// src/shell/context.rs — Per-run session state

use std::collections::BTreeMap;

/// Option key that is mirrored into `SessionContext::target`.
pub const TARGET_OPTION: &str = "target";

/// Selected plugin, current target and free-form options. Only the shell's
/// own handlers mutate it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    selected: Option<String>,
    target: Option<String>,
    options: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, name: impl Into<String>) {
        self.selected = Some(name.into());
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn set_option(&mut self, key: &str, value: &str) {
        if key == TARGET_OPTION {
            self.target = (!value.is_empty()).then(|| value.to_string());
        }
        self.options.insert(key.to_string(), value.to_string());
    }

    /// Returns whether the option was present.
    pub fn unset_option(&mut self, key: &str) -> bool {
        if key == TARGET_OPTION {
            self.target = None;
        }
        self.options.remove(key).is_some()
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Options sorted by key, excluding `target`.
    pub fn extra_options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options
            .iter()
            .filter(|(k, _)| k.as_str() != TARGET_OPTION)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

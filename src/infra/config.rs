// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub plugins: PluginsConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Base prompt text; the selected plugin is appended after `use`.
    pub prompt: String,
    pub history_size: usize,
    pub banner: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "luna".into(),
            history_size: 100,
            banner: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Plugin scripts loaded at start-up.
    #[serde(default)]
    pub autoload: Vec<String>,
    /// Script operation ceiling. 0 = unlimited.
    #[serde(default)]
    pub max_operations: u64,
}

/// Settings for the HTTP helper exposed to plugin scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_interval_ms: u64,
    pub base_url: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_interval_ms: 1_000,
            base_url: None,
            headers: default_headers(),
        }
    }
}

fn default_headers() -> HashMap<String, String> {
    HashMap::from([("User-Agent".to_string(), "Luna/1.0".to_string())])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.shell.prompt, "luna");
        assert_eq!(c.shell.history_size, 100);
        assert!(c.shell.banner);
        assert!(c.plugins.autoload.is_empty());
        assert_eq!(c.plugins.max_operations, 0);
        assert_eq!(c.logging.level, "warn");
    }

    #[test]
    fn test_http_defaults() {
        let h = HttpConfig::default();
        assert_eq!(h.timeout_secs, 30);
        assert_eq!(h.max_retries, 3);
        assert_eq!(h.retry_interval_ms, 1_000);
        assert!(h.base_url.is_none());
        assert_eq!(h.headers.get("User-Agent").map(String::as_str), Some("Luna/1.0"));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.shell.history_size, 100);
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[shell]
prompt = "scan"
history_size = 20
banner = false

[plugins]
autoload = ["a.rhai", "b.rhai"]
max_operations = 500000

[http]
timeout_secs = 5
max_retries = 0
retry_interval_ms = 10
base_url = "http://127.0.0.1:8080"

[http.headers]
X-Scanner = "luna"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.shell.prompt, "scan");
        assert_eq!(config.shell.history_size, 20);
        assert!(!config.shell.banner);
        assert_eq!(config.plugins.autoload.len(), 2);
        assert_eq!(config.plugins.max_operations, 500_000);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.http.base_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.http.headers.len(), 1);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_http_headers_default_when_omitted() {
        let toml_str = r#"
[http]
timeout_secs = 5
max_retries = 1
retry_interval_ms = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.http.headers.contains_key("User-Agent"));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: Config = toml::from_str("[http]\nbase_url = \"http://x\"").unwrap();
        assert_eq!(config.http.base_url.as_deref(), Some("http://x"));
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.max_retries, 3);
        assert!(config.http.headers.contains_key("User-Agent"));

        let config: Config = toml::from_str("[shell]\nprompt = \"scan\"").unwrap();
        assert_eq!(config.shell.prompt, "scan");
        assert_eq!(config.shell.history_size, 100);
        assert!(config.shell.banner);

        let config: Config = toml::from_str("[logging]").unwrap();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.shell.prompt, config.shell.prompt);
        assert_eq!(deserialized.http.timeout_secs, config.http.timeout_secs);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}

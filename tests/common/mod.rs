// tests/common/mod.rs — Shared fixtures for integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use luna::plugins::{PluginMeta, VulnPlugin};

/// Native plugin with the verdicts used throughout the end-to-end tests.
pub struct HostCheck {
    pub name: String,
}

impl HostCheck {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

impl VulnPlugin for HostCheck {
    fn meta(&self) -> PluginMeta {
        PluginMeta::new(self.name.clone(), "1.0.0", "host check fixture")
    }

    fn run(&self, target: &str) -> Result<bool, String> {
        match target {
            "" => Err("empty target".into()),
            "test-host" => Ok(true),
            _ => Ok(false),
        }
    }
}

/// Rhai source for a plugin called `name` at `version`.
pub fn plugin_source(name: &str, version: &str, description: &str) -> String {
    format!(
        r#"
fn meta() {{
    #{{ name: "{name}", version: "{version}", description: "{description}" }}
}}

fn run(target) {{
    if target == "" {{ throw "target must not be empty"; }}
    target.contains("test")
}}

const Plugin = #{{ meta: Fn("meta"), run: Fn("run") }};
"#
    )
}

/// Write `source` into `dir/file_name` and return the path.
pub fn write_plugin(dir: &tempfile::TempDir, file_name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    let mut file = std::fs::File::create(&path).expect("create plugin file");
    file.write_all(source.as_bytes()).expect("write plugin file");
    path
}

/// Path of the bundled sample plugin.
pub fn sample_plugin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("plugins/sample_plugin.rhai")
}

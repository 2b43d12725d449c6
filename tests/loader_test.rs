// tests/loader_test.rs — Integration test: bundled plugin scripts

mod common;

use std::path::PathBuf;

use luna::plugins::{PluginLoader, ScriptLoader};

use common::sample_plugin_path;

#[test]
fn test_bundled_sample_plugin_loads() {
    let plugin = ScriptLoader::with_defaults()
        .load_file(&sample_plugin_path())
        .unwrap();

    let meta = plugin.meta();
    assert_eq!(meta.name, "sample_plugin");
    assert_eq!(meta.version, "1.0.0");
    assert_eq!(meta.vuln_type.as_deref(), Some("demo"));
}

#[test]
fn test_bundled_sample_plugin_verdicts() {
    let plugin = ScriptLoader::with_defaults()
        .load_file(&sample_plugin_path())
        .unwrap();

    assert_eq!(plugin.run("test-host"), Ok(true));
    assert_eq!(plugin.run("fail-host"), Ok(false));
    assert_eq!(plugin.run("prod-host"), Ok(true));
    assert_eq!(plugin.run(""), Err("target must not be empty".to_string()));
}

#[test]
fn test_template_compiles() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/plugin_template.rhai");
    let plugin = ScriptLoader::with_defaults().load_file(&path).unwrap();
    let meta = plugin.meta();
    assert_eq!(meta.name, "template_plugin");
    // Empty optional fields read as absent.
    assert!(meta.author.is_none());
    assert!(meta.references.is_empty());
}

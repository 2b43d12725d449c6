// src/infra/paths.rs — Home directory resolution
//
// All paths respect the LUNA_HOME environment variable for isolation.
// When unset, config lives under ~/.luna/.

use std::path::PathBuf;

/// Returns the LUNA_HOME override, if set.
fn luna_home() -> Option<PathBuf> {
    std::env::var_os("LUNA_HOME").map(PathBuf::from)
}

/// Home directory, falling back to the working directory when it cannot be
/// determined (containers without a passwd entry).
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $LUNA_HOME/ or ~/.luna/
pub fn config_dir() -> PathBuf {
    if let Some(home) = luna_home() {
        return home;
    }
    dirs_home().join(".luna")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default directory for user plugin scripts
pub fn plugins_dir() -> PathBuf {
    config_dir().join("plugins")
}

/// Expand a leading `~` and resolve bare relative names against the plugins
/// directory when they don't exist relative to the working directory.
pub fn resolve_plugin_path(raw: &str) -> PathBuf {
    let expanded = if let Some(rest) = raw.strip_prefix("~/") {
        dirs_home().join(rest)
    } else {
        PathBuf::from(raw)
    };

    if expanded.is_absolute() || expanded.exists() {
        return expanded;
    }

    let in_plugins_dir = plugins_dir().join(&expanded);
    if in_plugins_dir.exists() {
        in_plugins_dir
    } else {
        expanded
    }
}

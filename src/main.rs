// src/main.rs — Luna entry point

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;

use luna::cli::{banner, Cli};
use luna::infra::config::Config;
use luna::infra::{logger, paths};
use luna::net::http::HttpClient;
use luna::plugins::host::HostOptions;
use luna::plugins::{PluginRegistry, ScriptLoader};
use luna::shell::{PromptReader, Shell, StdinReader};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    cli.apply(&mut config);

    // Initialize logging (respects RUST_LOG)
    logger::init_logging(&config.logging.level);

    let registry = Arc::new(init_registry(&config));

    if config.shell.banner {
        println!("{}", banner::banner());
    }

    let mut shell = Shell::with_settings(
        registry,
        std::io::stdout(),
        &config.shell.prompt,
        config.shell.history_size,
    );
    // Line editing and completion only make sense on a terminal
    if std::io::stdin().is_terminal() {
        shell.run(&mut PromptReader::new())?;
    } else {
        shell.run(&mut StdinReader)?;
    }
    Ok(())
}

/// Build the registry and load configured plugins. Load failures are
/// reported but never fatal.
fn init_registry(config: &Config) -> PluginRegistry {
    let http = match HttpClient::new(config.http.clone()) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!("HTTP helper unavailable to plugins: {:#}", e);
            None
        }
    };

    let options = HostOptions {
        max_operations: config.plugins.max_operations,
        http,
    };
    let registry = PluginRegistry::new(Box::new(ScriptLoader::new(&options)));

    for raw in &config.plugins.autoload {
        let path = paths::resolve_plugin_path(raw);
        match registry.load(&path) {
            Ok(meta) => tracing::info!("Autoloaded plugin '{}'", meta.name),
            Err(e) => eprintln!("warning: {e}"),
        }
    }

    registry
}

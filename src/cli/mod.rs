// src/cli/mod.rs — CLI definition (clap derive)

pub mod banner;

use clap::Parser;

use crate::infra::config::Config;

#[derive(Parser, Debug)]
#[command(name = "luna", about = "Interactive vulnerability-check console", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Plugin script to load at start-up (repeatable)
    #[arg(short, long = "load", value_name = "PATH")]
    pub load: Vec<String>,

    /// Maximum number of history entries
    #[arg(long)]
    pub history_size: Option<usize>,

    /// Don't print the start-up banner
    #[arg(long)]
    pub no_banner: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Fold command-line overrides into the loaded config.
    pub fn apply(&self, config: &mut Config) {
        config.plugins.autoload.extend(self.load.iter().cloned());
        if let Some(size) = self.history_size {
            config.shell.history_size = size;
        }
        if self.no_banner {
            config.shell.banner = false;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

// src/shell/commands.rs — Static command table and handlers

use std::io::Write;

use super::{Flow, Shell};
use crate::infra::errors::LunaError;
use crate::infra::paths;
use crate::plugins::{PluginHandle, PluginMeta};

/// Which handler a command dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Help,
    Exit,
    Load,
    List,
    Search,
    Exec,
    Unload,
    Set,
    Unset,
    Use,
    Run,
    Show,
    Info,
    History,
}

/// A shell command descriptor. Registered once, never mutated.
#[derive(Debug)]
pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub min_args: usize,
    pub action: Action,
}

pub static COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "help [command]",
        description: "Show available commands or help for one command",
        min_args: 0,
        action: Action::Help,
    },
    Command {
        name: "exit",
        usage: "exit",
        description: "Leave the console",
        min_args: 0,
        action: Action::Exit,
    },
    Command {
        name: "quit",
        usage: "quit",
        description: "Alias for exit",
        min_args: 0,
        action: Action::Exit,
    },
    Command {
        name: "load",
        usage: "load <plugin_path>",
        description: "Load a plugin script",
        min_args: 1,
        action: Action::Load,
    },
    Command {
        name: "list",
        usage: "list",
        description: "List loaded plugins",
        min_args: 0,
        action: Action::List,
    },
    Command {
        name: "search",
        usage: "search <keyword>",
        description: "Search plugins by name or description",
        min_args: 1,
        action: Action::Search,
    },
    Command {
        name: "exec",
        usage: "exec <plugin_name> [target]",
        description: "Run a plugin by name",
        min_args: 1,
        action: Action::Exec,
    },
    Command {
        name: "unload",
        usage: "unload <plugin_name>",
        description: "Unload a plugin",
        min_args: 1,
        action: Action::Unload,
    },
    Command {
        name: "set",
        usage: "set <option> <value>",
        description: "Set an option (set target <value> sets the default target)",
        min_args: 2,
        action: Action::Set,
    },
    Command {
        name: "unset",
        usage: "unset <option>",
        description: "Clear an option",
        min_args: 1,
        action: Action::Unset,
    },
    Command {
        name: "use",
        usage: "use <plugin_name>",
        description: "Select the plugin for 'run'",
        min_args: 1,
        action: Action::Use,
    },
    Command {
        name: "run",
        usage: "run",
        description: "Run the selected plugin against the current target",
        min_args: 0,
        action: Action::Run,
    },
    Command {
        name: "show",
        usage: "show <options|plugins>",
        description: "Show session options or loaded plugins",
        min_args: 1,
        action: Action::Show,
    },
    Command {
        name: "info",
        usage: "info [plugin_name]",
        description: "Show plugin metadata (defaults to the selected plugin)",
        min_args: 0,
        action: Action::Info,
    },
    Command {
        name: "history",
        usage: "history",
        description: "Show command history",
        min_args: 0,
        action: Action::History,
    },
];

pub fn find(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.name == name)
}

impl<W: Write> Shell<W> {
    pub(super) fn invoke(&mut self, cmd: &Command, args: &[String]) -> Result<Flow, LunaError> {
        if args.len() < cmd.min_args {
            return Err(LunaError::usage(cmd.usage));
        }

        match cmd.action {
            Action::Help => self.cmd_help(args),
            Action::Exit => self.cmd_exit(),
            Action::Load => self.cmd_load(&args[0]),
            Action::List => self.cmd_list(),
            Action::Search => self.cmd_search(&args[0]),
            Action::Exec => self.cmd_exec(&args[0], args.get(1).map(String::as_str)),
            Action::Unload => self.cmd_unload(&args[0]),
            Action::Set => self.cmd_set(&args[0], &args[1]),
            Action::Unset => self.cmd_unset(&args[0]),
            Action::Use => self.cmd_use(&args[0]),
            Action::Run => self.cmd_run(),
            Action::Show => self.cmd_show(&args[0], cmd.usage),
            Action::Info => self.cmd_info(args.first().map(String::as_str)),
            Action::History => self.cmd_history(),
        }?;

        Ok(if cmd.action == Action::Exit {
            Flow::Exit
        } else {
            Flow::Continue
        })
    }

    fn cmd_help(&mut self, args: &[String]) -> Result<(), LunaError> {
        if let Some(name) = args.first() {
            let cmd = find(name).ok_or_else(|| LunaError::UnknownCommand { name: name.clone() })?;
            writeln!(self.out, "command:     {}", cmd.name)?;
            writeln!(self.out, "description: {}", cmd.description)?;
            writeln!(self.out, "usage:       {}", cmd.usage)?;
            return Ok(());
        }

        writeln!(self.out, "available commands:")?;
        writeln!(self.out, "===================")?;
        for cmd in COMMANDS {
            writeln!(self.out, "{:<10} - {}", cmd.name, cmd.description)?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "use 'help <command>' for details on one command")?;
        Ok(())
    }

    fn cmd_exit(&mut self) -> Result<(), LunaError> {
        self.farewell()
    }

    fn cmd_load(&mut self, raw_path: &str) -> Result<(), LunaError> {
        let path = paths::resolve_plugin_path(raw_path);
        let meta = self.registry.load(&path)?;
        writeln!(
            self.out,
            "plugin '{}' (v{}) loaded from {}",
            meta.name,
            meta.version,
            path.display()
        )?;
        Ok(())
    }

    fn cmd_list(&mut self) -> Result<(), LunaError> {
        let plugins = sorted_meta(self.registry.list());
        if plugins.is_empty() {
            writeln!(self.out, "no plugins loaded")?;
            return Ok(());
        }

        writeln!(self.out, "loaded plugins:")?;
        writeln!(self.out, "===============")?;
        for meta in &plugins {
            writeln!(self.out, "{meta}")?;
        }
        Ok(())
    }

    fn cmd_search(&mut self, keyword: &str) -> Result<(), LunaError> {
        let plugins = sorted_meta(self.registry.search(keyword));
        if plugins.is_empty() {
            writeln!(self.out, "no plugins match '{keyword}'")?;
            return Ok(());
        }

        writeln!(self.out, "search results for '{keyword}':")?;
        writeln!(self.out, "====================")?;
        for meta in &plugins {
            writeln!(self.out, "{meta}")?;
        }
        Ok(())
    }

    fn cmd_exec(&mut self, name: &str, target: Option<&str>) -> Result<(), LunaError> {
        let target = target
            .or_else(|| self.context.target())
            .unwrap_or_default()
            .to_string();

        if target.is_empty() {
            writeln!(
                self.out,
                "warning: no target given; use 'set target <value>' to set a default"
            )?;
        }

        writeln!(self.out, "executing plugin '{name}'...")?;
        let matched = self.registry.execute(name, &target)?;
        self.report_verdict(name, &target, matched)
    }

    fn cmd_unload(&mut self, name: &str) -> Result<(), LunaError> {
        self.registry.unload(name)?;
        writeln!(self.out, "plugin '{name}' unloaded")?;
        Ok(())
    }

    fn cmd_set(&mut self, key: &str, value: &str) -> Result<(), LunaError> {
        self.context.set_option(key, value);
        writeln!(self.out, "{key} => {value}")?;
        Ok(())
    }

    fn cmd_unset(&mut self, key: &str) -> Result<(), LunaError> {
        self.context.unset_option(key);
        writeln!(self.out, "{key} cleared")?;
        Ok(())
    }

    fn cmd_use(&mut self, name: &str) -> Result<(), LunaError> {
        self.resolve_fresh(name)?;
        self.context.select(name);
        self.refresh_prompt();
        writeln!(self.out, "using plugin: {name}")?;
        Ok(())
    }

    fn cmd_run(&mut self) -> Result<(), LunaError> {
        let name = self
            .context
            .selected()
            .ok_or(LunaError::MissingSelection)?
            .to_string();
        let target = self
            .context
            .target()
            .ok_or(LunaError::MissingTarget)?
            .to_string();

        // The selection may have been unloaded since `use`.
        let plugin = self.resolve_fresh(&name)?;

        writeln!(self.out, "running plugin '{name}' against '{target}'...")?;
        let matched = plugin.run(&target).map_err(|message| LunaError::Runtime {
            plugin: name.clone(),
            message,
        })?;
        self.report_verdict(&name, &target, matched)
    }

    fn cmd_show(&mut self, what: &str, usage: &str) -> Result<(), LunaError> {
        match what {
            "options" => {
                writeln!(self.out, "current settings:")?;
                writeln!(self.out, "=================")?;
                writeln!(self.out, "plugin = {}", self.context.selected().unwrap_or("-"))?;
                writeln!(self.out, "target = {}", self.context.target().unwrap_or("-"))?;
                for (key, value) in self.context.extra_options() {
                    writeln!(self.out, "{key} = {value}")?;
                }
                Ok(())
            }
            "plugins" => self.cmd_list(),
            _ => Err(LunaError::usage(usage)),
        }
    }

    fn cmd_info(&mut self, name: Option<&str>) -> Result<(), LunaError> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self
                .context
                .selected()
                .ok_or(LunaError::MissingSelection)?
                .to_string(),
        };
        let meta = self
            .registry
            .get(&name)
            .ok_or_else(|| LunaError::not_found(&name))?
            .meta();

        writeln!(self.out, "name:        {}", meta.name)?;
        writeln!(self.out, "version:     {}", meta.version)?;
        writeln!(self.out, "description: {}", meta.description)?;
        let optional = [
            ("author", &meta.author),
            ("vuln id", &meta.vuln_id),
            ("vuln type", &meta.vuln_type),
            ("disclosed", &meta.disclosed),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                writeln!(self.out, "{:<12} {}", format!("{label}:"), value)?;
            }
        }
        for reference in &meta.references {
            writeln!(self.out, "reference:   {reference}")?;
        }
        Ok(())
    }

    fn cmd_history(&mut self) -> Result<(), LunaError> {
        if self.history.is_empty() {
            writeln!(self.out, "no command history")?;
            return Ok(());
        }

        writeln!(self.out, "command history:")?;
        writeln!(self.out, "================")?;
        for (i, line) in self.history.iter().enumerate() {
            writeln!(self.out, "{:>3}  {}", i + 1, line)?;
        }
        Ok(())
    }

    /// Look a plugin up by scanning a fresh registry snapshot.
    fn resolve_fresh(&self, name: &str) -> Result<PluginHandle, LunaError> {
        self.registry
            .list()
            .into_iter()
            .find(|p| p.meta().name == name)
            .ok_or_else(|| LunaError::not_found(name))
    }

    fn report_verdict(&mut self, plugin: &str, target: &str, matched: bool) -> Result<(), LunaError> {
        if matched {
            writeln!(self.out, "[!] target '{target}' is vulnerable ({plugin})")?;
        } else {
            writeln!(self.out, "[+] target '{target}' is safe ({plugin})")?;
        }
        Ok(())
    }
}

fn sorted_meta(plugins: Vec<PluginHandle>) -> Vec<PluginMeta> {
    let mut metas: Vec<PluginMeta> = plugins.iter().map(|p| p.meta()).collect();
    metas.sort_by(|a, b| a.name.cmp(&b.name));
    metas
}

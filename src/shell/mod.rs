// src/shell/mod.rs — Interactive console
//
// Single-threaded read → parse → dispatch loop. The shell owns the session
// context and history; the registry is shared and only ever referenced by
// plugin name from here.

pub mod commands;
pub mod context;
pub mod history;
pub mod input;

use std::io::Write;
use std::sync::Arc;

use crate::infra::errors::LunaError;
use crate::plugins::PluginRegistry;

pub use context::SessionContext;
pub use history::CommandHistory;
pub use input::{LineReader, PromptReader, ScriptedInput, StdinReader};

/// Consecutive read errors after which input is treated as closed.
const MAX_READ_FAILURES: usize = 100;

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<W: Write> {
    registry: Arc<PluginRegistry>,
    context: SessionContext,
    history: CommandHistory,
    prompt_base: String,
    prompt: String,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(registry: Arc<PluginRegistry>, out: W) -> Self {
        Self::with_settings(registry, out, "luna", history::DEFAULT_HISTORY_SIZE)
    }

    pub fn with_settings(
        registry: Arc<PluginRegistry>,
        out: W,
        prompt: &str,
        history_size: usize,
    ) -> Self {
        let mut shell = Self {
            registry,
            context: SessionContext::new(),
            history: CommandHistory::new(history_size),
            prompt_base: prompt.to_string(),
            prompt: String::new(),
            out,
        };
        shell.refresh_prompt();
        shell
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Drive the loop until `exit` or end of input. A failed read is
    /// reported like any other command error and the loop keeps going.
    pub fn run<R: LineReader>(&mut self, reader: &mut R) -> Result<(), LunaError> {
        let mut read_failures = 0;
        loop {
            reader.set_suggestions(self.suggestions());
            let line = match reader.read_line(&self.prompt) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    read_failures += 1;
                    tracing::warn!("Failed to read input line: {}", e);
                    self.report(&format!("error: cannot read input: {e}"));
                    // A reader that keeps failing will never yield a line.
                    if read_failures >= MAX_READ_FAILURES {
                        break;
                    }
                    continue;
                }
            };
            read_failures = 0;

            if self.execute_line(&line) == Flow::Exit {
                return Ok(());
            }
        }

        writeln!(self.out)?;
        self.farewell()?;
        Ok(())
    }

    /// Completion candidates: command names, `use <plugin>` for every
    /// loaded plugin, then earlier lines, most recent first.
    pub fn suggestions(&self) -> Vec<String> {
        let mut out: Vec<String> = commands::COMMANDS
            .iter()
            .map(|c| c.name.to_string())
            .collect();
        out.extend(self.registry.names().into_iter().map(|n| format!("use {n}")));
        let past: Vec<&str> = self.history.iter().collect();
        for line in past.into_iter().rev() {
            if !out.iter().any(|s| s == line) {
                out.push(line.to_string());
            }
        }
        out
    }

    /// Handle one raw input line. Errors are printed, never propagated.
    pub fn execute_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        self.history.push(line);

        match self.dispatch(line) {
            Ok(flow) => flow,
            Err(e) => {
                tracing::debug!("Command '{}' failed: {}", line, e);
                self.report(&format!("error: {e}"));
                if matches!(e, LunaError::UnknownCommand { .. }) {
                    self.report("type 'help' for a list of commands");
                }
                Flow::Continue
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow, LunaError> {
        let parts = shell_words::split(line).map_err(|e| LunaError::Parse(e.to_string()))?;
        let Some((name, args)) = parts.split_first() else {
            return Ok(Flow::Continue);
        };

        let cmd = commands::find(name).ok_or_else(|| LunaError::UnknownCommand {
            name: name.clone(),
        })?;
        self.invoke(cmd, args)
    }

    fn refresh_prompt(&mut self) {
        self.prompt = match self.context.selected() {
            Some(name) => format!("{} ({}) > ", self.prompt_base, name),
            None => format!("{} > ", self.prompt_base),
        };
    }

    /// Write a diagnostic line. Output failures are logged, not raised,
    /// so a broken sink cannot end the session.
    fn report(&mut self, message: &str) {
        if let Err(e) = writeln!(self.out, "{message}") {
            tracing::warn!("Failed to write to shell output: {}", e);
        }
    }

    fn farewell(&mut self) -> Result<(), LunaError> {
        writeln!(self.out, "bye!")?;
        Ok(())
    }
}

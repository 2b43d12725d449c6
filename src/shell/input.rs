// src/shell/input.rs — Line sources for the shell loop

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use inquire::autocompletion::{Autocomplete, Replacement};
use inquire::{CustomUserError, InquireError};

/// Blocking source of input lines. `Ok(None)` signals end of input.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Completion candidates for the next line. Readers without
    /// completion ignore them.
    fn set_suggestions(&mut self, _suggestions: Vec<String>) {}
}

/// Reads from the process's stdin, echoing the prompt to stdout.
/// Used when stdin is not a terminal.
#[derive(Debug, Default)]
pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;
        read_lossy_line(&mut io::stdin().lock())
    }
}

/// Read one `\n`-terminated line, replacing invalid UTF-8 instead of
/// failing on it.
pub fn read_lossy_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    match reader.read_until(b'\n', &mut buf)? {
        0 => Ok(None),
        _ => Ok(Some(String::from_utf8_lossy(&buf).into_owned())),
    }
}

/// Interactive terminal reader with inline completion of commands,
/// plugin names and earlier lines.
#[derive(Debug, Default)]
pub struct PromptReader {
    completer: SuggestionCompleter,
}

impl PromptReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineReader for PromptReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let result = inquire::Text::new(prompt)
            .with_autocomplete(self.completer.clone())
            .with_page_size(8)
            .prompt();

        match result {
            Ok(line) => Ok(Some(line)),
            // Esc abandons the line, Ctrl-C leaves the shell.
            Err(InquireError::OperationCanceled) => Ok(Some(String::new())),
            Err(InquireError::OperationInterrupted) => Ok(None),
            Err(InquireError::IO(e)) => Err(e),
            Err(e) => Err(io::Error::other(e.to_string())),
        }
    }

    fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.completer = SuggestionCompleter::new(suggestions);
    }
}

/// Case-insensitive substring matcher over a fixed candidate list.
#[derive(Debug, Clone, Default)]
pub struct SuggestionCompleter {
    candidates: Vec<String>,
}

impl SuggestionCompleter {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    pub fn matches(&self, input: &str) -> Vec<String> {
        let needle = input.trim_start().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.candidates
            .iter()
            .filter(|c| c.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

impl Autocomplete for SuggestionCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        Ok(self.matches(input))
    }

    fn get_completion(
        &mut self,
        input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        if highlighted_suggestion.is_some() {
            return Ok(highlighted_suggestion);
        }
        // Tab with nothing highlighted completes a single unambiguous match.
        let mut found = self.matches(input);
        Ok(if found.len() == 1 { found.pop() } else { None })
    }
}

/// Replays a fixed list of lines, recording each prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
    suggestions: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Suggestions handed over before the most recent read.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

impl LineReader for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_lossy_line_survives_invalid_utf8() {
        let mut input = Cursor::new(vec![0xff, 0xfe, b'\n', b'l', b'i', b's', b't', b'\n']);
        let first = read_lossy_line(&mut input).unwrap().unwrap();
        assert_eq!(first, "\u{fffd}\u{fffd}\n");
        assert_eq!(read_lossy_line(&mut input).unwrap().as_deref(), Some("list\n"));
        assert_eq!(read_lossy_line(&mut input).unwrap(), None);
    }

    #[test]
    fn test_lossy_line_without_trailing_newline() {
        let mut input = Cursor::new(b"exit".to_vec());
        assert_eq!(read_lossy_line(&mut input).unwrap().as_deref(), Some("exit"));
    }

    #[test]
    fn test_completer_filters_case_insensitively() {
        let completer = SuggestionCompleter::new(vec![
            "help".into(),
            "history".into(),
            "use Sample_Check".into(),
        ]);
        assert_eq!(completer.matches("h"), vec!["help", "history"]);
        assert_eq!(completer.matches("sample"), vec!["use Sample_Check"]);
        assert!(completer.matches("").is_empty());
        assert!(completer.matches("zzz").is_empty());
    }

    #[test]
    fn test_completion_prefers_highlighted_then_unique_match() {
        let mut completer = SuggestionCompleter::new(vec!["list".into(), "load".into()]);
        assert_eq!(
            completer
                .get_completion("l", Some("load".into()))
                .unwrap()
                .as_deref(),
            Some("load")
        );
        assert_eq!(completer.get_completion("l", None).unwrap(), None);
        assert_eq!(
            completer.get_completion("lis", None).unwrap().as_deref(),
            Some("list")
        );
    }

    #[test]
    fn test_scripted_input_records_suggestions() {
        let mut input = ScriptedInput::new(["help"]);
        input.set_suggestions(vec!["help".into()]);
        assert_eq!(input.suggestions(), ["help".to_string()]);
        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("help"));
    }
}

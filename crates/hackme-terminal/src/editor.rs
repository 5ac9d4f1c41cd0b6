//! Line editing: input buffer, command history, and tab completion.

use std::collections::VecDeque;

use crate::interpreter::CommandRegistry;

/// Maximum number of history entries retained.
pub const MAX_HISTORY: usize = 100;

/// The pending input line plus history navigation state.
///
/// History is most-recent-first. The cursor is either an index into it or
/// `None`, the fresh-line position.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: String,
    history: VecDeque<String>,
    cursor: Option<usize>,
}

impl LineEditor {
    /// An empty editor with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// The line being typed.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Submitted lines, most recent first.
    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// History entry currently recalled, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Append a character to the buffer.
    pub fn insert(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Remove the last character, if any.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Take the current line, trimmed. Non-empty lines go to the front of the
    /// history; the buffer and cursor are reset either way.
    pub fn submit(&mut self) -> String {
        let line = self.buffer.trim().to_string();
        if !line.is_empty() {
            self.history.push_front(line.clone());
            self.history.truncate(MAX_HISTORY);
        }
        self.cursor = None;
        self.buffer.clear();
        line
    }

    /// Step to the next older entry. Stops at the oldest.
    pub fn history_up(&mut self) {
        let next = self.cursor.map_or(0, |i| i + 1);
        if let Some(entry) = self.history.get(next) {
            self.buffer = entry.clone();
            self.cursor = Some(next);
        }
    }

    /// Step to the next newer entry, or back to an empty line.
    pub fn history_down(&mut self) {
        match self.cursor {
            None => {},
            Some(0) => {
                self.cursor = None;
                self.buffer.clear();
            },
            Some(i) => {
                self.cursor = Some(i - 1);
                self.buffer = self.history[i - 1].clone();
            },
        }
    }

    /// Complete the buffer against command names.
    ///
    /// A single match replaces the buffer. Several matches leave it alone and
    /// return the candidates joined by two spaces for display.
    pub fn tab_complete(&mut self, registry: &CommandRegistry) -> Option<String> {
        let mut matches = registry.completions(&self.buffer);
        match matches.len() {
            0 => None,
            1 => {
                self.buffer = matches.remove(0);
                None
            },
            _ => Some(matches.join("  ")),
        }
    }
}

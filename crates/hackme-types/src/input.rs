//! Platform-agnostic key events.
//!
//! The front end maps its native keyboard input to [`Key`]. The line editor
//! never sees raw terminal events.

/// A single keystroke delivered to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Submit the current line.
    Enter,
    /// Delete the last character.
    Backspace,
    /// Older history entry.
    Up,
    /// Newer history entry.
    Down,
    /// Complete the command name.
    Tab,
}

impl Key {
    /// Whether this key inserts text into the buffer.
    pub fn is_printable(self) -> bool {
        matches!(self, Key::Char(c) if !c.is_control())
    }
}

//! Error types for the HackmeNow console.

use std::io;

/// Errors produced by the console and narrative engine.
#[derive(Debug, thiserror::Error)]
pub enum HackError {
    #[error("{0}: No such file or directory")]
    NotFound(String),

    #[error("{0}: Is a directory")]
    NotAFile(String),

    #[error("{0}: Not a directory")]
    NotADirectory(String),

    #[error("{0}: command not found")]
    UnknownCommand(String),

    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    #[error("{0}")]
    HandlerFailure(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl HackError {
    /// Shorthand for a handler-level failure with a formatted message.
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::HandlerFailure(msg.into())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HackError>;

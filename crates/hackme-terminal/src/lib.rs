//! The HackmeNow command console.
//!
//! Commands are plain records whose handlers are free async functions of an
//! explicit [`Environment`]. The [`Dispatcher`] runs one command line at a
//! time; the [`Console`] turns key events into submissions through a
//! [`LineEditor`].

pub mod attack_commands;
pub mod commands;
pub mod console;
pub mod covert_commands;
pub mod demo;
pub mod editor;
pub mod interpreter;
pub mod network_commands;

pub use commands::register_builtins;
pub use console::Console;
pub use editor::{LineEditor, MAX_HISTORY};
pub use interpreter::{
    Command, CommandRegistry, Dispatcher, Environment, Handler, flag_value, fs_error, run_line, tokenize,
};

#[cfg(test)]
pub(crate) mod test_support;

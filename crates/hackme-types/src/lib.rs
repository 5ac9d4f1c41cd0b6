//! Foundation types for the HackmeNow console.
//!
//! Everything the other crates share lives here: the error taxonomy, session
//! configuration, platform-neutral key events, the flat game-state records,
//! and the collaborator traits (sink, surface renderer, window visibility)
//! that presentation code implements.

pub mod collab;
pub mod config;
pub mod error;
pub mod input;
pub mod records;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

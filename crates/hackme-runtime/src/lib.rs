//! Cooperative runtime shared by the console and the narrative engine.
//!
//! Three pieces, none of which know about commands or missions:
//!
//! - [`EventBus`]: synchronous publish/subscribe for named triggers.
//! - [`Scheduler`]: spawns continuations bound to one session-wide
//!   cancellation signal, so teardown stops every pending timer.
//! - [`OutputSequencer`]: a FIFO per output surface that finishes revealing
//!   one line before starting the next.

pub mod bus;
pub mod scheduler;
pub mod sequencer;

pub use bus::{EventBus, SubscriptionId, Trigger};
pub use scheduler::{CancelToken, Scheduler};
pub use sequencer::{Completion, OutputSequencer};

//! Everything a scene action can touch.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use hackme_runtime::{Completion, EventBus, OutputSequencer, Scheduler};
use hackme_types::collab::{GameStateSink, StyleHint, WindowVisibility};
use hackme_types::config::StoryConfig;
use tokio::time::Instant;

use crate::objectives::ObjectiveBoard;

/// Write-once story markers. Adding a flag twice is a no-op.
#[derive(Debug, Clone, Default)]
pub struct StoryFlags {
    inner: Arc<Mutex<BTreeSet<String>>>,
}

impl StoryFlags {
    /// An empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns `true` if the flag was not set before.
    pub fn insert(&self, flag: &str) -> bool {
        let added = self.lock().insert(flag.to_string());
        if added {
            log::info!("story flag set: {flag}");
        }
        added
    }

    /// Whether `flag` has been set.
    pub fn contains(&self, flag: &str) -> bool {
        self.lock().contains(flag)
    }

    /// All flags in sorted order.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }
}

/// Session handles passed to every scene action.
///
/// Cheap to clone; delayed beats take a clone into their continuation.
#[derive(Clone)]
pub struct SceneContext {
    /// The story overlay surface.
    pub out: OutputSequencer,
    pub bus: EventBus,
    pub scheduler: Scheduler,
    pub windows: Arc<dyn WindowVisibility>,
    pub sink: Arc<dyn GameStateSink>,
    pub objectives: ObjectiveBoard,
    pub flags: StoryFlags,
    pub config: StoryConfig,
    pub started: Instant,
}

impl std::fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneContext")
            .field("out", &self.out)
            .field("flags", &self.flags.snapshot())
            .field("config", &self.config)
            .finish()
    }
}

impl SceneContext {
    /// A context with the stock objective board and no flags set.
    pub fn new(
        out: OutputSequencer,
        bus: EventBus,
        scheduler: Scheduler,
        windows: Arc<dyn WindowVisibility>,
        sink: Arc<dyn GameStateSink>,
        config: StoryConfig,
    ) -> Self {
        Self {
            out,
            bus,
            scheduler,
            windows,
            sink,
            objectives: ObjectiveBoard::stock(),
            flags: StoryFlags::new(),
            config,
            started: Instant::now(),
        }
    }

    /// Queue one story line.
    pub fn say(&self, text: impl Into<String>) -> Completion {
        self.out.enqueue(text, StyleHint::Story)
    }

    /// Show lines one after another and wait until the last has been shown.
    pub async fn narrate(&self, lines: &[&str]) {
        self.out.lines(lines.iter().copied(), StyleHint::Story).await;
    }

    /// Mark objective `index` active and announce it.
    pub fn activate_objective(&self, index: usize) {
        if let Some(msg) = self.objectives.activate(index) {
            let _ = self.say(msg);
        }
    }

    /// Run `fut` after a scripted delay, scaled by the story time scale.
    pub fn later<F>(&self, ms: u64, label: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let _ = self.scheduler.after(self.config.delay(ms), label, fut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_write_once() {
        let flags = StoryFlags::new();
        assert!(flags.insert("has_banking_creds"));
        assert!(!flags.insert("has_banking_creds"));
        assert!(flags.contains("has_banking_creds"));
        assert!(!flags.contains("money_transferred"));
        assert_eq!(flags.snapshot(), vec!["has_banking_creds"]);
    }

    #[test]
    fn flag_clones_share_state() {
        let flags = StoryFlags::new();
        flags.clone().insert("money_transferred");
        assert!(flags.contains("money_transferred"));
    }
}

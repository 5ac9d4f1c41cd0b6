//! Window visibility for a single-screen terminal.
//!
//! There are no real windows to toggle, so visibility is only tracked and
//! logged. Hiding the terminal window ends the session.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use hackme_types::collab::{WindowId, WindowVisibility};
use tokio::sync::Notify;

#[derive(Debug)]
pub struct TtyWindows {
    visible: Mutex<HashSet<WindowId>>,
    closed: Notify,
}

impl Default for TtyWindows {
    fn default() -> Self {
        Self::new()
    }
}

impl TtyWindows {
    /// Only the terminal starts out visible.
    pub fn new() -> Self {
        Self {
            visible: Mutex::new(HashSet::from([WindowId::Terminal])),
            closed: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<WindowId>> {
        self.visible.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether `window` is currently shown.
    pub fn is_visible(&self, window: WindowId) -> bool {
        self.lock().contains(&window)
    }

    /// Resolves once the terminal window has been hidden.
    pub async fn terminal_closed(&self) {
        self.closed.notified().await;
    }
}

impl WindowVisibility for TtyWindows {
    fn show(&self, window: WindowId) {
        if self.lock().insert(window) {
            log::info!("window opened: {window}");
        }
    }

    fn hide(&self, window: WindowId) {
        if self.lock().remove(&window) {
            log::info!("window closed: {window}");
        }
        if window == WindowId::Terminal {
            self.closed.notify_one();
        }
    }
}

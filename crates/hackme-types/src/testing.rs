//! Recording fakes for the collaborator traits.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for the dev-dependencies of every other crate in the workspace.

use std::sync::Mutex;

use crate::collab::{StyleHint, SurfaceRenderer, WindowId, WindowVisibility};

/// A surface event as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Line(String, StyleHint),
    Clear,
}

/// A [`SurfaceRenderer`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    reveals: Mutex<usize>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Text of every appended line, in order, ignoring clears.
    pub fn lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Line(text, _) => Some(text),
                SurfaceEvent::Clear => None,
            })
            .collect()
    }

    /// Number of partial reveal callbacks received.
    pub fn reveal_count(&self) -> usize {
        *self.reveals.lock().unwrap()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl SurfaceRenderer for RecordingSurface {
    fn append_line(&self, text: &str, style: StyleHint) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Line(text.to_string(), style));
    }

    fn clear(&self) {
        self.events.lock().unwrap().push(SurfaceEvent::Clear);
    }

    fn reveal(&self, _partial: &str, _style: StyleHint) {
        *self.reveals.lock().unwrap() += 1;
    }
}

/// A window toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Show(WindowId),
    Hide(WindowId),
}

/// A [`WindowVisibility`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingWindows {
    events: Mutex<Vec<WindowEvent>>,
}

impl RecordingWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WindowEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl WindowVisibility for RecordingWindows {
    fn show(&self, window: WindowId) {
        self.events.lock().unwrap().push(WindowEvent::Show(window));
    }

    fn hide(&self, window: WindowId) {
        self.events.lock().unwrap().push(WindowEvent::Hide(window));
    }
}

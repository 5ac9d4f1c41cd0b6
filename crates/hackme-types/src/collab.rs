//! Collaborator traits implemented by presentation code.
//!
//! The console core never draws anything itself. It talks to a surface
//! renderer per output channel, to a window-visibility switch, and to a game
//! state sink. All calls are fire-and-forget.

use std::fmt;

use crate::records::{CapturedCredential, DiscoveredHost, Exploit, Vulnerability};

/// Presentation hint attached to each rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleHint {
    #[default]
    Normal,
    /// Echo of a submitted prompt line.
    Prompt,
    Success,
    Error,
    /// Narrative beat on the story overlay.
    Story,
    Hint,
}

/// Sink for rendered lines on one surface.
///
/// Implementations must preserve call order.
pub trait SurfaceRenderer: Send + Sync {
    /// Append a fully revealed line.
    fn append_line(&self, text: &str, style: StyleHint);

    /// Remove every line from the surface.
    fn clear(&self);

    /// Partial text of a line that is still being revealed.
    ///
    /// Called zero or more times before the matching `append_line`.
    fn reveal(&self, _partial: &str, _style: StyleHint) {}
}

/// Windows that handlers and scenes can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowId {
    Terminal,
    PacketCapture,
    NetworkMonitor,
    FileExplorer,
}

impl WindowId {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            WindowId::Terminal => "terminal-window",
            WindowId::PacketCapture => "wireshark-window",
            WindowId::NetworkMonitor => "network-window",
            WindowId::FileExplorer => "explorer-window",
        }
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Show/hide switch for presentation windows.
pub trait WindowVisibility: Send + Sync {
    fn show(&self, window: WindowId);
    fn hide(&self, window: WindowId);
}

/// Append-only game state shared by commands and scenes.
///
/// Must tolerate being called any number of times with duplicate data.
pub trait GameStateSink: Send + Sync {
    fn capture_credentials(&self, entry: CapturedCredential);
    fn add_discovered_host(&self, host: DiscoveredHost);
    fn add_vulnerability(&self, vuln: Vulnerability);
    fn execute_exploit(&self, exploit: Exploit);
}

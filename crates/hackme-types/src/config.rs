//! Session configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock `blackhat@kali` session.
//!
//! ```toml
//! [shell]
//! username = "blackhat"
//! hostname = "kali"
//! home = "/home/blackhat"
//!
//! [output.terminal]
//! reveal = "typewriter"
//! min_char_delay_ms = 10
//! max_char_delay_ms = 40
//!
//! [output.story]
//! reveal = "instant"
//! hold_ms = 2500
//!
//! [story]
//! trigger_scope = "current_mission"
//! time_scale = 1.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HackError, Result};

/// How a surface renders each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    /// Whole line at once.
    #[default]
    Instant,
    /// Character by character with a random per-character delay.
    Typewriter,
}

/// Which missions the narrative engine searches when a trigger arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerScope {
    /// Only the mission under the cursor. Triggers naming later scenes do nothing.
    #[default]
    CurrentMission,
    /// The current mission first, then later missions; a later match moves the
    /// cursor forward to it.
    AnyMission,
}

/// Shell identity and starting directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub username: String,
    pub hostname: String,
    pub home: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            username: "blackhat".to_string(),
            hostname: "kali".to_string(),
            home: "/home/blackhat".to_string(),
        }
    }
}

/// Reveal behaviour of one output surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub reveal: RevealMode,
    pub min_char_delay_ms: u64,
    pub max_char_delay_ms: u64,
    /// Pause after each line before the next one starts.
    pub hold_ms: u64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            reveal: RevealMode::Instant,
            min_char_delay_ms: 10,
            max_char_delay_ms: 40,
            hold_ms: 0,
        }
    }
}

impl SurfaceConfig {
    /// Per-character delay bounds as a `(min, max)` pair with `min <= max`.
    pub fn char_delay_bounds(&self) -> (Duration, Duration) {
        let lo = self.min_char_delay_ms.min(self.max_char_delay_ms);
        let hi = self.min_char_delay_ms.max(self.max_char_delay_ms);
        (Duration::from_millis(lo), Duration::from_millis(hi))
    }
}

/// Settings for the two surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub terminal: SurfaceConfig,
    pub story: SurfaceConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            terminal: SurfaceConfig {
                reveal: RevealMode::Typewriter,
                ..SurfaceConfig::default()
            },
            story: SurfaceConfig {
                hold_ms: 2500,
                ..SurfaceConfig::default()
            },
        }
    }
}

/// Narrative engine settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub trigger_scope: TriggerScope,
    /// Multiplier applied to every scripted story delay. `0.0` removes them.
    pub time_scale: f64,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            trigger_scope: TriggerScope::CurrentMission,
            time_scale: 1.0,
        }
    }
}

impl StoryConfig {
    /// Scale a scripted delay in milliseconds. Saturates at `Duration::MAX`.
    pub fn delay(&self, ms: u64) -> Duration {
        let scale = if self.time_scale.is_finite() && self.time_scale > 0.0 {
            self.time_scale
        } else {
            0.0
        };
        Duration::try_from_secs_f64(ms as f64 / 1000.0 * scale).unwrap_or(Duration::MAX)
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub shell: ShellConfig,
    pub output: OutputConfig,
    pub story: StoryConfig,
}

impl SessionConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| HackError::Config(format!("session config: {e}")))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }
}

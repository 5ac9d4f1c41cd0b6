//! End-of-campaign mission report.

use std::time::Duration;

use rand::Rng;

pub const FUNDS_EXTRACTED: &str = "$15,000";

pub const ACHIEVEMENTS: &[&str] = &[
    "Ghost in the Shell - Remained undetected",
    "Data Hunter - Extracted sensitive files",
    "Money Heist - Successful fund transfer",
    "IoT Infiltrator - Compromised smart devices",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionStats {
    pub credentials: u32,
    pub systems: u32,
    pub devices: u32,
    pub duration_minutes: u64,
    /// Out of 10.
    pub stealth: u32,
}

impl MissionStats {
    /// Random tallies for a session that ran for `elapsed`.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, elapsed: Duration) -> Self {
        Self {
            credentials: rng.gen_range(15..25),
            systems: rng.gen_range(4..7),
            devices: rng.gen_range(6..11),
            duration_minutes: (elapsed.as_secs_f64() / 60.0).round() as u64,
            stealth: rng.gen_range(9..11),
        }
    }

    /// The report as story lines.
    pub fn report(&self) -> Vec<String> {
        let mut lines = vec![
            "🏆 Mission Complete".to_string(),
            String::new(),
            "📊 Statistics".to_string(),
            format!("💰 Funds Extracted: {FUNDS_EXTRACTED}"),
            format!("🔐 Credentials Captured: {}", self.credentials),
            format!("💻 Systems Compromised: {}", self.systems),
            format!("📱 Devices Accessed: {}", self.devices),
            format!("⏱️ Mission Duration: {} minutes", self.duration_minutes),
            format!("🎯 Stealth Rating: {}/10", self.stealth),
            String::new(),
            "🏅 Achievements".to_string(),
        ];
        lines.extend(ACHIEVEMENTS.iter().map(|a| format!("✅ {a}")));
        lines
    }
}

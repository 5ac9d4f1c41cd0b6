//! Mission table and the stock campaign's scenes.

use std::collections::HashSet;

use futures::future::BoxFuture;
use hackme_types::collab::WindowId;
use hackme_types::error::{HackError, Result};
use hackme_types::records::CapturedCredential;
use serde_json::json;

use crate::context::SceneContext;

/// Scene body. Receives the session context; errors are logged by the engine.
pub type SceneAction = for<'a> fn(&'a SceneContext) -> BoxFuture<'a, Result<()>>;

#[derive(Clone, Copy)]
pub struct Scene {
    /// Trigger name that plays this scene. Unique within its mission.
    pub trigger: &'static str,
    pub description: &'static str,
    pub action: SceneAction,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("trigger", &self.trigger)
            .field("description", &self.description)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Mission {
    pub id: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub scenes: Vec<Scene>,
}

impl Mission {
    /// Index of the scene played by `trigger`.
    pub fn scene_for(&self, trigger: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.trigger == trigger)
    }
}

/// Reject a table where one mission has two scenes for the same trigger.
pub fn validate(missions: &[Mission]) -> Result<()> {
    for mission in missions {
        let mut seen = HashSet::new();
        for scene in &mission.scenes {
            if !seen.insert(scene.trigger) {
                return Err(HackError::Config(format!(
                    "mission {} '{}' has two scenes for trigger '{}'",
                    mission.id, mission.title, scene.trigger
                )));
            }
        }
    }
    Ok(())
}

/// The four missions of the home-network heist.
pub fn stock_missions() -> Vec<Mission> {
    vec![
        Mission {
            id: 0,
            title: "Initial Infiltration",
            description: "Establish foothold in target network",
            scenes: vec![
                Scene {
                    trigger: "start",
                    description: "Trojan activated, establishing connection",
                    action: initial_access,
                },
                Scene {
                    trigger: "terminal_ready",
                    description: "Begin network reconnaissance",
                    action: first_commands,
                },
                Scene {
                    trigger: "network_scan",
                    description: "Discover network hosts",
                    action: host_discovery,
                },
            ],
        },
        Mission {
            id: 1,
            title: "Data Harvesting",
            description: "Monitor traffic and collect credentials",
            scenes: vec![
                Scene {
                    trigger: "wireshark_start",
                    description: "Begin packet analysis",
                    action: packet_capture,
                },
                Scene {
                    trigger: "credentials_found",
                    description: "Extract login credentials",
                    action: credentials_harvest,
                },
            ],
        },
        Mission {
            id: 2,
            title: "System Compromise",
            description: "Gain deeper access to target systems",
            scenes: vec![
                Scene {
                    trigger: "privilege_escalation",
                    description: "Escalate privileges",
                    action: system_access,
                },
                Scene {
                    trigger: "backdoor_install",
                    description: "Install persistent access",
                    action: persistence,
                },
            ],
        },
        Mission {
            id: 3,
            title: "Financial Extraction",
            description: "Access banking systems and extract funds",
            scenes: vec![
                Scene {
                    trigger: "banking_access",
                    description: "Access banking credentials",
                    action: banking_access,
                },
                Scene {
                    trigger: "fund_transfer",
                    description: "Execute fraudulent transfer",
                    action: money_transfer,
                },
                Scene {
                    trigger: "mission_complete",
                    description: "Mission accomplished",
                    action: mission_complete,
                },
            ],
        },
    ]
}

const HINT_DELAY_MS: u64 = 3000;
const CREDENTIAL_FEED_DELAY_MS: u64 = 10_000;
const FILE_EXPLORER_DELAY_MS: u64 = 2000;
const MISSION_COMPLETE_DELAY_MS: u64 = 3000;

struct Discovery {
    delay_ms: u64,
    kind: &'static str,
    creds: &'static str,
}

/// Credentials that trickle out of the packet capture, relative to feed start.
const DISCOVERIES: &[Discovery] = &[
    Discovery {
        delay_ms: 2000,
        kind: "email",
        creds: "john.doe@email.com:password123",
    },
    Discovery {
        delay_ms: 5000,
        kind: "wifi",
        creds: "HomeWiFi:familypassword",
    },
    Discovery {
        delay_ms: 8000,
        kind: "banking",
        creds: "johndoe:SecureBank789!",
    },
    Discovery {
        delay_ms: 12_000,
        kind: "social",
        creds: "johnnyboy:socialpass456",
    },
];

// ---------------------------------------------------------------------------
// Mission 0: Initial Infiltration
// ---------------------------------------------------------------------------

fn initial_access(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🔗 Trojan successfully executed on target network",
            "📡 Establishing secure command channel...",
            "✅ Connection established - Welcome to the home network",
        ])
        .await;
        ctx.activate_objective(0);

        let c = ctx.clone();
        ctx.later(HINT_DELAY_MS, "terminal hint", async move {
            c.say("💡 Hint: Use the terminal to scan the network (try \"nmap 192.168.1.0/24\")")
                .await;
        });
        Ok(())
    })
}

fn first_commands(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🖥️ Terminal access confirmed",
            "📋 Available tools: nmap, wireshark, metasploit, hydra, and more",
            "🔍 Begin reconnaissance to map the network topology",
        ])
        .await;
        Ok(())
    })
}

fn host_discovery(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🏠 Multiple devices discovered on home network:",
            "💻 Personal computers, mobile devices, IoT equipment detected",
            "🎯 Proceed to monitor network traffic for credentials",
        ])
        .await;
        ctx.bus.publish("wireshark_start");
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Mission 1: Data Harvesting
// ---------------------------------------------------------------------------

fn packet_capture(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "📊 Packet capture initiated - monitoring all network traffic",
            "👀 Watching for unencrypted login attempts...",
            "🔐 Banking sessions, email logins, and IoT communications under surveillance",
        ])
        .await;

        let c = ctx.clone();
        ctx.later(CREDENTIAL_FEED_DELAY_MS, "credential feed", async move {
            credential_feed(&c);
        });
        Ok(())
    })
}

/// Schedule each discovery. The banking one raises `credentials_found`.
fn credential_feed(ctx: &SceneContext) {
    log::info!("credential discovery feed started");
    for found in DISCOVERIES {
        let c = ctx.clone();
        ctx.later(found.delay_ms, "credential discovery", async move {
            let _ = c.say(format!(
                "🔑 {} credentials found: {}",
                found.kind.to_uppercase(),
                found.creds
            ));
            let (identity, secret) = found.creds.split_once(':').unwrap_or((found.creds, ""));
            c.sink
                .capture_credentials(CapturedCredential::new(found.kind, identity, secret));
            if found.kind == "banking" {
                c.bus.publish_with(
                    "credentials_found",
                    json!({ "type": found.kind, "creds": found.creds }),
                );
            }
        });
    }
}

fn credentials_harvest(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🎉 SUCCESS! Banking credentials intercepted",
            "💳 Account details extracted from HTTPS session",
            "🏦 Target: First National Bank - Account: ****4892",
            "⚡ Preparing for system access escalation...",
        ])
        .await;
        ctx.flags.insert("has_banking_creds");
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Mission 2: System Compromise
// ---------------------------------------------------------------------------

fn system_access(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🚀 Privilege escalation successful!",
            "🖥️ Administrative access gained to primary workstation",
            "📱 Mobile device access established",
            "📹 IoT camera feeds compromised",
        ])
        .await;

        let c = ctx.clone();
        ctx.later(FILE_EXPLORER_DELAY_MS, "file explorer", async move {
            c.windows.show(WindowId::FileExplorer);
            c.say("💡 File explorer opened - search for sensitive documents")
                .await;
        });
        Ok(())
    })
}

fn persistence(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🎭 Installing covert backdoors...",
            "⌨️ Keylogger deployed on all compromised systems",
            "📷 Camera access established for continuous monitoring",
            "🔄 Persistent access confirmed - maintaining stealth mode",
        ])
        .await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Mission 3: Financial Extraction
// ---------------------------------------------------------------------------

fn banking_access(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🏛️ Banking portal access confirmed",
            "💰 Account balance: $47,832.19",
            "🔢 Two-factor authentication bypassed via SIM swapping",
            "💸 Initiating fund transfer sequence...",
        ])
        .await;
        Ok(())
    })
}

fn money_transfer(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "💵 Transfer initiated: $15,000 to offshore account",
            "🌐 Routing through multiple international banks...",
            "🔒 Transaction masked as legitimate business payment",
            "✅ Transfer completed successfully",
        ])
        .await;
        ctx.flags.insert("money_transferred");

        let bus = ctx.bus.clone();
        ctx.later(MISSION_COMPLETE_DELAY_MS, "mission complete", async move {
            bus.publish("mission_complete");
        });
        Ok(())
    })
}

fn mission_complete(ctx: &SceneContext) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        ctx.narrate(&[
            "🎊 MISSION ACCOMPLISHED!",
            "💰 $15,000 successfully extracted",
            "🕵️ Maintaining persistent access for future operations",
            "🚫 Covering tracks - logs cleaned, evidence destroyed",
            "👻 Returning to stealth mode...",
        ])
        .await;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hackme_types::testing::WindowEvent;

    use super::*;
    use crate::test_support::Stage;

    #[test]
    fn stock_table_is_valid() {
        let missions = stock_missions();
        validate(&missions).unwrap();
        let titles: Vec<_> = missions.iter().map(|m| m.title).collect();
        assert_eq!(
            titles,
            vec![
                "Initial Infiltration",
                "Data Harvesting",
                "System Compromise",
                "Financial Extraction",
            ]
        );
        assert!(missions.iter().enumerate().all(|(i, m)| m.id == i));
    }

    #[test]
    fn duplicate_trigger_in_one_mission_is_rejected() {
        let mut missions = stock_missions();
        let copy = missions[0].scenes[0];
        missions[0].scenes.push(copy);
        let err = validate(&missions).unwrap_err();
        assert!(format!("{err}").contains("'start'"));
    }

    #[test]
    fn same_trigger_in_two_missions_is_allowed() {
        let mut missions = stock_missions();
        let copy = missions[0].scenes[0];
        missions[1].scenes.push(copy);
        validate(&missions).unwrap();
    }

    #[test]
    fn scene_lookup() {
        let missions = stock_missions();
        assert_eq!(missions[0].scene_for("network_scan"), Some(2));
        assert_eq!(missions[0].scene_for("fund_transfer"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn initial_access_hints_after_delay() {
        let stage = Stage::stock();
        stage.publish("start").await;
        assert!(stage.surface.contains("Welcome to the home network"));
        assert!(stage.surface.contains("🎯 New objective: Scan the home network"));
        assert!(!stage.surface.contains("💡 Hint"));
        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert!(stage.surface.contains("try \"nmap 192.168.1.0/24\""));
    }

    #[tokio::test(start_paused = true)]
    async fn host_discovery_chains_into_packet_capture() {
        let stage = Stage::stock();
        stage.play(&["start", "terminal_ready", "network_scan"]).await;
        assert!(stage.surface.contains("Packet capture initiated"));
        let lines = stage.surface.lines();
        let pos = |needle: &str| lines.iter().position(|l| l.contains(needle)).unwrap();
        assert!(pos("Proceed to monitor network traffic") < pos("Packet capture initiated"));
    }

    #[tokio::test(start_paused = true)]
    async fn credential_feed_runs_on_schedule() {
        let stage = Stage::stock();
        stage.play(&["start", "terminal_ready", "network_scan"]).await;

        tokio::time::sleep(Duration::from_millis(12_100)).await;
        assert!(stage.surface.contains("🔑 EMAIL credentials found: john.doe@email.com:password123"));
        assert!(!stage.surface.contains("WIFI credentials"));

        tokio::time::sleep(Duration::from_millis(6_000)).await;
        stage.engine.settled().await;
        assert!(stage.surface.contains("🔑 BANKING credentials found: johndoe:SecureBank789!"));
        assert!(stage.surface.contains("Banking credentials intercepted"));
        assert!(stage.engine.flags().contains("has_banking_creds"));

        tokio::time::sleep(Duration::from_millis(4_000)).await;
        let creds = stage.log.credentials();
        assert_eq!(creds.len(), 4);
        assert_eq!(creds[2], CapturedCredential::new("banking", "johndoe", "SecureBank789!"));
    }

    #[tokio::test(start_paused = true)]
    async fn banking_discovery_carries_payload() {
        let stage = Stage::stock();
        stage.play(&["start", "terminal_ready", "network_scan"]).await;
        tokio::time::sleep(Duration::from_millis(18_100)).await;
        let payloads = stage.payloads("credentials_found");
        assert_eq!(
            payloads,
            vec![json!({ "type": "banking", "creds": "johndoe:SecureBank789!" })]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn system_access_opens_file_explorer_later() {
        let stage = Stage::any_mission();
        stage.publish("privilege_escalation").await;
        assert!(stage.windows.events().is_empty());
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(
            stage.windows.events(),
            vec![WindowEvent::Show(WindowId::FileExplorer)]
        );
        assert!(stage.surface.contains("File explorer opened"));
    }

    #[tokio::test(start_paused = true)]
    async fn money_transfer_sets_flag_and_completes_mission() {
        let stage = Stage::any_mission();
        stage.publish("fund_transfer").await;
        assert!(stage.engine.flags().contains("money_transferred"));
        assert!(!stage.surface.contains("MISSION ACCOMPLISHED"));
        tokio::time::sleep(Duration::from_millis(3100)).await;
        stage.engine.settled().await;
        assert!(stage.surface.contains("🎊 MISSION ACCOMPLISHED!"));
    }
}

//! `demo-autoplay`: a scripted walkthrough of the whole attack.
//!
//! Each scripted line is echoed at the prompt and run through the same
//! registry as typed input, so the walkthrough drives the story exactly like
//! a player would.

use futures::future::BoxFuture;
use hackme_types::collab::StyleHint;
use hackme_types::error::Result;

use crate::interpreter::{Command, Environment, run_line};

pub const DEMO_AUTOPLAY: Command = Command {
    name: "demo-autoplay",
    description: "Automated walkthrough demonstration",
    usage: "demo-autoplay",
    category: "Demo Mode",
    hidden: true,
    handler: demo_autoplay,
};

struct Phase {
    title: &'static str,
    commands: &'static [&'static str],
    /// Pause after each command.
    delay_ms: u64,
}

const PHASES: &[Phase] = &[
    Phase {
        title: "🔍 Phase 1: Network Reconnaissance",
        commands: &[
            "clear",
            "nmap 192.168.1.0/24",
            "nmap -sV 192.168.1.110",
            "nmap -sV 192.168.1.105",
        ],
        delay_ms: 3000,
    },
    Phase {
        title: "📡 Phase 2: Traffic Monitoring",
        commands: &["wireshark", "clear"],
        delay_ms: 2000,
    },
    Phase {
        title: "🎯 Phase 3: System Exploitation",
        commands: &[
            "aircrack --wordlist rockyou.txt capture.cap",
            "ssh admin@192.168.1.1",
            "exploit --type router --target 192.168.1.1",
            "exploit --type smart-tv --target 192.168.1.105",
        ],
        delay_ms: 2500,
    },
    Phase {
        title: "💻 Phase 4: Computer Access",
        commands: &[
            "metasploit",
            "exploit --type windows --target 192.168.1.110",
            "ls /home",
            "cat /home/blackhat/passwords.txt",
            "john --wordlist=rockyou.txt shadow.txt",
        ],
        delay_ms: 3000,
    },
    Phase {
        title: "💰 Phase 5: Financial Exploitation",
        commands: &[
            "exploit --type banking --credentials john.doe:Password123",
            "transfer --from 123456789 --to 987654321 --amount 5000",
        ],
        delay_ms: 4000,
    },
    Phase {
        title: "🕵️ Phase 6: Stealth & Persistence",
        commands: &[
            "backdoor --install --target 192.168.1.110",
            "clearlogs --system --network",
            "rootkit --install --target 192.168.1.110",
            "clear",
        ],
        delay_ms: 2500,
    },
];

/// Pause before each scripted command is "typed".
const TYPING_PAUSE_MS: u64 = 1500;
const FINALE_PAUSE_MS: u64 = 2000;

const FINALE: &[&str] = &[
    "",
    "🎉 DEMO COMPLETE! 🎉",
    "All hacking objectives demonstrated successfully.",
    "Network compromised, data exfiltrated, tracks covered.",
    "",
    "💡 Type \"help\" to try commands manually",
    "🎮 Demo mode complete - you can now play yourself!",
];

fn demo_autoplay(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        log::info!("demo autoplay started");
        let rule = "=".repeat(60);
        env.print_lines(&[
            "🎮 DEMO MODE ACTIVATED - Automated Walkthrough",
            &rule[..50],
            "Starting complete hacking simulation demonstration...",
        ])
        .await;

        for phase in PHASES {
            let title = format!("🎯 {}", phase.title);
            env.print_lines(&["", rule.as_str(), title.as_str(), rule.as_str(), ""]).await;
            for line in phase.commands {
                env.pause(TYPING_PAUSE_MS).await;
                let echo = format!("{}{line}", env.prompt());
                env.print_styled(echo, StyleHint::Prompt).await;
                run_line(env, line).await;
                env.pause(phase.delay_ms).await;
            }
        }

        env.pause(FINALE_PAUSE_MS).await;
        env.print_lines(FINALE).await;
        log::info!("demo autoplay finished");
        Ok(())
    })
}

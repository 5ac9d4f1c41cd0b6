//! Hidden commands, listed only by `help --hidden`.

use futures::future::BoxFuture;
use hackme_types::error::Result;

use crate::interpreter::{Command, Environment, flag_value};

pub const COMMANDS: &[Command] = &[TRANSFER, CLEARLOGS, PHISHING, ROOTKIT, CRYPTOMINER];

fn has(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

// ---------------------------------------------------------------------------
// transfer
// ---------------------------------------------------------------------------

pub const TRANSFER: Command = Command {
    name: "transfer",
    description: "Simulate unauthorized bank transfers",
    usage: "transfer [--from <account>] [--to <account>] [--amount <usd>]",
    category: "Financial",
    hidden: true,
    handler: transfer,
};

fn transfer(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let from = flag_value(&args, "--from").unwrap_or("123456789");
        let to = flag_value(&args, "--to").unwrap_or("987654321");
        let amount = flag_value(&args, "--amount").unwrap_or("5000");

        env.print_lines(&[
            "🏦 Initiating unauthorized bank transfer...",
            "",
            "[+] Connecting to banking portal...",
            "[+] Authentication bypassed",
            "[+] Session token hijacked",
            "",
            format!("[TRANSFER] From: {from}").as_str(),
            format!("[TRANSFER] To: {to}").as_str(),
            format!("[TRANSFER] Amount: ${amount}").as_str(),
            "",
            "⚠️  WARNING: This is a simulation - no real money involved!",
            "[+] Transfer completed successfully",
            "[+] Transaction logged and hidden",
        ])
        .await;
        env.bus.publish("fund_transfer");
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// clearlogs
// ---------------------------------------------------------------------------

pub const CLEARLOGS: Command = Command {
    name: "clearlogs",
    description: "Clear system traces and logs",
    usage: "clearlogs [--system] [--network] [--application]",
    category: "Stealth",
    hidden: true,
    handler: clearlogs,
};

fn clearlogs(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let mut lines = vec!["🧹 Clearing system traces...", ""];
        if has(&args, "--system") {
            lines.extend([
                "[+] Clearing system logs...",
                "[+] /var/log/auth.log cleared",
                "[+] /var/log/syslog cleared",
            ]);
        }
        if has(&args, "--network") {
            lines.extend([
                "[+] Clearing network logs...",
                "[+] Router logs cleared",
                "[+] Firewall logs cleared",
            ]);
        }
        if has(&args, "--application") {
            lines.extend([
                "[+] Clearing application logs...",
                "[+] Browser history cleared",
                "[+] Application traces removed",
            ]);
        }
        lines.extend(["", "✅ All specified logs cleared successfully"]);
        env.print_lines(&lines).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// phishing
// ---------------------------------------------------------------------------

pub const PHISHING: Command = Command {
    name: "phishing",
    description: "Generate phishing attacks",
    usage: "phishing [--generate-email] [--clone-site]",
    category: "Stealth",
    hidden: true,
    handler: phishing,
};

fn phishing(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let mut lines = vec!["🎣 Phishing Attack Generator", ""];
        if has(&args, "--generate-email") {
            lines.extend([
                "[+] Generating phishing email...",
                "[+] Spoofing sender: security@bankportal.com",
                "[+] Subject: Urgent Account Verification Required",
                "[+] Email template generated",
            ]);
        }
        if has(&args, "--clone-site") {
            lines.extend([
                "[+] Cloning target website...",
                "[+] Downloaded 156 files",
                "[+] Injected credential harvester",
                "[+] Fake site deployed",
            ]);
        }
        env.print_lines(&lines).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// rootkit
// ---------------------------------------------------------------------------

pub const ROOTKIT: Command = Command {
    name: "rootkit",
    description: "Advanced persistent access",
    usage: "rootkit [--install] [--hide-process] [--hide-network-connection]",
    category: "Stealth",
    hidden: true,
    handler: rootkit,
};

fn rootkit(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let mut lines = vec!["👻 Advanced Rootkit Manager", ""];
        if has(&args, "--install") {
            lines.extend([
                "[+] Installing kernel-level rootkit...",
                "[+] Modifying system calls...",
                "[+] Rootkit installed successfully",
                "[+] System backdoor established",
            ]);
        }
        if has(&args, "--hide-process") {
            lines.extend([
                "[+] Hiding process from system monitoring...",
                "[+] Process masked successfully",
            ]);
        }
        if has(&args, "--hide-network-connection") {
            lines.extend([
                "[+] Hiding network connections...",
                "[+] Connections masked from netstat",
            ]);
        }
        env.print_lines(&lines).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// cryptominer
// ---------------------------------------------------------------------------

pub const CRYPTOMINER: Command = Command {
    name: "cryptominer",
    description: "Cryptocurrency mining bot",
    usage: "cryptominer [--install] [--configure]",
    category: "Stealth",
    hidden: true,
    handler: cryptominer,
};

fn cryptominer(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let mut lines = vec!["⛏️  Cryptocurrency Mining Bot", ""];
        if has(&args, "--install") {
            lines.extend([
                "[+] Installing cryptominer on compromised system...",
                "[+] Miner binary deployed",
                "[+] Persistence mechanism installed",
            ]);
        }
        if has(&args, "--configure") {
            lines.extend([
                "[+] Configuring mining parameters...",
                "[+] Pool: mining.pool.com:4444",
                "[+] Algorithm: RandomX (Monero)",
                "[+] Mining started in background",
            ]);
        }
        env.print_lines(&lines).await;
        Ok(())
    })
}

//! Exploitation and cracking tools.
//!
//! Several of these feed the game state sink or publish story triggers:
//! `hydra`, `aircrack` and `steganography` capture credentials, `exploit`
//! and `python3 <exploit script>` record exploits, `exploit
//! privilege_escalation` and `exploit banking` advance the story, and
//! `backdoor` announces persistence.

use futures::future::BoxFuture;
use hackme_types::error::Result;
use hackme_types::records::{CapturedCredential, Exploit};

use crate::interpreter::{Command, Environment, flag_value};

pub const COMMANDS: &[Command] = &[
    HYDRA,
    JOHN,
    HASHCAT,
    SQLMAP,
    AIRCRACK,
    METASPLOIT,
    MSFCONSOLE,
    EXPLOIT,
    PAYLOAD,
    BACKDOOR,
    KEYLOGGER,
    STEGANOGRAPHY,
    SOCIAL,
    PYTHON3,
];

const CRACK_LATENCY_MS: u64 = 1500;
const EXPLOIT_LATENCY_MS: u64 = 800;

// ---------------------------------------------------------------------------
// hydra / john / hashcat
// ---------------------------------------------------------------------------

pub const HYDRA: Command = Command {
    name: "hydra",
    description: "Brute-force a login service",
    usage: "hydra [options] <target>",
    category: "Exploitation",
    hidden: false,
    handler: hydra,
};

fn hydra(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print("Hydra password cracker started...").await;
        env.pause(CRACK_LATENCY_MS).await;
        env.print("[+] Found valid credentials: admin:password123").await;
        env.sink
            .capture_credentials(CapturedCredential::new("login", "admin", "password123"));
        Ok(())
    })
}

pub const JOHN: Command = Command {
    name: "john",
    description: "Crack password hashes",
    usage: "john [--wordlist=<file>] <hashfile>",
    category: "Exploitation",
    hidden: false,
    handler: john,
};

fn john(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(&[
            "John the Ripper password cracker",
            "Loaded 1 password hash (NT [MD4 128/128 AVX 4x3])",
            "Will run 4 OpenMP threads",
            "Proceeding with single, rules:Single",
            "Press Ctrl-C to abort, or send SIGUSR1 to john process for status",
            "Warning: Only 2 candidates buffered for the current salt, minimum 12 needed for performance.",
            "Done. Now run \"john --show\" to see cracked passwords",
        ])
        .await;
        Ok(())
    })
}

pub const HASHCAT: Command = Command {
    name: "hashcat",
    description: "GPU hash cracker",
    usage: "hashcat [options] <hash>",
    category: "Exploitation",
    hidden: false,
    handler: hashcat,
};

const HASHCAT_SESSION: &[&str] = &[
    "hashcat (v6.2.6) starting...",
    "",
    "* Device #1: WARNING! Kernel exec timeout is not disabled.",
    "             This may cause \"CL_OUT_OF_RESOURCES\" or related errors.",
    "             To disable the timeout, see: https://hashcat.net/q/timeoutpatch",
    "",
    "Session..........: hashcat",
    "Status...........: Cracked",
    "Hash.Name........: NTLM",
    "Hash.Target......: 5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
    "",
    "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8:password",
    "",
    "Session..........: hashcat",
    "Status...........: Cracked",
];

fn hashcat(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(HASHCAT_SESSION).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// sqlmap
// ---------------------------------------------------------------------------

pub const SQLMAP: Command = Command {
    name: "sqlmap",
    description: "Automatic SQL injection",
    usage: "sqlmap -u <url>",
    category: "Exploitation",
    hidden: false,
    handler: sqlmap,
};

const SQLMAP_RUN: &[&str] = &[
    "        ___",
    "       __H__",
    " ___ ___[)]_____ ___ ___  {1.7.2#stable}",
    "|_ -| . [\"]     | .|_ -|",
    "|___|_  [)]_|_|_|__,|___|",
    "      |_|V...       |_|   https://sqlmap.org",
    "",
    "[!] legal disclaimer: Usage of sqlmap for attacking targets without prior mutual consent is illegal.",
    "",
    "[*] starting @ 21:30:45 /2024-01-20/",
    "[21:30:45] [INFO] testing connection to the target URL",
    "[21:30:45] [INFO] checking if the target is protected by some kind of WAF/IPS",
    "[21:30:46] [INFO] testing if the target URL content is stable",
    "[21:30:46] [INFO] target URL content is stable",
    "[21:30:46] [INFO] testing if GET parameter 'id' is dynamic",
    "[21:30:46] [WARNING] GET parameter 'id' does not appear to be dynamic",
    "[21:30:46] [WARNING] heuristic (basic) test shows that GET parameter 'id' might not be injectable",
    "[21:30:46] [INFO] testing for SQL injection on GET parameter 'id'",
    "[21:30:46] [INFO] testing 'AND boolean-based blind - WHERE or HAVING clause'",
    "[21:30:47] [INFO] GET parameter 'id' appears to be 'AND boolean-based blind - WHERE or HAVING clause' injectable",
    "[21:30:47] [INFO] testing 'Generic UNION query (NULL) - 1 to 20 columns'",
    "[21:30:48] [INFO] automatically extending ranges to optimize the number of requests",
    "[21:30:48] [CRITICAL] unable to connect to the target URL. sqlmap is going to retry the request(s)",
];

fn sqlmap(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(SQLMAP_RUN).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// aircrack
// ---------------------------------------------------------------------------

pub const AIRCRACK: Command = Command {
    name: "aircrack",
    description: "Crack a captured WPA handshake",
    usage: "aircrack [--wordlist <file>] <capture>",
    category: "Advanced",
    hidden: false,
    handler: aircrack,
};

const AIRCRACK_RUN: &[&str] = &[
    "Aircrack-ng 1.7  - (C) 2006-2022 Thomas d'Otreppe",
    "      https://www.aircrack-ng.org",
    "",
    "      [00:00:05] 2840/14344392 keys tested (548.23 k/s)",
    "",
    "      Time left: 7 hours, 14 minutes, 18 seconds                  0.02%",
    "",
    "                           KEY FOUND! [ WPA2Password123 ]",
    "",
    "      Master Key     : CD 69 0D 11 8E 24 58 9C 66 B8 89 78 AE 8C 32 7B",
    "                       1B 99 DE 96 70 EB 3C 90 A4 24 52 B3 B4 4F B0 B3",
    "",
    "      EAPOL HMAC     : 4E 44 B7 19 E6 9C F9 66 51 22 10 33 99 F8 7A ED",
];

fn aircrack(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(&AIRCRACK_RUN[..4]).await;
        env.pause(CRACK_LATENCY_MS).await;
        env.print_lines(&AIRCRACK_RUN[4..]).await;
        env.sink
            .capture_credentials(CapturedCredential::new("wifi", "HomeWiFi", "WPA2Password123"));
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// metasploit / msfconsole
// ---------------------------------------------------------------------------

pub const METASPLOIT: Command = Command {
    name: "metasploit",
    description: "Metasploit launcher",
    usage: "metasploit",
    category: "Exploitation",
    hidden: false,
    handler: metasploit,
};

fn metasploit(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(&[
            "Starting Metasploit Framework Console...",
            "Please use \"msfconsole\" for full interface",
        ])
        .await;
        Ok(())
    })
}

pub const MSFCONSOLE: Command = Command {
    name: "msfconsole",
    description: "Metasploit Framework console",
    usage: "msfconsole",
    category: "Exploitation",
    hidden: false,
    handler: msfconsole,
};

fn msfconsole(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(&[
            "Starting Metasploit Framework...",
            "",
            "       =[ metasploit v6.3.25-dev                          ]",
            "+ -- --=[ 2328 exploits - 1218 auxiliary - 413 post       ]",
            "+ -- --=[ 864 payloads - 45 encoders - 11 nops            ]",
            "+ -- --=[ 9 evasion                                       ]",
            "",
            "msf6 > ",
        ])
        .await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// exploit / payload / backdoor
// ---------------------------------------------------------------------------

pub const EXPLOIT: Command = Command {
    name: "exploit",
    description: "Run an exploit against a target",
    usage: "exploit <name> | exploit --type <name> [--target <host>]",
    category: "Exploitation",
    hidden: false,
    handler: exploit,
};

/// Exploits that hand over an administrative shell.
const ESCALATIONS: &[&str] = &["privilege_escalation", "windows"];

fn exploit(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let name = flag_value(&args, "--type")
            .or_else(|| args.first().map(String::as_str).filter(|a| !a.starts_with('-')));
        let Some(name) = name else {
            env.print("Available exploits: rce, privilege_escalation, sql_injection, banking")
                .await;
            return Ok(());
        };
        let target = flag_value(&args, "--target").unwrap_or("target_host");

        env.print(format!("Executing exploit: {name}")).await;
        env.pause(EXPLOIT_LATENCY_MS).await;
        env.print_lines(&["[+] Exploit successful!", "[+] Shell obtained on target system"])
            .await;

        env.sink.execute_exploit(Exploit {
            name: name.to_string(),
            target: target.to_string(),
        });
        if ESCALATIONS.contains(&name) {
            env.bus.publish("privilege_escalation");
            env.bus.publish("system_access");
        } else if name == "banking" {
            env.bus.publish("banking_access");
        }
        Ok(())
    })
}

pub const PAYLOAD: Command = Command {
    name: "payload",
    description: "List available payloads",
    usage: "payload",
    category: "Exploitation",
    hidden: false,
    handler: payload,
};

fn payload(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(&[
            "Available payloads:",
            "  1. windows/meterpreter/reverse_tcp",
            "  2. linux/x86/shell_reverse_tcp",
            "  3. android/meterpreter/reverse_tcp",
            "  4. php/meterpreter_reverse_tcp",
            "",
            "Use: payload generate <number>",
        ])
        .await;
        Ok(())
    })
}

pub const BACKDOOR: Command = Command {
    name: "backdoor",
    description: "Install persistent access",
    usage: "backdoor [--install] [--target <host>]",
    category: "Exploitation",
    hidden: false,
    handler: backdoor,
};

fn backdoor(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print("Installing persistent backdoor...").await;
        env.pause(EXPLOIT_LATENCY_MS).await;
        env.print_lines(&["[+] Backdoor installed successfully", "[+] Listening on port 4444"])
            .await;
        env.bus.publish("backdoor_install");
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// keylogger / steganography / social
// ---------------------------------------------------------------------------

pub const KEYLOGGER: Command = Command {
    name: "keylogger",
    description: "Capture keystrokes on a target",
    usage: "keylogger",
    category: "Advanced",
    hidden: false,
    handler: keylogger,
};

fn keylogger(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(&[
            "Keylogger activated on target system",
            "[+] Capturing keystrokes...",
            "[LOG] john_doe typed: \"mypassword123\"",
            "[LOG] sarah_smith typed: \"banking_login\"",
        ])
        .await;
        Ok(())
    })
}

pub const STEGANOGRAPHY: Command = Command {
    name: "steganography",
    description: "Look for data hidden in media files",
    usage: "steganography",
    category: "Advanced",
    hidden: false,
    handler: steganography,
};

fn steganography(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(&[
            "Steganography tools available:",
            "",
            "Image Analysis:",
            "  - Checking family_photos.zip for hidden data...",
            "  - Found embedded text in IMG_2034.jpg",
            "  - Hidden message: \"Bank account PIN: 4729\"",
            "",
            "Audio Analysis:",
            "  - No audio files found",
            "",
            "File Metadata:",
            "  - Extracting EXIF data...",
            "  - GPS coordinates found: 40.7589° N, 73.9851° W",
        ])
        .await;
        env.sink
            .capture_credentials(CapturedCredential::new("steganography", "Bank PIN", "4729"));
        Ok(())
    })
}

pub const SOCIAL: Command = Command {
    name: "social",
    description: "Social engineering toolkit",
    usage: "social",
    category: "Advanced",
    hidden: false,
    handler: social,
};

const SET_MENU: &[&str] = &[
    "Social Engineering Toolkit (SET) v8.0.3",
    "Created by: David Kennedy (ReL1K)",
    "",
    "Available attack vectors:",
    "",
    "1) Spear-Phishing Attack Vectors",
    "2) Website Attack Vectors",
    "3) Infectious Media Generator",
    "4) Create a Payload and Listener",
    "5) Mass Mailer Attack",
    "6) Arduino-Based Attack Vector",
    "7) Wireless Access Point Attack Vector",
    "8) QRCode Generator Attack Vector",
    "9) Powershell Attack Vectors",
    "10) SMS Spoofing Attack Vector",
    "",
    "99) Return back to the main menu.",
    "",
    "set> ",
];

fn social(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(SET_MENU).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// python3
// ---------------------------------------------------------------------------

pub const PYTHON3: Command = Command {
    name: "python3",
    description: "Run a Python script",
    usage: "python3 [script]",
    category: "Advanced",
    hidden: false,
    handler: python3,
};

fn python3(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let Some(script) = args.first() else {
            env.print_lines(&[
                "Python 3.9.2 (default, Feb 28 2021, 17:03:44)",
                "[GCC 10.2.1 20210110] on linux",
                "Type \"help\", \"copyright\", \"credits\" or \"license\" for more information.",
                ">>> ",
            ])
            .await;
            return Ok(());
        };
        env.print(format!("Executing {script}...")).await;
        if script.contains("exploit") || script.contains("payload") {
            env.pause(EXPLOIT_LATENCY_MS).await;
            env.print_lines(&[
                "[+] Exploit loaded successfully",
                "[+] Target: 192.168.1.100:445",
                "[+] Sending payload...",
                "[+] Payload executed successfully",
                "[+] Reverse shell established",
            ])
            .await;
            env.sink.execute_exploit(Exploit {
                name: "Python RCE".to_string(),
                target: "192.168.1.100".to_string(),
            });
        }
        Ok(())
    })
}

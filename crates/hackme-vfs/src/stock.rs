//! The stock attacker workstation tree.

use hackme_types::error::Result;

use crate::static_vfs::StaticVfs;

/// Build the `/home/blackhat` workstation every session starts in.
pub fn stock_tree() -> Result<StaticVfs> {
    StaticVfs::builder()
        .dir("/", &["home", "etc", "var", "usr", "tmp"])
        .dir("/home", &["blackhat"])
        .dir(
            "/home/blackhat",
            &[
                "tools",
                "exploits",
                "logs",
                "capture.pcap",
                "passwords.txt",
                "backdoor.py",
            ],
        )
        .dir(
            "/home/blackhat/tools",
            &["nmap_scan.txt", "hydra_results.txt", "sql_injection.py"],
        )
        .dir(
            "/home/blackhat/exploits",
            &["rce_exploit.py", "privilege_escalation.sh", "reverse_shell.c"],
        )
        .dir(
            "/home/blackhat/logs",
            &["access.log", "keylogger.log", "network_traffic.log"],
        )
        .file(
            "/home/blackhat/capture.pcap",
            "Binary packet capture file containing network traffic...",
        )
        .file(
            "/home/blackhat/passwords.txt",
            "john_doe:password123\nsarah_smith:letmein\nadmin:admin\nroot:toor",
        )
        .file(
            "/home/blackhat/backdoor.py",
            "#!/usr/bin/env python3\n# Remote access backdoor\nimport socket, subprocess\n...",
        )
        .file(
            "/home/blackhat/tools/nmap_scan.txt",
            "Nmap scan report for 192.168.1.1\n\
             22/tcp   open  ssh\n\
             80/tcp   open  http\n\
             443/tcp  open  https",
        )
        .file(
            "/home/blackhat/tools/hydra_results.txt",
            "[22][ssh] host: 192.168.1.1   login: admin   password: password123",
        )
        .file(
            "/home/blackhat/tools/sql_injection.py",
            "#!/usr/bin/env python3\n# Boolean-based blind injection helper\npayload = \"' OR '1'='1\"",
        )
        .file(
            "/home/blackhat/exploits/rce_exploit.py",
            "#!/usr/bin/env python3\n# Remote code execution against 192.168.1.100:445\n...",
        )
        .file(
            "/home/blackhat/exploits/privilege_escalation.sh",
            "#!/bin/bash\n# Local privilege escalation via misconfigured sudoers\nsudo -l",
        )
        .file(
            "/home/blackhat/exploits/reverse_shell.c",
            "/* Connect back to 192.168.1.50:4444 and spawn /bin/sh */",
        )
        .file(
            "/home/blackhat/logs/access.log",
            "192.168.1.1 - - [20/Jan/2024:21:30:45] \"GET /admin HTTP/1.1\" 200",
        )
        .file(
            "/home/blackhat/logs/keylogger.log",
            "[LOG] john_doe typed: \"mypassword123\"\n[LOG] sarah_smith typed: \"banking_login\"",
        )
        .file(
            "/home/blackhat/logs/network_traffic.log",
            "DNS  192.168.1.102 -> 8.8.8.8  Standard query A banking.example.com",
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_tree_builds() {
        let vfs = stock_tree().unwrap();
        assert!(vfs.is_dir("/home/blackhat"));
        assert!(vfs.is_dir("/home/blackhat/tools"));
    }

    #[test]
    fn home_listing_matches_workstation() {
        let vfs = stock_tree().unwrap();
        let listing = vfs.list("/home/blackhat").unwrap();
        assert_eq!(listing[0], "tools");
        assert_eq!(listing.len(), 6);
    }

    #[test]
    fn password_file_has_one_entry_per_line() {
        let vfs = stock_tree().unwrap();
        let content = vfs.read("/home/blackhat/passwords.txt").unwrap();
        assert_eq!(content.lines().count(), 4);
        assert!(content.starts_with("john_doe:password123"));
    }

    #[test]
    fn every_listed_home_child_exists() {
        let vfs = stock_tree().unwrap();
        for dir in ["/home/blackhat", "/home/blackhat/tools", "/home/blackhat/exploits"] {
            for child in vfs.list(dir).unwrap() {
                let path = format!("{dir}/{child}");
                assert!(vfs.exists(&path), "missing {path}");
            }
        }
    }
}

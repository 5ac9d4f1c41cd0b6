//! Flat game-state records and the append-only log that collects them.
//!
//! Commands and scenes only ever produce these; nothing in the core mutates a
//! record once it has been handed to a [`GameStateSink`](crate::collab::GameStateSink).

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::collab::GameStateSink;

/// A credential pulled out of a cracked hash, sniffed session, or hidden file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedCredential {
    /// What kind of secret this is (`login`, `wifi`, `pin`, ...).
    pub kind: String,
    /// Account, network name, or other identity the secret belongs to.
    pub identity: String,
    pub secret: String,
}

impl CapturedCredential {
    /// Build a captured secret from borrowed parts.
    pub fn new(kind: &str, identity: &str, secret: &str) -> Self {
        Self {
            kind: kind.to_string(),
            identity: identity.to_string(),
            secret: secret.to_string(),
        }
    }
}

/// A host that answered a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredHost {
    pub ip: String,
    pub ports: Vec<u16>,
}

/// A weakness reported by a service scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vulnerability {
    pub host: String,
    pub port: u16,
    pub service: String,
    pub summary: String,
}

/// An exploit that was run against a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exploit {
    pub name: String,
    pub target: String,
}

#[derive(Debug, Default)]
struct Logs {
    credentials: Vec<CapturedCredential>,
    hosts: Vec<DiscoveredHost>,
    vulnerabilities: Vec<Vulnerability>,
    exploits: Vec<Exploit>,
}

/// In-memory append-only [`GameStateSink`].
///
/// Duplicates are kept as-is. Each accessor returns a snapshot.
#[derive(Debug, Default)]
pub struct GameLog {
    logs: Mutex<Logs>,
}

impl GameLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Logs> {
        // Appends never panic mid-update, so a poisoned lock still holds whole records.
        self.logs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Captured credentials in capture order.
    pub fn credentials(&self) -> Vec<CapturedCredential> {
        self.lock().credentials.clone()
    }

    pub fn hosts(&self) -> Vec<DiscoveredHost> {
        self.lock().hosts.clone()
    }

    pub fn vulnerabilities(&self) -> Vec<Vulnerability> {
        self.lock().vulnerabilities.clone()
    }

    pub fn exploits(&self) -> Vec<Exploit> {
        self.lock().exploits.clone()
    }

    /// Serialize the whole log as pretty JSON.
    pub fn to_json(&self) -> String {
        let logs = self.lock();
        let value = serde_json::json!({
            "credentials": logs.credentials,
            "hosts": logs.hosts,
            "vulnerabilities": logs.vulnerabilities,
            "exploits": logs.exploits,
        });
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

impl GameStateSink for GameLog {
    fn capture_credentials(&self, entry: CapturedCredential) {
        log::info!("credential captured: {}:{}", entry.kind, entry.identity);
        self.lock().credentials.push(entry);
    }

    fn add_discovered_host(&self, host: DiscoveredHost) {
        log::info!("host discovered: {} ({} open ports)", host.ip, host.ports.len());
        self.lock().hosts.push(host);
    }

    fn add_vulnerability(&self, vuln: Vulnerability) {
        log::info!("vulnerability: {}:{} {}", vuln.host, vuln.port, vuln.service);
        self.lock().vulnerabilities.push(vuln);
    }

    fn execute_exploit(&self, exploit: Exploit) {
        log::info!("exploit executed: {} -> {}", exploit.name, exploit.target);
        self.lock().exploits.push(exploit);
    }
}

//! One interactive run: every component wired to one bus and one scheduler.

use std::sync::Arc;

use hackme_runtime::{EventBus, OutputSequencer, Scheduler};
use hackme_story::{NarrativeEngine, SceneContext, stock_missions};
use hackme_terminal::{CommandRegistry, Console, Dispatcher, Environment, register_builtins};
use hackme_types::collab::{GameStateSink, StyleHint, SurfaceRenderer, WindowVisibility};
use hackme_types::config::SessionConfig;
use hackme_types::error::{HackError, Result};
use hackme_types::records::{CapturedCredential, DiscoveredHost, Exploit, Vulnerability};

const WELCOME: &[&str] = &[
    "Welcome to HackmeNow Terminal v2.4.7",
    "Type \"help\" for available commands",
    "",
];

/// Presentation collaborators supplied by the front end.
pub struct Surfaces {
    pub terminal: Arc<dyn SurfaceRenderer>,
    pub story: Arc<dyn SurfaceRenderer>,
    pub windows: Arc<dyn WindowVisibility>,
    pub sink: Arc<dyn GameStateSink>,
}

/// Forwards to the front end's sink and announces captures and exploits on
/// the terminal.
struct AnnouncingSink {
    inner: Arc<dyn GameStateSink>,
    terminal: OutputSequencer,
}

impl GameStateSink for AnnouncingSink {
    fn capture_credentials(&self, entry: CapturedCredential) {
        let _ = self.terminal.enqueue(
            format!("[+] Credentials captured: {}:{}", entry.identity, entry.secret),
            StyleHint::Success,
        );
        self.inner.capture_credentials(entry);
    }

    fn add_discovered_host(&self, host: DiscoveredHost) {
        self.inner.add_discovered_host(host);
    }

    fn add_vulnerability(&self, vuln: Vulnerability) {
        self.inner.add_vulnerability(vuln);
    }

    fn execute_exploit(&self, exploit: Exploit) {
        let _ = self.terminal.enqueue(
            format!("[+] Exploit executed: {}", exploit.name),
            StyleHint::Success,
        );
        self.inner.execute_exploit(exploit);
    }
}

pub struct Session {
    pub console: Console,
    pub engine: NarrativeEngine,
    pub bus: EventBus,
    pub scheduler: Scheduler,
    terminal: OutputSequencer,
}

impl Session {
    /// Build every component. Must run inside a tokio runtime.
    pub fn build(config: &SessionConfig, surfaces: Surfaces) -> Result<Self> {
        let scheduler = Scheduler::new();
        let bus = EventBus::new();
        let terminal = OutputSequencer::spawn(
            "terminal",
            surfaces.terminal,
            config.output.terminal.clone(),
            &scheduler,
        );
        let story = OutputSequencer::spawn(
            "story",
            surfaces.story,
            config.output.story.clone(),
            &scheduler,
        );

        let sink: Arc<dyn GameStateSink> = Arc::new(AnnouncingSink {
            inner: surfaces.sink,
            terminal: terminal.clone(),
        });

        let vfs = hackme_vfs::stock_tree()?;
        let shell = &config.shell;
        if !vfs.is_dir(&shell.home) {
            return Err(HackError::Config(format!(
                "home directory {} does not exist",
                shell.home
            )));
        }
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry)?;
        log::info!("registered {} commands", registry.len());

        let env = Environment {
            cwd: shell.home.clone(),
            home: shell.home.clone(),
            username: shell.username.clone(),
            hostname: shell.hostname.clone(),
            vfs: Arc::new(vfs),
            registry: Arc::new(registry),
            out: terminal.clone(),
            bus: bus.clone(),
            sink: Arc::clone(&sink),
            windows: Arc::clone(&surfaces.windows),
            scheduler: scheduler.clone(),
        };
        let console = Console::new(
            Arc::new(Dispatcher::new(env)),
            terminal.clone(),
            scheduler.clone(),
        );

        let ctx = SceneContext::new(
            story,
            bus.clone(),
            scheduler.clone(),
            surfaces.windows,
            sink,
            config.story.clone(),
        );
        let engine = NarrativeEngine::new(stock_missions(), ctx)?;

        Ok(Self {
            console,
            engine,
            bus,
            scheduler,
            terminal,
        })
    }

    /// Print the banner, then open the campaign.
    pub async fn begin(&self) {
        self.terminal.lines(WELCOME.iter().copied(), StyleHint::Success).await;
        self.engine.start();
        self.bus.publish("terminal_ready");
    }

    /// Cancel every pending task of this session.
    pub fn shutdown(&self) {
        self.scheduler.cancel();
    }
}

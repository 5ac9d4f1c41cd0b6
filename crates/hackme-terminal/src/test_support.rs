//! Session harness shared by the command tests.

use std::sync::{Arc, Mutex};

use hackme_runtime::{EventBus, OutputSequencer, Scheduler};
use hackme_types::config::{RevealMode, SurfaceConfig};
use hackme_types::records::GameLog;
use hackme_types::testing::{RecordingSurface, RecordingWindows};

use crate::commands::register_builtins;
use crate::interpreter::{CommandRegistry, Dispatcher, Environment};

pub(crate) struct Harness {
    pub surface: Arc<RecordingSurface>,
    pub windows: Arc<RecordingWindows>,
    pub log: Arc<GameLog>,
    pub bus: EventBus,
    pub scheduler: Scheduler,
    pub out: OutputSequencer,
    pub dispatcher: Arc<Dispatcher>,
    published: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    /// A stock session with every built-in command.
    pub fn new() -> Self {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry).unwrap();
        Self::with_registry(registry)
    }

    /// A stock session whose terminal reveals character by character.
    pub fn typewriter() -> Self {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry).unwrap();
        Self::with_parts(
            registry,
            SurfaceConfig {
                reveal: RevealMode::Typewriter,
                min_char_delay_ms: 1,
                max_char_delay_ms: 30,
                hold_ms: 0,
            },
        )
    }

    pub fn with_registry(registry: CommandRegistry) -> Self {
        Self::with_parts(registry, SurfaceConfig::default())
    }

    fn with_parts(registry: CommandRegistry, surface_config: SurfaceConfig) -> Self {
        let surface = Arc::new(RecordingSurface::new());
        let windows = Arc::new(RecordingWindows::new());
        let log = Arc::new(GameLog::new());
        let bus = EventBus::new();
        let scheduler = Scheduler::new();
        let out = OutputSequencer::spawn(
            "terminal",
            Arc::clone(&surface) as _,
            surface_config,
            &scheduler,
        );

        let published = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&published);
        bus.subscribe(move |t| record.lock().unwrap().push(t.name.clone()));

        let env = Environment {
            cwd: "/home/blackhat".to_string(),
            home: "/home/blackhat".to_string(),
            username: "blackhat".to_string(),
            hostname: "kali".to_string(),
            vfs: Arc::new(hackme_vfs::stock_tree().unwrap()),
            registry: Arc::new(registry),
            out: out.clone(),
            bus: bus.clone(),
            sink: Arc::clone(&log) as _,
            windows: Arc::clone(&windows) as _,
            scheduler: scheduler.clone(),
        };
        Self {
            surface,
            windows,
            log,
            bus,
            scheduler,
            out,
            dispatcher: Arc::new(Dispatcher::new(env)),
            published,
        }
    }

    /// Names of every trigger published so far, in order.
    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }

    /// Dispatch each line in turn.
    pub async fn run(&self, lines: &[&str]) {
        for line in lines {
            self.dispatcher.dispatch(line).await;
        }
    }
}

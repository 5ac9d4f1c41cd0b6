//! Story harness shared by the engine and scene tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hackme_runtime::{EventBus, OutputSequencer, Scheduler};
use hackme_types::config::{StoryConfig, SurfaceConfig, TriggerScope};
use hackme_types::records::GameLog;
use hackme_types::testing::{RecordingSurface, RecordingWindows};
use serde_json::Value;

use crate::context::SceneContext;
use crate::engine::NarrativeEngine;
use crate::missions::{Mission, stock_missions};

pub(crate) struct Stage {
    pub surface: Arc<RecordingSurface>,
    pub windows: Arc<RecordingWindows>,
    pub log: Arc<GameLog>,
    pub bus: EventBus,
    pub scheduler: Scheduler,
    pub engine: NarrativeEngine,
    payloads: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Stage {
    pub fn stock() -> Self {
        Self::with(stock_missions(), TriggerScope::CurrentMission)
    }

    pub fn any_mission() -> Self {
        Self::with(stock_missions(), TriggerScope::AnyMission)
    }

    pub fn with(missions: Vec<Mission>, scope: TriggerScope) -> Self {
        let surface = Arc::new(RecordingSurface::new());
        let windows = Arc::new(RecordingWindows::new());
        let log = Arc::new(GameLog::new());
        let bus = EventBus::new();
        let scheduler = Scheduler::new();
        let out = OutputSequencer::spawn(
            "story",
            Arc::clone(&surface) as _,
            SurfaceConfig::default(),
            &scheduler,
        );

        let payloads = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&payloads);
        bus.subscribe(move |t| {
            if let Some(p) = &t.payload {
                record.lock().unwrap().push((t.name.clone(), p.clone()));
            }
        });

        let config = StoryConfig {
            trigger_scope: scope,
            ..StoryConfig::default()
        };
        let ctx = SceneContext::new(
            out,
            bus.clone(),
            scheduler.clone(),
            Arc::clone(&windows) as _,
            Arc::clone(&log) as _,
            config,
        );
        Self {
            surface,
            windows,
            log,
            bus,
            scheduler,
            engine: NarrativeEngine::new(missions, ctx).unwrap(),
            payloads,
        }
    }

    /// A standalone context on fresh fakes.
    pub fn context() -> SceneContext {
        let scheduler = Scheduler::new();
        let out = OutputSequencer::spawn(
            "story",
            Arc::new(RecordingSurface::new()),
            SurfaceConfig::default(),
            &scheduler,
        );
        SceneContext::new(
            out,
            EventBus::new(),
            scheduler,
            Arc::new(RecordingWindows::new()),
            Arc::new(GameLog::new()),
            StoryConfig::default(),
        )
    }

    /// Publish a trigger and wait for the engine and the story surface.
    pub async fn publish(&self, name: &str) {
        self.bus.publish(name);
        self.engine.settled().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    pub async fn play(&self, names: &[&str]) {
        for name in names {
            self.publish(name).await;
        }
    }

    /// Payloads published with `name`.
    pub fn payloads(&self, name: &str) -> Vec<Value> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Story lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.surface
            .lines()
            .iter()
            .filter(|l| l.contains(needle))
            .count()
    }
}

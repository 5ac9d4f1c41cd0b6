//! Trigger routing and the mission/scene cursor.
//!
//! Two bus subscribers are installed per engine:
//!
//! 1. The scene router forwards every trigger to one worker task, which plays
//!    the matching scene to completion before looking at the next trigger.
//!    Triggers a scene publishes therefore play after it.
//! 2. The objective subscriber applies the objective table synchronously, in
//!    the publisher's call, whether or not a scene matched.
//!
//! After a matched scene the cursor advances by one regardless of where the
//! match was, then rolls over into the next mission when the current one runs
//! out of scenes. Past the last mission the engine is finished: it schedules
//! the mission report and ignores further scene triggers.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use hackme_runtime::{SubscriptionId, Trigger};
use hackme_types::collab::StyleHint;
use hackme_types::config::TriggerScope;
use hackme_types::error::Result;
use tokio::sync::{mpsc, watch};

use crate::context::{SceneContext, StoryFlags};
use crate::missions::{Mission, validate};
use crate::objectives::Objective;
use crate::summary::MissionStats;

const SUMMARY_DELAY_MS: u64 = 5000;

/// Position in the mission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub mission: usize,
    /// Next scene expected in `mission`.
    pub scene: usize,
    pub finished: bool,
}

struct Shared {
    missions: Vec<Mission>,
    ctx: SceneContext,
    cursor: Mutex<Cursor>,
    /// Triggers handed to the worker.
    queued: AtomicU64,
    /// Triggers the worker has finished with.
    handled: watch::Sender<u64>,
}

impl Shared {
    fn cursor(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mission and scene index played by `name`, given the trigger scope.
    fn route(&self, name: &str) -> Option<(usize, usize)> {
        let cursor = *self.cursor();
        if cursor.finished {
            return None;
        }
        let last = match self.ctx.config.trigger_scope {
            TriggerScope::CurrentMission => cursor.mission,
            TriggerScope::AnyMission => self.missions.len().saturating_sub(1),
        };
        (cursor.mission..=last).find_map(|m| {
            self.missions
                .get(m)?
                .scene_for(name)
                .map(|scene| (m, scene))
        })
    }

    async fn handle(&self, trigger: &Trigger) {
        let Some((mission, index)) = self.route(&trigger.name) else {
            log::debug!("no scene for trigger '{}'", trigger.name);
            return;
        };
        let Some(scene) = self.missions[mission].scenes.get(index) else {
            return;
        };
        if let Some(payload) = &trigger.payload {
            log::debug!("trigger '{}' payload: {payload}", trigger.name);
        }

        log::info!("playing scene: {}", scene.description);
        match AssertUnwindSafe((scene.action)(&self.ctx)).catch_unwind().await {
            Ok(Ok(())) => {},
            Ok(Err(e)) => log::error!("scene '{}' failed: {e}", scene.description),
            Err(_) => log::error!("scene '{}' panicked", scene.description),
        }
        self.advance(mission, index);
    }

    fn advance(&self, mission: usize, index: usize) {
        let mut cursor = self.cursor();
        if mission > cursor.mission {
            log::info!(
                "trigger jumped ahead to mission {} '{}'",
                mission,
                self.missions[mission].title
            );
            *cursor = Cursor {
                mission,
                scene: index,
                finished: false,
            };
        } else if index != cursor.scene {
            log::warn!(
                "scene {index} of mission {mission} played while the cursor expected scene {}",
                cursor.scene
            );
        }

        cursor.scene += 1;
        let scene_count = self.missions.get(cursor.mission).map_or(0, |m| m.scenes.len());
        if cursor.scene < scene_count {
            return;
        }
        cursor.mission += 1;
        cursor.scene = 0;
        match self.missions.get(cursor.mission) {
            Some(next) => log::info!("starting mission {}: {}", next.id, next.title),
            None => {
                cursor.finished = true;
                drop(cursor);
                self.finish();
            },
        }
    }

    fn finish(&self) {
        log::info!("all missions complete");
        let ctx = self.ctx.clone();
        self.ctx.later(SUMMARY_DELAY_MS, "mission summary", async move {
            let stats = MissionStats::roll(&mut rand::thread_rng(), ctx.started.elapsed());
            ctx.out.lines(stats.report(), StyleHint::Story).await;
        });
    }
}

/// Story state machine bound to one session's bus.
///
/// Dropping the engine unsubscribes it; scenes already queued still play
/// until the session is cancelled.
pub struct NarrativeEngine {
    shared: Arc<Shared>,
    subscriptions: Vec<SubscriptionId>,
}

impl std::fmt::Debug for NarrativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeEngine")
            .field("cursor", &self.cursor())
            .field("missions", &self.shared.missions.len())
            .finish()
    }
}

impl NarrativeEngine {
    /// Validate the mission table, subscribe to the context's bus, and start
    /// the scene worker on the context's scheduler.
    pub fn new(missions: Vec<Mission>, ctx: SceneContext) -> Result<Self> {
        validate(&missions)?;
        let (handled, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            cursor: Mutex::new(Cursor {
                finished: missions.is_empty(),
                ..Cursor::default()
            }),
            missions,
            ctx,
            queued: AtomicU64::new(0),
            handled,
        });
        let bus = shared.ctx.bus.clone();

        let (tx, mut rx) = mpsc::unbounded_channel::<Trigger>();
        let router = Arc::clone(&shared);
        let scenes = bus.subscribe(move |trigger| {
            router.queued.fetch_add(1, Ordering::AcqRel);
            if tx.send(trigger.clone()).is_err() {
                router.queued.fetch_sub(1, Ordering::AcqRel);
                log::debug!("narrative worker gone, dropping '{}'", trigger.name);
            }
        });

        let board = shared.ctx.objectives.clone();
        let out = shared.ctx.out.clone();
        let objectives = bus.subscribe(move |trigger| {
            for msg in board.apply(&trigger.name) {
                let _ = out.enqueue(msg, StyleHint::Story);
            }
        });

        let worker = Arc::clone(&shared);
        shared.ctx.scheduler.spawn("narrative engine", async move {
            while let Some(trigger) = rx.recv().await {
                worker.handle(&trigger).await;
                worker.handled.send_modify(|n| *n += 1);
            }
        });

        if let Some(first) = shared.missions.first() {
            log::info!("starting mission {}: {}", first.id, first.title);
        }
        Ok(Self {
            shared,
            subscriptions: vec![scenes, objectives],
        })
    }

    /// Publish the opening trigger of the campaign.
    pub fn start(&self) {
        self.shared.ctx.bus.publish("start");
    }

    /// Position of the next expected scene.
    pub fn cursor(&self) -> Cursor {
        *self.shared.cursor()
    }

    /// Mission under the cursor, or `None` once finished.
    pub fn current_mission(&self) -> Option<&Mission> {
        let cursor = self.cursor();
        if cursor.finished {
            return None;
        }
        self.shared.missions.get(cursor.mission)
    }

    /// Snapshot of the objective board.
    pub fn objectives(&self) -> Vec<Objective> {
        self.shared.ctx.objectives.snapshot()
    }

    /// Story flags set so far.
    pub fn flags(&self) -> &StoryFlags {
        &self.shared.ctx.flags
    }

    /// Wait until every trigger published so far, and every trigger those
    /// scenes published in turn, has been handled. Returns early if the
    /// session is cancelled.
    pub async fn settled(&self) {
        let mut token = self.shared.ctx.scheduler.token();
        let mut handled = self.shared.handled.subscribe();
        loop {
            let target = self.shared.queued.load(Ordering::Acquire);
            tokio::select! {
                _ = handled.wait_for(|n| *n >= target) => {},
                _ = token.cancelled() => return,
            }
            if self.shared.queued.load(Ordering::Acquire) == target {
                return;
            }
        }
    }
}

impl Drop for NarrativeEngine {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.shared.ctx.bus.unsubscribe(id);
        }
    }
}

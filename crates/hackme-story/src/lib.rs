//! Narrative engine for the HackmeNow console.
//!
//! Missions are a static table of scenes keyed by trigger name. The engine
//! subscribes to the session [`EventBus`](hackme_runtime::EventBus), plays the
//! matching scene for each trigger on one serial task, and keeps the objective
//! board in step with a fixed trigger table.

pub mod context;
pub mod engine;
pub mod missions;
pub mod objectives;
pub mod summary;
#[cfg(test)]
pub(crate) mod test_support;

pub use context::{SceneContext, StoryFlags};
pub use engine::{Cursor, NarrativeEngine};
pub use missions::{Mission, Scene, SceneAction, stock_missions};
pub use objectives::{Objective, ObjectiveBoard, ObjectiveState};
pub use summary::MissionStats;

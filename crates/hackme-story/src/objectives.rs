//! Mission objectives and the trigger table that moves them.
//!
//! Objectives only ever move forward: pending, then active, then completed.
//! A request that would not move an objective forward is ignored, as is any
//! index past the end of the board.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectiveState {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub index: usize,
    pub label: String,
    pub state: ObjectiveState,
}

/// Labels of the stock campaign's four objectives.
pub const STOCK_OBJECTIVES: &[&str] = &[
    "Scan the home network",
    "Capture credentials from network traffic",
    "Gain system access",
    "Access banking systems",
];

/// `(trigger, completes, activates)`
const TRANSITIONS: &[(&str, usize, Option<usize>)] = &[
    ("network_scan", 0, Some(1)),
    ("credentials_found", 1, Some(2)),
    ("system_access", 2, Some(3)),
    ("banking_access", 3, None),
];

/// Objective indices a trigger completes and activates, if it moves any.
pub fn transition_for(trigger: &str) -> Option<(usize, Option<usize>)> {
    TRANSITIONS
        .iter()
        .find(|(name, _, _)| *name == trigger)
        .map(|&(_, done, next)| (done, next))
}

/// Shared objective board. Clones see the same objectives.
#[derive(Debug, Clone)]
pub struct ObjectiveBoard {
    inner: Arc<Mutex<Vec<Objective>>>,
}

impl Default for ObjectiveBoard {
    fn default() -> Self {
        Self::stock()
    }
}

impl ObjectiveBoard {
    /// A board with every objective pending.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let objectives = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| Objective {
                index,
                label: label.into(),
                state: ObjectiveState::Pending,
            })
            .collect();
        Self {
            inner: Arc::new(Mutex::new(objectives)),
        }
    }

    /// The four campaign objectives, all pending.
    pub fn stock() -> Self {
        Self::new(STOCK_OBJECTIVES.iter().copied())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Objective>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of every objective in board order.
    pub fn snapshot(&self) -> Vec<Objective> {
        self.lock().clone()
    }

    /// State of objective `index`, if it exists.
    pub fn state(&self, index: usize) -> Option<ObjectiveState> {
        self.lock().get(index).map(|o| o.state)
    }

    /// Number of objectives on the board.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Mark an objective active. Returns the announcement if it changed.
    pub fn activate(&self, index: usize) -> Option<String> {
        self.raise(index, ObjectiveState::Active)
            .map(|label| format!("🎯 New objective: {label}"))
    }

    /// Mark an objective completed. Returns the announcement if it changed.
    pub fn complete(&self, index: usize) -> Option<String> {
        self.raise(index, ObjectiveState::Completed)
            .map(|label| format!("✅ Objective completed: {label}"))
    }

    fn raise(&self, index: usize, to: ObjectiveState) -> Option<String> {
        let mut objectives = self.lock();
        let Some(objective) = objectives.get_mut(index) else {
            log::debug!("ignoring objective {index}: out of range");
            return None;
        };
        if objective.state >= to {
            return None;
        }
        log::info!(
            "objective {index} '{}': {:?} -> {to:?}",
            objective.label,
            objective.state
        );
        objective.state = to;
        Some(objective.label.clone())
    }

    /// Apply the trigger table. Returns the announcements, completion first.
    pub fn apply(&self, trigger: &str) -> Vec<String> {
        let Some((done, next)) = transition_for(trigger) else {
            return Vec::new();
        };
        let mut messages: Vec<String> = self.complete(done).into_iter().collect();
        messages.extend(next.and_then(|index| self.activate(index)));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_board_starts_pending() {
        let board = ObjectiveBoard::stock();
        assert_eq!(board.len(), 4);
        assert!(
            board
                .snapshot()
                .iter()
                .all(|o| o.state == ObjectiveState::Pending)
        );
    }

    #[test]
    fn network_scan_completes_first_and_activates_second() {
        let board = ObjectiveBoard::stock();
        let messages = board.apply("network_scan");
        assert_eq!(
            messages,
            vec![
                "✅ Objective completed: Scan the home network",
                "🎯 New objective: Capture credentials from network traffic",
            ]
        );
        assert_eq!(board.state(0), Some(ObjectiveState::Completed));
        assert_eq!(board.state(1), Some(ObjectiveState::Active));
    }

    #[test]
    fn repeated_trigger_is_silent() {
        let board = ObjectiveBoard::stock();
        board.apply("credentials_found");
        assert!(board.apply("credentials_found").is_empty());
    }

    #[test]
    fn banking_access_activates_nothing() {
        let board = ObjectiveBoard::stock();
        assert_eq!(
            board.apply("banking_access"),
            vec!["✅ Objective completed: Access banking systems"]
        );
    }

    #[test]
    fn unrelated_trigger_changes_nothing() {
        let board = ObjectiveBoard::stock();
        assert!(board.apply("wireshark_start").is_empty());
        assert!(board.apply("").is_empty());
    }

    #[test]
    fn activation_never_reopens_completed_objective() {
        let board = ObjectiveBoard::stock();
        board.complete(1);
        assert_eq!(board.activate(1), None);
        assert_eq!(board.state(1), Some(ObjectiveState::Completed));
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let board = ObjectiveBoard::new(["only one"]);
        assert_eq!(board.activate(3), None);
        assert_eq!(board.complete(1), None);
        // Table points past the end of a one-objective board.
        assert!(board.apply("credentials_found").is_empty());
        assert_eq!(board.state(0), Some(ObjectiveState::Pending));
    }

    #[test]
    fn clones_share_state() {
        let board = ObjectiveBoard::stock();
        let other = board.clone();
        other.activate(0);
        assert_eq!(board.state(0), Some(ObjectiveState::Active));
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Step {
            Trigger(&'static str),
            Activate(usize),
            Complete(usize),
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                prop::sample::select(vec![
                    "network_scan",
                    "credentials_found",
                    "system_access",
                    "banking_access",
                    "start",
                ])
                .prop_map(Step::Trigger),
                (0usize..6).prop_map(Step::Activate),
                (0usize..6).prop_map(Step::Complete),
            ]
        }

        proptest! {
            #[test]
            fn states_never_move_backwards(steps in prop::collection::vec(step(), 0..40)) {
                let board = ObjectiveBoard::stock();
                let mut before: Vec<ObjectiveState> =
                    board.snapshot().iter().map(|o| o.state).collect();
                for s in steps {
                    match s {
                        Step::Trigger(t) => { board.apply(t); },
                        Step::Activate(i) => { board.activate(i); },
                        Step::Complete(i) => { board.complete(i); },
                    }
                    let after: Vec<ObjectiveState> =
                        board.snapshot().iter().map(|o| o.state).collect();
                    for (b, a) in before.iter().zip(&after) {
                        prop_assert!(a >= b);
                    }
                    before = after;
                }
            }
        }
    }
}

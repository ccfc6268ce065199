//! Transition history tracking.
//!
//! [`History`] is a plugin that records every committed transition of the
//! machines it is attached to.

use crate::core::Stage;
use crate::machine::{Context, Machine};
use crate::plugin::{Phase, Plugin};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub machine: Uuid,
    pub transition: String,
    pub from: String,
    pub to: String,
    /// When the new state was entered
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use lifecycle_fsm::plugin::{StateHistory, StateTransition};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let machine = Uuid::new_v4();
/// let step = |transition: &str, from: &str, to: &str| StateTransition {
///     machine,
///     transition: transition.to_string(),
///     from: from.to_string(),
///     to: to.to_string(),
///     timestamp: Utc::now(),
/// };
///
/// let history = StateHistory::new()
///     .record(step("melt", "solid", "liquid"))
///     .record(step("vaporize", "liquid", "gas"));
///
/// assert_eq!(history.get_path(), vec!["solid", "liquid", "gas"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States traversed: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }
}

/// Plugin recording committed transitions.
///
/// Self-transitions are only recorded when the machine observes unchanged
/// states, since otherwise they never enter a state.
#[derive(Debug, Default)]
pub struct History {
    history: Mutex<StateHistory>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current history.
    pub fn snapshot(&self) -> StateHistory {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        *self.history.lock().unwrap_or_else(PoisonError::into_inner) = StateHistory::new();
    }
}

impl<C: Context> Plugin<C> for History {
    fn hook(&self, machine: &Machine<C>, phase: Phase<'_, C>) {
        let Phase::Lifecycle(lifecycle) = phase else {
            return;
        };
        if lifecycle.stage != Stage::EnterAnyState {
            return;
        }

        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        *history = history.record(StateTransition {
            machine: machine.id(),
            transition: lifecycle.transition.clone(),
            from: lifecycle.from.clone(),
            to: lifecycle.to.clone(),
            timestamp: Utc::now(),
        });
    }
}

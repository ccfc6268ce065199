//! Lifecycle stages and the event names observers subscribe to.
//!
//! Every transition walks the same fixed sequence of twelve stages. Each
//! stage (except the commit) maps to an event name built from the
//! transition or state it concerns, e.g. `before_melt` or `enter_liquid`.

use serde::{Deserialize, Serialize};

/// One of the twelve fixed points in a transition's dispatch.
///
/// The declaration order is the dispatch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    BeforeAnyTransition,
    BeforeTransition,
    LeaveAnyState,
    LeaveState,
    OnAnyTransition,
    /// Writes the target state into the machine. Not observable.
    Commit,
    EnterAnyState,
    EnterState,
    OnState,
    AfterAnyTransition,
    AfterTransition,
    OnTransition,
}

impl Stage {
    /// All stages in dispatch order.
    pub const ALL: [Stage; 12] = [
        Stage::BeforeAnyTransition,
        Stage::BeforeTransition,
        Stage::LeaveAnyState,
        Stage::LeaveState,
        Stage::OnAnyTransition,
        Stage::Commit,
        Stage::EnterAnyState,
        Stage::EnterState,
        Stage::OnState,
        Stage::AfterAnyTransition,
        Stage::AfterTransition,
        Stage::OnTransition,
    ];

    /// Whether the stage only runs when the transition changes state.
    pub fn requires_change(self) -> bool {
        matches!(
            self,
            Stage::LeaveAnyState
                | Stage::LeaveState
                | Stage::Commit
                | Stage::EnterAnyState
                | Stage::EnterState
                | Stage::OnState
        )
    }

    /// Whether plugins are notified when this stage begins.
    pub fn is_instrumented(self) -> bool {
        self != Stage::Commit
    }

    /// Stages to dispatch for a transition, in order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lifecycle_fsm::core::Stage;
    ///
    /// assert_eq!(Stage::plan(true).len(), 12);
    /// assert!(!Stage::plan(false).contains(&Stage::Commit));
    /// ```
    pub fn plan(changed: bool) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| changed || !stage.requires_change())
            .collect()
    }
}

/// Templates for lifecycle event names.
///
/// Specific events are `<prefix>_<label>` where the label is the
/// snake_cased transition or state name. Generic events use the
/// `any_transition` / `any_state` labels, so with the defaults a machine
/// emits `before_transition`, `leave_state`, `on_transition`, `enter_state`
/// and `after_transition`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleNames {
    pub before: String,
    pub leave: String,
    pub on: String,
    pub enter: String,
    pub after: String,
    pub any_transition: String,
    pub any_state: String,
}

impl Default for LifecycleNames {
    fn default() -> Self {
        Self {
            before: "before".to_string(),
            leave: "leave".to_string(),
            on: "on".to_string(),
            enter: "enter".to_string(),
            after: "after".to_string(),
            any_transition: "transition".to_string(),
            any_state: "state".to_string(),
        }
    }
}

impl LifecycleNames {
    /// `before_<transition>`
    pub fn before(&self, transition: &str) -> String {
        join(&self.before, transition)
    }

    /// `leave_<state>`
    pub fn leave(&self, state: &str) -> String {
        join(&self.leave, state)
    }

    /// `on_<label>`; shared by states and transitions.
    pub fn on(&self, label: &str) -> String {
        join(&self.on, label)
    }

    /// `enter_<state>`
    pub fn enter(&self, state: &str) -> String {
        join(&self.enter, state)
    }

    /// `after_<transition>`
    pub fn after(&self, transition: &str) -> String {
        join(&self.after, transition)
    }

    /// Event name a stage dispatches for `transition` from `from` to `to`.
    ///
    /// Returns `None` for [`Stage::Commit`], which has no observers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lifecycle_fsm::core::{LifecycleNames, Stage};
    ///
    /// let names = LifecycleNames::default();
    /// let event = names.event_for(Stage::EnterState, "melt", "solid", "liquid");
    /// assert_eq!(event.as_deref(), Some("enter_liquid"));
    /// ```
    pub fn event_for(&self, stage: Stage, transition: &str, from: &str, to: &str) -> Option<String> {
        let name = match stage {
            Stage::BeforeAnyTransition => self.before(&self.any_transition),
            Stage::BeforeTransition => self.before(transition),
            Stage::LeaveAnyState => self.leave(&self.any_state),
            Stage::LeaveState => self.leave(from),
            Stage::OnAnyTransition => self.on(&self.any_transition),
            Stage::Commit => return None,
            Stage::EnterAnyState => self.enter(&self.any_state),
            Stage::EnterState => self.enter(to),
            Stage::OnState => self.on(to),
            Stage::AfterAnyTransition => self.after(&self.any_transition),
            Stage::AfterTransition => self.after(transition),
            Stage::OnTransition => self.on(transition),
        };
        Some(name)
    }
}

fn join(prefix: &str, label: &str) -> String {
    format!("{}_{}", prefix, snake_case(label))
}

/// Normalize a state or transition label to snake_case.
///
/// Camel humps, hyphens and spaces all become single underscores.
///
/// # Example
///
/// ```rust
/// use lifecycle_fsm::core::snake_case;
///
/// assert_eq!(snake_case("WarmUp"), "warm_up");
/// assert_eq!(snake_case("warm-up"), "warm_up");
/// assert_eq!(snake_case("melt"), "melt");
/// ```
pub fn snake_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    let mut after_lower = false;

    for ch in label.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            after_lower = false;
        } else if ch.is_uppercase() {
            if after_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            after_lower = false;
        } else {
            out.push(ch);
            after_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    out
}

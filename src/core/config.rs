//! Static machine configuration and its query surface.
//!
//! The configuration is read-only during a transition except for one thing:
//! states discovered at call time (through a resolver) are registered late.

use crate::core::lifecycle::LifecycleNames;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Source-state symbol matching every state.
pub const WILDCARD: &str = "*";

/// Computes a transition's target at call time from the context and the
/// call arguments. `None` means the transition does not apply.
pub type Resolver<C> = Arc<dyn Fn(&C, &[Value]) -> Option<String> + Send + Sync>;

/// Where a transition leads.
pub enum Target<C> {
    /// A fixed target state.
    State(String),
    /// Stay in whatever state the machine is in.
    Current,
    /// Decide at call time.
    Resolver(Resolver<C>),
}

impl<C> Target<C> {
    /// Resolve the target state given the machine's current state.
    ///
    /// This is the pure half of `seek`: the lookup already happened and
    /// produced this descriptor.
    pub fn resolve(&self, current: &str, context: &C, args: &[Value]) -> Option<String> {
        match self {
            Target::State(state) => Some(state.clone()),
            Target::Current => Some(current.to_string()),
            Target::Resolver(resolver) => resolver(context, args),
        }
    }
}

impl<C> Clone for Target<C> {
    fn clone(&self) -> Self {
        match self {
            Target::State(state) => Target::State(state.clone()),
            Target::Current => Target::Current,
            Target::Resolver(resolver) => Target::Resolver(Arc::clone(resolver)),
        }
    }
}

impl<C> fmt::Debug for Target<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::State(state) => f.debug_tuple("State").field(state).finish(),
            Target::Current => f.write_str("Current"),
            Target::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// A named transition from one or more source states.
pub struct TransitionDef<C> {
    pub name: String,
    /// Source states; [`WILDCARD`] matches any state.
    pub from: Vec<String>,
    pub to: Target<C>,
}

impl<C> Clone for TransitionDef<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

impl<C> fmt::Debug for TransitionDef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionDef")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Descriptor of the transition that moves a fresh machine out of its
/// placeholder state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialTransition {
    pub name: String,
    pub from: String,
    pub to: Option<String>,
    /// Fire the transition from `Machine::init`.
    pub active: bool,
}

impl Default for InitialTransition {
    fn default() -> Self {
        Self {
            name: "init".to_string(),
            from: "none".to_string(),
            to: None,
            active: false,
        }
    }
}

impl InitialTransition {
    /// Start in `state`, entering it when the machine is initialized.
    pub fn to(state: impl Into<String>) -> Self {
        Self {
            to: Some(state.into()),
            active: true,
            ..Self::default()
        }
    }

    /// Like [`InitialTransition::to`] but left for the caller to fire.
    pub fn deferred(state: impl Into<String>) -> Self {
        Self {
            active: false,
            ..Self::to(state)
        }
    }
}

/// What `fire` does when a transition is already in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingPolicy {
    /// Wait in line and retry against the latest state.
    #[default]
    Queue,
    /// Fail immediately with `TransitionError::TransitionPending`.
    Reject,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Run leave/commit/enter stages even when `from == to`.
    pub observe_unchanged_state: bool,
    pub pending_policy: PendingPolicy,
}

/// The state set, transition table and options of a machine.
pub struct Config<C> {
    states: Vec<String>,
    transitions: Vec<String>,
    map: HashMap<String, HashMap<String, Target<C>>>,
    init: InitialTransition,
    options: Options,
    lifecycle: LifecycleNames,
}

impl<C> Config<C> {
    /// Create a configuration holding only the initial transition.
    pub fn new(init: InitialTransition, options: Options, lifecycle: LifecycleNames) -> Self {
        let mut config = Self {
            states: Vec::new(),
            transitions: Vec::new(),
            map: HashMap::new(),
            init,
            options,
            lifecycle,
        };

        if let Some(to) = config.init.to.clone() {
            config.map_transition(TransitionDef {
                name: config.init.name.clone(),
                from: vec![config.init.from.clone()],
                to: Target::State(to),
            });
        }

        config
    }

    /// Register a state if it is not known yet. Returns `true` if it was new.
    pub fn add_state(&mut self, state: &str) -> bool {
        if self.map.contains_key(state) {
            return false;
        }
        self.states.push(state.to_string());
        self.map.insert(state.to_string(), HashMap::new());
        true
    }

    fn add_transition(&mut self, name: &str) {
        if !self.transitions.iter().any(|t| t == name) {
            self.transitions.push(name.to_string());
        }
    }

    /// Add a transition to the table, registering every state it names.
    ///
    /// A later entry for the same `(from, name)` pair replaces the earlier one.
    /// A literal [`WILDCARD`] target means "stay in the current state".
    pub fn map_transition(&mut self, def: TransitionDef<C>) {
        let to = match def.to {
            Target::State(state) if state == WILDCARD => Target::Current,
            other => other,
        };

        for from in &def.from {
            if from != WILDCARD {
                self.add_state(from);
            }
        }
        if let Target::State(state) = &to {
            self.add_state(state);
        }
        self.add_transition(&def.name);

        for from in def.from {
            self.map
                .entry(from)
                .or_default()
                .insert(def.name.clone(), to.clone());
        }
    }

    /// Every known state, in registration order.
    pub fn all_states(&self) -> &[String] {
        &self.states
    }

    /// Every transition name, in registration order.
    pub fn all_transitions(&self) -> &[String] {
        &self.transitions
    }

    /// Transitions with an entry from `state`, including wildcard entries.
    pub fn transitions_for(&self, state: &str) -> Vec<String> {
        self.transitions
            .iter()
            .filter(|t| {
                self.entry(state, t).is_some() || self.entry(WILDCARD, t).is_some()
            })
            .cloned()
            .collect()
    }

    /// Target descriptor for `transition` fired from `state`.
    ///
    /// An entry for the exact state wins over a wildcard entry. `None`
    /// means the transition is invalid from `state`.
    pub fn transition_for(&self, state: &str, transition: &str) -> Option<&Target<C>> {
        self.entry(state, transition)
            .or_else(|| self.entry(WILDCARD, transition))
    }

    fn entry(&self, state: &str, transition: &str) -> Option<&Target<C>> {
        self.map.get(state).and_then(|row| row.get(transition))
    }

    pub fn init(&self) -> &InitialTransition {
        &self.init
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn lifecycle(&self) -> &LifecycleNames {
        &self.lifecycle
    }
}

/// Resolve `transition` from `state` against a configuration.
///
/// Returns `None` when no entry applies or a resolver declines.
pub fn seek<C>(
    config: &Config<C>,
    state: &str,
    transition: &str,
    context: &C,
    args: &[Value],
) -> Option<String> {
    config
        .transition_for(state, transition)
        .and_then(|target| target.resolve(state, context, args))
}

//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{
    validate, Config, InitialTransition, LifecycleNames, Options, PendingPolicy, TransitionDef,
};
use crate::machine::{Context, Machine, Observer};
use crate::plugin::Plugin;
use std::sync::Arc;
use stillwater::validation::Validation;
use tracing::debug;

/// Builder for constructing state machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use lifecycle_fsm::{MachineBuilder, TransitionBuilder};
///
/// let machine = MachineBuilder::new(())
///     .init("solid")
///     .transition(TransitionBuilder::new().name("melt").from("solid").to("liquid"))
///     .unwrap()
///     .transition(TransitionBuilder::new().name("freeze").from("liquid").to("solid"))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert!(machine.is("none"));
/// assert_eq!(machine.all_states(), vec!["none", "solid", "liquid"]);
/// ```
pub struct MachineBuilder<C: Context> {
    context: Arc<C>,
    init: InitialTransition,
    states: Vec<String>,
    transitions: Vec<TransitionDef<C>>,
    options: Options,
    lifecycle: LifecycleNames,
    observers: Vec<Arc<dyn Observer<C>>>,
    plugins: Vec<Arc<dyn Plugin<C>>>,
}

impl<C: Context> MachineBuilder<C> {
    /// Create a new builder around `context`.
    pub fn new(context: C) -> Self {
        Self::with_context(Arc::new(context))
    }

    /// Create a builder around a context that is already shared.
    pub fn with_context(context: Arc<C>) -> Self {
        Self {
            context,
            init: InitialTransition::default(),
            states: Vec::new(),
            transitions: Vec::new(),
            options: Options::default(),
            lifecycle: LifecycleNames::default(),
            observers: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Enter `state` through the initial transition when `init` is called.
    pub fn init(mut self, state: impl Into<String>) -> Self {
        self.init = InitialTransition::to(state);
        self
    }

    /// Replace the initial transition descriptor.
    pub fn init_with(mut self, init: InitialTransition) -> Self {
        self.init = init;
        self
    }

    /// Declare a state that no transition names.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<C>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: TransitionDef<C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<TransitionDef<C>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Run the state-level stages even when a transition keeps the state.
    pub fn observe_unchanged_state(mut self, observe: bool) -> Self {
        self.options.observe_unchanged_state = observe;
        self
    }

    /// What `fire` does while another transition is in flight.
    pub fn pending_policy(mut self, policy: PendingPolicy) -> Self {
        self.options.pending_policy = policy;
        self
    }

    /// Override the event-name prefixes.
    pub fn lifecycle_names(mut self, names: LifecycleNames) -> Self {
        self.lifecycle = names;
        self
    }

    /// Register an observer. Observers run in registration order, after
    /// the context.
    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: Observer<C> + 'static,
    {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn plugin<P>(mut self, plugin: P) -> Self
    where
        P: Plugin<C> + 'static,
    {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Build the state machine.
    /// Returns every configuration violation found, not just the first.
    pub fn build(self) -> Result<Machine<C>, BuildError> {
        match validate(&self.states, &self.transitions, &self.init) {
            Validation::Success(_) => {}
            Validation::Failure(errors) => {
                return Err(BuildError::InvalidConfig {
                    violations: errors.iter().cloned().collect(),
                });
            }
        }

        let mut config = Config::new(self.init, self.options, self.lifecycle);
        for state in &self.states {
            config.add_state(state);
        }
        for transition in self.transitions {
            config.map_transition(transition);
        }

        debug!(
            states = config.all_states().len(),
            transitions = config.all_transitions().len(),
            "machine configured"
        );

        Ok(Machine::new(self.context, config, self.observers, self.plugins))
    }
}

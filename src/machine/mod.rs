//! The async shell around the pure core.
//!
//! A [`Machine`] owns the current state, the observer list and the pending
//! gate. `fire` is the only way to change state: it waits for the gate,
//! resolves the target, then runs the lifecycle pipeline.

mod context;
mod error;
mod gate;
mod observer;
mod pipeline;

pub use context::Context;
pub use error::{BoxError, TransitionError};
pub use gate::{PendingGate, Permit};
pub use observer::{Handler, HandlerResult, Handlers, Lifecycle, Observer, Response};

use crate::core::{Config, LifecycleNames, Options, PendingPolicy};
use crate::plugin::{Phase, Plugin};
use context::ContextObserver;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// A finite state machine instance.
///
/// Build one with [`crate::builder::MachineBuilder`]. All methods take
/// `&self`; share the machine across tasks with an `Arc`.
pub struct Machine<C: Context> {
    id: Uuid,
    context: Arc<C>,
    config: RwLock<Config<C>>,
    state: Mutex<String>,
    observers: RwLock<Vec<Arc<dyn Observer<C>>>>,
    plugins: Vec<Arc<dyn Plugin<C>>>,
    gate: PendingGate,
}

impl<C: Context> Machine<C> {
    pub(crate) fn new(
        context: Arc<C>,
        config: Config<C>,
        observers: Vec<Arc<dyn Observer<C>>>,
        plugins: Vec<Arc<dyn Plugin<C>>>,
    ) -> Self {
        let state = config.init().from.clone();
        let mut registry: Vec<Arc<dyn Observer<C>>> =
            vec![Arc::new(ContextObserver(Arc::clone(&context)))];
        registry.extend(observers);

        Self {
            id: Uuid::new_v4(),
            context,
            config: RwLock::new(config),
            state: Mutex::new(state),
            observers: RwLock::new(registry),
            plugins,
            gate: PendingGate::new(),
        }
    }

    /// Instance id, used in logs and passed to plugins.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// Current state.
    pub fn state(&self) -> String {
        lock(&self.state).clone()
    }

    pub fn is(&self, state: &str) -> bool {
        *lock(&self.state) == state
    }

    /// Whether the current state is any of `states`.
    pub fn is_any<I, S>(&self, states: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let current = self.state();
        states.into_iter().any(|s| s.as_ref() == current)
    }

    /// Whether a transition is in flight.
    pub fn is_pending(&self) -> bool {
        self.gate.is_pending()
    }

    /// Whether `transition` would be accepted right now.
    ///
    /// Resolvers are consulted with no arguments.
    pub fn can(&self, transition: &str) -> bool {
        !self.is_pending() && self.seek(transition, &[]).is_some()
    }

    pub fn cannot(&self, transition: &str) -> bool {
        !self.can(transition)
    }

    pub fn all_states(&self) -> Vec<String> {
        read(&self.config).all_states().to_vec()
    }

    pub fn all_transitions(&self) -> Vec<String> {
        read(&self.config).all_transitions().to_vec()
    }

    /// Transitions available from the current state.
    pub fn transitions(&self) -> Vec<String> {
        let state = self.state();
        read(&self.config).transitions_for(&state)
    }

    /// Event-name templates used by this machine.
    pub fn lifecycle(&self) -> LifecycleNames {
        read(&self.config).lifecycle().clone()
    }

    pub fn options(&self) -> Options {
        read(&self.config).options()
    }

    /// Resolve `transition` from the current state.
    ///
    /// `None` means the transition is invalid from here.
    pub fn seek(&self, transition: &str, args: &[Value]) -> Option<String> {
        let state = self.state();
        let target = read(&self.config)
            .transition_for(&state, transition)
            .cloned()?;
        // The resolver runs without the config lock so it may query the machine.
        target.resolve(&state, &self.context, args)
    }

    /// Register a single async handler for `event`.
    pub fn observe<F, Fut>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(Lifecycle<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add_observer(Handlers::new().on(event, handler));
    }

    /// Register a single synchronous handler for `event`.
    pub fn observe_sync<F>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(&Lifecycle<C>) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_observer(Handlers::new().on_sync(event, handler));
    }

    /// Register an observer after every observer registered so far.
    ///
    /// A stage that already started keeps the observers it snapshotted;
    /// later stages see the new observer.
    pub fn add_observer<O>(&self, observer: O)
    where
        O: Observer<C> + 'static,
    {
        write(&self.observers).push(Arc::new(observer));
    }

    /// Seed the context, notify plugins and fire the initial transition
    /// if it is active.
    ///
    /// Returns `None` when there was no transition to fire.
    pub async fn init(&self, args: Vec<Value>) -> Result<Option<Value>, TransitionError> {
        self.context.seed(&args);

        let state = self.state();
        debug!(machine = %self.id, state = %state, "initializing machine");
        for plugin in &self.plugins {
            plugin.hook(self, Phase::Init { state: &state });
        }

        let init = read(&self.config).init().clone();
        if init.active {
            self.fire(&init.name, Vec::new()).await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// Fire `transition`.
    ///
    /// Resolves to `true` (or the last value an observer returned) on
    /// success and to `false` if an observer vetoed. When another
    /// transition is in flight the call waits its turn and is then
    /// resolved against the state the machine is in at that point.
    pub async fn fire(&self, transition: &str, args: Vec<Value>) -> Result<Value, TransitionError> {
        debug!(machine = %self.id, transition, "firing transition");
        let _permit = self.admit(transition).await?;

        let from = self.state();
        let Some(to) = self.seek(transition, &args) else {
            debug!(machine = %self.id, transition, from = %from, "invalid transition");
            return Err(self.context.on_invalid_transition(transition, &from, None).await);
        };

        self.transit(transition, from, to, args).await
    }

    async fn admit(&self, transition: &str) -> Result<Permit<'_>, TransitionError> {
        if let Some(permit) = self.gate.try_enter() {
            return Ok(permit);
        }

        match self.options().pending_policy {
            PendingPolicy::Reject => Err(TransitionError::TransitionPending {
                transition: transition.to_string(),
                state: self.state(),
            }),
            PendingPolicy::Queue => {
                debug!(machine = %self.id, transition, "transition pending, queueing");
                Ok(self.gate.enter().await)
            }
        }
    }
}

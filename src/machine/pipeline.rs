//! The lifecycle dispatch loop.

use super::observer::{Lifecycle, Observer, Response};
use super::{lock, read, write, Context, Machine, TransitionError};
use crate::core::Stage;
use crate::plugin::Phase;
use serde_json::Value;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, trace};

impl<C: Context> Machine<C> {
    /// Run every stage of an admitted transition. The caller holds the gate.
    pub(super) async fn transit(
        &self,
        transition: &str,
        from: String,
        to: String,
        args: Vec<Value>,
    ) -> Result<Value, TransitionError> {
        let (changed, names) = {
            let mut config = write(&self.config);
            config.add_state(&to);
            let changed = config.options().observe_unchanged_state || from != to;
            (changed, config.lifecycle().clone())
        };

        debug!(machine = %self.id, transition, from = %from, to = %to, changed, "beginning transition");

        let base = Lifecycle::new(transition, &from, &to, args, Arc::clone(&self.context));
        let mut result: Option<Value> = None;
        let mut previous: Option<String> = None;

        for stage in Stage::plan(changed) {
            let Some(event) = names.event_for(stage, transition, &from, &to) else {
                self.commit(&to);
                previous = None;
                continue;
            };

            let lifecycle = base.at(stage, event);
            if stage.is_instrumented() && previous.as_deref() != Some(lifecycle.event.as_str()) {
                for plugin in &self.plugins {
                    plugin.hook(self, Phase::Lifecycle(&lifecycle));
                }
            }
            previous = Some(lifecycle.event.clone());

            match self.dispatch(&lifecycle, &mut result).await? {
                ControlFlow::Continue(()) => {}
                ControlFlow::Break(()) => {
                    debug!(
                        machine = %self.id,
                        transition,
                        event = %lifecycle.event,
                        "transition cancelled by observer"
                    );
                    return Ok(Value::Bool(false));
                }
            }
        }

        debug!(machine = %self.id, transition, state = %to, "transition complete");
        Ok(result.unwrap_or(Value::Bool(true)))
    }

    /// Notify, one at a time, every observer of the stage's event.
    async fn dispatch(
        &self,
        lifecycle: &Lifecycle<C>,
        result: &mut Option<Value>,
    ) -> Result<ControlFlow<()>, TransitionError> {
        let event = lifecycle.event.as_str();
        let observers = self.observers_for(event);
        trace!(machine = %self.id, event, observers = observers.len(), "dispatching stage");

        for observer in observers {
            let response = observer
                .notify(event, lifecycle.clone())
                .await
                .map_err(|source| {
                    debug!(machine = %self.id, event, error = %source, "observer failed");
                    TransitionError::ObserverFailed {
                        event: event.to_string(),
                        transition: lifecycle.transition.clone(),
                        source,
                    }
                })?;

            if response.is_cancel() {
                return Ok(ControlFlow::Break(()));
            }
            if let Response::Value(value) = response {
                *result = Some(value);
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Observers handling `event`, in registration order.
    fn observers_for(&self, event: &str) -> Vec<Arc<dyn Observer<C>>> {
        read(&self.observers)
            .iter()
            .filter(|observer| observer.observes(event))
            .cloned()
            .collect()
    }

    fn commit(&self, to: &str) {
        let mut state = lock(&self.state);
        trace!(machine = %self.id, from = %*state, to, "committing state");
        *state = to.to_string();
    }
}

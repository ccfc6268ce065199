//! The object a machine drives through its states.

use crate::machine::error::TransitionError;
use crate::machine::observer::{HandlerResult, Lifecycle, Observer, Response};
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use std::sync::Arc;

/// The context collaborator of a machine.
///
/// Every method has a default, so `impl Context for MyType {}` is enough.
/// The context is always the first observer of its machine: override
/// `observes`/`notify` to handle lifecycle events on the context itself.
#[async_trait]
pub trait Context: Send + Sync + 'static {
    /// Called by `Machine::init` with the initialization arguments.
    fn seed(&self, _args: &[Value]) {}

    /// Produce the error returned when `transition` has no target from
    /// `from`. May suspend, e.g. to consult an external service.
    async fn on_invalid_transition(
        &self,
        transition: &str,
        from: &str,
        to: Option<&str>,
    ) -> TransitionError {
        TransitionError::invalid(transition, from, to)
    }

    fn observes(&self, _event: &str) -> bool {
        false
    }

    fn notify(&self, _event: &str, _lifecycle: Lifecycle<Self>) -> BoxFuture<'static, HandlerResult>
    where
        Self: Sized,
    {
        future::ready(Ok(Response::Continue)).boxed()
    }
}

impl Context for () {}

/// Registers the context as an observer.
pub(crate) struct ContextObserver<C>(pub(crate) Arc<C>);

impl<C: Context> Observer<C> for ContextObserver<C> {
    fn observes(&self, event: &str) -> bool {
        self.0.observes(event)
    }

    fn notify(&self, event: &str, lifecycle: Lifecycle<C>) -> BoxFuture<'static, HandlerResult> {
        self.0.notify(event, lifecycle)
    }
}

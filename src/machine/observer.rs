//! Observers and the transition-event record they receive.

use crate::core::Stage;
use crate::machine::error::BoxError;
use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What an observer tells the pipeline after handling an event.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// Keep going; the running result is unchanged.
    Continue,
    /// Keep going and make this the running result.
    ///
    /// `Value::Bool(false)` is treated as [`Response::Cancel`].
    Value(Value),
    /// Veto the transition. Later stages are skipped and `fire` resolves
    /// to `false`.
    Cancel,
}

impl Response {
    pub fn is_cancel(&self) -> bool {
        matches!(self, Response::Cancel | Response::Value(Value::Bool(false)))
    }
}

impl From<()> for Response {
    fn from(_: ()) -> Self {
        Response::Continue
    }
}

impl From<bool> for Response {
    fn from(proceed: bool) -> Self {
        if proceed {
            Response::Value(Value::Bool(true))
        } else {
            Response::Cancel
        }
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Response::Value(value)
    }
}

pub type HandlerResult = Result<Response, BoxError>;

/// Async handler for a single lifecycle event.
pub type Handler<C> = Arc<dyn Fn(Lifecycle<C>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// The transition-event record handed to observers and plugins.
///
/// A fresh record is produced for every stage; `event` and `stage` say
/// which one.
pub struct Lifecycle<C> {
    pub transition: String,
    pub from: String,
    pub to: String,
    pub event: String,
    pub stage: Stage,
    args: Arc<[Value]>,
    context: Arc<C>,
}

impl<C> Lifecycle<C> {
    pub(crate) fn new(
        transition: &str,
        from: &str,
        to: &str,
        args: Vec<Value>,
        context: Arc<C>,
    ) -> Self {
        Self {
            transition: transition.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            event: String::new(),
            stage: Stage::BeforeAnyTransition,
            args: args.into(),
            context,
        }
    }

    /// The same transition, positioned at `stage`.
    pub(crate) fn at(&self, stage: Stage, event: String) -> Self {
        Self {
            event,
            stage,
            ..self.clone()
        }
    }

    /// Arguments passed to `fire`.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Shared handle to the context, for moving into a spawned future.
    pub fn context_arc(&self) -> Arc<C> {
        Arc::clone(&self.context)
    }
}

impl<C> Clone for Lifecycle<C> {
    fn clone(&self) -> Self {
        Self {
            transition: self.transition.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            event: self.event.clone(),
            stage: self.stage,
            args: Arc::clone(&self.args),
            context: Arc::clone(&self.context),
        }
    }
}

impl<C> fmt::Debug for Lifecycle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("transition", &self.transition)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("event", &self.event)
            .field("stage", &self.stage)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Something interested in lifecycle events.
///
/// `observes` is asked once per stage, when the stage starts; observers
/// that return `true` are then notified one at a time in registration order.
pub trait Observer<C>: Send + Sync {
    fn observes(&self, event: &str) -> bool;

    fn notify(&self, event: &str, lifecycle: Lifecycle<C>) -> BoxFuture<'static, HandlerResult>;
}

impl<C, O> Observer<C> for Arc<O>
where
    O: Observer<C> + ?Sized,
{
    fn observes(&self, event: &str) -> bool {
        (**self).observes(event)
    }

    fn notify(&self, event: &str, lifecycle: Lifecycle<C>) -> BoxFuture<'static, HandlerResult> {
        (**self).notify(event, lifecycle)
    }
}

/// An observer built from per-event closures.
///
/// # Example
///
/// ```rust
/// use lifecycle_fsm::machine::{Handlers, Observer, Response};
///
/// let handlers: Handlers<()> = Handlers::new()
///     .on_sync("before_melt", |_| Ok(Response::Continue))
///     .on("enter_liquid", |_| async { Ok(Response::Continue) });
///
/// assert!(handlers.observes("before_melt"));
/// assert!(!handlers.observes("after_melt"));
/// ```
pub struct Handlers<C> {
    handlers: HashMap<String, Handler<C>>,
}

impl<C: Send + Sync + 'static> Handlers<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Handle `event` asynchronously. Replaces any handler for `event`.
    pub fn on<F, Fut>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Lifecycle<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.insert(
            event.into(),
            Arc::new(move |lifecycle| handler(lifecycle).boxed()),
        );
        self
    }

    /// Handle `event` with a synchronous closure.
    pub fn on_sync<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Lifecycle<C>) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.insert(
            event.into(),
            Arc::new(move |lifecycle| future::ready(handler(&lifecycle)).boxed()),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<C: Send + Sync + 'static> Default for Handlers<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Observer<C> for Handlers<C> {
    fn observes(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    fn notify(&self, event: &str, lifecycle: Lifecycle<C>) -> BoxFuture<'static, HandlerResult> {
        match self.handlers.get(event) {
            Some(handler) => handler(lifecycle),
            None => future::ready(Ok(Response::Continue)).boxed(),
        }
    }
}

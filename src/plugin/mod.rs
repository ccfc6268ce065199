//! Instrumentation hooks.
//!
//! Plugins see a machine's initialization and every lifecycle stage whose
//! event name differs from the previous stage's. Hooks are synchronous and
//! cannot influence the transition, but they get the machine itself and
//! may query it (state, pending flag, id). Firing from a hook would wait on
//! the transition that is calling it; don't.

mod history;

pub use history::{History, StateHistory, StateTransition};

use crate::machine::{Context, Lifecycle, Machine};

/// When a plugin is called.
pub enum Phase<'a, C> {
    /// `Machine::init` was called; `state` is the state before the
    /// initial transition fires.
    Init { state: &'a str },
    /// A lifecycle stage is about to run its observers.
    Lifecycle(&'a Lifecycle<C>),
}

pub trait Plugin<C: Context>: Send + Sync {
    fn hook(&self, machine: &Machine<C>, phase: Phase<'_, C>);
}

impl<C, P> Plugin<C> for std::sync::Arc<P>
where
    C: Context,
    P: Plugin<C> + ?Sized,
{
    fn hook(&self, machine: &Machine<C>, phase: Phase<'_, C>) {
        (**self).hook(machine, phase)
    }
}

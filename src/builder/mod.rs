//! Builder API for ergonomic state machine construction.
//!
//! [`MachineBuilder`] collects the configuration, validates it in one pass
//! and produces a [`crate::machine::Machine`]. [`TransitionBuilder`] builds
//! the individual transition definitions.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Target, TransitionDef};

/// Create a transition between two fixed states.
///
/// # Example
///
/// ```
/// use lifecycle_fsm::builder::{simple_transition, MachineBuilder};
///
/// let machine = MachineBuilder::new(())
///     .init("green")
///     .add_transition(simple_transition("warn", "green", "yellow"))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.all_transitions(), vec!["init", "warn"]);
/// ```
pub fn simple_transition<C>(
    name: impl Into<String>,
    from: impl Into<String>,
    to: impl Into<String>,
) -> TransitionDef<C> {
    TransitionDef {
        name: name.into(),
        from: vec![from.into()],
        to: Target::State(to.into()),
    }
}

/// Create a transition that keeps the machine in whatever state it is in.
///
/// Such transitions still run the transition-level stages, so they are
/// useful for "ping" style events.
pub fn self_transition<C>(name: impl Into<String>, from: impl Into<String>) -> TransitionDef<C> {
    TransitionDef {
        name: name.into(),
        from: vec![from.into()],
        to: Target::Current,
    }
}

//! Lifecycle FSM: a finite state machine runtime with observable lifecycles
//!
//! A machine is configured once with named states and named transitions.
//! Firing a transition runs a fixed sequence of lifecycle stages, each
//! announcing an event name to the registered observers. Observers may
//! return a value, fail, or veto the transition by answering `false`.
//!
//! The configuration logic is pure and lives in [`core`]. The async shell
//! in [`machine`] owns the current state and serializes transitions through
//! a FIFO pending gate: a transition fired while another is in flight waits
//! its turn and is then resolved against the state at that point.
//!
//! # Core Concepts
//!
//! - **Transitions**: named edges from one or more states (or `*`) to a
//!   fixed state, the current state, or a resolver-chosen state
//! - **Lifecycle**: twelve ordered stages from `before_transition` to
//!   `on_<transition>`, with the state commit in the middle
//! - **Observers**: handlers keyed by event name, run in registration order
//! - **Plugins**: synchronous hooks that see initialization and every
//!   distinct lifecycle event
//!
//! # Example
//!
//! ```rust
//! use lifecycle_fsm::{MachineBuilder, Response, TransitionBuilder};
//! use serde_json::json;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let machine = MachineBuilder::new(())
//!     .init("solid")
//!     .transition(TransitionBuilder::new().name("melt").from("solid").to("liquid"))
//!     .unwrap()
//!     .transition(TransitionBuilder::new().name("freeze").from("liquid").to("solid"))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! machine.observe_sync("before_freeze", |_| Ok(Response::Cancel));
//! machine.init(Vec::new()).await.unwrap();
//!
//! assert_eq!(machine.fire("melt", Vec::new()).await.unwrap(), json!(true));
//! assert!(machine.is("liquid"));
//!
//! // Vetoed: the state does not change.
//! assert_eq!(machine.fire("freeze", Vec::new()).await.unwrap(), json!(false));
//! assert!(machine.is("liquid"));
//! # });
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod plugin;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use core::{InitialTransition, LifecycleNames, PendingPolicy, Stage, WILDCARD};
pub use machine::{
    Context, Handlers, HandlerResult, Lifecycle, Machine, Observer, Response, TransitionError,
};
pub use plugin::{History, Phase, Plugin};

//! Core configuration types and logic.
//!
//! This module contains the pure part of the state machine:
//! - The configuration query surface and target resolution
//! - Lifecycle stages and their event names
//! - Accumulating configuration validation
//!
//! Nothing in here suspends, locks or logs; the async shell lives in
//! [`crate::machine`].

mod config;
mod lifecycle;
mod validation;

pub use config::{
    seek, Config, InitialTransition, Options, PendingPolicy, Resolver, Target, TransitionDef,
    WILDCARD,
};
pub use lifecycle::{snake_case, LifecycleNames, Stage};
pub use validation::{validate, ConfigViolation};

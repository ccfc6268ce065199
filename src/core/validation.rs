//! Configuration checks that report every problem at once.
//!
//! Uses Stillwater's `Validation` so a misconfigured machine lists all of
//! its violations in a single build attempt.

use crate::core::config::{InitialTransition, Target, TransitionDef, WILDCARD};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single configuration problem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("State names must not be empty")]
    EmptyStateName,

    #[error("Transition names must not be empty")]
    EmptyTransitionName,

    #[error("Transition '{transition}' has no source state")]
    MissingSource { transition: String },

    #[error("Transition '{transition}' is declared twice from state '{from}'")]
    DuplicateTransition { transition: String, from: String },

    #[error("Transition '{transition}' clashes with the initial transition")]
    ReservedName { transition: String },

    #[error("'*' matches every state and cannot be declared as a state")]
    WildcardState,
}

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> ConfigViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Validate declared states and transitions, accumulating ALL violations.
pub fn validate<C>(
    states: &[String],
    transitions: &[TransitionDef<C>],
    init: &InitialTransition,
) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    for state in states {
        checks.push(check(!state.is_empty(), || ConfigViolation::EmptyStateName));
        checks.push(check(state != WILDCARD, || ConfigViolation::WildcardState));
    }

    if let Some(to) = &init.to {
        checks.push(check(!to.is_empty(), || ConfigViolation::EmptyStateName));
        checks.push(check(to != WILDCARD, || ConfigViolation::WildcardState));
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for def in transitions {
        checks.push(check(!def.name.is_empty(), || {
            ConfigViolation::EmptyTransitionName
        }));

        checks.push(check(!def.from.is_empty(), || ConfigViolation::MissingSource {
            transition: def.name.clone(),
        }));

        checks.push(check(init.to.is_none() || def.name != init.name, || {
            ConfigViolation::ReservedName {
                transition: def.name.clone(),
            }
        }));

        if let Target::State(to) = &def.to {
            checks.push(check(!to.is_empty(), || ConfigViolation::EmptyStateName));
        }

        for from in &def.from {
            checks.push(check(!from.is_empty(), || ConfigViolation::EmptyStateName));
            checks.push(check(seen.insert((def.name.as_str(), from.as_str())), || {
                ConfigViolation::DuplicateTransition {
                    transition: def.name.clone(),
                    from: from.clone(),
                }
            }));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

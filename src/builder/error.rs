//! Build errors for machine and transition builders.

use crate::core::ConfigViolation;
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition name not specified. Call .name(name)")]
    MissingName,

    #[error("Transition source state not specified. Call .from(state) or .from_any()")]
    MissingFromState,

    #[error("Transition target not specified. Call .to(state), .to_current() or .to_with(resolver)")]
    MissingToState,

    #[error("Invalid configuration: {} violation(s), first: {}", violations.len(), first(violations))]
    InvalidConfig { violations: Vec<ConfigViolation> },
}

fn first(violations: &[ConfigViolation]) -> String {
    violations
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

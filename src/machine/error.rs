//! Errors surfaced by `Machine::fire`.

use thiserror::Error;

/// Error type for observer handlers and custom invalid-transition handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can end a transition attempt.
///
/// A vetoed transition is not an error: it completes with a `false` outcome.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Transition '{transition}' is invalid in current state '{from}'")]
    InvalidTransition {
        transition: String,
        from: String,
        to: Option<String>,
    },

    #[error(
        "Transition '{transition}' is invalid while previous transition is still in progress (current state '{state}')"
    )]
    TransitionPending { transition: String, state: String },

    #[error("Observer for '{event}' failed during transition '{transition}': {source}")]
    ObserverFailed {
        event: String,
        transition: String,
        #[source]
        source: BoxError,
    },

    #[error("Transition rejected: {0}")]
    Context(#[source] BoxError),
}

impl TransitionError {
    pub fn invalid(transition: &str, from: &str, to: Option<&str>) -> Self {
        TransitionError::InvalidTransition {
            transition: transition.to_string(),
            from: from.to_string(),
            to: to.map(str::to_string),
        }
    }

    /// Whether the error came from the pending-transition reject policy.
    pub fn is_pending(&self) -> bool {
        matches!(self, TransitionError::TransitionPending { .. })
    }
}

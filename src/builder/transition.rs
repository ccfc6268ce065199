//! Builder for transition definitions.

use crate::builder::error::BuildError;
use crate::core::{Target, TransitionDef, WILDCARD};
use serde_json::Value;
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<C> {
    name: Option<String>,
    from: Vec<String>,
    to: Option<Target<C>>,
}

impl<C> TransitionBuilder<C> {
    pub fn new() -> Self {
        Self {
            name: None,
            from: Vec::new(),
            to: None,
        }
    }

    /// Set the transition name (required).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a source state. May be called repeatedly.
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from.push(state.into());
        self
    }

    /// Add several source states.
    pub fn from_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from.extend(states.into_iter().map(Into::into));
        self
    }

    /// Allow the transition from every state.
    pub fn from_any(self) -> Self {
        self.from(WILDCARD)
    }

    /// Set a fixed target state.
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(Target::State(state.into()));
        self
    }

    /// Stay in whatever state the machine is in.
    pub fn to_current(mut self) -> Self {
        self.to = Some(Target::Current);
        self
    }

    /// Decide the target when the transition fires. Returning `None` makes
    /// the transition invalid for that call.
    pub fn to_with<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&C, &[Value]) -> Option<String> + Send + Sync + 'static,
    {
        self.to = Some(Target::Resolver(Arc::new(resolver)));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<TransitionDef<C>, BuildError> {
        let name = self.name.ok_or(BuildError::MissingName)?;
        if self.from.is_empty() {
            return Err(BuildError::MissingFromState);
        }
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(TransitionDef {
            name,
            from: self.from,
            to,
        })
    }
}

impl<C> Default for TransitionBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

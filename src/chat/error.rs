//! Conversation engine errors

use thiserror::Error;

/// Failures that escape a handler.
///
/// Predictable domain failures (unknown Pokémon, bad input, upstream errors)
/// never show up here; handlers turn them into assistant messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Structural corruption of the session. Fatal for the operation.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// Anything else a handler could not recover from
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl ChatError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

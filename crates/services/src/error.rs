//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by the lesson session engine.
///
/// The taxonomy is deliberately small: learner intents that do not apply
/// in the current state are silent no-ops, exhausted lives are a modeled
/// sub-state with a recovery path, and progress-sink failures never
/// surface here. What remains is content that cannot start a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("not enough content: the {pool} pool is empty")]
    NotEnoughContent { pool: &'static str },
}

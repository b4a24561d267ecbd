//! Error types for the UO Steam interpreter.
//!
//! Mirrors the four-variant taxonomy of spec §7: every failure a script can
//! trigger is one of `SyntaxError`, `CommandError`, `TypeConversion` or
//! `RunTime`. `TypeConversion` is a `RunTime` subtype: it carries the same
//! propagation behaviour (swallowed under `@`) but keeps a distinct variant
//! so callers can match on it specifically (e.g. to decide whether a
//! default applies).

use thiserror::Error;

/// Result type used throughout the crate.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// The interpreter's error taxonomy (spec §7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// Command used with the wrong shape of arguments. Always triggers a
    /// usage-string printout and is always consumed by the dispatcher.
    #[error("syntax error: {message}")]
    Syntax { message: String },

    /// Domain-level command failure, e.g. "item not found". Always prints
    /// `keyword: message` and is always consumed.
    #[error("{message}")]
    Command { message: String },

    /// A token could not be coerced to the requested type.
    #[error("type conversion error: {message}")]
    TypeConversion { message: String },

    /// Evaluator invariant violation: unmatched loop terminator, unknown
    /// command, unknown expression, malformed scope chain.
    #[error("run-time error: {message}")]
    RunTime { message: String },
}

impl ScriptError {
    /// Builds a [`ScriptError::Syntax`].
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Builds a [`ScriptError::Command`].
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }

    /// Builds a [`ScriptError::TypeConversion`].
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Builds a [`ScriptError::RunTime`].
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::RunTime {
            message: message.into(),
        }
    }

    /// `true` for the two variants that `@` (quiet) swallows: `RunTime` and
    /// its `TypeConversion` subtype. `Syntax` and `Command` are never
    /// swallowed — they always produce their host-visible printout.
    pub fn is_quietable(&self) -> bool {
        matches!(self, Self::RunTime { .. } | Self::TypeConversion { .. })
    }
}

//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`RegistryError`, `FormulaError`, `TargetError`) are
//! defined next to the code that produces them. None of them abort an
//! encounter: callers substitute a neutral value and log through
//! [`report`], which picks the log level from the error's severity.

/// Severity level of an error, used to decide how loudly it is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Bad content or input; the engine substitutes a fallback and continues.
    ///
    /// Examples: definition cycle, missing parent, malformed formula
    Recoverable,

    /// Expected no-op condition that is not worth a warning.
    ///
    /// Examples: action with no living targets
    Silent,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Silent => "silent",
        }
    }

    /// Returns true if this error should surface as a warning.
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait implemented by every battle-core error type.
pub trait BattleError: std::error::Error {
    /// Returns the severity classification of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a stable error code for logging.
    fn error_code(&self) -> &'static str;
}

/// Logs `err` at the level its severity calls for.
pub fn report<E: BattleError>(err: &E) {
    if err.severity().is_warning() {
        tracing::warn!(code = err.error_code(), "{err}");
    } else {
        tracing::debug!(code = err.error_code(), "{err}");
    }
}

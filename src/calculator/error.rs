//! Failure types shared by every engine operation.

use super::scientific::ScientificFn;
use super::state::{ERROR_SENTINEL, INFINITY_SENTINEL};

/// Why an engine operation failed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{0} is not defined for this argument")]
    Domain(ScientificFn),

    #[error("result overflowed")]
    Overflow,

    #[error("result is not a finite number")]
    InvalidResult,

    #[error("ASCII value must be between 0-127, got {0}")]
    AsciiOutOfRange(f64),

    #[error("input must be a single character")]
    NotSingleCharacter,
}

impl CalcError {
    /// The text the engine shows while in this error state.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::Overflow => INFINITY_SENTINEL,
            _ => ERROR_SENTINEL,
        }
    }
}

/// Result of a state-changing engine call.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The state changed as requested.
    Applied,
    /// The call was a no-op: error state, wrong mode, limit reached, nothing pending.
    Ignored,
    /// The call failed and the engine is now showing an error.
    Failed(CalcError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Converts into a `Result`, treating `Ignored` as success.
    pub fn into_result(self) -> Result<(), CalcError> {
        match self {
            Self::Failed(err) => Err(err),
            Self::Applied | Self::Ignored => Ok(()),
        }
    }
}

//! Error taxonomy for controller operations and simulation input validation.

use std::error::Error;
use std::fmt;

use crate::battery::state::SystemState;

/// Errors surfaced by controller operations and the day-cycle simulator.
///
/// All variants are recoverable result values; none is used for ordinary
/// control flow. State transitions are driven by explicit state checks, so an
/// `InvalidStateTransition` means the caller invoked an operation out of
/// order, not that the controller lost track of itself.
#[derive(Debug, Clone, PartialEq)]
pub enum EssError {
    /// An operation requiring a specific state was invoked in another state.
    /// No state mutation occurred.
    InvalidStateTransition {
        /// State the operation requires.
        expected: SystemState,
        /// State the controller was actually in.
        actual: SystemState,
    },
    /// Malformed external input; nothing was run.
    Validation {
        /// Dotted field path (e.g., `"simulation.start_hour"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },
    /// An internal invariant (SOC or voltage bounds) would be violated by a
    /// computed update. The update was not committed.
    NumericBounds {
        /// Name of the quantity that left its declared range.
        quantity: &'static str,
        /// The offending computed value.
        value: f64,
        /// Lower bound of the declared range.
        min: f64,
        /// Upper bound of the declared range.
        max: f64,
    },
}

impl EssError {
    /// Shorthand constructor for validation errors.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for EssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { expected, actual } => {
                write!(f, "invalid state: operation requires {expected}, controller is {actual}")
            }
            Self::Validation { field, message } => {
                write!(f, "validation error: {field} — {message}")
            }
            Self::NumericBounds {
                quantity,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "numeric bounds violation: {quantity} = {value} outside [{min}, {max}]"
                )
            }
        }
    }
}

impl Error for EssError {}

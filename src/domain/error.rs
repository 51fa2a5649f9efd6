// Domain error taxonomy
use thiserror::Error;

/// Caller-input validation failures surfaced by the engine.
///
/// Everything else in the domain layer is a total function over well-formed
/// input: missing aggregates are expressed as absent fields, never as errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported plot type: {0}")]
    UnsupportedPlotType(String),

    #[error("unknown extrapolation method: {0}")]
    UnknownExtrapolationMethod(String),

    #[error("unknown object: {0}")]
    UnknownObject(String),

    #[error("unknown variable '{variable}' on object '{object}'")]
    UnknownVariable { object: String, variable: String },
}

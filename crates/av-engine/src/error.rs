//! Error types for the avalanche engine

use thiserror::Error;

/// Engine error type
///
/// Configuration problems surface from [`crate::GameConfig::validate`] before any
/// spin runs. Contract violations (bad coordinates, malformed state, empty
/// choices) surface at the call site. Ordinary negative outcomes such as a
/// failed wild spawn are never errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Position ({row}, {col}) out of bounds")]
    OutOfBounds { row: usize, col: usize },

    #[error("Invalid grid state: {0}")]
    InvalidGridState(String),

    #[error("Unknown symbol: {0:?}")]
    UnknownSymbol(String),

    #[error("Cannot choose from an empty sequence")]
    EmptyChoice,

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Incomplete paytable: {0}")]
    IncompletePaytable(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid bet: {0}")]
    InvalidBet(f64),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias
pub type EngineResult<T> = Result<T, EngineError>;

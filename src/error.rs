//! Error types for the tour-optimization engine.

use thiserror::Error;

/// Main error type for engine operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The distance oracle reports a dimension of zero.
    #[error("problem has no cities")]
    EmptyProblem,

    /// A full-path assignment had the wrong number of stops.
    #[error("path length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// A distance computation hit an unset (sentinel) stop.
    #[error("unset stop at position {0}")]
    UnsetStop(usize),

    /// No finite-cost closed tour exists for this instance.
    #[error("no feasible tour exists")]
    NoTour,

    /// Invalid solver configuration, detected before the first iteration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A property field name not exposed by this solver.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    /// A property value of the wrong kind for the named field.
    #[error("invalid value for property `{field}`: expected {expected}")]
    PropertyType {
        field: String,
        expected: &'static str,
    },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the tabular-rl engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A decay schedule was constructed with inconsistent bounds.
    #[error("invalid decay schedule: {0}")]
    Decay(&'static str),

    /// An action index was outside the environment's declared action set.
    #[error("invalid action index {index} for action set of size {len}")]
    InvalidAction { index: usize, len: usize },

    /// A snapshot's environment dimensions did not match the live environment.
    #[error("snapshot dimensions {found:?} do not match environment {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A snapshot's action count did not match the live agent.
    #[error("snapshot action count {found} does not match agent {expected}")]
    ActionCountMismatch { expected: usize, found: usize },

    /// A snapshot was structurally invalid.
    #[error("malformed snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    /// Underlying I/O failure (snapshot file helpers).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure (snapshot file helpers).
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

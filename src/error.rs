//! Error types for matrix multiplication.

use thiserror::Error;

use crate::config::VectorIsa;

/// Result type for matmul operations.
pub type Result<T> = std::result::Result<T, MatmulError>;

/// Errors that can occur while building matrices or running a strategy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatmulError {
    /// `A.cols != B.rows`. Raised before any computation, by every strategy.
    #[error("incompatible dimensions: A is {a_rows}×{a_cols}, B is {b_rows}×{b_cols}")]
    IncompatibleDimensions {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },

    /// The requested vector backend is not supported by this CPU or target.
    #[error("vector instructions unavailable: {0} is not supported here")]
    VectorUnavailable(VectorIsa),

    /// Element buffer does not match the declared shape, or a dimension is zero.
    #[error("invalid shape: {rows}×{cols} matrix cannot hold {len} elements")]
    InvalidShape { rows: usize, cols: usize, len: usize },

    /// A tunable is out of range or could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl From<rayon::ThreadPoolBuildError> for MatmulError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        MatmulError::WorkerPool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_dimensions_message() {
        let err = MatmulError::IncompatibleDimensions {
            a_rows: 10,
            a_cols: 20,
            b_rows: 30,
            b_cols: 10,
        };
        assert_eq!(
            err.to_string(),
            "incompatible dimensions: A is 10×20, B is 30×10"
        );
    }

    #[test]
    fn test_vector_unavailable_message() {
        let err = MatmulError::VectorUnavailable(VectorIsa::Avx512);
        assert_eq!(
            err.to_string(),
            "vector instructions unavailable: avx512 is not supported here"
        );
    }

    #[test]
    fn test_errors_are_distinct() {
        let dims = MatmulError::IncompatibleDimensions {
            a_rows: 1,
            a_cols: 2,
            b_rows: 3,
            b_cols: 4,
        };
        assert_ne!(dims, MatmulError::VectorUnavailable(VectorIsa::Avx2));
    }
}

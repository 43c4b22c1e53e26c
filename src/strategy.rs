//! The seven strategies behind one `multiply` entry point.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::blocked::simple_simd::matmul_vectorized;
use crate::blocked::tiled::matmul_blocked;
use crate::config::MatmulConfig;
use crate::error::{MatmulError, Result};
use crate::matrix::Matrix;
use crate::matrix::naive_ijk::matmul_reference;
use crate::matrix::naive_ikj::matmul_access_order;
use crate::recursive::matmul_divide_conquer;
use crate::threaded::combined::matmul_combined;
use crate::threaded::row_bands::matmul_data_parallel;

/// One algorithm for `C = A · B`. All variants take the same inputs, return
/// the same shape, and agree with [`Strategy::Reference`] within floating
/// point tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Naive i-j-k triple loop. Ground truth.
    Reference,
    /// i-k-j loop interchange.
    AccessOrder,
    /// i-k-j with output rows split across workers.
    DataParallel,
    /// Cache tiling of i, j and k.
    Blocking,
    /// Quadrant recursion with a vector leaf kernel.
    DivideConquer,
    /// SIMD lanes across output columns.
    Vectorized,
    /// Tiling + SIMD + workers.
    Combined,
}

impl Strategy {
    /// Every strategy, slowest-expected first.
    pub const ALL: [Strategy; 7] = [
        Strategy::Reference,
        Strategy::AccessOrder,
        Strategy::DataParallel,
        Strategy::Blocking,
        Strategy::DivideConquer,
        Strategy::Vectorized,
        Strategy::Combined,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Reference => "reference",
            Strategy::AccessOrder => "access-order",
            Strategy::DataParallel => "data-parallel",
            Strategy::Blocking => "blocking",
            Strategy::DivideConquer => "divide-conquer",
            Strategy::Vectorized => "vectorized",
            Strategy::Combined => "combined",
        }
    }

    /// Whether the strategy fails with
    /// [`MatmulError::VectorUnavailable`] when the requested ISA is missing.
    pub fn needs_vector_isa(self) -> bool {
        matches!(self, Strategy::Vectorized | Strategy::Combined)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = MatmulError;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MatmulError::InvalidConfig(format!("unknown strategy `{s}`")))
    }
}

/// `C = A · B` with `strategy` and the default config.
///
/// # Example
///
/// ```
/// use matmul::{Matrix, Strategy, multiply};
///
/// let a = Matrix::filled(3, 3, 1.0);
/// let c = multiply(Strategy::Combined, &a, &Matrix::identity(3)).unwrap();
/// assert_eq!(c, a);
/// ```
///
/// # Errors
///
/// [`MatmulError::IncompatibleDimensions`] if `a.cols() != b.rows()`; see
/// [`multiply_with`] for the rest.
pub fn multiply(strategy: Strategy, a: &Matrix, b: &Matrix) -> Result<Matrix> {
    multiply_with(strategy, a, b, &MatmulConfig::default())
}

/// `C = A · B` with `strategy` and an explicit config.
///
/// # Errors
///
/// - [`MatmulError::IncompatibleDimensions`] if `a.cols() != b.rows()`,
///   checked before anything else
/// - [`MatmulError::InvalidConfig`] for a zero block size, threshold or
///   worker count
/// - [`MatmulError::VectorUnavailable`] from the vectorized and combined
///   strategies when the requested ISA is not supported
/// - [`MatmulError::WorkerPool`] if divide-and-conquer cannot start its pool
pub fn multiply_with(
    strategy: Strategy,
    a: &Matrix,
    b: &Matrix,
    config: &MatmulConfig,
) -> Result<Matrix> {
    debug!(
        %strategy,
        a_rows = a.rows(),
        a_cols = a.cols(),
        b_rows = b.rows(),
        b_cols = b.cols(),
        "multiply"
    );

    match strategy {
        Strategy::Reference => matmul_reference(a, b),
        Strategy::AccessOrder => matmul_access_order(a, b),
        Strategy::DataParallel => matmul_data_parallel(a, b, config),
        Strategy::Blocking => matmul_blocked(a, b, config),
        Strategy::DivideConquer => matmul_divide_conquer(a, b, config),
        Strategy::Vectorized => matmul_vectorized(a, b, config),
        Strategy::Combined => matmul_combined(a, b, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
        }
        assert!("strassen".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_vector_strategies() {
        let vector: Vec<_> = Strategy::ALL
            .into_iter()
            .filter(|s| s.needs_vector_isa())
            .collect();
        assert_eq!(vector, vec![Strategy::Vectorized, Strategy::Combined]);
    }
}

//! SIMD matmul without cache blocking or threads.

use tracing::debug;

use crate::config::MatmulConfig;
use crate::error::Result;
use crate::kernels::Backend;
use crate::matrix::{Matrix, check_dims};

/// Vectorized multiplication over `W` output columns at a time.
///
/// For each row i and each group of `W` adjacent columns (W = lane count of
/// the selected ISA), a register accumulator collects
/// `splat(A[i,k]) * B[k, j..j+W]` for every k, then is stored into C. When
/// fewer than `W` columns remain, a scalar loop finishes the row.
///
/// Single-threaded and unblocked, so it shows what the lanes alone buy.
///
/// # Errors
///
/// - [`IncompatibleDimensions`](crate::MatmulError::IncompatibleDimensions)
///   if `a.cols() != b.rows()`
/// - [`VectorUnavailable`](crate::MatmulError::VectorUnavailable) if the
///   requested vector ISA is not supported by `config.cpu`
pub fn matmul_vectorized(a: &Matrix, b: &Matrix, config: &MatmulConfig) -> Result<Matrix> {
    check_dims(a, b)?;
    let backend = Backend::for_config(config)?;

    let (m, k) = a.shape();
    let n = b.cols();
    debug!(isa = %backend.isa(), lanes = backend.lanes(), tail = n % backend.lanes(), "vectorized kernel");

    let mut c = Matrix::zeros(m, n);
    backend.dot_rows(a.as_slice(), b.as_slice(), c.as_mut_slice(), k, n);
    Ok(c)
}

//! Blocked + SIMD + multi-threaded multiplication.

use tracing::debug;

use crate::config::MatmulConfig;
use crate::error::Result;
use crate::kernels::Backend;
use crate::matrix::{Matrix, check_dims};
use crate::threaded::for_each_band;

/// Everything at once: cache blocking, SIMD inner loop, and threads.
///
/// Output rows are cut into bands of `config.block_size` rows (the i-blocks)
/// and the bands are spread over `config.workers` threads. Inside a band the
/// j-blocks and k-blocks are walked in order, and each row segment of a
/// block is updated with the vector `axpy` kernel, lane groups first and the
/// scalar tail after.
///
/// The output is allocated zeroed before any worker starts, and a band's
/// k-blocks accumulate sequentially on the thread that owns it.
///
/// # Errors
///
/// - [`IncompatibleDimensions`](crate::MatmulError::IncompatibleDimensions)
///   if `a.cols() != b.rows()`
/// - [`VectorUnavailable`](crate::MatmulError::VectorUnavailable) if the
///   requested vector ISA is not supported by `config.cpu`
pub fn matmul_combined(a: &Matrix, b: &Matrix, config: &MatmulConfig) -> Result<Matrix> {
    check_dims(a, b)?;
    config.validate()?;
    let backend = Backend::for_config(config)?;

    let (m, k) = a.shape();
    let n = b.cols();
    let block = config.block_size;
    debug!(
        isa = %backend.isa(),
        block,
        workers = config.workers,
        "combined kernel"
    );

    let mut c = Matrix::zeros(m, n);
    let b = b.as_slice();
    for_each_band(
        a.as_slice(),
        c.as_mut_slice(),
        k,
        n,
        block,
        config.workers,
        |a_band, c_band| backend.blocked_band(a_band, b, c_band, k, n, block),
    );
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorIsa;
    use crate::cpu::CpuFeatures;
    use crate::error::MatmulError;
    use crate::matrix::naive_ijk::matmul_reference;

    fn assert_close(expected: &Matrix, actual: &Matrix, name: &str) {
        assert_eq!(expected.shape(), actual.shape(), "{}: shape mismatch", name);
        for (idx, (e, a)) in expected.as_slice().iter().zip(actual.as_slice()).enumerate() {
            assert!(
                (e - a).abs() < 1e-9,
                "{}: mismatch at {}: expected {}, got {}",
                name,
                idx,
                e,
                a
            );
        }
    }

    #[test]
    fn test_block_edges() {
        for isa in [VectorIsa::Portable4, VectorIsa::Portable8] {
            for block in [1, 4, 7, 32] {
                let config = MatmulConfig::default()
                    .with_vector_isa(isa)
                    .with_block_size(block)
                    .with_workers(3);
                for (m, k, n) in [(33, 31, 35), (8, 8, 8), (1, 40, 10)] {
                    let a = Matrix::from_fn(m, k, |i, j| ((i * k + j) % 10) as f64);
                    let b = Matrix::from_fn(k, n, |i, j| ((i * n + j) % 10) as f64);
                    assert_close(
                        &matmul_reference(&a, &b).unwrap(),
                        &matmul_combined(&a, &b, &config).unwrap(),
                        &format!("{} block={} {}x{}x{}", isa, block, m, k, n),
                    );
                }
            }
        }
    }

    #[test]
    fn test_refuses_missing_vector_isa() {
        let config = MatmulConfig::default()
            .with_cpu(CpuFeatures::none())
            .with_vector_isa(VectorIsa::Avx2);
        let a = Matrix::identity(4);
        assert_eq!(
            matmul_combined(&a, &a, &config),
            Err(MatmulError::VectorUnavailable(VectorIsa::Avx2))
        );
    }

    #[test]
    fn test_dimension_error_comes_first() {
        let config = MatmulConfig::default()
            .with_cpu(CpuFeatures::none())
            .with_vector_isa(VectorIsa::Avx512);
        let err = matmul_combined(&Matrix::zeros(2, 3), &Matrix::zeros(2, 3), &config).unwrap_err();
        assert!(matches!(err, MatmulError::IncompatibleDimensions { .. }));
    }
}

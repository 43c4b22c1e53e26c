//! Recursive divide-and-conquer multiplication.
//!
//! A, B and C are each split into four quadrants by halving both
//! dimensions, giving the 8-multiply recurrence
//!
//! ```text
//! C11 = A11·B11 + A12·B21    C12 = A11·B12 + A12·B22
//! C21 = A21·B11 + A22·B21    C22 = A21·B12 + A22·B22
//! ```
//!
//! The four output quadrants are disjoint and run in parallel on a rayon
//! pool. The two products feeding one quadrant both accumulate into it, so
//! they run one after the other on the same task.

use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::config::MatmulConfig;
use crate::error::Result;
use crate::kernels::Backend;
use crate::matrix::view::{RowsMut, View};
use crate::matrix::{Matrix, check_dims};

/// Divide-and-conquer multiplication.
///
/// Recursion stops as soon as any of the three dimensions of the current
/// sub-problem is at or below `config.dc_threshold`; the leaf runs the
/// vector i-k-j kernel on the sub-views. Odd sizes split unevenly (the top
/// and left halves take the floor), so any shape works, not only powers of
/// two.
///
/// The leaf kernel uses the configured vector ISA when the CPU supports it
/// and portable lanes otherwise; this strategy never fails on a missing
/// vector capability.
pub fn matmul_divide_conquer(a: &Matrix, b: &Matrix, config: &MatmulConfig) -> Result<Matrix> {
    check_dims(a, b)?;
    config.validate()?;

    let backend = Backend::for_config(config).unwrap_or_else(|err| {
        debug!(%err, "divide-and-conquer leaves fall back to portable lanes");
        Backend::Portable4
    });

    let (m, k) = a.shape();
    let n = b.cols();
    let threshold = config.dc_threshold;
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;

    let mut c = Matrix::zeros(m, n);
    {
        let av = View::full(a.as_slice(), m, k);
        let bv = View::full(b.as_slice(), k, n);
        let cv = RowsMut::full(c.as_mut_slice(), n);
        pool.install(|| recurse(av, bv, cv, threshold, backend));
    }
    Ok(c)
}

fn recurse(a: View<'_>, b: View<'_>, mut c: RowsMut<'_>, threshold: usize, backend: Backend) {
    let (m, k, n) = (a.rows(), a.cols(), b.cols());

    if m <= threshold || k <= threshold || n <= threshold {
        backend.accumulate_views(a, b, &mut c);
        return;
    }

    // threshold >= 1, so every dimension here is >= 2 and no half is empty.
    let (m2, k2, n2) = (m / 2, k / 2, n / 2);
    let [a11, a12, a21, a22] = a.quadrants(m2, k2);
    let [b11, b12, b21, b22] = b.quadrants(k2, n2);
    let [c11, c12, c21, c22] = c.quadrants(m2, n2);

    rayon::join(
        || {
            rayon::join(
                || product_pair(a11, b11, a12, b21, c11, threshold, backend),
                || product_pair(a11, b12, a12, b22, c12, threshold, backend),
            )
        },
        || {
            rayon::join(
                || product_pair(a21, b11, a22, b21, c21, threshold, backend),
                || product_pair(a21, b12, a22, b22, c22, threshold, backend),
            )
        },
    );
}

/// `out += x1·y1` then `out += x2·y2`, in that order.
fn product_pair(
    x1: View<'_>,
    y1: View<'_>,
    x2: View<'_>,
    y2: View<'_>,
    mut out: RowsMut<'_>,
    threshold: usize,
    backend: Backend,
) {
    recurse(x1, y1, out.reborrow(), threshold, backend);
    recurse(x2, y2, out, threshold, backend);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorIsa;
    use crate::cpu::CpuFeatures;
    use crate::matrix::naive_ijk::matmul_reference;

    fn assert_close(expected: &Matrix, actual: &Matrix, name: &str) {
        assert_eq!(expected.shape(), actual.shape(), "{}: shape mismatch", name);
        for (idx, (e, a)) in expected.as_slice().iter().zip(actual.as_slice()).enumerate() {
            assert!(
                (e - a).abs() <= 1e-9 * e.abs().max(1.0),
                "{}: mismatch at {}: expected {}, got {}",
                name,
                idx,
                e,
                a
            );
        }
    }

    #[test]
    fn test_power_of_two_and_uneven_sizes() {
        for threshold in [1, 2, 5, 16] {
            let config = MatmulConfig::default().with_dc_threshold(threshold).with_workers(4);
            for size in [1, 2, 7, 16, 31, 32, 33, 64] {
                let a = Matrix::from_fn(size, size, |i, j| ((i * 31 + j * 17) % 11) as f64 - 5.0);
                let b = Matrix::from_fn(size, size, |i, j| ((i * 13 + j * 7) % 9) as f64 * 0.5);
                assert_close(
                    &matmul_reference(&a, &b).unwrap(),
                    &matmul_divide_conquer(&a, &b, &config).unwrap(),
                    &format!("threshold={} size={}", threshold, size),
                );
            }
        }
    }

    #[test]
    fn test_rectangular_operands() {
        let config = MatmulConfig::default().with_dc_threshold(3);
        for (m, k, n) in [(9, 20, 5), (20, 9, 14), (17, 4, 23)] {
            let a = Matrix::from_fn(m, k, |i, j| (i + 2 * j) as f64);
            let b = Matrix::from_fn(k, n, |i, j| (3 * i + j) as f64 % 7.0);
            assert_close(
                &matmul_reference(&a, &b).unwrap(),
                &matmul_divide_conquer(&a, &b, &config).unwrap(),
                &format!("{}x{}x{}", m, k, n),
            );
        }
    }

    #[test]
    fn test_runs_without_vector_capability() {
        let config = MatmulConfig::default()
            .with_cpu(CpuFeatures::none())
            .with_vector_isa(VectorIsa::Avx512)
            .with_dc_threshold(4);
        let a = Matrix::identity(10).scaled(3.0);
        let c = matmul_divide_conquer(&a, &a, &config).unwrap();
        assert_eq!(c, Matrix::identity(10).scaled(9.0));
    }
}

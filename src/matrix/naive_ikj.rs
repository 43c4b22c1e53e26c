use crate::error::Result;
use crate::matrix::{Matrix, check_dims};

/// Loop-interchanged multiplication, i-k-j order: `C = A · B`.
///
/// Swapping the j and k loops makes the innermost loop walk a row of B and
/// a row of C with stride 1. `A[i,k]` is loaded once per (i, k) pair.
/// Summation order differs from [`matmul_reference`](super::naive_ijk::matmul_reference),
/// so compare with a tolerance, not `==`.
pub fn matmul_access_order(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    check_dims(a, b)?;

    let (m, k) = a.shape();
    let n = b.cols();
    let mut c = Matrix::zeros(m, n);
    ikj_rows(a.as_slice(), b.as_slice(), c.as_mut_slice(), k, n);
    Ok(c)
}

/// `c_rows += a_rows · b` in i-k-j order.
///
/// `a_rows` holds the rows of A that produce `c_rows` (`k` columns each);
/// `b` is all of B (`k × n`). Used on a whole matrix or on one worker's band.
pub(crate) fn ikj_rows(a_rows: &[f64], b: &[f64], c_rows: &mut [f64], k: usize, n: usize) {
    debug_assert_eq!(a_rows.len() / k, c_rows.len() / n);
    debug_assert_eq!(b.len(), k * n);

    for (a_row, c_row) in a_rows.chunks_exact(k).zip(c_rows.chunks_exact_mut(n)) {
        for (&a_ip, b_row) in a_row.iter().zip(b.chunks_exact(n)) {
            for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
}

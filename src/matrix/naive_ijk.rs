use crate::error::Result;
use crate::matrix::{Matrix, check_dims};

/// Reference multiplication, i-j-k loop order: `C = A · B`.
///
/// The textbook triple loop. The inner loop walks B down a column (stride
/// `n`), so nearly every access misses cache. Each output cell is summed in
/// a local and written once.
///
/// This is the ground truth every other strategy is compared against.
///
/// # Errors
///
/// [`MatmulError::IncompatibleDimensions`](crate::MatmulError) if
/// `a.cols() != b.rows()`.
pub fn matmul_reference(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    check_dims(a, b)?;

    let (m, k) = a.shape();
    let n = b.cols();
    let (a, b) = (a.as_slice(), b.as_slice());

    let mut c = Matrix::zeros(m, n);
    let out = c.as_mut_slice();
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            out[i * n + j] = sum;
        }
    }
    Ok(c)
}

//! Data-parallel i-k-j multiplication.

use crate::config::MatmulConfig;
use crate::error::Result;
use crate::matrix::naive_ikj::ikj_rows;
use crate::matrix::{Matrix, check_dims};
use crate::threaded::for_each_band;

/// i-k-j multiplication with the output rows split across workers.
///
/// Rows are divided into `config.workers` contiguous bands of
/// `ceil(rows / workers)` rows; a matrix with fewer rows than workers uses
/// one worker per row. Each worker runs the same kernel as
/// [`matmul_access_order`](crate::matmul_access_order) on its own band.
pub fn matmul_data_parallel(a: &Matrix, b: &Matrix, config: &MatmulConfig) -> Result<Matrix> {
    check_dims(a, b)?;
    config.validate()?;

    let (m, k) = a.shape();
    let n = b.cols();
    let workers = config.workers.min(m);
    let rows_per_worker = m.div_ceil(workers);

    let mut c = Matrix::zeros(m, n);
    let b = b.as_slice();
    for_each_band(
        a.as_slice(),
        c.as_mut_slice(),
        k,
        n,
        rows_per_worker,
        workers,
        |a_band, c_band| ikj_rows(a_band, b, c_band, k, n),
    );
    Ok(c)
}

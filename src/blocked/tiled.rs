//! Cache-blocked (tiled) multiplication.

use crate::config::MatmulConfig;
use crate::error::Result;
use crate::kernels::for_each_tile;
use crate::matrix::{Matrix, check_dims};
use crate::threaded::for_each_band;

/// Tiled multiplication with block edge `T = config.block_size`.
///
/// The i, j and k ranges are cut into `T`-sized blocks so that one block of
/// A, B and C stays in cache while it is reused. For every block triple the
/// i-k-j kernel runs on `[i0, min(i0+T, m)) × [k0, min(k0+T, k)) ×
/// [j0, min(j0+T, n))`.
///
/// Partial sums from successive k-blocks land in the same output block, so
/// the k-block loop stays sequential. The i-blocks are independent and are
/// spread over `config.workers` threads.
pub fn matmul_blocked(a: &Matrix, b: &Matrix, config: &MatmulConfig) -> Result<Matrix> {
    check_dims(a, b)?;
    config.validate()?;

    let (m, k) = a.shape();
    let n = b.cols();
    let block = config.block_size;

    let mut c = Matrix::zeros(m, n);
    let b = b.as_slice();
    for_each_band(
        a.as_slice(),
        c.as_mut_slice(),
        k,
        n,
        block,
        config.workers,
        |a_band, c_band| tile_band(a_band, b, c_band, k, n, block),
    );
    Ok(c)
}

/// All j-blocks and k-blocks for one i-block, scalar inner loop.
fn tile_band(a_band: &[f64], b: &[f64], c_band: &mut [f64], k: usize, n: usize, block: usize) {
    for_each_tile(a_band, b, c_band, k, n, block, |a_ip, b_seg, c_seg| {
        for (c_ij, &b_pj) in c_seg.iter_mut().zip(b_seg) {
            *c_ij += a_ip * b_pj;
        }
    });
}

//! Multi-threaded strategies.
//!
//! Output rows are cut into bands and each worker gets a contiguous run of
//! bands as exclusive `&mut` slices. Workers only read A and B, and no two
//! workers ever see the same output row, so nothing is locked. The scope
//! joins every worker before returning.
//!
//! Available implementations:
//! - `row_bands`: one band of rows per worker, i-k-j kernel
//! - `combined`: block-row bands, tiled, SIMD inner loop

pub mod combined;
pub mod row_bands;

use std::thread;

/// Run `f(a_band, c_band)` over bands of `band_rows` rows on up to
/// `workers` threads.
///
/// `a` is `m × k` and `c` is `m × n`; band `t` pairs rows
/// `[t * band_rows, (t + 1) * band_rows)` of both. Bands are handed out in
/// contiguous runs, one run per worker.
pub(crate) fn for_each_band<F>(
    a: &[f64],
    c: &mut [f64],
    k: usize,
    n: usize,
    band_rows: usize,
    workers: usize,
    f: F,
) where
    F: Fn(&[f64], &mut [f64]) + Sync,
{
    debug_assert!(band_rows > 0);
    // A band taller than the matrix is the whole matrix; clamping also keeps
    // `band_rows * k` and `band_rows * n` within the buffer lengths.
    let m = c.len() / n;
    let band_rows = band_rows.clamp(1, m.max(1));
    let bands: Vec<(&[f64], &mut [f64])> = a
        .chunks(band_rows * k)
        .zip(c.chunks_mut(band_rows * n))
        .collect();

    let workers = workers.clamp(1, bands.len().max(1));
    if workers == 1 {
        for (a_band, c_band) in bands {
            f(a_band, c_band);
        }
        return;
    }

    let per_worker = bands.len().div_ceil(workers);
    let f = &f;
    let mut bands = bands.into_iter();

    thread::scope(|s| {
        loop {
            let run: Vec<_> = bands.by_ref().take(per_worker).collect();
            if run.is_empty() {
                break;
            }
            s.spawn(move || {
                for (a_band, c_band) in run {
                    f(a_band, c_band);
                }
            });
        }
    });
}

//! AVX2 + FMA lanes: 4 × f64 per YMM register.

use std::arch::x86_64::*;

use super::Lanes;
use crate::matrix::view::{RowsMut, View};

/// Four f64 lanes in a 256-bit YMM register.
///
/// Loads and stores are unaligned (`loadu`/`storeu`), so caller buffers need
/// no particular alignment.
#[derive(Debug, Clone, Copy)]
pub struct Avx2;

// SAFETY: every method requires AVX2 + FMA, which the trait contract puts on
// the caller. Loads and stores touch exactly `src[..4]` / `dst[..4]`.
#[allow(unsafe_op_in_unsafe_fn)]
unsafe impl Lanes for Avx2 {
    const WIDTH: usize = 4;
    type Reg = __m256d;

    #[inline(always)]
    unsafe fn zero() -> __m256d {
        _mm256_setzero_pd()
    }

    #[inline(always)]
    unsafe fn splat(x: f64) -> __m256d {
        _mm256_set1_pd(x)
    }

    #[inline(always)]
    unsafe fn load(src: &[f64]) -> __m256d {
        debug_assert!(src.len() >= 4);
        _mm256_loadu_pd(src.as_ptr())
    }

    #[inline(always)]
    unsafe fn fma(a: __m256d, b: __m256d, acc: __m256d) -> __m256d {
        _mm256_fmadd_pd(a, b, acc)
    }

    #[inline(always)]
    unsafe fn store(dst: &mut [f64], v: __m256d) {
        debug_assert!(dst.len() >= 4);
        _mm256_storeu_pd(dst.as_mut_ptr(), v)
    }
}

/// # Safety
///
/// CPU must support AVX2 and FMA.
#[target_feature(enable = "avx2,fma")]
pub(crate) unsafe fn dot_rows(a_rows: &[f64], b: &[f64], c_rows: &mut [f64], k: usize, n: usize) {
    unsafe { super::dot_rows::<Avx2>(a_rows, b, c_rows, k, n) }
}

/// # Safety
///
/// CPU must support AVX2 and FMA.
#[target_feature(enable = "avx2,fma")]
pub(crate) unsafe fn blocked_band(
    a_band: &[f64],
    b: &[f64],
    c_band: &mut [f64],
    k: usize,
    n: usize,
    block: usize,
) {
    unsafe { super::blocked_band::<Avx2>(a_band, b, c_band, k, n, block) }
}

/// # Safety
///
/// CPU must support AVX2 and FMA.
#[target_feature(enable = "avx2,fma")]
pub(crate) unsafe fn accumulate_views(a: View<'_>, b: View<'_>, c: &mut RowsMut<'_>) {
    unsafe { super::accumulate_views::<Avx2>(a, b, c) }
}

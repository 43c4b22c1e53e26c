//! AVX-512 + FMA lanes: 8 × f64 per ZMM register.

use std::arch::x86_64::*;

use super::Lanes;
use crate::matrix::view::{RowsMut, View};

/// Eight f64 lanes in a 512-bit ZMM register. Twice the work per
/// instruction of [`Avx2`](super::avx2::Avx2), on Skylake-X and later.
#[derive(Debug, Clone, Copy)]
pub struct Avx512;

// SAFETY: every method requires AVX-512F + FMA, which the trait contract
// puts on the caller. Loads and stores touch exactly `src[..8]` / `dst[..8]`.
#[allow(unsafe_op_in_unsafe_fn)]
unsafe impl Lanes for Avx512 {
    const WIDTH: usize = 8;
    type Reg = __m512d;

    #[inline(always)]
    unsafe fn zero() -> __m512d {
        _mm512_setzero_pd()
    }

    #[inline(always)]
    unsafe fn splat(x: f64) -> __m512d {
        _mm512_set1_pd(x)
    }

    #[inline(always)]
    unsafe fn load(src: &[f64]) -> __m512d {
        debug_assert!(src.len() >= 8);
        _mm512_loadu_pd(src.as_ptr())
    }

    #[inline(always)]
    unsafe fn fma(a: __m512d, b: __m512d, acc: __m512d) -> __m512d {
        _mm512_fmadd_pd(a, b, acc)
    }

    #[inline(always)]
    unsafe fn store(dst: &mut [f64], v: __m512d) {
        debug_assert!(dst.len() >= 8);
        _mm512_storeu_pd(dst.as_mut_ptr(), v)
    }
}

/// # Safety
///
/// CPU must support AVX-512F and FMA.
#[target_feature(enable = "avx512f,fma")]
pub(crate) unsafe fn dot_rows(a_rows: &[f64], b: &[f64], c_rows: &mut [f64], k: usize, n: usize) {
    unsafe { super::dot_rows::<Avx512>(a_rows, b, c_rows, k, n) }
}

/// # Safety
///
/// CPU must support AVX-512F and FMA.
#[target_feature(enable = "avx512f,fma")]
pub(crate) unsafe fn blocked_band(
    a_band: &[f64],
    b: &[f64],
    c_band: &mut [f64],
    k: usize,
    n: usize,
    block: usize,
) {
    unsafe { super::blocked_band::<Avx512>(a_band, b, c_band, k, n, block) }
}

/// # Safety
///
/// CPU must support AVX-512F and FMA.
#[target_feature(enable = "avx512f,fma")]
pub(crate) unsafe fn accumulate_views(a: View<'_>, b: View<'_>, c: &mut RowsMut<'_>) {
    unsafe { super::accumulate_views::<Avx512>(a, b, c) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avx512_lanes() {
        if !(is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("fma")) {
            println!("Skipping - AVX-512 not available");
            return;
        }

        let src: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let mut dst = [0.0; 9];

        unsafe {
            let v = Avx512::fma(Avx512::splat(2.0), Avx512::load(&src[1..]), Avx512::zero());
            Avx512::store(&mut dst[..8], v);
        }

        assert_eq!(dst, [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 0.0]);
    }
}

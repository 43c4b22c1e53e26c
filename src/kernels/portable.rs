//! Plain-Rust lanes for CPUs (or targets) without a supported vector ISA.

use super::Lanes;

/// `W` f64 lanes held in an array. The compiler is free to auto-vectorize
/// the per-lane loops; nothing here needs a CPU feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct Portable<const W: usize>;

// SAFETY: only safe Rust inside; `load`/`store` index through slices.
unsafe impl<const W: usize> Lanes for Portable<W> {
    const WIDTH: usize = W;
    type Reg = [f64; W];

    #[inline(always)]
    unsafe fn zero() -> [f64; W] {
        [0.0; W]
    }

    #[inline(always)]
    unsafe fn splat(x: f64) -> [f64; W] {
        [x; W]
    }

    #[inline(always)]
    unsafe fn load(src: &[f64]) -> [f64; W] {
        let mut r = [0.0; W];
        r.copy_from_slice(&src[..W]);
        r
    }

    #[inline(always)]
    unsafe fn fma(a: [f64; W], b: [f64; W], acc: [f64; W]) -> [f64; W] {
        let mut r = acc;
        for l in 0..W {
            r[l] += a[l] * b[l];
        }
        r
    }

    #[inline(always)]
    unsafe fn store(dst: &mut [f64], v: [f64; W]) {
        dst[..W].copy_from_slice(&v);
    }
}

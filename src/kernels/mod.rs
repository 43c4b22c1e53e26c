//! SIMD lanes and the vector kernels built on them.
//!
//! Every vector instruction goes through the narrow [`Lanes`] interface:
//! zero, splat (broadcast), unaligned load, fused multiply-add and unaligned
//! store over a fixed lane count. The kernels below are written once against
//! that interface and instantiated per instruction set:
//!
//! - [`Portable`]: plain Rust arrays, 4 or 8 lanes, runs everywhere
//! - `Avx2`: 4 × f64, needs AVX2 + FMA
//! - `Avx512`: 8 × f64, needs AVX-512F + FMA
//!
//! Columns left over after the last full lane group always go through the
//! same scalar loop, whatever the instruction set.

pub mod portable;

#[cfg(target_arch = "x86_64")]
pub mod avx2;
#[cfg(target_arch = "x86_64")]
pub mod avx512;

pub use portable::Portable;

use crate::config::{MatmulConfig, VectorIsa};
use crate::cpu::CpuFeatures;
use crate::error::{MatmulError, Result};
use crate::matrix::view::{RowsMut, View};

/// A fixed-width vector of f64 lanes.
///
/// # Safety
///
/// Implementors may use instructions the CPU has to support. Callers of the
/// methods must have checked that support (see [`CpuFeatures`]), and must
/// pass slices holding at least `WIDTH` elements to `load` and `store`.
pub unsafe trait Lanes {
    const WIDTH: usize;
    type Reg: Copy;

    unsafe fn zero() -> Self::Reg;
    unsafe fn splat(x: f64) -> Self::Reg;
    unsafe fn load(src: &[f64]) -> Self::Reg;
    /// `a * b + acc`
    unsafe fn fma(a: Self::Reg, b: Self::Reg, acc: Self::Reg) -> Self::Reg;
    unsafe fn store(dst: &mut [f64], v: Self::Reg);
}

/// `y += alpha * x`, lane groups first, scalar tail after.
///
/// # Safety
///
/// The CPU must support `L`'s instructions.
#[inline(always)]
pub unsafe fn axpy<L: Lanes>(alpha: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());

    unsafe {
        let va = L::splat(alpha);
        let mut ys = y.chunks_exact_mut(L::WIDTH);
        let mut xs = x.chunks_exact(L::WIDTH);
        for (yc, xc) in (&mut ys).zip(&mut xs) {
            let v = L::fma(va, L::load(xc), L::load(yc));
            L::store(yc, v);
        }
        for (yj, &xj) in ys.into_remainder().iter_mut().zip(xs.remainder()) {
            *yj += alpha * xj;
        }
    }
}

/// `c_rows = a_rows · b` with a register accumulator per lane group.
///
/// For each row and each group of `WIDTH` output columns, `A[i,p]` is
/// broadcast and multiplied against `WIDTH` consecutive elements of row p of
/// B, for every p. The last `n % WIDTH` columns are summed by a scalar loop.
/// `c_rows` is overwritten, not accumulated into.
///
/// # Safety
///
/// The CPU must support `L`'s instructions.
#[inline(always)]
pub(crate) unsafe fn dot_rows<L: Lanes>(
    a_rows: &[f64],
    b: &[f64],
    c_rows: &mut [f64],
    k: usize,
    n: usize,
) {
    let main = n - n % L::WIDTH;

    for (a_row, c_row) in a_rows.chunks_exact(k).zip(c_rows.chunks_exact_mut(n)) {
        for j in (0..main).step_by(L::WIDTH) {
            unsafe {
                let mut acc = L::zero();
                for (b_row, &a_ip) in b.chunks_exact(n).zip(a_row) {
                    acc = L::fma(L::splat(a_ip), L::load(&b_row[j..j + L::WIDTH]), acc);
                }
                L::store(&mut c_row[j..j + L::WIDTH], acc);
            }
        }

        for j in main..n {
            let mut sum = 0.0;
            for (b_row, &a_ip) in b.chunks_exact(n).zip(a_row) {
                sum += a_ip * b_row[j];
            }
            c_row[j] = sum;
        }
    }
}

/// Walk one band of at most `block` rows tile by tile: j-blocks, then
/// k-blocks in increasing order, then the rows of the band. For every `p` of
/// a k-block, `update(A[i,p], B[p, j0..j1], C[i, j0..j1])` must apply
/// `c_seg += a_ip * b_seg`.
///
/// Shared by the scalar blocking strategy and the vector combined kernel.
#[inline(always)]
pub(crate) fn for_each_tile<F>(
    a_band: &[f64],
    b: &[f64],
    c_band: &mut [f64],
    k: usize,
    n: usize,
    block: usize,
    mut update: F,
) where
    F: FnMut(f64, &[f64], &mut [f64]),
{
    for j0 in (0..n).step_by(block) {
        let j1 = j0 + block.min(n - j0);
        for k0 in (0..k).step_by(block) {
            let k1 = k0 + block.min(k - k0);
            for (a_row, c_row) in a_band.chunks_exact(k).zip(c_band.chunks_exact_mut(n)) {
                let c_seg = &mut c_row[j0..j1];
                for p in k0..k1 {
                    update(a_row[p], &b[p * n + j0..p * n + j1], c_seg);
                }
            }
        }
    }
}

/// Tiled `c_band += a_band · b` for one band, with [`axpy`] on each row
/// segment.
///
/// # Safety
///
/// The CPU must support `L`'s instructions.
#[inline(always)]
pub(crate) unsafe fn blocked_band<L: Lanes>(
    a_band: &[f64],
    b: &[f64],
    c_band: &mut [f64],
    k: usize,
    n: usize,
    block: usize,
) {
    for_each_tile(a_band, b, c_band, k, n, block, |a_ip, b_seg, c_seg| unsafe {
        axpy::<L>(a_ip, b_seg, c_seg)
    });
}

/// `c += a · b` over strided sub-matrices, i-k-j order.
///
/// # Safety
///
/// The CPU must support `L`'s instructions.
#[inline(always)]
pub(crate) unsafe fn accumulate_views<L: Lanes>(a: View<'_>, b: View<'_>, c: &mut RowsMut<'_>) {
    debug_assert_eq!(a.cols(), b.rows());
    debug_assert_eq!((a.rows(), b.cols()), (c.rows(), c.cols()));

    for i in 0..a.rows() {
        let c_row = c.row_mut(i);
        for p in 0..a.cols() {
            unsafe { axpy::<L>(a.get(i, p), b.row(p), c_row) };
        }
    }
}

/// Instruction set resolved against the CPU. Holding one means its
/// instructions are safe to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backend {
    Portable4,
    Portable8,
    #[cfg(target_arch = "x86_64")]
    Avx2,
    #[cfg(target_arch = "x86_64")]
    Avx512,
}

impl Backend {
    /// Check `isa` against the reported CPU features. Only features the
    /// running CPU also has count, so a forged report can withhold an
    /// instruction set but never enable one.
    #[cfg_attr(not(target_arch = "x86_64"), allow(unused_variables))]
    pub(crate) fn select(isa: VectorIsa, cpu: CpuFeatures) -> Result<Self> {
        let cpu = cpu.intersect(CpuFeatures::detect());
        match isa {
            VectorIsa::Portable4 => Ok(Backend::Portable4),
            VectorIsa::Portable8 => Ok(Backend::Portable8),
            #[cfg(target_arch = "x86_64")]
            VectorIsa::Avx2 if cpu.has_avx2_fma() => Ok(Backend::Avx2),
            #[cfg(target_arch = "x86_64")]
            VectorIsa::Avx512 if cpu.has_avx512_fma() => Ok(Backend::Avx512),
            unavailable => Err(MatmulError::VectorUnavailable(unavailable)),
        }
    }

    /// The requested ISA, or the best one the config's CPU reports.
    pub(crate) fn for_config(config: &MatmulConfig) -> Result<Self> {
        let cpu = config.cpu.intersect(CpuFeatures::detect());
        let isa = config.vector_isa.unwrap_or_else(|| VectorIsa::best_for(cpu));
        Self::select(isa, cpu)
    }

    pub(crate) fn isa(self) -> VectorIsa {
        match self {
            Backend::Portable4 => VectorIsa::Portable4,
            Backend::Portable8 => VectorIsa::Portable8,
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => VectorIsa::Avx2,
            #[cfg(target_arch = "x86_64")]
            Backend::Avx512 => VectorIsa::Avx512,
        }
    }

    pub(crate) fn lanes(self) -> usize {
        self.isa().lanes()
    }

    /// See [`dot_rows`].
    pub(crate) fn dot_rows(self, a_rows: &[f64], b: &[f64], c_rows: &mut [f64], k: usize, n: usize) {
        // SAFETY: a Backend only exists for an ISA the CPU supports.
        unsafe {
            match self {
                Backend::Portable4 => dot_rows::<Portable<4>>(a_rows, b, c_rows, k, n),
                Backend::Portable8 => dot_rows::<Portable<8>>(a_rows, b, c_rows, k, n),
                #[cfg(target_arch = "x86_64")]
                Backend::Avx2 => avx2::dot_rows(a_rows, b, c_rows, k, n),
                #[cfg(target_arch = "x86_64")]
                Backend::Avx512 => avx512::dot_rows(a_rows, b, c_rows, k, n),
            }
        }
    }

    /// See [`blocked_band`].
    pub(crate) fn blocked_band(
        self,
        a_band: &[f64],
        b: &[f64],
        c_band: &mut [f64],
        k: usize,
        n: usize,
        block: usize,
    ) {
        // SAFETY: a Backend only exists for an ISA the CPU supports.
        unsafe {
            match self {
                Backend::Portable4 => blocked_band::<Portable<4>>(a_band, b, c_band, k, n, block),
                Backend::Portable8 => blocked_band::<Portable<8>>(a_band, b, c_band, k, n, block),
                #[cfg(target_arch = "x86_64")]
                Backend::Avx2 => avx2::blocked_band(a_band, b, c_band, k, n, block),
                #[cfg(target_arch = "x86_64")]
                Backend::Avx512 => avx512::blocked_band(a_band, b, c_band, k, n, block),
            }
        }
    }

    /// See [`accumulate_views`].
    pub(crate) fn accumulate_views(self, a: View<'_>, b: View<'_>, c: &mut RowsMut<'_>) {
        // SAFETY: a Backend only exists for an ISA the CPU supports.
        unsafe {
            match self {
                Backend::Portable4 => accumulate_views::<Portable<4>>(a, b, c),
                Backend::Portable8 => accumulate_views::<Portable<8>>(a, b, c),
                #[cfg(target_arch = "x86_64")]
                Backend::Avx2 => avx2::accumulate_views(a, b, c),
                #[cfg(target_arch = "x86_64")]
                Backend::Avx512 => avx512::accumulate_views(a, b, c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available_backends() -> Vec<Backend> {
        let cpu = CpuFeatures::detect();
        VectorIsa::ALL
            .into_iter()
            .filter_map(|isa| Backend::select(isa, cpu).ok())
            .collect()
    }

    fn naive(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
        let mut c = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                for p in 0..k {
                    c[i * n + j] += a[i * k + p] * b[p * n + j];
                }
            }
        }
        c
    }

    fn assert_close(expected: &[f64], actual: &[f64], name: &str) {
        assert_eq!(expected.len(), actual.len(), "{}: length mismatch", name);
        for (idx, (e, a)) in expected.iter().zip(actual).enumerate() {
            assert!(
                (e - a).abs() < 1e-10,
                "{}: mismatch at {}: expected {}, got {}",
                name,
                idx,
                e,
                a
            );
        }
    }

    #[test]
    fn test_portable_always_selectable() {
        let none = CpuFeatures::none();
        assert_eq!(Backend::select(VectorIsa::Portable4, none), Ok(Backend::Portable4));
        assert_eq!(Backend::select(VectorIsa::Portable8, none), Ok(Backend::Portable8));
    }

    #[test]
    fn test_hardware_isa_refused_without_features() {
        let none = CpuFeatures::none();
        assert_eq!(
            Backend::select(VectorIsa::Avx2, none),
            Err(MatmulError::VectorUnavailable(VectorIsa::Avx2))
        );
        assert_eq!(
            Backend::select(VectorIsa::Avx512, none),
            Err(MatmulError::VectorUnavailable(VectorIsa::Avx512))
        );
    }

    #[test]
    fn test_claimed_features_need_real_support() {
        let claimed = CpuFeatures {
            avx2: true,
            fma: true,
            avx512f: true,
        };
        let real = CpuFeatures::detect();

        assert_eq!(
            Backend::select(VectorIsa::Avx2, claimed).is_ok(),
            cfg!(target_arch = "x86_64") && real.has_avx2_fma()
        );
        assert_eq!(
            Backend::select(VectorIsa::Avx512, claimed).is_ok(),
            cfg!(target_arch = "x86_64") && real.has_avx512_fma()
        );

        let config = MatmulConfig::default().with_cpu(claimed);
        assert_eq!(
            Backend::for_config(&config).unwrap().isa(),
            VectorIsa::best_for(real)
        );
    }

    #[test]
    fn test_axpy_tails() {
        for backend in available_backends() {
            // Every length from empty through two full groups plus a tail.
            for len in 0..=2 * backend.lanes() + 3 {
                let x: Vec<f64> = (0..len).map(|i| i as f64 + 0.5).collect();
                let mut y: Vec<f64> = (0..len).map(|i| (i % 3) as f64).collect();
                let expected: Vec<f64> = x.iter().zip(&y).map(|(x, y)| y + 2.0 * x).collect();

                // SAFETY: backend was selected against the detected CPU.
                unsafe {
                    match backend {
                        Backend::Portable4 => axpy::<Portable<4>>(2.0, &x, &mut y),
                        Backend::Portable8 => axpy::<Portable<8>>(2.0, &x, &mut y),
                        #[cfg(target_arch = "x86_64")]
                        Backend::Avx2 => axpy::<avx2::Avx2>(2.0, &x, &mut y),
                        #[cfg(target_arch = "x86_64")]
                        Backend::Avx512 => axpy::<avx512::Avx512>(2.0, &x, &mut y),
                    }
                }

                assert_close(&expected, &y, &format!("{:?} axpy len {}", backend, len));
            }
        }
    }

    #[test]
    fn test_dot_rows_remainder_columns() {
        let (m, k) = (3, 7);
        for backend in available_backends() {
            for n in [1, 3, 4, 5, 8, 10, 13, 16, 17] {
                let a: Vec<f64> = (0..m * k).map(|i| (i % 10) as f64).collect();
                let b: Vec<f64> = (0..k * n).map(|i| (i % 7) as f64 - 3.0).collect();
                let mut c = vec![f64::NAN; m * n];

                backend.dot_rows(&a, &b, &mut c, k, n);

                assert_close(
                    &naive(&a, &b, m, k, n),
                    &c,
                    &format!("{:?} dot_rows n={}", backend, n),
                );
            }
        }
    }

    #[test]
    fn test_tile_walk_covers_every_product_once() {
        let (rows, k, n) = (3, 10, 7);
        let a: Vec<f64> = (0..rows * k).map(|i| (i % 6) as f64).collect();
        let b: Vec<f64> = (0..k * n).map(|i| (i % 4) as f64).collect();
        let expected = naive(&a, &b, rows, k, n);

        for block in [1, 3, 7, 10, usize::MAX] {
            let mut c = vec![0.0; rows * n];
            let mut updates = 0;
            for_each_tile(&a, &b, &mut c, k, n, block, |a_ip, b_seg, c_seg| {
                updates += 1;
                for (c_ij, &b_pj) in c_seg.iter_mut().zip(b_seg) {
                    *c_ij += a_ip * b_pj;
                }
            });
            assert_close(&expected, &c, &format!("tile walk block={}", block));
            let j_blocks = n.div_ceil(block.min(n));
            assert_eq!(updates, rows * k * j_blocks, "block={}", block);
        }
    }

    #[test]
    fn test_blocked_band_accumulates() {
        let (rows, k, n, block) = (5, 11, 13, 4);
        let a: Vec<f64> = (0..rows * k).map(|i| (i % 9) as f64).collect();
        let b: Vec<f64> = (0..k * n).map(|i| (i % 5) as f64).collect();
        let expected: Vec<f64> = naive(&a, &b, rows, k, n).iter().map(|x| x + 1.0).collect();

        for backend in available_backends() {
            let mut c = vec![1.0; rows * n];
            backend.blocked_band(&a, &b, &mut c, k, n, block);
            assert_close(&expected, &c, &format!("{:?} blocked_band", backend));
        }
    }

    #[test]
    fn test_accumulate_views_on_sub_blocks() {
        let (m, k, n) = (6, 5, 9);
        let a: Vec<f64> = (0..m * k).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..k * n).map(|i| (i % 4) as f64).collect();

        for backend in available_backends() {
            let mut c = vec![0.0; m * n];
            {
                let av = View::full(&a, m, k);
                let bv = View::full(&b, k, n);
                let mut cv = RowsMut::full(&mut c, n);
                backend.accumulate_views(av, bv, &mut cv);
            }
            assert_close(&naive(&a, &b, m, k, n), &c, &format!("{:?} views", backend));
        }
    }
}

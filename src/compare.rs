//! Tolerance-equivalence between matrices.
//!
//! Strategies sum in different orders and some use fused multiply-add, so
//! their results differ from the reference in the last few bits. Two
//! elements `x`, `y` are equivalent when
//!
//! ```text
//! |x - y| <= abs + rel * max(|x|, |y|)
//! ```
//!
//! or when they are the same infinity, or both NaN. Overflow is not trapped
//! anywhere, so every strategy produces NaN/∞ in the same cells.

use crate::matrix::Matrix;

/// Absolute and relative bounds on the elementwise difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerance {
    pub const fn new(abs: f64, rel: f64) -> Self {
        Self { abs, rel }
    }

    /// Pure absolute bound.
    pub const fn absolute(abs: f64) -> Self {
        Self { abs, rel: 0.0 }
    }

    pub fn accepts(&self, x: f64, y: f64) -> bool {
        if x == y || (x.is_nan() && y.is_nan()) {
            return true;
        }
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        (x - y).abs() <= self.abs + self.rel * x.abs().max(y.abs())
    }
}

impl Default for Tolerance {
    /// 1e-10 absolute plus 1e-9 relative.
    fn default() -> Self {
        Self::new(1e-10, 1e-9)
    }
}

/// First element outside tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mismatch {
    pub row: usize,
    pub col: usize,
    pub expected: f64,
    pub actual: f64,
}

/// First cell (row-major order) where `actual` strays from `expected`.
///
/// # Panics
///
/// Panics if the shapes differ.
pub fn first_mismatch(expected: &Matrix, actual: &Matrix, tol: Tolerance) -> Option<Mismatch> {
    assert_eq!(expected.shape(), actual.shape(), "shape mismatch");
    let cols = expected.cols();
    expected
        .as_slice()
        .iter()
        .zip(actual.as_slice())
        .position(|(&e, &a)| !tol.accepts(e, a))
        .map(|idx| Mismatch {
            row: idx / cols,
            col: idx % cols,
            expected: expected.as_slice()[idx],
            actual: actual.as_slice()[idx],
        })
}

/// Largest elementwise `|expected - actual|`, or `None` if the shapes
/// differ. NaN cells are skipped.
pub fn max_abs_diff(expected: &Matrix, actual: &Matrix) -> Option<f64> {
    if expected.shape() != actual.shape() {
        return None;
    }
    Some(
        expected
            .as_slice()
            .iter()
            .zip(actual.as_slice())
            .map(|(e, a)| (e - a).abs())
            .filter(|d| !d.is_nan())
            .fold(0.0, f64::max),
    )
}

impl Matrix {
    /// Same shape and every element within `tol`.
    ///
    /// ```
    /// use matmul::{Matrix, Tolerance};
    ///
    /// let a = Matrix::filled(2, 2, 1.0);
    /// let b = Matrix::filled(2, 2, 1.0 + 1e-12);
    /// assert!(a.approx_eq(&b, Tolerance::default()));
    /// assert!(!a.approx_eq(&Matrix::filled(2, 3, 1.0), Tolerance::default()));
    /// ```
    pub fn approx_eq(&self, other: &Matrix, tol: Tolerance) -> bool {
        self.shape() == other.shape() && first_mismatch(self, other, tol).is_none()
    }
}

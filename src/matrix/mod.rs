//! The dense row-major matrix type and the scalar strategies.
//!
//! `naive_ijk` is the correctness baseline every other strategy is checked
//! against; `naive_ikj` is the loop-interchanged version the faster
//! strategies build on.

pub mod naive_ijk;
pub mod naive_ikj;
pub mod transpose;
pub mod view;

use rand::Rng;

use crate::error::{MatmulError, Result};

/// Dense `rows × cols` matrix of f64, row-major: element (i, j) lives at
/// `i * cols + j`.
///
/// The constructors guarantee `rows > 0`, `cols > 0` and
/// `data.len() == rows * cols`; the fields are private so that stays true.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Wrap an existing row-major buffer.
    ///
    /// # Example
    ///
    /// ```
    /// use matmul::Matrix;
    ///
    /// let m = Matrix::new(2, 3, vec![1.0, 2.0, 3.0,
    ///                                4.0, 5.0, 6.0]).unwrap();
    /// assert_eq!(m.get(1, 0), 4.0);
    /// assert!(Matrix::new(2, 3, vec![0.0; 5]).is_err());
    /// ```
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 || rows.checked_mul(cols) != Some(data.len()) {
            return Err(MatmulError::InvalidShape {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Matrix with every element set to `value`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or `rows * cols` overflows `usize`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        assert!(
            rows > 0 && cols > 0,
            "matrix dimensions must be non-zero, got {}×{}",
            rows,
            cols
        );
        let len = rows
            .checked_mul(cols)
            .unwrap_or_else(|| panic!("matrix size overflows usize: {}×{}", rows, cols));
        Self {
            rows,
            cols,
            data: vec![value; len],
        }
    }

    /// All-zero matrix. Every strategy allocates its output this way, so
    /// zero-initialization always precedes accumulation.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// `n × n` identity.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    /// Build element-by-element from `f(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut m = Self::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                m.data[i * cols + j] = f(i, j);
            }
        }
        m
    }

    /// Uniform random entries in `[0, 1)`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::from_fn(rows, cols, |_, _| rng.random::<f64>())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Element (i, j).
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({}, {}) out of bounds for {}×{} matrix",
            i,
            j,
            self.rows,
            self.cols
        );
        self.data[i * self.cols + j]
    }

    /// Row `i` as a contiguous slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// New matrix with every element multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|x| x * factor).collect(),
        }
    }

    /// New `cols × rows` matrix.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        transpose::transpose(&self.data, &mut out.data, self.rows, self.cols);
        out
    }
}

/// Dimension check run first by every strategy: `A.cols` must equal `B.rows`.
pub fn check_dims(a: &Matrix, b: &Matrix) -> Result<()> {
    if a.cols != b.rows {
        return Err(MatmulError::IncompatibleDimensions {
            a_rows: a.rows,
            a_cols: a.cols,
            b_rows: b.rows,
            b_cols: b.cols,
        });
    }
    Ok(())
}

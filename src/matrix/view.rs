//! Sub-matrix views used by the recursive strategy.
//!
//! A [`View`] is an offset/stride window over a read-only row-major buffer.
//! The mutable side is a list of row slices ([`RowsMut`]): splitting it into
//! quadrants only moves slices around and calls `split_at_mut`, so the
//! borrow checker proves the four output quadrants are disjoint.

/// Read-only `rows × cols` window starting at (`row0`, `col0`) of a buffer
/// whose rows are `stride` elements long.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    data: &'a [f64],
    stride: usize,
    row0: usize,
    col0: usize,
    rows: usize,
    cols: usize,
}

impl<'a> View<'a> {
    /// Whole `rows × cols` buffer.
    pub fn full(data: &'a [f64], rows: usize, cols: usize) -> Self {
        assert_eq!(
            rows.checked_mul(cols),
            Some(data.len()),
            "view: expected {}×{}",
            rows,
            cols
        );
        Self {
            data,
            stride: cols,
            row0: 0,
            col0: 0,
            rows,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[(self.row0 + i) * self.stride + self.col0 + j]
    }

    /// Row `i` of the window, `cols` elements.
    pub fn row(&self, i: usize) -> &'a [f64] {
        debug_assert!(i < self.rows);
        let start = (self.row0 + i) * self.stride + self.col0;
        &self.data[start..start + self.cols]
    }

    /// Sub-window of `rows × cols` at (`i`, `j`) relative to this one.
    pub fn sub(&self, i: usize, j: usize, rows: usize, cols: usize) -> Self {
        assert!(
            i + rows <= self.rows && j + cols <= self.cols,
            "sub-view out of bounds"
        );
        Self {
            row0: self.row0 + i,
            col0: self.col0 + j,
            rows,
            cols,
            ..*self
        }
    }

    /// Split at row `r` and column `c` into `[top-left, top-right,
    /// bottom-left, bottom-right]`.
    pub fn quadrants(&self, r: usize, c: usize) -> [Self; 4] {
        [
            self.sub(0, 0, r, c),
            self.sub(0, c, r, self.cols - c),
            self.sub(r, 0, self.rows - r, c),
            self.sub(r, c, self.rows - r, self.cols - c),
        ]
    }
}

/// Exclusive window over an output matrix, one slice per row. Every slice
/// has the same length.
#[derive(Debug)]
pub struct RowsMut<'a> {
    rows: Vec<&'a mut [f64]>,
}

impl<'a> RowsMut<'a> {
    /// Cut a `rows × cols` buffer into its rows.
    pub fn full(data: &'a mut [f64], cols: usize) -> Self {
        Self {
            rows: data.chunks_exact_mut(cols).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.rows[i][..]
    }

    /// Shorter-lived window over the same rows.
    pub fn reborrow(&mut self) -> RowsMut<'_> {
        RowsMut {
            rows: self.rows.iter_mut().map(|r| &mut **r).collect(),
        }
    }

    /// Split at row `r` and column `c` into `[top-left, top-right,
    /// bottom-left, bottom-right]`, consuming `self`.
    pub fn quadrants(self, r: usize, c: usize) -> [Self; 4] {
        let n = self.rows.len();
        let mut tl = Vec::with_capacity(r);
        let mut tr = Vec::with_capacity(r);
        let mut bl = Vec::with_capacity(n - r);
        let mut br = Vec::with_capacity(n - r);

        for (i, row) in self.rows.into_iter().enumerate() {
            let (left, right) = row.split_at_mut(c);
            if i < r {
                tl.push(left);
                tr.push(right);
            } else {
                bl.push(left);
                br.push(right);
            }
        }

        [
            Self { rows: tl },
            Self { rows: tr },
            Self { rows: bl },
            Self { rows: br },
        ]
    }
}

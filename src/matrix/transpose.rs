/// Transpose a row-major buffer: `dst = src^T`.
///
/// `src` is `rows × cols`, `dst` becomes `cols × rows`. Column j of `src`
/// ends up as row j of `dst`.
///
/// # Example
///
/// ```
/// use matmul::matrix::transpose::transpose;
///
/// // 3×2 in, 2×3 out.
/// let src = [1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
/// let mut dst = [0.0; 6];
/// transpose(&src, &mut dst, 3, 2);
/// assert_eq!(dst, [1.0, 2.0, 3.0, -1.0, -2.0, -3.0]);
/// ```
pub fn transpose(src: &[f64], dst: &mut [f64], rows: usize, cols: usize) {
    let len = rows.checked_mul(cols);
    assert_eq!(len, Some(src.len()), "src: expected {}×{}", rows, cols);
    assert_eq!(len, Some(dst.len()), "dst: expected {}×{}", cols, rows);

    for (i, src_row) in src.chunks_exact(cols).enumerate() {
        for (j, &x) in src_row.iter().enumerate() {
            dst[j * rows + i] = x;
        }
    }
}

//! Matrix product kernel used by [`crate::Matrix`].
//!
//! A plain triple loop over row-major buffers. The inner accumulation is kept
//! sequential (no FMA, no blocking) so training runs are bit-reproducible.

/// Computes `c = a * b` where `a` is `(m, k)`, `b` is `(k, n)` and `c` is `(m, n)`,
/// all row-major and contiguous.
#[inline]
pub(crate) fn gemm_f64(m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    // Bounds are validated by `Matrix::matmul`.
    for i in 0..m {
        let a0 = i * k;
        for j in 0..n {
            let mut acc = 0.0_f64;
            for p in 0..k {
                acc += a[a0 + p] * b[p * n + j];
            }
            c[i * n + j] = acc;
        }
    }
}

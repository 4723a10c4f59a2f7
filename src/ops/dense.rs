/*!
 * Dense Kernels
 * Single-rank cofactor/determinant kernels on row-major slices
 */

/// Copy the minor of `a` with row `p` and column `q` removed into `out`.
///
/// `a` is `n`x`n` row-major; `out` must hold `(n-1)*(n-1)` elements.
pub(crate) fn minor_into(a: &[f64], n: usize, p: usize, q: usize, out: &mut [f64]) {
    debug_assert_eq!(a.len(), n * n);
    debug_assert!(out.len() >= (n - 1) * (n - 1));

    let mut k = 0;
    for row in 0..n {
        if row == p {
            continue;
        }
        for col in 0..n {
            if col == q {
                continue;
            }
            out[k] = a[row * n + col];
            k += 1;
        }
    }
}

/// Determinant by recursive cofactor expansion over the first row.
///
/// O(n!) by construction; only acceptable for small fixed orders.
pub(crate) fn determinant(a: &[f64], n: usize) -> f64 {
    debug_assert_eq!(a.len(), n * n);
    if n == 0 {
        return 1.0;
    }
    if n == 1 {
        return a[0];
    }

    let mut det = 0.0;
    let mut sign = 1.0;
    let mut minor = vec![0.0; (n - 1) * (n - 1)];
    for f in 0..n {
        minor_into(a, n, 0, f, &mut minor);
        det += sign * a[f] * determinant(&minor, n - 1);
        sign = -sign;
    }
    det
}

/// Signed cofactor of element `(i, j)`.
pub(crate) fn cofactor(a: &[f64], n: usize, i: usize, j: usize) -> f64 {
    let mut minor = vec![0.0; (n - 1) * (n - 1)];
    minor_into(a, n, i, j, &mut minor);
    let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
    sign * determinant(&minor, n - 1)
}

use alloc::vec;
use alloc::vec::Vec;

use crate::dense::DenseMatrix;
use crate::linalg::{swap_cols, LinalgError, MAX_SWEEPS};
use crate::traits::FloatScalar;

/// Householder reduction of a real symmetric matrix to tridiagonal form.
///
/// On entry `v` (`n x n`, row-major) holds the symmetric matrix; only its
/// lower triangle is read. On return `v` holds the orthogonal transform,
/// `d` the diagonal and `e` the subdiagonal, with `e[i]` coupling rows
/// `i - 1` and `i` and `e[0] = 0`.
///
/// Symmetry is not checked.
pub fn tridiagonalize<T: FloatScalar>(n: usize, v: &mut [T], d: &mut [T], e: &mut [T]) {
    assert_eq!(v.len(), n * n, "tridiagonalization requires an n x n buffer");
    assert_eq!(d.len(), n);
    assert_eq!(e.len(), n);
    if n == 0 {
        return;
    }

    for j in 0..n {
        d[j] = v[(n - 1) * n + j];
    }

    for i in (1..n).rev() {
        let mut scale = T::zero();
        let mut h = T::zero();
        for k in 0..i {
            scale = scale + d[k].abs();
        }
        if scale == T::zero() {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = v[(i - 1) * n + j];
                v[i * n + j] = T::zero();
                v[j * n + i] = T::zero();
            }
        } else {
            for k in 0..i {
                d[k] = d[k] / scale;
                h = h + d[k] * d[k];
            }
            let mut f = d[i - 1];
            let mut g = h.sqrt();
            if f > T::zero() {
                g = -g;
            }
            e[i] = scale * g;
            h = h - f * g;
            d[i - 1] = f - g;
            for x in e.iter_mut().take(i) {
                *x = T::zero();
            }

            for j in 0..i {
                f = d[j];
                v[j * n + i] = f;
                g = e[j] + v[j * n + j] * f;
                for k in (j + 1)..i {
                    g = g + v[k * n + j] * d[k];
                    e[k] = e[k] + v[k * n + j] * f;
                }
                e[j] = g;
            }
            f = T::zero();
            for j in 0..i {
                e[j] = e[j] / h;
                f = f + e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] = e[j] - hh * d[j];
            }
            for j in 0..i {
                f = d[j];
                g = e[j];
                for k in j..i {
                    v[k * n + j] = v[k * n + j] - (f * e[k] + g * d[k]);
                }
                d[j] = v[(i - 1) * n + j];
                v[i * n + j] = T::zero();
            }
        }
        d[i] = h;
    }

    // Accumulate transformations
    for i in 0..(n - 1) {
        v[(n - 1) * n + i] = v[i * n + i];
        v[i * n + i] = T::one();
        let h = d[i + 1];
        if h != T::zero() {
            for k in 0..=i {
                d[k] = v[k * n + i + 1] / h;
            }
            for j in 0..=i {
                let mut g = T::zero();
                for k in 0..=i {
                    g = g + v[k * n + i + 1] * v[k * n + j];
                }
                for k in 0..=i {
                    v[k * n + j] = v[k * n + j] - g * d[k];
                }
            }
        }
        for k in 0..=i {
            v[k * n + i + 1] = T::zero();
        }
    }
    for j in 0..n {
        d[j] = v[(n - 1) * n + j];
        v[(n - 1) * n + j] = T::zero();
    }
    v[(n - 1) * n + n - 1] = T::one();
    e[0] = T::zero();
}

/// Implicit-shift QL diagonalization of a symmetric tridiagonal matrix.
///
/// Takes `d`/`e` in the layout produced by [`tridiagonalize`] and
/// accumulates the rotations into the columns of `v` (`n x n`): pass the
/// transform from [`tridiagonalize`] to get eigenvectors of the original
/// matrix, or the identity for those of the tridiagonal itself. On return
/// `d` holds the eigenvalues ascending, with matching eigenvector columns in
/// `v`; `e` is destroyed.
///
/// Fails with [`LinalgError::ConvergenceFailure`] when one eigenvalue needs
/// more than [`MAX_SWEEPS`] sweeps.
pub fn tridiagonal_ql<T: FloatScalar>(
    n: usize,
    d: &mut [T],
    e: &mut [T],
    v: &mut [T],
) -> Result<(), LinalgError> {
    tridiagonal_ql_with_max_sweeps(n, d, e, v, MAX_SWEEPS)
}

/// [`tridiagonal_ql`] with an explicit sweep cap per eigenvalue.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn tridiagonal_ql_with_max_sweeps<T: FloatScalar>(
    n: usize,
    d: &mut [T],
    e: &mut [T],
    v: &mut [T],
    max_sweeps: usize,
) -> Result<(), LinalgError> {
    assert_eq!(d.len(), n);
    assert_eq!(e.len(), n);
    assert_eq!(v.len(), n * n, "eigenvector buffer must be n x n");
    if n == 0 {
        return Ok(());
    }

    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = T::zero();

    let eps = T::epsilon();
    let two = T::one() + T::one();
    let mut f = T::zero();
    let mut tst1 = T::zero();

    for l in 0..n {
        tst1 = tst1.max(d[l].abs() + e[l].abs());
        let mut m = l;
        while m < n - 1 {
            if e[m].abs() <= eps * tst1 {
                break;
            }
            m += 1;
        }

        if m > l {
            let mut iter = 0;
            loop {
                if iter == max_sweeps {
                    log::warn!(
                        "tridiagonal QL: eigenvalue {} did not converge in {} sweeps",
                        l,
                        max_sweeps
                    );
                    return Err(LinalgError::ConvergenceFailure {
                        index: l,
                        sweeps: max_sweeps,
                    });
                }
                iter += 1;

                // Shift
                let mut g = d[l];
                let mut p = (d[l + 1] - g) / (two * e[l]);
                let mut r = p.hypot(T::one());
                if p < T::zero() {
                    r = -r;
                }
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let mut h = g - d[l];
                for x in d.iter_mut().skip(l + 2) {
                    *x = *x - h;
                }
                f = f + h;

                // Implicit QL transformation
                p = d[m];
                let mut c = T::one();
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = T::zero();
                let mut s2 = T::zero();
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    g = c * e[i];
                    h = c * p;
                    r = p.hypot(e[i]);
                    e[i + 1] = s * r;
                    s = e[i] / r;
                    c = p / r;
                    p = c * d[i] - s * g;
                    d[i + 1] = h + s * (c * g + s * d[i]);

                    for k in 0..n {
                        h = v[k * n + i + 1];
                        v[k * n + i + 1] = s * v[k * n + i] + c * h;
                        v[k * n + i] = c * v[k * n + i] - s * h;
                    }
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                if !(e[l].abs() > eps * tst1) {
                    break;
                }
            }
        }
        d[l] = d[l] + f;
        e[l] = T::zero();
    }

    sort_ascending(n, d, v);
    Ok(())
}

/// Selection sort of the eigenvalues, ascending, with eigenvector columns.
fn sort_ascending<T: FloatScalar>(n: usize, d: &mut [T], v: &mut [T]) {
    for i in 0..n.saturating_sub(1) {
        let mut k = i;
        for j in (i + 1)..n {
            if d[j] < d[k] {
                k = j;
            }
        }
        if k != i {
            d.swap(i, k);
            swap_cols(v, n, n, i, k);
        }
    }
}

/// Full symmetric eigendecomposition, in place.
///
/// `a` (`n x n`) holds the symmetric matrix on entry and the orthonormal
/// eigenvectors (as columns) on return; `d` receives the eigenvalues
/// ascending.
pub fn symmetric_eigen_in_place<T: FloatScalar>(
    n: usize,
    a: &mut [T],
    d: &mut [T],
) -> Result<(), LinalgError> {
    let mut e = vec![T::zero(); n];
    tridiagonalize(n, a, d, &mut e);
    tridiagonal_ql(n, d, &mut e, a)
}

/// Eigendecomposition of a real symmetric matrix: `A = V·diag(λ)·V^T`.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
///
/// let a = DenseMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0, 2.0]);
/// let eig = a.eig_symmetric().unwrap();
/// assert!((eig.eigenvalues()[0] - 1.0).abs() < 1e-12);
/// assert!((eig.eigenvalues()[1] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SymmetricEigen<T> {
    values: Vec<T>,
    vectors: DenseMatrix<T>,
}

impl<T: FloatScalar> SymmetricEigen<T> {
    /// Decompose a symmetric matrix. Only the lower triangle is read.
    pub fn new(a: &DenseMatrix<T>) -> Result<Self, LinalgError> {
        assert!(a.is_square(), "eigendecomposition requires a square matrix");
        let n = a.nrows();
        let mut vectors = a.clone();
        let mut values = vec![T::zero(); n];
        symmetric_eigen_in_place(n, vectors.as_mut_slice(), &mut values)?;
        Ok(Self { values, vectors })
    }

    /// Eigenvalues, ascending.
    #[inline]
    pub fn eigenvalues(&self) -> &[T] {
        &self.values
    }

    /// Orthonormal eigenvectors as columns, matching [`eigenvalues`](Self::eigenvalues).
    #[inline]
    pub fn eigenvectors(&self) -> &DenseMatrix<T> {
        &self.vectors
    }
}

impl<T: FloatScalar> DenseMatrix<T> {
    /// Eigendecomposition of a real symmetric matrix.
    pub fn eig_symmetric(&self) -> Result<SymmetricEigen<T>, LinalgError> {
        SymmetricEigen::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!((a - b).abs() < tol, "{}: {} vs {} (diff {})", msg, a, b, (a - b).abs());
    }

    fn check_eigen(a: &DenseMatrix<f64>) {
        let n = a.nrows();
        let eig = a.eig_symmetric().unwrap();
        let (vals, vecs) = (eig.eigenvalues(), eig.eigenvectors());

        let av = a * vecs;
        let vl = DenseMatrix::from_fn(n, n, |i, j| vecs[(i, j)] * vals[j]);
        assert!(av.max_abs_diff(&vl) < TOL, "A·V != V·Λ");

        let vtv = &vecs.transpose() * vecs;
        assert!(vtv.max_abs_diff(&DenseMatrix::eye(n)) < TOL, "V^T·V != I");

        for i in 1..n {
            assert!(vals[i - 1] <= vals[i], "not ascending: {:?}", vals);
        }
    }

    #[test]
    fn eigen_2x2() {
        let a = DenseMatrix::from_rows(2, 2, &[2.0, 1.0, 1.0, 2.0]);
        let eig = a.eig_symmetric().unwrap();
        assert_near(eig.eigenvalues()[0], 1.0, TOL, "l0");
        assert_near(eig.eigenvalues()[1], 3.0, TOL, "l1");
        check_eigen(&a);
    }

    #[test]
    fn eigen_4x4() {
        let a = DenseMatrix::from_rows(
            4,
            4,
            &[
                4.0, 1.0, -2.0, 2.0, 1.0, 2.0, 0.0, 1.0, -2.0, 0.0, 3.0, -2.0, 2.0, 1.0, -2.0, -1.0,
            ],
        );
        check_eigen(&a);
        let trace: f64 = a.eig_symmetric().unwrap().eigenvalues().iter().sum();
        assert_near(trace, 8.0, TOL, "trace");
    }

    #[test]
    fn diagonal_input_is_sorted() {
        let a = DenseMatrix::from_rows(3, 3, &[5.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 2.0]);
        let eig = a.eig_symmetric().unwrap();
        assert_eq!(eig.eigenvalues(), &[-1.0, 2.0, 5.0]);
        check_eigen(&a);
    }

    #[test]
    fn repeated_eigenvalues() {
        let a = DenseMatrix::from_rows(3, 3, &[2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 2.0]);
        let eig = a.eig_symmetric().unwrap();
        assert_near(eig.eigenvalues()[0], 1.0, TOL, "l0");
        assert_near(eig.eigenvalues()[1], 1.0, TOL, "l1");
        assert_near(eig.eigenvalues()[2], 4.0, TOL, "l2");
        check_eigen(&a);
    }

    #[test]
    fn tridiagonal_with_identity_seed() {
        // [[2,-1,0],[-1,2,-1],[0,-1,2]]: eigenvalues 2 - sqrt2, 2, 2 + sqrt2
        let mut d = [2.0_f64, 2.0, 2.0];
        let mut e = [0.0, -1.0, -1.0];
        let mut v = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        tridiagonal_ql(3, &mut d, &mut e, &mut v).unwrap();
        let r2 = 2.0_f64.sqrt();
        assert_near(d[0], 2.0 - r2, TOL, "l0");
        assert_near(d[1], 2.0, TOL, "l1");
        assert_near(d[2], 2.0 + r2, TOL, "l2");
    }

    #[test]
    fn sweep_cap_reports_failure() {
        let mut a = [
            4.0_f64, 1.0, -2.0, 2.0, 1.0, 2.0, 0.0, 1.0, -2.0, 0.0, 3.0, -2.0, 2.0, 1.0, -2.0, -1.0,
        ];
        let mut d = [0.0; 4];
        let mut e = [0.0; 4];
        tridiagonalize(4, &mut a, &mut d, &mut e);
        let err = tridiagonal_ql_with_max_sweeps(4, &mut d, &mut e, &mut a, 1).unwrap_err();
        assert!(matches!(err, LinalgError::ConvergenceFailure { sweeps: 1, .. }));
    }

    #[test]
    fn one_by_one() {
        let a = DenseMatrix::from_rows(1, 1, &[-3.5_f64]);
        let eig = a.eig_symmetric().unwrap();
        assert_eq!(eig.eigenvalues(), &[-3.5]);
        assert_eq!(eig.eigenvectors()[(0, 0)], 1.0);
    }
}

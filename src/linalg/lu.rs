use alloc::vec;
use alloc::vec::Vec;
use num_traits::{One, Zero};

use crate::dense::DenseMatrix;
use crate::linalg::{swap_rows, LinalgError};
use crate::traits::LinalgScalar;

/// Perform LU decomposition with row-scaled partial pivoting, in place.
///
/// Crout's algorithm on the `n x n` row-major buffer `a`. On return, `a`
/// holds both factors packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// `perm` is filled with the row permutation: row `i` of `P·A` is row
/// `perm[i]` of the original `A`, and `P·A = L·U`.
///
/// Returns the pivot sign `det(P)`, `+1` or `-1`.
///
/// Never fails. An exact-zero pivot is left in place and the column below it
/// is not scaled; the caller detects singularity from the zero on U's
/// diagonal.
pub fn lu_in_place<T: LinalgScalar>(n: usize, a: &mut [T], perm: &mut [usize]) -> T::Real {
    assert_eq!(a.len(), n * n, "LU decomposition requires an n x n buffer");
    assert_eq!(perm.len(), n, "permutation slice length must match matrix size");

    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }

    // Implicit row scaling: 1 / max |a_ij| per row, 1 for an all-zero row.
    let mut scale = vec![<T::Real as One>::one(); n];
    for i in 0..n {
        let mut big = <T::Real as Zero>::zero();
        for j in 0..n {
            let v = a[i * n + j].modulus();
            if v > big {
                big = v;
            }
        }
        if big != <T::Real as Zero>::zero() {
            scale[i] = <T::Real as One>::one() / big;
        }
    }

    let mut sign = <T::Real as One>::one();

    for j in 0..n {
        // U entries above the diagonal
        for i in 0..j {
            let mut sum = a[i * n + j];
            for k in 0..i {
                sum = sum - a[i * n + k] * a[k * n + j];
            }
            a[i * n + j] = sum;
        }

        // Candidates on and below the diagonal; ties go to the later row
        let mut big = <T::Real as Zero>::zero();
        let mut imax = j;
        for i in j..n {
            let mut sum = a[i * n + j];
            for k in 0..j {
                sum = sum - a[i * n + k] * a[k * n + j];
            }
            a[i * n + j] = sum;
            let dum = scale[i] * sum.modulus();
            if dum >= big {
                big = dum;
                imax = i;
            }
        }

        if imax != j {
            swap_rows(a, n, imax, j);
            perm.swap(imax, j);
            scale.swap(imax, j);
            sign = <T::Real as Zero>::zero() - sign;
        }

        let pivot = a[j * n + j];
        if pivot != T::zero() {
            let inv_pivot = pivot.safe_recip();
            for i in (j + 1)..n {
                a[i * n + j] = a[i * n + j] * inv_pivot;
            }
        }
    }

    sign
}

/// Solve `P·L·U·X = B` in place, given the packed factors from [`lu_in_place`].
///
/// `b` is an `n x nrhs` row-major buffer, overwritten with `X`. Each
/// right-hand-side column is solved independently: permutation, forward
/// substitution with unit-diagonal L (starting at the first nonzero entry),
/// then back substitution with U.
///
/// A zero on U's diagonal yields non-finite entries; check
/// [`Lu::is_singular`] first when that matters.
pub fn lu_solve<T: LinalgScalar>(n: usize, nrhs: usize, lu: &[T], perm: &[usize], b: &mut [T]) {
    assert_eq!(lu.len(), n * n, "LU buffer must be n x n");
    assert_eq!(perm.len(), n, "permutation length must match matrix size");
    assert_eq!(b.len(), n * nrhs, "right-hand side must be n x nrhs");

    let mut x = vec![T::zero(); n];
    for col in 0..nrhs {
        for i in 0..n {
            x[i] = b[perm[i] * nrhs + col];
        }

        // Forward substitution, skipping the leading zeros of Pb
        let mut first: Option<usize> = None;
        for i in 0..n {
            let mut sum = x[i];
            match first {
                Some(f) => {
                    for j in f..i {
                        sum = sum - lu[i * n + j] * x[j];
                    }
                }
                None => {
                    if sum != T::zero() {
                        first = Some(i);
                    }
                }
            }
            x[i] = sum;
        }

        // Back substitution
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum = sum - lu[i * n + j] * x[j];
            }
            x[i] = sum.safe_div(lu[i * n + i]);
        }

        for i in 0..n {
            b[i * nrhs + col] = x[i];
        }
    }
}

/// Unpack compact LU storage into explicit `L` (unit lower) and `U` (upper).
///
/// `l` and `u` are `n x n` row-major buffers; every entry is overwritten.
pub fn compact_to_full<T: LinalgScalar>(n: usize, lu: &[T], l: &mut [T], u: &mut [T]) {
    assert_eq!(lu.len(), n * n);
    assert_eq!(l.len(), n * n);
    assert_eq!(u.len(), n * n);
    for i in 0..n {
        for j in 0..n {
            let v = lu[i * n + j];
            l[i * n + j] = if j < i {
                v
            } else if j == i {
                T::one()
            } else {
                T::zero()
            };
            u[i * n + j] = if j >= i { v } else { T::zero() };
        }
    }
}

/// Expand a permutation vector into the `n x n` matrix `P` with `P[i][perm[i]] = 1`,
/// so that `(P·A)` row `i` is `A` row `perm[i]`.
///
/// `p` is overwritten.
pub fn permutation_to_full<T: LinalgScalar>(perm: &[usize], p: &mut [T]) {
    let n = perm.len();
    assert_eq!(p.len(), n * n);
    for x in p.iter_mut() {
        *x = T::zero();
    }
    for (i, &pi) in perm.iter().enumerate() {
        p[i * n + pi] = T::one();
    }
}

/// LU decomposition of a square matrix.
///
/// Stores the packed L/U factors, permutation vector and pivot sign.
/// Decomposition itself never fails; singularity surfaces through
/// [`is_singular`](Self::is_singular), a zero [`det`](Self::det), or
/// `Err(Singular)` from [`solve`](Self::solve) / [`inverse`](Self::inverse).
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
///
/// let a = DenseMatrix::from_rows(2, 2, &[4.0_f64, 3.0, 6.0, 3.0]);
/// let lu = a.lu();
/// assert_eq!(lu.sign(), -1.0);
/// assert!((lu.det() - (-6.0)).abs() < 1e-12);
///
/// let b = DenseMatrix::from_rows(2, 1, &[10.0, 12.0]);
/// let x = lu.solve(&b).unwrap();
/// assert!((x[(0, 0)] - 1.0).abs() < 1e-12);
/// assert!((x[(1, 0)] - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Lu<T: LinalgScalar> {
    lu: DenseMatrix<T>,
    perm: Vec<usize>,
    sign: T::Real,
}

impl<T: LinalgScalar> Lu<T> {
    /// Decompose a square matrix.
    pub fn new(a: &DenseMatrix<T>) -> Self {
        assert!(a.is_square(), "LU decomposition requires a square matrix");
        let n = a.nrows();
        let mut lu = a.clone();
        let mut perm = vec![0usize; n];
        let sign = lu_in_place(n, lu.as_mut_slice(), &mut perm);
        Self { lu, perm, sign }
    }

    /// The packed factors (L below the diagonal, U on and above).
    #[inline]
    pub fn packed(&self) -> &DenseMatrix<T> {
        &self.lu
    }

    /// Row permutation: row `i` of `P·A` is row `perm()[i]` of `A`.
    #[inline]
    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    /// Pivot sign, `det(P)`.
    #[inline]
    pub fn sign(&self) -> T::Real {
        self.sign
    }

    /// Unit lower-triangular factor.
    pub fn l(&self) -> DenseMatrix<T> {
        self.full().0
    }

    /// Upper-triangular factor.
    pub fn u(&self) -> DenseMatrix<T> {
        self.full().1
    }

    /// Permutation matrix with `P·A = L·U`.
    pub fn p(&self) -> DenseMatrix<T> {
        let n = self.lu.nrows();
        let mut p = DenseMatrix::zeros(n, n);
        permutation_to_full(&self.perm, p.as_mut_slice());
        p
    }

    fn full(&self) -> (DenseMatrix<T>, DenseMatrix<T>) {
        let n = self.lu.nrows();
        let mut l = DenseMatrix::zeros(n, n);
        let mut u = DenseMatrix::zeros(n, n);
        compact_to_full(n, self.lu.as_slice(), l.as_mut_slice(), u.as_mut_slice());
        (l, u)
    }

    /// True when U has an exact zero on its diagonal.
    pub fn is_singular(&self) -> bool {
        (0..self.lu.nrows()).any(|i| self.lu[(i, i)] == T::zero())
    }

    /// Determinant: pivot sign times the product of U's diagonal.
    pub fn det(&self) -> T {
        let mut d = T::from_real(self.sign);
        for i in 0..self.lu.nrows() {
            d = d * self.lu[(i, i)];
        }
        d
    }

    /// Solve `A·X = B` for every column of `B`.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>, LinalgError> {
        let n = self.lu.nrows();
        assert_eq!(b.nrows(), n, "rhs row count mismatch");
        if self.is_singular() {
            log::debug!("LU solve rejected: exact-zero pivot in {}x{} factorization", n, n);
            return Err(LinalgError::Singular);
        }
        let mut x = b.clone();
        lu_solve(n, b.ncols(), self.lu.as_slice(), &self.perm, x.as_mut_slice());
        Ok(x)
    }

    /// Matrix inverse, by solving against the identity.
    pub fn inverse(&self) -> Result<DenseMatrix<T>, LinalgError> {
        self.solve(&DenseMatrix::eye(self.lu.nrows()))
    }
}

/// Convenience methods on square matrices.
impl<T: LinalgScalar> DenseMatrix<T> {
    /// LU decomposition with row-scaled partial pivoting.
    pub fn lu(&self) -> Lu<T> {
        Lu::new(self)
    }

    /// Determinant via LU.
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let a = DenseMatrix::from_rows(3, 3, &[6.0_f64, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0]);
    /// assert!((a.det() - (-306.0)).abs() < 1e-10);
    /// ```
    pub fn det(&self) -> T {
        self.lu().det()
    }

    /// Solve `A·X = B` via LU.
    pub fn solve(&self, b: &DenseMatrix<T>) -> Result<DenseMatrix<T>, LinalgError> {
        self.lu().solve(b)
    }

    /// Matrix inverse via LU.
    pub fn inverse(&self) -> Result<DenseMatrix<T>, LinalgError> {
        self.lu().inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!((a - b).abs() < tol, "{}: {} vs {} (diff {})", msg, a, b, (a - b).abs());
    }

    #[test]
    fn tie_in_scaled_pivot_picks_later_row() {
        // Both scaled candidates equal 1: the later row wins.
        let mut a = [4.0_f64, 3.0, 6.0, 3.0];
        let mut perm = [0usize; 2];
        let sign = lu_in_place(2, &mut a, &mut perm);
        assert_eq!(sign, -1.0);
        assert_eq!(perm, [1, 0]);
        assert_near(a[0], 6.0, TOL, "U00");
        assert_near(a[2], 4.0 / 6.0, TOL, "L10");
        assert_near(a[3], 1.0, TOL, "U11");
        assert_near(sign * a[0] * a[3], -6.0, TOL, "det");
    }

    #[test]
    fn zero_leading_entry_forces_pivot() {
        let mut a = [0.0_f64, 1.0, 1.0, 0.0];
        let mut perm = [0usize; 2];
        let sign = lu_in_place(2, &mut a, &mut perm);
        assert_eq!(sign, -1.0);
        assert_eq!(perm, [1, 0]);
        // L = I, U = I
        assert_eq!(a, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn exact_zero_pivot_is_silent() {
        let mut a = [1.0_f64, 2.0, 2.0, 4.0];
        let mut perm = [0usize; 2];
        lu_in_place(2, &mut a, &mut perm);
        assert_eq!(a[3], 0.0);
        let lu = DenseMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]).lu();
        assert!(lu.is_singular());
        assert_eq!(lu.det(), 0.0);
        assert_eq!(lu.inverse().unwrap_err(), LinalgError::Singular);
    }

    #[test]
    fn zero_row_uses_unit_scale() {
        let mut a = [0.0_f64, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 7.0];
        let mut perm = [0usize; 3];
        lu_in_place(3, &mut a, &mut perm);
        // The zero row sinks to the bottom and leaves a zero pivot there.
        assert_eq!(perm[2], 0);
        assert_eq!(a[8], 0.0);
    }

    #[test]
    fn reconstruct_pa_eq_lu() {
        let a = DenseMatrix::from_rows(
            4,
            4,
            &[
                1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 2.0, 6.0, 4.0, 1.0, 3.0, 1.0, 9.0, 2.0,
            ],
        );
        let lu = a.lu();
        let pa = &lu.p() * &a;
        let l_u = &lu.l() * &lu.u();
        assert!(pa.max_abs_diff(&l_u) < 1e-12);

        // Every index appears exactly once.
        let mut seen = [false; 4];
        for &p in lu.perm() {
            assert!(!seen[p]);
            seen[p] = true;
        }
    }

    #[test]
    fn solve_leading_zero_rhs() {
        let a = DenseMatrix::from_rows(3, 3, &[2.0_f64, 1.0, -1.0, -3.0, -1.0, 2.0, -2.0, 1.0, 2.0]);
        let b = DenseMatrix::from_rows(3, 1, &[0.0, 0.0, 1.0]);
        let x = a.solve(&b).unwrap();
        let ax = &a * &x;
        assert!(ax.max_abs_diff(&b) < 1e-12);
    }

    #[test]
    fn solve_multiple_rhs() {
        let a = DenseMatrix::from_rows(3, 3, &[2.0_f64, 1.0, -1.0, -3.0, -1.0, 2.0, -2.0, 1.0, 2.0]);
        let b = DenseMatrix::from_rows(3, 2, &[8.0, 1.0, -11.0, 0.0, -3.0, 2.0]);
        let x = a.solve(&b).unwrap();
        assert_near(x[(0, 0)], 2.0, TOL, "x00");
        assert_near(x[(1, 0)], 3.0, TOL, "x10");
        assert_near(x[(2, 0)], -1.0, TOL, "x20");
        let ax = &a * &x;
        assert!(ax.max_abs_diff(&b) < 1e-12);
    }

    #[test]
    fn inverse_3x3() {
        let a = DenseMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 0.0, 1.0, 4.0, 5.0, 6.0, 0.0]);
        let inv = a.inverse().unwrap();
        let id = &a * &inv;
        assert!(id.max_abs_diff(&DenseMatrix::eye(3)) < 1e-10);
    }

    #[test]
    fn badly_scaled_rows() {
        // Row scaling keeps the tiny row from being chosen on magnitude alone.
        let a = DenseMatrix::from_rows(2, 2, &[1e-20_f64, 1.0, 1.0, 1.0]);
        let b = DenseMatrix::from_rows(2, 1, &[1.0, 2.0]);
        let x = a.solve(&b).unwrap();
        assert_near(x[(0, 0)], 1.0, 1e-12, "x0");
        assert_near(x[(1, 0)], 1.0, 1e-12, "x1");
    }

    #[test]
    fn f32_det() {
        let a = DenseMatrix::from_rows(2, 2, &[3.0_f32, 8.0, 4.0, 6.0]);
        assert!((a.det() - (-14.0)).abs() < 1e-5);
    }

    #[test]
    fn empty_matrix() {
        let a = DenseMatrix::<f64>::zeros(0, 0);
        let lu = a.lu();
        assert_eq!(lu.det(), 1.0);
        assert!(!lu.is_singular());
    }
}

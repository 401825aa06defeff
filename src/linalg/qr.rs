use alloc::vec;
use alloc::vec::Vec;
use num_traits::{Float, One, Zero};

use crate::dense::DenseMatrix;
use crate::linalg::swap_cols;
use crate::traits::LinalgScalar;

/// Column-pivoted Householder QR, in place.
///
/// `a` is an `m x n` row-major buffer. At each of `min(m, n)` steps the
/// remaining column with the largest squared norm is swapped into place and
/// a Householder reflector zeroes it below the diagonal. On return:
///
/// - `d[i]` (length `min(m, n)`) holds R's diagonal. Its modulus is the
///   column norm at step `i`; its phase is opposite the pivot entry's
///   (`-sign` for reals).
/// - `a` holds R's strict upper triangle, and the reflector vectors on and
///   below the diagonal.
/// - `ind[i]` (length `n`) is the column swapped into position `i` at step
///   `i`. This is a swap history, not a permutation; use
///   [`swaps_to_permutation`] for the matrix form.
///
/// Squared column norms are cached and downdated by the eliminated row's
/// entry at each step. A cached norm that has cancelled below `sqrt(eps)`
/// of its last exact value is recomputed from the column's remaining rows.
/// Pivoting stops once the largest exact remaining norm is negligible
/// against the largest initial column norm; unreached steps keep `d[i] = 0`
/// and `ind[i] = i`.
///
/// Returns the number of steps taken. Rank deficiency is never an error.
pub fn qrp_in_place<T: LinalgScalar>(
    m: usize,
    n: usize,
    a: &mut [T],
    d: &mut [T],
    ind: &mut [usize],
) -> usize {
    let k = m.min(n);
    assert_eq!(a.len(), m * n, "QR requires an m x n buffer");
    assert_eq!(d.len(), k, "diagonal length must be min(m, n)");
    assert_eq!(ind.len(), n, "swap history length must be n");

    let zero = <T::Real as Zero>::zero();
    let one = <T::Real as One>::one();

    for x in d.iter_mut() {
        *x = T::zero();
    }
    for (i, p) in ind.iter_mut().enumerate() {
        *p = i;
    }

    let mut c = vec![zero; n];
    for i in 0..m {
        for j in 0..n {
            c[j] = c[j] + a[i * n + j].modulus_sqr();
        }
    }
    let mut guard = zero;
    for &cj in &c {
        if cj > guard {
            guard = cj;
        }
    }
    let guard = Float::sqrt(guard);
    let tol = Float::sqrt(T::lepsilon());
    let mut exact = c.clone();

    let mut i = 0;
    while i < k {
        let mut p = argmax_from(&c, i);
        if guard + Float::sqrt(c[p]) == guard {
            // The cache may have cancelled; confirm against the true tails.
            for j in i..n {
                c[j] = tail_norm_sqr(a, m, n, i, j);
                exact[j] = c[j];
            }
            p = argmax_from(&c, i);
            if guard + Float::sqrt(c[p]) == guard {
                log::debug!("QR pivoting stopped at step {} of {}: remaining columns negligible", i, k);
                break;
            }
        }
        if p != i {
            swap_cols(a, m, n, i, p);
            c.swap(i, p);
            exact.swap(i, p);
        }
        ind[i] = p;

        let mut s = zero;
        for r in i..m {
            s = s + a[r * n + i].modulus_sqr();
        }
        let s = Float::sqrt(s);

        if s != zero {
            let x0 = a[i * n + i];
            let ph = x0.reflector_phase();
            let sv = T::from_real(s);
            d[i] = T::zero() - ph * sv;
            a[i * n + i] = x0 + ph * sv;
            let beta = T::from_real(one / (s * a[i * n + i].modulus()));

            for j in (i + 1)..n {
                let mut t = T::zero();
                for r in i..m {
                    t = t + a[r * n + i].conj() * a[r * n + j];
                }
                let t = t * beta;
                for r in i..m {
                    a[r * n + j] = a[r * n + j] - t * a[r * n + i];
                }
            }
        }

        for j in (i + 1)..n {
            c[j] = Float::max(c[j] - a[i * n + j].modulus_sqr(), zero);
            if c[j] <= tol * exact[j] {
                c[j] = tail_norm_sqr(a, m, n, i + 1, j);
                exact[j] = c[j];
            }
        }
        i += 1;
    }
    i
}

/// Index of the largest entry of `c[from..]`, first on ties.
fn argmax_from<R: PartialOrd>(c: &[R], from: usize) -> usize {
    let mut p = from;
    for j in (from + 1)..c.len() {
        if c[j] > c[p] {
            p = j;
        }
    }
    p
}

/// Squared norm of column `j` over rows `row..m`.
fn tail_norm_sqr<T: LinalgScalar>(a: &[T], m: usize, n: usize, row: usize, j: usize) -> T::Real {
    let mut s = <T::Real as Zero>::zero();
    for r in row..m {
        s = s + a[r * n + j].modulus_sqr();
    }
    s
}

/// Apply reflector `i` (stored in column `i` of `a`, rows `i..m`) to the
/// columns `cols` of `y`, a row-major buffer of width `stride`.
#[allow(clippy::too_many_arguments)]
fn apply_reflector<T: LinalgScalar>(
    m: usize,
    n: usize,
    a: &[T],
    d: &[T],
    i: usize,
    y: &mut [T],
    stride: usize,
    cols: core::ops::Range<usize>,
) {
    let one = <T::Real as One>::one();
    let beta = T::from_real(one / (d[i].modulus() * a[i * n + i].modulus()));
    for j in cols {
        let mut t = T::zero();
        for r in i..m {
            t = t + a[r * n + i].conj() * y[r * stride + j];
        }
        let t = t * beta;
        for r in i..m {
            y[r * stride + j] = y[r * stride + j] - t * a[r * n + i];
        }
    }
}

/// Reconstruct the `m x m` unitary factor Q from [`qrp_in_place`] output.
///
/// Replays the stored reflectors in reverse order against an identity seed;
/// `q` is overwritten. Steps with `d[i] = 0` carry no reflector and are
/// skipped.
pub fn qrp_q<T: LinalgScalar>(m: usize, n: usize, a: &[T], d: &[T], q: &mut [T]) {
    let k = m.min(n);
    assert_eq!(a.len(), m * n);
    assert_eq!(d.len(), k);
    assert_eq!(q.len(), m * m, "Q must be m x m");

    for r in 0..m {
        for c in 0..m {
            q[r * m + c] = if r == c { T::one() } else { T::zero() };
        }
    }
    for i in (0..k).rev() {
        if d[i] == T::zero() {
            continue;
        }
        apply_reflector(m, n, a, d, i, q, m, i..m);
    }
}

/// Convert a QR swap history into the `n x n` permutation matrix `P` with
/// `A·P = Q·R`.
///
/// The recorded swaps are replayed in order on a running index array, then
/// scattered into `p`, which is overwritten.
pub fn swaps_to_permutation<T: LinalgScalar>(ind: &[usize], p: &mut [T]) {
    let n = ind.len();
    assert_eq!(p.len(), n * n);
    let mut idx: Vec<usize> = (0..n).collect();
    for (i, &s) in ind.iter().enumerate() {
        idx.swap(i, s);
    }
    for x in p.iter_mut() {
        *x = T::zero();
    }
    for (j, &r) in idx.iter().enumerate() {
        p[r * n + j] = T::one();
    }
}

/// Numerical rank from R's diagonal: leading entries with
/// `|d[i]| >= |d[0]|·eps`, stopping at the first that falls below.
///
/// Relies on the pivoting keeping `|d|` roughly non-increasing, which holds
/// in practice but is not guaranteed for every input.
fn estimate_rank<T: LinalgScalar>(d: &[T]) -> usize {
    let Some(first) = d.first() else {
        return 0;
    };
    let threshold = first.modulus() * T::lepsilon();
    d.iter()
        .take_while(|x| **x != T::zero() && x.modulus() >= threshold)
        .count()
}

/// Rank-revealing least squares from [`qrp_in_place`] output.
///
/// Minimizes `||A·X - B||` for each of the `nrhs` columns of the `m x nrhs`
/// buffer `b`, writing the `n x nrhs` solution to `x`. Only the first `r`
/// rows of R are used, where `r` is the estimated numerical rank; the
/// remaining unknowns of the pivoted system are zero. For rank-deficient
/// systems this is one particular solution, not the minimum-norm one.
///
/// Returns the estimated rank.
#[allow(clippy::too_many_arguments)]
pub fn qrp_solve<T: LinalgScalar>(
    m: usize,
    n: usize,
    nrhs: usize,
    a: &[T],
    d: &[T],
    ind: &[usize],
    b: &[T],
    x: &mut [T],
) -> usize {
    let k = m.min(n);
    assert_eq!(a.len(), m * n);
    assert_eq!(d.len(), k);
    assert_eq!(ind.len(), n);
    assert_eq!(b.len(), m * nrhs, "right-hand side must be m x nrhs");
    assert_eq!(x.len(), n * nrhs, "solution must be n x nrhs");

    let rank = estimate_rank(d);
    if rank < k {
        log::debug!("QR least squares: estimated rank {} of {}", rank, k);
    }

    let mut y = b.to_vec();
    for i in 0..rank {
        apply_reflector(m, n, a, d, i, &mut y, nrhs, 0..nrhs);
    }

    let mut z = vec![T::zero(); n];
    for col in 0..nrhs {
        for v in z.iter_mut() {
            *v = T::zero();
        }
        for i in (0..rank).rev() {
            let mut s = y[i * nrhs + col];
            for j in (i + 1)..rank {
                s = s - a[i * n + j] * z[j];
            }
            z[i] = s.safe_div(d[i]);
        }
        for i in (0..k).rev() {
            z.swap(i, ind[i]);
        }
        for i in 0..n {
            x[i * nrhs + col] = z[i];
        }
    }
    rank
}

/// Column-pivoted QR decomposition of an `m x n` matrix: `A·P = Q·R`.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
///
/// // Fit y = c0 + c1·t through four exact points.
/// let a = DenseMatrix::from_rows(4, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
/// let b = DenseMatrix::from_rows(4, 1, &[1.0, 3.0, 5.0, 7.0]);
/// let qr = a.qr();
/// assert_eq!(qr.rank(), 2);
/// let c = qr.solve(&b);
/// assert!((c[(0, 0)] - 1.0).abs() < 1e-12);
/// assert!((c[(1, 0)] - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Qr<T: LinalgScalar> {
    qr: DenseMatrix<T>,
    d: Vec<T>,
    ind: Vec<usize>,
}

impl<T: LinalgScalar> Qr<T> {
    /// Decompose an `m x n` matrix of any shape.
    pub fn new(a: &DenseMatrix<T>) -> Self {
        let (m, n) = (a.nrows(), a.ncols());
        let mut qr = a.clone();
        let mut d = vec![T::zero(); m.min(n)];
        let mut ind = vec![0usize; n];
        qrp_in_place(m, n, qr.as_mut_slice(), &mut d, &mut ind);
        Self { qr, d, ind }
    }

    /// The `m x m` unitary factor.
    pub fn q(&self) -> DenseMatrix<T> {
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        let mut q = DenseMatrix::zeros(m, m);
        qrp_q(m, n, self.qr.as_slice(), &self.d, q.as_mut_slice());
        q
    }

    /// The `m x n` upper-triangular factor.
    pub fn r(&self) -> DenseMatrix<T> {
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        let mut r = DenseMatrix::zeros(m, n);
        for i in 0..self.d.len() {
            r[(i, i)] = self.d[i];
            for j in (i + 1)..n {
                r[(i, j)] = self.qr[(i, j)];
            }
        }
        r
    }

    /// The `n x n` column permutation.
    pub fn p(&self) -> DenseMatrix<T> {
        let n = self.ind.len();
        let mut p = DenseMatrix::zeros(n, n);
        swaps_to_permutation(&self.ind, p.as_mut_slice());
        p
    }

    /// Swap history: column `swaps()[i]` was exchanged with column `i` at step `i`.
    #[inline]
    pub fn swaps(&self) -> &[usize] {
        &self.ind
    }

    /// R's diagonal.
    #[inline]
    pub fn diagonal(&self) -> &[T] {
        &self.d
    }

    /// Estimated numerical rank, from R's diagonal.
    pub fn rank(&self) -> usize {
        estimate_rank(&self.d)
    }

    /// Least-squares solution of `A·X ≈ B` (`B` is `m x nrhs`).
    pub fn solve(&self, b: &DenseMatrix<T>) -> DenseMatrix<T> {
        let (m, n) = (self.qr.nrows(), self.qr.ncols());
        assert_eq!(b.nrows(), m, "rhs row count mismatch");
        let nrhs = b.ncols();
        let mut x = DenseMatrix::zeros(n, nrhs);
        qrp_solve(
            m,
            n,
            nrhs,
            self.qr.as_slice(),
            &self.d,
            &self.ind,
            b.as_slice(),
            x.as_mut_slice(),
        );
        x
    }
}

impl<T: LinalgScalar> DenseMatrix<T> {
    /// Column-pivoted QR decomposition.
    pub fn qr(&self) -> Qr<T> {
        Qr::new(self)
    }

    /// Least-squares solution of `A·X ≈ B` via column-pivoted QR.
    pub fn lstsq(&self, b: &DenseMatrix<T>) -> DenseMatrix<T> {
        self.qr().solve(b)
    }
}

use alloc::vec;
use alloc::vec::Vec;
use num_traits::{Float, One, Zero};

use crate::dense::DenseMatrix;
use crate::linalg::{swap_cols, LinalgError, MAX_SWEEPS};
use crate::traits::LinalgScalar;

/// Singular value decomposition `A = U·diag(s)·V^H`, in place.
///
/// Golub–Kahan Householder bidiagonalization followed by implicit-shift QR
/// sweeps on the bidiagonal. `a` is an `m x n` row-major buffer with
/// `m >= n`; on return (with `compute_uv`) it holds the `m x n`
/// column-orthonormal U. `s` (length `n`) receives the singular values,
/// non-negative and sorted descending; `v` (`n x n`) receives V.
///
/// With `compute_uv = false` only `s` is computed; `v` is not touched and
/// may be empty, and `a` is left as scratch.
///
/// For complex input, each Householder step absorbs a unit phase into the
/// adjacent row or column so the bidiagonal form stays real; the phases are
/// folded back into U and V during accumulation.
///
/// Fails with [`LinalgError::ConvergenceFailure`] when one singular value
/// needs more than [`MAX_SWEEPS`] sweeps; the buffers are then unspecified.
pub fn svd_in_place<T: LinalgScalar>(
    m: usize,
    n: usize,
    compute_uv: bool,
    a: &mut [T],
    s: &mut [T::Real],
    v: &mut [T],
) -> Result<(), LinalgError> {
    svd_in_place_with_max_sweeps(m, n, compute_uv, a, s, v, MAX_SWEEPS)
}

/// [`svd_in_place`] with an explicit sweep cap per singular value.
pub fn svd_in_place_with_max_sweeps<T: LinalgScalar>(
    m: usize,
    n: usize,
    compute_uv: bool,
    a: &mut [T],
    s: &mut [T::Real],
    v: &mut [T],
    max_sweeps: usize,
) -> Result<(), LinalgError> {
    assert!(m >= n, "SVD kernel requires m >= n (decompose the adjoint instead)");
    assert_eq!(a.len(), m * n, "SVD requires an m x n buffer");
    assert_eq!(s.len(), n, "singular value slice must have length n");
    if compute_uv {
        assert_eq!(v.len(), n * n, "V must be n x n");
    }

    let zero = <T::Real as Zero>::zero();
    let mut rv1 = vec![zero; n];
    let mut lphase = vec![T::one(); n];
    let mut rphase = vec![T::one(); n];

    let anorm = bidiagonalize(m, n, a, s, &mut rv1, &mut lphase, &mut rphase);
    if compute_uv {
        accumulate_right(n, a, &rv1, &rphase, v);
        accumulate_left(m, n, a, s, &lphase);
    }
    diagonalize(m, n, compute_uv, a, s, &mut rv1, v, anorm, max_sweeps)?;
    sort_descending(m, n, compute_uv, a, s, v);
    Ok(())
}

/// Sum of moduli, used to scale a Householder vector.
fn scale_of<T: LinalgScalar>(xs: impl Iterator<Item = T>) -> T::Real {
    xs.fold(<T::Real as Zero>::zero(), |acc, x| acc + x.modulus())
}

/// Reduce `a` to real upper-bidiagonal form. Diagonal goes to `w`,
/// superdiagonal to `rv1[1..]`. Returns the deflation reference `anorm`.
fn bidiagonalize<T: LinalgScalar>(
    m: usize,
    n: usize,
    a: &mut [T],
    w: &mut [T::Real],
    rv1: &mut [T::Real],
    lphase: &mut [T],
    rphase: &mut [T],
) -> T::Real {
    let zero = <T::Real as Zero>::zero();
    let mut anorm = zero;
    let mut tmp = vec![T::zero(); n];

    for i in 0..n {
        let l = i + 1;

        // Left reflection on column i, rows i..m
        let mut g = T::zero();
        let mut scale = zero;
        if i < m {
            scale = scale_of((i..m).map(|k| a[k * n + i]));
            if scale != zero {
                let sc = T::from_real(scale);
                let mut s = zero;
                for k in i..m {
                    a[k * n + i] = a[k * n + i].safe_div(sc);
                    s = s + a[k * n + i].modulus_sqr();
                }
                let f = a[i * n + i];
                g = T::zero() - f.reflector_phase() * T::from_real(s.sqrt());
                let h = T::from_real((f * g.conj()).re() - s);
                a[i * n + i] = f - g;
                for j in l..n {
                    let mut sum = T::zero();
                    for k in i..m {
                        sum = sum + a[k * n + i].conj() * a[k * n + j];
                    }
                    let f = sum.safe_div(h);
                    for k in i..m {
                        a[k * n + j] = a[k * n + j] + f * a[k * n + i];
                    }
                }
                for k in i..m {
                    a[k * n + i] = a[k * n + i] * sc;
                }
            }
        }
        let raw = T::from_real(scale) * g;
        let q = raw.unit_phase();
        lphase[i] = q;
        w[i] = (raw * q.conj()).re();
        for j in l..n {
            a[i * n + j] = a[i * n + j] * q.conj();
        }

        // Right reflection on row i, columns l..n
        g = T::zero();
        scale = zero;
        if i < m && i + 1 != n {
            scale = scale_of((l..n).map(|k| a[i * n + k]));
            if scale != zero {
                let sc = T::from_real(scale);
                let mut s = zero;
                for k in l..n {
                    a[i * n + k] = a[i * n + k].safe_div(sc);
                    s = s + a[i * n + k].modulus_sqr();
                }
                let f = a[i * n + l];
                g = T::zero() - f.reflector_phase() * T::from_real(s.sqrt());
                let h = T::from_real((f * g.conj()).re() - s);
                a[i * n + l] = f - g;
                for k in l..n {
                    tmp[k] = a[i * n + k].safe_div(h);
                }
                for j in l..m {
                    let mut sum = T::zero();
                    for k in l..n {
                        sum = sum + a[j * n + k] * a[i * n + k].conj();
                    }
                    for k in l..n {
                        a[j * n + k] = a[j * n + k] + sum * tmp[k];
                    }
                }
                for k in l..n {
                    a[i * n + k] = a[i * n + k] * sc;
                }
            }
        }
        if l < n {
            let raw = T::from_real(scale) * g;
            let q = raw.unit_phase();
            rphase[l] = q;
            rv1[l] = (raw * q.conj()).re();
            for j in l..m {
                a[j * n + l] = a[j * n + l] * q.conj();
            }
        }

        anorm = anorm.max(w[i].abs() + rv1[i].abs());
    }
    anorm
}

/// Replay the right-hand reflectors into `v`, seeded as the identity.
fn accumulate_right<T: LinalgScalar>(
    n: usize,
    a: &[T],
    rv1: &[T::Real],
    rphase: &[T],
    v: &mut [T],
) {
    let mut g = T::zero();
    let mut l = n;
    for i in (0..n).rev() {
        if i + 1 < n {
            if g != T::zero() {
                for j in l..n {
                    v[j * n + i] = a[i * n + j].conj().safe_div(a[i * n + l].conj()).safe_div(g);
                }
                for j in l..n {
                    let mut s = T::zero();
                    for k in l..n {
                        s = s + a[i * n + k] * v[k * n + j];
                    }
                    for k in l..n {
                        v[k * n + j] = v[k * n + j] + s * v[k * n + i];
                    }
                }
            }
            for j in l..n {
                v[i * n + j] = T::zero();
                v[j * n + i] = T::zero();
            }
        }
        v[i * n + i] = rphase[i].conj();
        g = T::from_real(rv1[i]) * rphase[i];
        l = i;
    }
}

/// Replay the left-hand reflectors in place, turning `a` into U.
fn accumulate_left<T: LinalgScalar>(m: usize, n: usize, a: &mut [T], w: &[T::Real], lphase: &[T]) {
    for i in (0..m.min(n)).rev() {
        let l = i + 1;
        let g = T::from_real(w[i]) * lphase[i];
        for j in l..n {
            a[i * n + j] = T::zero();
        }
        if g != T::zero() {
            let ginv = g.safe_recip();
            for j in l..n {
                let mut s = T::zero();
                for k in l..m {
                    s = s + a[k * n + i].conj() * a[k * n + j];
                }
                let f = s.safe_div(a[i * n + i]) * ginv.conj();
                for k in i..m {
                    a[k * n + j] = a[k * n + j] + f * a[k * n + i];
                }
            }
            for j in i..m {
                a[j * n + i] = a[j * n + i] * ginv;
            }
        } else {
            for j in i..m {
                a[j * n + i] = T::zero();
            }
        }
        a[i * n + i] = a[i * n + i] + T::one();
        for j in i..m {
            a[j * n + i] = a[j * n + i] * lphase[i];
        }
    }
}

/// Apply the plane rotation `(c, s)` to columns `p` and `q` of a row-major
/// `rows x cols` buffer.
#[inline]
fn rotate_cols<T: LinalgScalar>(
    buf: &mut [T],
    rows: usize,
    cols: usize,
    p: usize,
    q: usize,
    c: T::Real,
    s: T::Real,
) {
    let (c, s) = (T::from_real(c), T::from_real(s));
    for r in 0..rows {
        let y = buf[r * cols + p];
        let z = buf[r * cols + q];
        buf[r * cols + p] = y * c + z * s;
        buf[r * cols + q] = z * c - y * s;
    }
}

/// Find the start `l` of the unreduced block ending at `k`.
///
/// Returns `(l, cancel)`: `cancel` is set when `w[l - 1]` is negligible, in
/// which case `rv1[l]` must be chased out before sweeping.
fn split_point<R: Float>(k: usize, w: &[R], rv1: &[R], anorm: R) -> (usize, bool) {
    let mut l = k;
    loop {
        if l == 0 || rv1[l].abs() + anorm == anorm {
            return (l, false);
        }
        if w[l - 1].abs() + anorm == anorm {
            return (l, true);
        }
        l -= 1;
    }
}

/// Zero `rv1[l]` when `w[l - 1]` is negligible, rotating U's columns.
#[allow(clippy::too_many_arguments)]
fn cancel<T: LinalgScalar>(
    m: usize,
    n: usize,
    compute_uv: bool,
    a: &mut [T],
    w: &mut [T::Real],
    rv1: &mut [T::Real],
    l: usize,
    k: usize,
    anorm: T::Real,
) {
    let nm = l - 1;
    let mut c = <T::Real as Zero>::zero();
    let mut s = <T::Real as One>::one();
    for i in l..=k {
        let f = s * rv1[i];
        rv1[i] = c * rv1[i];
        if f.abs() + anorm == anorm {
            break;
        }
        let g = w[i];
        let h = f.hypot(g);
        w[i] = h;
        let h = h.recip();
        c = g * h;
        s = -f * h;
        if compute_uv {
            rotate_cols(a, m, n, nm, i, c, s);
        }
    }
}

/// One implicit-shift QR sweep over `w[l..=k]`, shift from the trailing 2x2.
#[allow(clippy::too_many_arguments)]
fn sweep<T: LinalgScalar>(
    m: usize,
    n: usize,
    compute_uv: bool,
    a: &mut [T],
    w: &mut [T::Real],
    rv1: &mut [T::Real],
    v: &mut [T],
    l: usize,
    k: usize,
) {
    let one = <T::Real as One>::one();
    let two = one + one;

    let nm = k - 1;
    let mut x = w[l];
    let mut y = w[nm];
    let mut z = w[k];
    let mut g = rv1[nm];
    let mut h = rv1[k];
    let mut f = ((y - z) * (y + z) + (g - h) * (g + h)) / (two * h * y);
    g = f.hypot(one);
    let signed_g = if f >= <T::Real as Zero>::zero() { g.abs() } else { -g.abs() };
    f = ((x - z) * (x + z) + h * ((y / (f + signed_g)) - h)) / x;

    let mut c = one;
    let mut s = one;
    for j in l..=nm {
        let i = j + 1;
        g = rv1[i];
        y = w[i];
        h = s * g;
        g = c * g;
        z = f.hypot(h);
        rv1[j] = z;
        c = f / z;
        s = h / z;
        f = x * c + g * s;
        g = g * c - x * s;
        h = y * s;
        y = y * c;
        if compute_uv {
            rotate_cols(v, n, n, j, i, c, s);
        }
        z = f.hypot(h);
        w[j] = z;
        if z != <T::Real as Zero>::zero() {
            z = z.recip();
            c = f * z;
            s = h * z;
        }
        f = c * g + s * y;
        x = c * y - s * g;
        if compute_uv {
            rotate_cols(a, m, n, j, i, c, s);
        }
    }
    rv1[l] = <T::Real as Zero>::zero();
    rv1[k] = f;
    w[k] = x;
}

/// Diagonalize the bidiagonal `(w, rv1)`, trailing value first.
#[allow(clippy::too_many_arguments)]
fn diagonalize<T: LinalgScalar>(
    m: usize,
    n: usize,
    compute_uv: bool,
    a: &mut [T],
    w: &mut [T::Real],
    rv1: &mut [T::Real],
    v: &mut [T],
    anorm: T::Real,
    max_sweeps: usize,
) -> Result<(), LinalgError> {
    let zero = <T::Real as Zero>::zero();
    for k in (0..n).rev() {
        let mut its = 0;
        loop {
            let (l, needs_cancel) = split_point(k, w, rv1, anorm);
            if needs_cancel {
                cancel(m, n, compute_uv, a, w, rv1, l, k, anorm);
            }
            if l == k {
                if w[k] < zero {
                    w[k] = -w[k];
                    if compute_uv {
                        for j in 0..n {
                            v[j * n + k] = T::zero() - v[j * n + k];
                        }
                    }
                }
                break;
            }
            if its == max_sweeps {
                log::warn!(
                    "SVD: singular value {} did not converge in {} sweeps",
                    k,
                    max_sweeps
                );
                return Err(LinalgError::ConvergenceFailure {
                    index: k,
                    sweeps: max_sweeps,
                });
            }
            its += 1;
            sweep(m, n, compute_uv, a, w, rv1, v, l, k);
        }
    }
    Ok(())
}

/// Selection sort of the singular values, descending, with U/V columns.
fn sort_descending<T: LinalgScalar>(
    m: usize,
    n: usize,
    compute_uv: bool,
    a: &mut [T],
    w: &mut [T::Real],
    v: &mut [T],
) {
    for i in 0..n {
        let mut mx = i;
        for j in (i + 1)..n {
            if w[j] > w[mx] {
                mx = j;
            }
        }
        if mx != i {
            w.swap(i, mx);
            if compute_uv {
                swap_cols(a, m, n, i, mx);
                swap_cols(v, n, n, i, mx);
            }
        }
    }
}

/// Thin singular value decomposition of an `m x n` matrix of any shape.
///
/// `A = U·diag(σ)·V^H` with `k = min(m, n)` singular values; U is `m x k`,
/// V is `n x k`. Wide matrices are decomposed through their adjoint.
///
/// # Example
///
/// ```
/// use densela::DenseMatrix;
///
/// let a = DenseMatrix::from_rows(2, 2, &[3.0_f64, 2.0, 2.0, 3.0]);
/// let svd = a.svd().unwrap();
/// let s = svd.singular_values();
/// assert!((s[0] - 5.0).abs() < 1e-12);
/// assert!((s[1] - 1.0).abs() < 1e-12);
/// assert!((svd.condition_number() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Svd<T: LinalgScalar> {
    u: DenseMatrix<T>,
    s: Vec<T::Real>,
    v: DenseMatrix<T>,
}

impl<T: LinalgScalar> Svd<T> {
    /// Decompose `a`, computing U, V and the singular values.
    pub fn new(a: &DenseMatrix<T>) -> Result<Self, LinalgError> {
        let (m, n) = (a.nrows(), a.ncols());
        if m >= n {
            let (u, s, v) = Self::thin(a.clone())?;
            Ok(Self { u, s, v })
        } else {
            let (u, s, v) = Self::thin(a.adjoint())?;
            Ok(Self { u: v, s, v: u })
        }
    }

    fn thin(mut work: DenseMatrix<T>) -> Result<(DenseMatrix<T>, Vec<T::Real>, DenseMatrix<T>), LinalgError> {
        let (m, n) = (work.nrows(), work.ncols());
        let mut s = vec![<T::Real as Zero>::zero(); n];
        let mut v = DenseMatrix::zeros(n, n);
        svd_in_place(m, n, true, work.as_mut_slice(), &mut s, v.as_mut_slice())?;
        Ok((work, s, v))
    }

    /// Singular values only, descending.
    pub fn singular_values_only(a: &DenseMatrix<T>) -> Result<Vec<T::Real>, LinalgError> {
        let mut work = if a.nrows() >= a.ncols() {
            a.clone()
        } else {
            a.adjoint()
        };
        let (m, n) = (work.nrows(), work.ncols());
        let mut s = vec![<T::Real as Zero>::zero(); n];
        svd_in_place(m, n, false, work.as_mut_slice(), &mut s, &mut [])?;
        Ok(s)
    }

    /// Left singular vectors, `m x min(m, n)`.
    #[inline]
    pub fn u(&self) -> &DenseMatrix<T> {
        &self.u
    }

    /// Right singular vectors, `n x min(m, n)`.
    #[inline]
    pub fn v(&self) -> &DenseMatrix<T> {
        &self.v
    }

    /// Singular values, non-negative and descending.
    #[inline]
    pub fn singular_values(&self) -> &[T::Real] {
        &self.s
    }

    /// Number of singular values above `eps·σ_max`.
    pub fn rank(&self) -> usize {
        self.rank_with_tol(self.norm2() * T::lepsilon())
    }

    /// Number of singular values strictly above `tol`.
    pub fn rank_with_tol(&self, tol: T::Real) -> usize {
        self.s.iter().filter(|&&x| x > tol).count()
    }

    /// Spectral norm, `σ_max` (zero for an empty matrix).
    pub fn norm2(&self) -> T::Real {
        self.s.first().copied().unwrap_or_else(<T::Real as Zero>::zero)
    }

    /// `σ_max / σ_min`; infinite for a singular matrix.
    pub fn condition_number(&self) -> T::Real {
        match self.s.last() {
            Some(&min) if min != <T::Real as Zero>::zero() => self.norm2() / min,
            _ => <T::Real as Float>::infinity(),
        }
    }

    /// Rebuild `U·diag(σ)·V^H`.
    pub fn reconstruct(&self) -> DenseMatrix<T> {
        let mut us = self.u.clone();
        for i in 0..us.nrows() {
            for j in 0..self.s.len() {
                us[(i, j)] = us[(i, j)] * T::from_real(self.s[j]);
            }
        }
        &us * &self.v.adjoint()
    }
}

impl<T: LinalgScalar> DenseMatrix<T> {
    /// Thin singular value decomposition.
    pub fn svd(&self) -> Result<Svd<T>, LinalgError> {
        Svd::new(self)
    }

    /// Numerical rank: singular values above `eps·σ_max`.
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let a = DenseMatrix::from_rows(3, 3, &[1.0_f64, 2.0, 3.0, 2.0, 4.0, 6.0, 3.0, 6.0, 9.0]);
    /// assert_eq!(a.rank().unwrap(), 1);
    /// ```
    pub fn rank(&self) -> Result<usize, LinalgError> {
        let s = Svd::singular_values_only(self)?;
        let tol = s.first().copied().unwrap_or_else(<T::Real as Zero>::zero) * T::lepsilon();
        Ok(s.iter().filter(|&&x| x > tol).count())
    }

    /// Spectral norm, the largest singular value.
    pub fn norm2(&self) -> Result<T::Real, LinalgError> {
        let s = Svd::singular_values_only(self)?;
        Ok(s.first().copied().unwrap_or_else(<T::Real as Zero>::zero))
    }
}

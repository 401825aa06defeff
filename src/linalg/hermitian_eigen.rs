use alloc::vec;
use alloc::vec::Vec;
use num_complex::Complex;
use num_traits::{One, Zero};

use crate::dense::DenseMatrix;
use crate::linalg::{tridiagonal_ql, LinalgError};
use crate::traits::FloatScalar;

/// Householder reduction of a Hermitian matrix to real symmetric
/// tridiagonal form.
///
/// `a` (`n x n`, row-major) holds the Hermitian matrix on entry; only its
/// lower triangle is read. On return:
///
/// - `d` and `e` hold the real tridiagonal (diagonal, and subdiagonal with
///   `e[0] = 0`), in the layout [`tridiagonal_ql`] takes.
/// - `tau` holds the unit phase of each row, which makes the subdiagonal
///   real.
/// - the strict lower triangle of `a` holds the Householder vectors, and
///   `a[i][i]` holds the original diagonal in its real part and the
///   reflector scale in its imaginary part.
///
/// Pass `a` and `tau` to [`hermitian_back_transform`] to recover the
/// eigenvectors. Hermitian symmetry is not checked.
pub fn hermitian_tridiagonalize<T: FloatScalar>(
    n: usize,
    a: &mut [Complex<T>],
    d: &mut [T],
    e: &mut [T],
    tau: &mut [Complex<T>],
) {
    assert_eq!(a.len(), n * n, "tridiagonalization requires an n x n buffer");
    assert_eq!(d.len(), n);
    assert_eq!(e.len(), n);
    assert_eq!(tau.len(), n);
    if n == 0 {
        return;
    }

    let zero = <T as Zero>::zero();
    let one = <T as One>::one();
    let mut p = vec![Complex::new(zero, zero); n];

    tau[n - 1] = Complex::new(one, zero);
    for i in 0..n {
        d[i] = a[i * n + i].re;
    }

    for i in (0..n).rev() {
        let mut h = zero;
        let mut scale = zero;

        if i == 0 {
            e[0] = zero;
        } else {
            let l = i - 1;
            for k in 0..i {
                scale = scale + a[i * n + k].re.abs() + a[i * n + k].im.abs();
            }
            if scale == zero {
                tau[l] = Complex::new(one, zero);
                e[i] = zero;
            } else {
                for k in 0..i {
                    a[i * n + k] = a[i * n + k].unscale(scale);
                    h = h + a[i * n + k].norm_sqr();
                }
                let mut g = h.sqrt();
                e[i] = scale * g;
                let ail = a[i * n + l];
                let f = ail.re.hypot(ail.im);

                let (tre, si) = if f != zero {
                    let t = tau[i];
                    let tre = (ail.im * t.im - ail.re * t.re) / f;
                    let si = (ail.re * t.im + ail.im * t.re) / f;
                    h = h + f * g;
                    g = one + g / f;
                    a[i * n + l] = ail.scale(g);
                    (tre, si)
                } else {
                    a[i * n + l] = Complex::new(g, zero);
                    (-tau[i].re, tau[i].im)
                };

                // A single off-diagonal entry needs no update of the leading block
                if f == zero || l != 0 {
                    let mut f = zero;
                    for j in 0..i {
                        let mut gr = zero;
                        let mut gi = zero;
                        for k in 0..=j {
                            let (ajk, aik) = (a[j * n + k], a[i * n + k]);
                            gr = gr + ajk.re * aik.re + ajk.im * aik.im;
                            gi = gi - ajk.re * aik.im + ajk.im * aik.re;
                        }
                        for k in (j + 1)..i {
                            let (akj, aik) = (a[k * n + j], a[i * n + k]);
                            gr = gr + akj.re * aik.re - akj.im * aik.im;
                            gi = gi - akj.re * aik.im - akj.im * aik.re;
                        }
                        p[j] = Complex::new(gr / h, gi / h);
                        f = f + p[j].re * a[i * n + j].re - p[j].im * a[i * n + j].im;
                    }

                    let hh = f / (h + h);
                    for j in 0..i {
                        let fr = a[i * n + j].re;
                        let gr = p[j].re - hh * fr;
                        let fi = -a[i * n + j].im;
                        let gi = p[j].im - hh * fi;
                        p[j] = Complex::new(gr, -gi);
                        for k in 0..=j {
                            let (aik, pk) = (a[i * n + k], p[k]);
                            let ajk = a[j * n + k];
                            a[j * n + k] = Complex::new(
                                ajk.re - fr * pk.re - gr * aik.re + fi * pk.im + gi * aik.im,
                                ajk.im - fr * pk.im - gr * aik.im - fi * pk.re - gi * aik.re,
                            );
                        }
                    }
                }

                for k in 0..i {
                    a[i * n + k] = a[i * n + k].scale(scale);
                }
                tau[l] = Complex::new(tre, -si);
            }
        }

        let hh = d[i];
        d[i] = a[i * n + i].re;
        a[i * n + i] = Complex::new(hh, scale * h.sqrt());
    }
}

/// Recover complex eigenvectors from the real eigenvectors of the
/// tridiagonal produced by [`hermitian_tridiagonalize`].
///
/// `zr` (`n x n`) holds the real eigenvectors as columns, typically from
/// [`tridiagonal_ql`] seeded with the identity. `z` (`n x n`) is overwritten
/// with the eigenvectors of the original Hermitian matrix.
pub fn hermitian_back_transform<T: FloatScalar>(
    n: usize,
    a: &[Complex<T>],
    tau: &[Complex<T>],
    zr: &[T],
    z: &mut [Complex<T>],
) {
    assert_eq!(a.len(), n * n);
    assert_eq!(tau.len(), n);
    assert_eq!(zr.len(), n * n);
    assert_eq!(z.len(), n * n);

    let zero = <T as Zero>::zero();
    for k in 0..n {
        let t = tau[k];
        for j in 0..n {
            let x = zr[k * n + j];
            z[k * n + j] = Complex::new(x * t.re, -(x * t.im));
        }
    }

    for i in 1..n {
        let h = a[i * n + i].im;
        if h == zero {
            continue;
        }
        for j in 0..n {
            let mut s = Complex::new(zero, zero);
            for k in 0..i {
                s = s + a[i * n + k] * z[k * n + j];
            }
            let s = s.unscale(h).unscale(h);
            for k in 0..i {
                z[k * n + j] = z[k * n + j] - s * a[i * n + k].conj();
            }
        }
    }
}

/// Eigendecomposition of a Hermitian matrix: `A = V·diag(λ)·V^H` with real,
/// ascending `λ`.
///
/// # Example
///
/// ```
/// use densela::{Complex, DenseMatrix};
///
/// let a = DenseMatrix::from_rows(
///     2,
///     2,
///     &[
///         Complex::new(2.0_f64, 0.0), Complex::new(1.0, -1.0),
///         Complex::new(1.0, 1.0), Complex::new(3.0, 0.0),
///     ],
/// );
/// let eig = a.eig_hermitian().unwrap();
/// assert!((eig.eigenvalues()[0] - 1.0).abs() < 1e-12);
/// assert!((eig.eigenvalues()[1] - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct HermitianEigen<T> {
    values: Vec<T>,
    vectors: DenseMatrix<Complex<T>>,
}

impl<T: FloatScalar> HermitianEigen<T> {
    /// Decompose a Hermitian matrix. Only the lower triangle is read.
    pub fn new(a: &DenseMatrix<Complex<T>>) -> Result<Self, LinalgError> {
        assert!(a.is_square(), "eigendecomposition requires a square matrix");
        let n = a.nrows();
        let mut work = a.clone();
        let mut values = vec![T::zero(); n];
        let mut e = vec![T::zero(); n];
        let mut tau = vec![Complex::new(T::zero(), T::zero()); n];
        hermitian_tridiagonalize(n, work.as_mut_slice(), &mut values, &mut e, &mut tau);

        let mut zr = DenseMatrix::<T>::eye(n);
        tridiagonal_ql(n, &mut values, &mut e, zr.as_mut_slice())?;

        let mut vectors = DenseMatrix::zeros(n, n);
        hermitian_back_transform(n, work.as_slice(), &tau, zr.as_slice(), vectors.as_mut_slice());
        Ok(Self { values, vectors })
    }

    /// Eigenvalues, ascending.
    #[inline]
    pub fn eigenvalues(&self) -> &[T] {
        &self.values
    }

    /// Orthonormal eigenvectors as columns, matching [`eigenvalues`](Self::eigenvalues).
    #[inline]
    pub fn eigenvectors(&self) -> &DenseMatrix<Complex<T>> {
        &self.vectors
    }
}

impl<T: FloatScalar> DenseMatrix<Complex<T>> {
    /// Eigendecomposition of a Hermitian matrix.
    pub fn eig_hermitian(&self) -> Result<HermitianEigen<T>, LinalgError> {
        HermitianEigen::new(self)
    }
}

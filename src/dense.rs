use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut, Mul};

use crate::traits::{LinalgScalar, Scalar};

/// Heap-allocated dense matrix.
///
/// Row-major `Vec<T>` storage with runtime dimensions, i.e. exactly the flat
/// buffer layout the [`linalg`](crate::linalg) kernels consume. The
/// dimensions travel alongside the buffer; [`as_mut_slice`](Self::as_mut_slice)
/// hands the raw buffer to a kernel.
///
/// # Examples
///
/// ```
/// use densela::DenseMatrix;
///
/// let a = DenseMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
/// assert_eq!(a[(0, 1)], 2.0);
/// assert_eq!(a.nrows(), 2);
///
/// let id = DenseMatrix::<f64>::eye(3);
/// assert_eq!(id[(2, 2)], 1.0);
/// assert_eq!(id[(0, 2)], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: Scalar> DenseMatrix<T> {
    /// An `nrows x ncols` matrix of zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// The `n x n` identity.
    pub fn eye(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Copy a row-major slice.
    ///
    /// Panics if `slice.len() != nrows * ncols`.
    pub fn from_rows(nrows: usize, ncols: usize, slice: &[T]) -> Self {
        assert_eq!(slice.len(), nrows * ncols, "slice length must equal nrows * ncols");
        Self {
            data: slice.to_vec(),
            nrows,
            ncols,
        }
    }

    /// Take ownership of a row-major buffer.
    ///
    /// Panics if `data.len() != nrows * ncols`.
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), nrows * ncols, "buffer length must equal nrows * ncols");
        Self { data, nrows, ncols }
    }

    /// Build a matrix from `f(row, col)`.
    ///
    /// ```
    /// use densela::DenseMatrix;
    /// let m = DenseMatrix::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
    /// assert_eq!(m[(1, 2)], 5.0);
    /// ```
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Transpose (no conjugation).
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }
}

impl<T> DenseMatrix<T> {
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// The row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The row-major buffer, for handing to an in-place kernel.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the matrix, returning its row-major buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: LinalgScalar> DenseMatrix<T> {
    /// Conjugate transpose `A^H` (plain transpose for reals).
    pub fn adjoint(&self) -> Self {
        Self::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)].conj())
    }

    /// Largest entry-wise distance to `other`, by modulus.
    ///
    /// Panics on a dimension mismatch.
    pub fn max_abs_diff(&self, other: &Self) -> T::Real {
        assert_eq!(
            (self.nrows, self.ncols),
            (other.nrows, other.ncols),
            "dimension mismatch"
        );
        let mut worst = <T::Real as num_traits::Zero>::zero();
        for (a, b) in self.data.iter().zip(other.data.iter()) {
            let d = (*a - *b).modulus();
            if d > worst {
                worst = d;
            }
        }
        worst
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        debug_assert!(i < self.nrows && j < self.ncols);
        &self.data[i * self.ncols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        debug_assert!(i < self.nrows && j < self.ncols);
        &mut self.data[i * self.ncols + j]
    }
}

impl<T: Scalar> Mul<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn mul(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        assert_eq!(self.ncols, rhs.nrows, "inner dimensions must agree");
        let mut out = DenseMatrix::zeros(self.nrows, rhs.ncols);
        for i in 0..self.nrows {
            for k in 0..self.ncols {
                let a = self[(i, k)];
                if a == T::zero() {
                    continue;
                }
                for j in 0..rhs.ncols {
                    out[(i, j)] = out[(i, j)] + a * rhs[(k, j)];
                }
            }
        }
        out
    }
}

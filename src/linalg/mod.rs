//! Dense decomposition kernels over flat row-major buffers.
//!
//! Every kernel takes its dimensions as explicit parameters and mutates the
//! caller's buffers in place; none of them depends on another. The owned
//! wrappers ([`Lu`], [`Qr`], [`Svd`], [`SymmetricEigen`], [`HermitianEigen`])
//! allocate the buffers and expose determinant, inverse, rank, norm, solve
//! and eigenpair queries on top of the kernels.

#[cfg(feature = "complex")]
pub(crate) mod hermitian_eigen;
pub(crate) mod lu;
pub(crate) mod qr;
pub(crate) mod svd;
pub(crate) mod symmetric_eigen;

#[cfg(feature = "complex")]
pub use hermitian_eigen::{hermitian_back_transform, hermitian_tridiagonalize, HermitianEigen};
pub use lu::{compact_to_full, lu_in_place, lu_solve, permutation_to_full, Lu};
pub use qr::{qrp_in_place, qrp_q, qrp_solve, swaps_to_permutation, Qr};
pub use svd::{svd_in_place, svd_in_place_with_max_sweeps, Svd};
pub use symmetric_eigen::{
    symmetric_eigen_in_place, tridiagonal_ql, tridiagonal_ql_with_max_sweeps, tridiagonalize,
    SymmetricEigen,
};

/// Sweep cap per singular value (SVD) or eigenvalue (tridiagonal QL).
pub const MAX_SWEEPS: usize = 30;

/// Errors from linear algebra operations.
///
/// The LU and QR kernels never fail: singularity and rank deficiency are
/// encoded numerically in their outputs. Only the iterative kernels report
/// [`LinalgError::ConvergenceFailure`], and only the owned wrappers report
/// [`LinalgError::Singular`].
///
/// ```
/// use densela::DenseMatrix;
/// use densela::linalg::LinalgError;
///
/// let singular = DenseMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// assert_eq!(singular.inverse().unwrap_err(), LinalgError::Singular);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// An exact-zero pivot made the LU factors singular.
    Singular,
    /// QR/QL sweeps for one singular value or eigenvalue exceeded the cap.
    /// The buffers passed to the kernel are left partially updated.
    ConvergenceFailure {
        /// Index of the value that failed to converge.
        index: usize,
        /// Sweep cap that was exceeded.
        sweeps: usize,
    },
}

impl core::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinalgError::Singular => write!(f, "matrix is singular"),
            LinalgError::ConvergenceFailure { index, sweeps } => write!(
                f,
                "no convergence for value {} within {} sweeps",
                index, sweeps
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LinalgError {}

/// Swap two columns of a row-major `nrows x ncols` buffer.
#[inline]
pub(crate) fn swap_cols<T>(data: &mut [T], nrows: usize, ncols: usize, a: usize, b: usize) {
    if a == b {
        return;
    }
    for r in 0..nrows {
        data.swap(r * ncols + a, r * ncols + b);
    }
}

/// Swap two rows of a row-major buffer with `ncols` columns.
#[inline]
pub(crate) fn swap_rows<T>(data: &mut [T], ncols: usize, a: usize, b: usize) {
    if a == b {
        return;
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = data.split_at_mut(hi * ncols);
    head[lo * ncols..(lo + 1) * ncols].swap_with_slice(&mut tail[..ncols]);
}

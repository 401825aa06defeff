//! # densela
//!
//! Dense linear algebra decompositions in pure Rust, no-std compatible (with
//! `alloc`). Every kernel works in place on a flat row-major buffer with
//! explicit dimensions, and is generic over real (`f32`, `f64`) and complex
//! (`Complex<f32>`, `Complex<f64>`) elements.
//!
//! ## Quick start
//!
//! ```
//! use densela::DenseMatrix;
//!
//! // Solve a linear system Ax = b
//! let a = DenseMatrix::from_rows(3, 3, &[
//!     2.0_f64, 1.0, -1.0,
//!     -3.0, -1.0, 2.0,
//!     -2.0, 1.0, 2.0,
//! ]);
//! let b = DenseMatrix::from_rows(3, 1, &[8.0, -11.0, -3.0]);
//! let x = a.solve(&b).unwrap(); // x = [2, 3, -1]
//! assert!((x[(1, 0)] - 3.0).abs() < 1e-12);
//!
//! let s = a.svd().unwrap();
//! assert!(s.singular_values()[0] >= s.singular_values()[2]);
//! ```
//!
//! ## Modules
//!
//! - [`linalg`] — The kernels and their owned wrappers:
//!   - LU with row-scaled partial pivoting ([`lu_in_place`](linalg::lu_in_place), [`Lu`])
//!   - column-pivoted Householder QR with rank-revealing least squares
//!     ([`qrp_in_place`](linalg::qrp_in_place), [`Qr`])
//!   - Golub–Kahan SVD ([`svd_in_place`](linalg::svd_in_place), [`Svd`])
//!   - symmetric eigendecomposition by tridiagonalization and implicit QL
//!     ([`SymmetricEigen`]), and its Hermitian counterpart ([`HermitianEigen`])
//!
//! - [`dense`] — Heap-allocated `DenseMatrix<T>` with runtime dimensions;
//!   convenience methods `a.det()`, `a.inverse()`, `a.solve(&b)`,
//!   `a.lstsq(&b)`, `a.rank()`, `a.norm2()`, `a.eig_symmetric()`.
//!
//! - [`complex`] — Overflow-safe complex magnitude, division and reciprocal.
//!
//! - [`traits`] — Element trait hierarchy:
//!   - [`Scalar`] — all matrix elements (`Copy + PartialEq + Debug + Zero + One + Num`)
//!   - [`FloatScalar`] — real floats, used for singular values and eigenvalues
//!   - [`LinalgScalar`] — real floats and complex numbers, used by every kernel
//!
//! ## Failure model
//!
//! LU and QR never fail: a zero pivot or a negligible column norm is encoded
//! in the output (a zero on U's diagonal, a zero `d[i]`). SVD and the
//! tridiagonal QL iteration give up after [`MAX_SWEEPS`](linalg::MAX_SWEEPS)
//! sweeps per value with [`LinalgError::ConvergenceFailure`]. Buffer length
//! mismatches are programming errors and panic.
//!
//! Diagnostics go through the `log` facade; no logger is installed.
//!
//! ## Cargo features
//!
//! | Feature   | Default  | Description |
//! |-----------|----------|-------------|
//! | `std`     | yes      | Hardware FPU via system libm, `std::error::Error` |
//! | `complex` | yes      | `Complex<f32>` / `Complex<f64>` support via `num-complex` |
//! | `all`     | no       | All features: `std` + `complex` |
//!
//! Without `std`, float functions come from `libm` through `num-traits`,
//! which is always enabled.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "complex")]
pub mod complex;
pub mod dense;
pub mod linalg;
pub mod traits;

pub use dense::DenseMatrix;
#[cfg(feature = "complex")]
pub use linalg::HermitianEigen;
pub use linalg::{LinalgError, Lu, Qr, Svd, SymmetricEigen};
pub use traits::{FloatScalar, LinalgScalar, Scalar};

#[cfg(feature = "complex")]
pub use num_complex::Complex;

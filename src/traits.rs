use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

#[cfg(feature = "complex")]
use num_complex::Complex;

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for real floating-point matrix elements.
///
/// Singular values, eigenvalues and the bidiagonal/tridiagonal forms are
/// always stored in this type, even when the matrix itself is complex.
pub trait FloatScalar: Scalar + Float + LinalgScalar<Real = Self> {}

impl<T: Scalar + Float + LinalgScalar<Real = T>> FloatScalar for T {}

/// Trait for matrix elements that the decomposition kernels operate on.
///
/// Covers real floats (`f32`, `f64`) and, with the `complex` feature,
/// `Complex<f32>` / `Complex<f64>`. The real and complex variants of every
/// kernel are the same generic routine; the methods here are where the two
/// differ.
pub trait LinalgScalar: Scalar {
    /// The real component type (`Self` for reals, `T` for `Complex<T>`).
    type Real: FloatScalar;

    /// Absolute value / modulus. Overflow-safe for complex (`hypot`).
    fn modulus(self) -> Self::Real;

    /// Squared modulus, `|z|^2`.
    fn modulus_sqr(self) -> Self::Real;

    /// Complex conjugate (identity for reals).
    fn conj(self) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Machine epsilon of the underlying real type.
    fn lepsilon() -> Self::Real;

    /// Promote a real value into `Self`.
    fn from_real(r: Self::Real) -> Self;

    /// Division that avoids intermediate overflow (Smith's algorithm for complex).
    fn safe_div(self, rhs: Self) -> Self;

    /// Reciprocal that avoids intermediate overflow.
    fn safe_recip(self) -> Self;

    /// Phase used to pick a Householder reflector's sign: `±1` for reals
    /// (`+1` at zero), `z/|z|` for complex (`1` at zero).
    fn reflector_phase(self) -> Self;

    /// Unit factor `q` such that `self * conj(q)` is real and non-negative:
    /// always `1` for reals, `z/|z|` for complex (`1` at zero).
    fn unit_phase(self) -> Self;
}

/// Concrete impls for real floats: trivial delegation.
macro_rules! impl_linalg_scalar_real {
    ($($t:ty),*) => {
        $(
            impl LinalgScalar for $t {
                type Real = $t;

                #[inline] fn modulus(self) -> $t { Float::abs(self) }
                #[inline] fn modulus_sqr(self) -> $t { self * self }
                #[inline] fn conj(self) -> $t { self }
                #[inline] fn re(self) -> $t { self }
                #[inline] fn lepsilon() -> $t { <$t as Float>::epsilon() }
                #[inline] fn from_real(r: $t) -> $t { r }
                #[inline] fn safe_div(self, rhs: $t) -> $t { self / rhs }
                #[inline] fn safe_recip(self) -> $t { 1.0 / self }
                #[inline] fn reflector_phase(self) -> $t { if self >= 0.0 { 1.0 } else { -1.0 } }
                #[inline] fn unit_phase(self) -> $t { 1.0 }
            }
        )*
    };
}

impl_linalg_scalar_real!(f32, f64);

#[cfg(feature = "complex")]
impl<T: FloatScalar> LinalgScalar for Complex<T> {
    type Real = T;

    #[inline]
    fn modulus(self) -> T {
        crate::complex::abs(self)
    }

    #[inline]
    fn modulus_sqr(self) -> T {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn conj(self) -> Self {
        Complex::new(self.re, T::zero() - self.im)
    }

    #[inline]
    fn re(self) -> T {
        self.re
    }

    #[inline]
    fn lepsilon() -> T {
        T::epsilon()
    }

    #[inline]
    fn from_real(r: T) -> Self {
        Complex::new(r, T::zero())
    }

    #[inline]
    fn safe_div(self, rhs: Self) -> Self {
        crate::complex::div(self, rhs)
    }

    #[inline]
    fn safe_recip(self) -> Self {
        crate::complex::recip(self)
    }

    #[inline]
    fn reflector_phase(self) -> Self {
        self.unit_phase()
    }

    #[inline]
    fn unit_phase(self) -> Self {
        let r = crate::complex::abs(self);
        if r == T::zero() {
            Complex::new(T::one(), T::zero())
        } else {
            Complex::new(self.re / r, self.im / r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_phases() {
        assert_eq!((-3.0_f64).reflector_phase(), -1.0);
        assert_eq!(0.0_f64.reflector_phase(), 1.0);
        assert_eq!((-3.0_f64).unit_phase(), 1.0);
        assert_eq!(2.0_f32.safe_recip(), 0.5);
    }

    #[cfg(feature = "complex")]
    #[test]
    fn complex_unit_phase_rotates_onto_real_axis() {
        let z = Complex::new(3.0_f64, -4.0);
        let q = z.unit_phase();
        let r = z * q.conj();
        assert!((r.re - 5.0).abs() < 1e-14);
        assert!(r.im.abs() < 1e-14);
        assert_eq!(Complex::new(0.0_f64, 0.0).unit_phase(), Complex::new(1.0, 0.0));
    }
}

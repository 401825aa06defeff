//! Overflow-safe complex arithmetic used by the complex kernel variants.
//!
//! `num-complex` computes `a / b` as `a * conj(b) / |b|^2`, which overflows
//! for `|b|` above `sqrt(MAX)`. The kernels divide by pivots and reflector
//! norms that can legitimately be that large, so they go through these
//! helpers instead.

use num_complex::Complex;
use num_traits::Float;

use crate::traits::FloatScalar;

/// Modulus `|z|` computed with `hypot`, without squaring either component.
#[inline]
pub fn abs<T: FloatScalar>(z: Complex<T>) -> T {
    Float::hypot(z.re, z.im)
}

/// Complex division `a / b` by Smith's algorithm.
///
/// Division by exact zero produces non-finite components, never a panic.
///
/// ```
/// use densela::Complex;
/// use densela::complex::div;
///
/// let q = div(Complex::new(1e300_f64, 1e300), Complex::new(1e300, 1e300));
/// assert!((q.re - 1.0).abs() < 1e-15);
/// assert!(q.im.abs() < 1e-15);
/// ```
pub fn div<T: FloatScalar>(a: Complex<T>, b: Complex<T>) -> Complex<T> {
    if Float::abs(b.re) >= Float::abs(b.im) {
        let r = b.im / b.re;
        let den = b.re + b.im * r;
        Complex::new((a.re + a.im * r) / den, (a.im - a.re * r) / den)
    } else {
        let r = b.re / b.im;
        let den = b.im + b.re * r;
        Complex::new((a.re * r + a.im) / den, (a.im * r - a.re) / den)
    }
}

/// Complex reciprocal `1 / z` by Smith's algorithm.
pub fn recip<T: FloatScalar>(z: Complex<T>) -> Complex<T> {
    if Float::abs(z.re) >= Float::abs(z.im) {
        let r = z.im / z.re;
        let den = z.re + z.im * r;
        Complex::new(T::one() / den, (T::zero() - r) / den)
    } else {
        let r = z.re / z.im;
        let den = z.im + z.re * r;
        Complex::new(r / den, (T::zero() - T::one()) / den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type C = Complex<f64>;

    fn assert_complex_near(a: C, b: C, tol: f64) {
        assert!((a.re - b.re).abs() < tol && (a.im - b.im).abs() < tol, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn abs_does_not_overflow() {
        let z = C::new(1e200, 1e200);
        let r = abs(z);
        assert!(r.is_finite());
        assert!((r / 1e200 - 2.0_f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn div_matches_naive_in_range() {
        let a = C::new(3.0, -2.0);
        let b = C::new(1.5, 4.0);
        assert_complex_near(div(a, b), a / b, 1e-15);
        let b = C::new(4.0, 1.5);
        assert_complex_near(div(a, b), a / b, 1e-15);
    }

    #[test]
    fn div_large_denominator() {
        // Naive division squares |b| and overflows to inf/inf = NaN.
        let a = C::new(2e300, 0.0);
        let b = C::new(1e300, 1e300);
        let q = div(a, b);
        assert_complex_near(q, C::new(1.0, -1.0), 1e-15);
    }

    #[test]
    fn recip_both_branches() {
        assert_complex_near(recip(C::new(0.0, 2.0)), C::new(0.0, -0.5), 1e-15);
        assert_complex_near(recip(C::new(2.0, 0.0)), C::new(0.5, 0.0), 1e-15);
        let z = C::new(3.0, 4.0);
        assert_complex_near(recip(z) * z, C::new(1.0, 0.0), 1e-15);
    }

    #[test]
    fn div_by_zero_is_non_finite() {
        let q = div(C::new(1.0, 1.0), C::new(0.0, 0.0));
        assert!(!q.re.is_finite() || !q.im.is_finite());
    }
}

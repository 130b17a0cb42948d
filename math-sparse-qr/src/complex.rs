//! Complex scalar type used by the sparse QR solver
//!
//! [`Complex`] is a plain `(re, im)` pair of `f64` values. The arithmetic is
//! written out explicitly rather than delegated to `num_complex` because the
//! solver's stability relies on the exact formulas used here:
//!
//! - division uses Smith's scaling (the larger divisor component is factored out)
//! - the magnitude uses a scaled hypotenuse, so large components do not overflow
//! - the square root uses half-angle formulas that avoid cancellation
//!
//! Nothing in this module panics or reports errors. Dividing by `(0, 0)` yields
//! NaN/Inf components, which then propagate through the solve.
//!
//! Values convert to and from [`num_complex::Complex64`] so they can be passed
//! to code built on `num-complex`.

use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Default tolerance of [`Complex::approx_eq`]
pub const DEFAULT_TOLERANCE: f64 = 1e-14;

/// A complex number stored as a pair of finite `f64` values
///
/// `PartialEq` is exact, component-wise equality. The equality of the solver's
/// algebra is [`Complex::approx_eq`], which compares the magnitude of the
/// difference against a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    /// Real part
    pub re: f64,
    /// Imaginary part
    pub im: f64,
}

impl Complex {
    /// Create a complex number from its parts
    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Additive identity `(0, 0)`
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Multiplicative identity `(1, 0)`
    #[inline]
    pub const fn one() -> Self {
        Self::new(1.0, 0.0)
    }

    /// Real part
    #[inline]
    pub fn re(self) -> f64 {
        self.re
    }

    /// Imaginary part
    #[inline]
    pub fn im(self) -> f64 {
        self.im
    }

    /// Multiply both components by a real scalar
    #[inline]
    pub fn scale(self, s: f64) -> Self {
        Self::new(self.re * s, self.im * s)
    }

    /// Divide by `re + i*im` using Smith's algorithm
    pub fn div_parts(self, re: f64, im: f64) -> Self {
        if re.abs() >= im.abs() {
            let ratio = im / re;
            let scalar = 1.0 / (re + im * ratio);
            Self::new(
                scalar * (self.re + self.im * ratio),
                scalar * (self.im - self.re * ratio),
            )
        } else {
            let ratio = re / im;
            let scalar = 1.0 / (re * ratio + im);
            Self::new(
                scalar * (self.re * ratio + self.im),
                scalar * (self.im * ratio - self.re),
            )
        }
    }

    /// Complex conjugate
    #[inline]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// Magnitude `|z|`
    #[inline]
    pub fn abs(self) -> f64 {
        Self::abs_parts(self.re, self.im)
    }

    /// Magnitude of `re + i*im` via the scaled hypotenuse
    ///
    /// Returns exactly `0.0` when both parts are zero.
    pub fn abs_parts(re: f64, im: f64) -> f64 {
        let abs_re = re.abs();
        let abs_im = im.abs();
        if abs_re == 0.0 && abs_im == 0.0 {
            0.0
        } else if abs_re >= abs_im {
            let d = im / re;
            abs_re * (1.0 + d * d).sqrt()
        } else {
            let d = re / im;
            abs_im * (1.0 + d * d).sqrt()
        }
    }

    /// Squared magnitude, without the overflow protection of [`Complex::abs`]
    #[inline]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Principal square root
    ///
    /// For `re < 0` the imaginary part of the result takes the sign of the
    /// input's imaginary part. Returns `(0, 0)` for zero input.
    pub fn sqrt(self) -> Self {
        let abs = self.abs();
        if abs > 0.0 {
            if self.re > 0.0 {
                let t = (0.5 * (abs + self.re)).sqrt();
                Self::new(t, 0.5 * (self.im / t))
            } else {
                let mut t = (0.5 * (abs - self.re)).sqrt();
                if self.im < 0.0 {
                    t = -t;
                }
                Self::new(0.5 * (self.im / t), t)
            }
        } else {
            Self::zero()
        }
    }

    /// `self * self`
    #[inline]
    pub fn square(self) -> Self {
        self * self
    }

    /// `|self - other| <= 1e-14`
    #[inline]
    pub fn approx_eq(self, other: Self) -> bool {
        self.approx_eq_tol(other, DEFAULT_TOLERANCE)
    }

    /// `|self - other| <= |tol|`
    #[inline]
    pub fn approx_eq_tol(self, other: Self, tol: f64) -> bool {
        Self::abs_parts(self.re - other.re, self.im - other.im) <= tol.abs()
    }

    /// True if either component is NaN
    #[inline]
    pub fn is_nan(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }

    /// True if both components are finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

/// Flatten complex values into the interleaved `re, im, re, im, ...` layout
pub fn pack_interleaved(values: &[Complex]) -> Vec<f64> {
    let mut out = Vec::with_capacity(2 * values.len());
    for z in values {
        out.push(z.re);
        out.push(z.im);
    }
    out
}

/// Read complex values from the interleaved `re, im, ...` layout
///
/// A trailing unpaired value is ignored.
pub fn unpack_interleaved(data: &[f64]) -> Vec<Complex> {
    data.chunks_exact(2)
        .map(|pair| Complex::new(pair[0], pair[1]))
        .collect()
}

impl From<f64> for Complex {
    #[inline]
    fn from(re: f64) -> Self {
        Self::new(re, 0.0)
    }
}

impl From<Complex64> for Complex {
    #[inline]
    fn from(z: Complex64) -> Self {
        Self::new(z.re, z.im)
    }
}

impl From<Complex> for Complex64 {
    #[inline]
    fn from(z: Complex) -> Self {
        Complex64::new(z.re, z.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < 0.0 {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

impl Add for Complex {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.im * rhs.re + self.re * rhs.im,
        )
    }
}

impl Mul<f64> for Complex {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Div for Complex {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        self.div_parts(rhs.re, rhs.im)
    }
}

impl Neg for Complex {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl AddAssign for Complex {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Complex {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Complex {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Complex {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Zero for Complex {
    #[inline]
    fn zero() -> Self {
        Complex::zero()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }
}

impl One for Complex {
    #[inline]
    fn one() -> Self {
        Complex::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples() -> Vec<Complex> {
        vec![
            Complex::new(3.0, 4.0),
            Complex::new(-1.5, 0.25),
            Complex::new(0.0, -2.0),
            Complex::new(1e-3, 7.0),
            Complex::new(-8.0, -0.5),
            Complex::new(2.0, 0.0),
        ]
    }

    #[test]
    fn test_identities() {
        assert_eq!(Complex::zero(), Complex::new(0.0, 0.0));
        assert_eq!(Complex::one(), Complex::new(1.0, 0.0));
        let z = Complex::new(2.5, -1.0);
        assert_relative_eq!(z.re(), 2.5);
        assert_relative_eq!(z.im(), -1.0);
    }

    #[test]
    fn test_add_commutes_and_mul_identity() {
        for x in samples() {
            for y in samples() {
                assert_eq!(x + y, y + x);
            }
            assert_eq!(x * Complex::one(), x);
        }
    }

    #[test]
    fn test_mul_formula() {
        let x = Complex::new(1.0, 2.0);
        let y = Complex::new(3.0, -1.0);
        // (1 + 2i)(3 - i) = 3 - i + 6i + 2 = 5 + 5i
        assert_eq!(x * y, Complex::new(5.0, 5.0));
        assert_eq!(x * 2.0, Complex::new(2.0, 4.0));
    }

    #[test]
    fn test_div_inverts_mul() {
        for x in samples() {
            for y in samples() {
                let back = (x * y) / y;
                assert!(back.approx_eq_tol(x, 1e-12), "{x} * {y} / {y} = {back}");
            }
        }
    }

    #[test]
    fn test_div_both_branches() {
        let x = Complex::new(1.0, 1.0);
        // |re| >= |im|
        let a = x.div_parts(2.0, 1.0);
        assert!(a.approx_eq(Complex::new(0.6, 0.2)));
        // |re| < |im|
        let b = x.div_parts(1.0, 2.0);
        assert!(b.approx_eq(Complex::new(0.6, -0.2)));
    }

    #[test]
    fn test_div_avoids_overflow() {
        let big = 1e300;
        let x = Complex::new(big, big);
        let q = x / Complex::new(big, big);
        assert!(q.approx_eq_tol(Complex::one(), 1e-12));
    }

    #[test]
    fn test_div_by_zero_poisons() {
        let q = Complex::new(1.0, 1.0) / Complex::zero();
        assert!(!q.is_finite());
    }

    #[test]
    fn test_abs() {
        assert_relative_eq!(Complex::new(3.0, 4.0).abs(), 5.0);
        assert_relative_eq!(Complex::new(-4.0, 3.0).abs(), 5.0);
        assert_eq!(Complex::zero().abs(), 0.0);
        for x in samples() {
            assert!(x.abs() >= 0.0);
        }
        // Would overflow with the naive formula
        assert_relative_eq!(
            Complex::new(3e200, 4e200).abs(),
            5e200,
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_sqrt() {
        let r = Complex::new(-4.0, 0.0).sqrt();
        assert!(r.approx_eq(Complex::new(0.0, 2.0)));

        let r = Complex::new(0.0, 2.0).sqrt();
        assert!(r.approx_eq(Complex::new(1.0, 1.0)));

        let r = Complex::new(-3.0, -4.0).sqrt();
        assert!(r.approx_eq_tol(Complex::new(1.0, -2.0), 1e-14));

        assert_eq!(Complex::zero().sqrt(), Complex::zero());

        for x in samples() {
            let s = x.square().sqrt();
            assert!(
                s.approx_eq_tol(x, 1e-12) || s.approx_eq_tol(-x, 1e-12),
                "sqrt({x}^2) = {s}"
            );
        }
    }

    #[test]
    fn test_conj_and_self_subtraction() {
        for x in samples() {
            assert_eq!(x.conj().conj(), x);
            assert_eq!(x - x, Complex::zero());
        }
        assert_eq!(Complex::new(1.0, 2.0).conj(), Complex::new(1.0, -2.0));
    }

    #[test]
    fn test_tolerance_boundary() {
        let one = Complex::one();
        assert!(one.approx_eq(Complex::new(1.0 + 9e-15, 0.0)));
        assert!(!one.approx_eq(Complex::new(1.0 + 2e-14, 0.0)));
        assert!(one.approx_eq_tol(Complex::new(1.5, 0.0), -0.5));
    }

    #[test]
    fn test_interleaved_layout() {
        let values = vec![Complex::new(1.0, 2.0), Complex::new(-3.0, 4.0)];
        let packed = pack_interleaved(&values);
        assert_eq!(packed, vec![1.0, 2.0, -3.0, 4.0]);

        let odd = [5.0, 6.0, 7.0];
        assert_eq!(unpack_interleaved(&odd), vec![Complex::new(5.0, 6.0)]);
    }

    #[test]
    fn test_complex64_conversion() {
        let z = Complex::new(0.5, -0.25);
        let c: Complex64 = z.into();
        assert_relative_eq!(c.re, 0.5);
        assert_relative_eq!(c.im, -0.25);

        let sum = c + Complex64::new(1.0, 1.0);
        assert_eq!(Complex::from(sum), Complex::new(1.5, 0.75));
    }
}

//! [`Real`]: the scalar capabilities needed by the likelihood callbacks
//!
//! The reduce/map machinery only needs [`Scalar`] (a zero and `+`). The
//! callbacks that compute log-likelihood contributions need a bit more. Data
//! (e.g. observed counts) always arrives as plain numbers and gets promoted
//! into the model's scalar type with [`Real::from_f64`]. That is what lets
//! the same callback produce an `f64` or a [`Dual`] (carrying a derivative)
//! depending on the type of the parameters it receives.

use parlik_nostd_internal::Scalar;
use std::ops::{Add, Mul, Neg, Sub};

pub trait Real: Scalar + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self> {
    /// Wrap an `f64` constant (derivative = 0 for derivative-tracking types)
    fn from_f64(value: f64) -> Self;

    /// Extract the primal value
    fn value(&self) -> f64;

    fn exp(self) -> Self;

    fn ln(self) -> Self;
}

impl Real for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }
}

/// A forward-mode dual number `val + der·ε` (with `ε² = 0`).
///
/// Seeding a single parameter with `der = 1` (see [`Dual::variable`]) makes
/// every quantity computed from it carry its derivative with respect to that
/// parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dual {
    pub val: f64,
    pub der: f64,
}

impl Dual {
    /// a quantity that doesn't depend on the seeded parameter
    pub fn constant(val: f64) -> Self {
        Dual { val, der: 0.0 }
    }

    /// the seeded parameter itself
    pub fn variable(val: f64) -> Self {
        Dual { val, der: 1.0 }
    }
}

impl Add for Dual {
    type Output = Dual;

    #[inline]
    fn add(self, rhs: Dual) -> Dual {
        Dual {
            val: self.val + rhs.val,
            der: self.der + rhs.der,
        }
    }
}

impl Sub for Dual {
    type Output = Dual;

    #[inline]
    fn sub(self, rhs: Dual) -> Dual {
        Dual {
            val: self.val - rhs.val,
            der: self.der - rhs.der,
        }
    }
}

impl Mul for Dual {
    type Output = Dual;

    #[inline]
    fn mul(self, rhs: Dual) -> Dual {
        Dual {
            val: self.val * rhs.val,
            der: self.der * rhs.val + self.val * rhs.der,
        }
    }
}

impl Neg for Dual {
    type Output = Dual;

    #[inline]
    fn neg(self) -> Dual {
        Dual {
            val: -self.val,
            der: -self.der,
        }
    }
}

impl Scalar for Dual {
    #[inline]
    fn zero() -> Self {
        Dual::constant(0.0)
    }
}

impl Real for Dual {
    #[inline]
    fn from_f64(value: f64) -> Self {
        Dual::constant(value)
    }

    #[inline]
    fn value(&self) -> f64 {
        self.val
    }

    #[inline]
    fn exp(self) -> Self {
        let e = self.val.exp();
        Dual {
            val: e,
            der: self.der * e,
        }
    }

    #[inline]
    fn ln(self) -> Self {
        Dual {
            val: self.val.ln(),
            der: self.der / self.val,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_rule() {
        // d/dx (x * x) at x = 3
        let x = Dual::variable(3.0);
        let y = x * x;
        assert_eq!(y, Dual { val: 9.0, der: 6.0 });
    }

    #[test]
    fn exp_ln_derivatives() {
        let x = Dual::variable(2.0);
        let e = x.exp();
        assert_eq!(e.val, 2.0_f64.exp());
        assert_eq!(e.der, 2.0_f64.exp());

        let l = x.ln();
        assert_eq!(l.val, 2.0_f64.ln());
        assert_eq!(l.der, 0.5);
    }

    #[test]
    fn constants_have_no_derivative() {
        let c = Dual::from_f64(4.0) * Dual::variable(5.0);
        assert_eq!(c.der, 4.0);
        assert_eq!(Dual::zero(), Dual::constant(0.0));
        assert_eq!(<f64 as Real>::from_f64(1.5).value(), 1.5);
    }
}

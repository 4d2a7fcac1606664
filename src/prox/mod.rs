//! Closed-form proximal operators for the fixed library of scalar convex
//! functions supported by the graph-form solver.
//!
//! Each [`FunctionObj`] represents
//!
//! ```text
//! phi(x) = c * h(a*x - b) + d*x + (e/2)*x^2
//! ```
//!
//! `h` is dispatched through a single match on [`Kind`] (a closed, tagged
//! enum) rather than through a trait object: the prox bodies are a handful
//! of arithmetic operations each, and indirect calls would defeat branch
//! prediction on the hot per-coordinate loop.

mod newton;

use crate::errors::AdmmError;
use crate::scalar::Scalar;

/// The fixed catalog of scalar convex functions the solver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Abs,
    Huber,
    Identity,
    IndBox01,
    IndEq0,
    IndGe0,
    IndLe0,
    NegLog,
    LogExp,
    MaxNeg0,
    MaxPos0,
    Square,
    Zero,
}

impl Kind {
    fn is_indicator(self) -> bool {
        matches!(
            self,
            Kind::IndBox01 | Kind::IndEq0 | Kind::IndGe0 | Kind::IndLe0
        )
    }
}

/// One scalar convex function with affine pre-composition and quadratic
/// post-addition: `phi(x) = c*h(a*x-b) + d*x + (e/2)*x^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionObj<T: Scalar> {
    pub kind: Kind,
    pub a: T,
    pub b: T,
    pub c: T,
    pub d: T,
    pub e: T,
}

impl<T: Scalar> FunctionObj<T> {
    /// A function of the given kind with default parameters `a=1, b=0, c=1,
    /// d=0, e=0`.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            a: T::one(),
            b: T::zero(),
            c: T::one(),
            d: T::zero(),
            e: T::zero(),
        }
    }

    pub fn with_a(mut self, a: T) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: T) -> Self {
        self.b = b;
        self
    }

    pub fn with_c(mut self, c: T) -> Self {
        self.c = c;
        self
    }

    pub fn with_d(mut self, d: T) -> Self {
        self.d = d;
        self
    }

    pub fn with_e(mut self, e: T) -> Self {
        self.e = e;
        self
    }

    /// Check the invariants from the data model: `a != 0`, `c >= 0`, `e >=
    /// 0`, and indicator kinds carrying pure set-membership parameters
    /// (`c=1, d=0, e=0`).
    pub fn validate(&self, index: usize) -> Result<(), AdmmError> {
        if self.a == T::zero() {
            return Err(AdmmError::ZeroScale { index });
        }
        if self.c < T::zero() {
            return Err(AdmmError::NegativeC {
                index,
                value: self.c.to_f64_approx(),
            });
        }
        if self.e < T::zero() {
            return Err(AdmmError::NegativeE {
                index,
                value: self.e.to_f64_approx(),
            });
        }
        if self.kind.is_indicator()
            && (self.c != T::one() || self.d != T::zero() || self.e != T::zero())
        {
            return Err(AdmmError::IndicatorParamsViolated { index });
        }
        Ok(())
    }

    /// `x* = argmin_x phi(x) + (rho/2)(x - v)^2`.
    ///
    /// Implements the reparameterization rule shared by all variants: the
    /// affine/quadratic envelope around `h` is absorbed into a shifted,
    /// rescaled argument and an adjusted penalty, the base prox of `h` is
    /// evaluated once, and the result is un-transformed.
    pub fn prox(&self, v: T, rho: T) -> T {
        let rho_prime = rho + self.e;
        let v_prime = (rho * v - self.d) / rho_prime;
        if self.c == T::zero() {
            // The h-term has no weight left; phi reduces to the
            // affine+quadratic envelope, whose prox is exactly v_prime.
            return v_prime;
        }
        let lambda = rho_prime / (self.c * self.a * self.a);
        let w = self.a * v_prime - self.b;
        let z = prox_base(self.kind, w, lambda);
        (z + self.b) / self.a
    }

    /// `phi(x)`. Indicator kinds return a large finite sentinel (rather than
    /// actual infinity) outside their domain, since the value is only ever
    /// used for objective reporting, not for control flow.
    pub fn eval(&self, x: T) -> T {
        let z = self.a * x - self.b;
        self.c * eval_base(self.kind, z) + self.d * x + (self.e / T::from_f64(2.0)) * x * x
    }
}

const INDICATOR_SENTINEL: f64 = 1e18;

fn prox_base<T: Scalar>(kind: Kind, v: T, lambda: T) -> T {
    let inv_lambda = T::one() / lambda;
    match kind {
        Kind::Abs => {
            let shrink = v.abs_s() - inv_lambda;
            if shrink > T::zero() {
                v.signum_s() * shrink
            } else {
                T::zero()
            }
        }
        Kind::Huber => {
            let bound = T::one() + inv_lambda;
            if v > bound {
                v - inv_lambda
            } else if v < -bound {
                v + inv_lambda
            } else {
                v * lambda / (T::one() + lambda)
            }
        }
        Kind::Identity => v - inv_lambda,
        Kind::IndBox01 => v.clamp_s(T::zero(), T::one()),
        Kind::IndEq0 => T::zero(),
        Kind::IndGe0 => v.max_s(T::zero()),
        Kind::IndLe0 => v.min_s(T::zero()),
        Kind::NegLog => {
            let disc = v * v + T::from_f64(4.0) * inv_lambda;
            (v + disc.sqrt_s()) / T::from_f64(2.0)
        }
        Kind::LogExp => newton::solve_log_exp_prox(v, lambda),
        Kind::MaxNeg0 => {
            if v < -inv_lambda {
                v + inv_lambda
            } else if v <= T::zero() {
                T::zero()
            } else {
                v
            }
        }
        Kind::MaxPos0 => {
            if v > inv_lambda {
                v - inv_lambda
            } else if v >= T::zero() {
                T::zero()
            } else {
                v
            }
        }
        Kind::Square => v * lambda / (T::one() + lambda),
        Kind::Zero => v,
    }
}

fn eval_base<T: Scalar>(kind: Kind, x: T) -> T {
    match kind {
        Kind::Abs => x.abs_s(),
        Kind::Huber => {
            if x.abs_s() <= T::one() {
                x * x / T::from_f64(2.0)
            } else {
                x.abs_s() - T::from_f64(0.5)
            }
        }
        Kind::Identity => x,
        Kind::IndBox01 => {
            if x >= T::zero() && x <= T::one() {
                T::zero()
            } else {
                T::from_f64(INDICATOR_SENTINEL)
            }
        }
        Kind::IndEq0 => {
            if x == T::zero() {
                T::zero()
            } else {
                T::from_f64(INDICATOR_SENTINEL)
            }
        }
        Kind::IndGe0 => {
            if x >= T::zero() {
                T::zero()
            } else {
                T::from_f64(INDICATOR_SENTINEL)
            }
        }
        Kind::IndLe0 => {
            if x <= T::zero() {
                T::zero()
            } else {
                T::from_f64(INDICATOR_SENTINEL)
            }
        }
        Kind::NegLog => {
            if x > T::zero() {
                -x.ln_s()
            } else {
                T::from_f64(INDICATOR_SENTINEL)
            }
        }
        Kind::LogExp => (T::one() + x.exp_s()).ln_s(),
        Kind::MaxNeg0 => (-x).max_s(T::zero()),
        Kind::MaxPos0 => x.max_s(T::zero()),
        Kind::Square => x * x / T::from_f64(2.0),
        Kind::Zero => T::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [Kind; 13] = [
        Kind::Abs,
        Kind::Huber,
        Kind::Identity,
        Kind::IndBox01,
        Kind::IndEq0,
        Kind::IndGe0,
        Kind::IndLe0,
        Kind::NegLog,
        Kind::LogExp,
        Kind::MaxNeg0,
        Kind::MaxPos0,
        Kind::Square,
        Kind::Zero,
    ];

    fn finite_diff_subgradient_ok(kind: Kind, v: f64, lambda: f64) -> bool {
        // Finite-difference check that x* minimizes h(x) + (lambda/2)(x-v)^2
        // by comparing against small perturbations.
        let x_star = prox_base(kind, v, lambda);
        let obj = |x: f64| eval_base(kind, x) + (lambda / 2.0) * (x - v) * (x - v);
        let f0 = obj(x_star);
        let h = 1e-5;
        let plus = obj(x_star + h);
        let minus = obj(x_star - h);
        f0 <= plus + 1e-6 && f0 <= minus + 1e-6
    }

    #[test]
    fn prox_is_local_minimizer() {
        for &kind in KINDS.iter() {
            for &v in &[-5.0_f64, -0.3, 0.0, 0.3, 5.0] {
                for &lambda in &[1e-2, 1.0, 1e2] {
                    assert!(
                        finite_diff_subgradient_ok(kind, v, lambda),
                        "kind={kind:?} v={v} lambda={lambda}"
                    );
                }
            }
        }
    }

    #[test]
    fn prox_is_firmly_nonexpansive() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xADAA);
        for &kind in KINDS.iter() {
            for &lambda in &[1e-2, 1.0, 1e2] {
                for _ in 0..50 {
                    let v1: f64 = rng.gen_range(-10.0..10.0);
                    let v2: f64 = rng.gen_range(-10.0..10.0);
                    let p1 = prox_base(kind, v1, lambda);
                    let p2 = prox_base(kind, v2, lambda);
                    let lhs = (p1 - p2) * (v1 - v2);
                    let rhs = (p1 - p2) * (p1 - p2);
                    assert!(
                        lhs >= rhs - 1e-9,
                        "kind={kind:?} lambda={lambda} v1={v1} v2={v2} lhs={lhs} rhs={rhs}"
                    );
                }
            }
        }
    }

    #[test]
    fn default_function_obj_has_spec_defaults() {
        let f = FunctionObj::<f64>::new(Kind::Abs);
        assert_eq!(f.a, 1.0);
        assert_eq!(f.b, 0.0);
        assert_eq!(f.c, 1.0);
        assert_eq!(f.d, 0.0);
        assert_eq!(f.e, 0.0);
    }

    #[test]
    fn function_obj_debug_snapshot() {
        let f = FunctionObj::<f64>::new(Kind::Huber).with_b(0.5).with_e(2.0);
        insta::assert_debug_snapshot!(f, @"FunctionObj { kind: Huber, a: 1.0, b: 0.5, c: 1.0, d: 0.0, e: 2.0 }");
    }

    #[test]
    fn reparameterization_matches_generic_bisection() {
        // phi(x) = c*h(a*x-b) + d*x + (e/2)x^2; compare our composed prox
        // against a generic bisection search on the raw objective.
        let configs: [(Kind, f64, f64, f64, f64, f64, f64, f64); 4] = [
            (Kind::Abs, 2.0, 1.0, 3.0, 0.5, 0.2, 1.0, 1.0),
            (Kind::Square, 0.5, -1.0, 2.0, -0.3, 0.1, -2.0, 2.0),
            (Kind::MaxPos0, 3.0, 0.0, 1.0, 0.0, 0.0, 4.0, 0.5),
            (Kind::NegLog, 1.0, 0.0, 1.0, 0.0, 0.0, 3.0, 1.0),
        ];
        for (kind, a, b, c, d, e, v, rho) in configs {
            let f = FunctionObj {
                kind,
                a,
                b,
                c,
                d,
                e,
            };
            let x_star = f.prox(v, rho);

            let obj = |x: f64| f.eval(x) + (rho / 2.0) * (x - v) * (x - v);
            // bisection on the derivative via narrowing bracket search
            let mut lo = x_star - 5.0;
            let mut hi = x_star + 5.0;
            for _ in 0..200 {
                let m1 = lo + (hi - lo) / 3.0;
                let m2 = hi - (hi - lo) / 3.0;
                if obj(m1) < obj(m2) {
                    hi = m2;
                } else {
                    lo = m1;
                }
            }
            let reference = (lo + hi) / 2.0;
            assert!(
                (x_star - reference).abs_s() < 1e-4,
                "kind={kind:?} x_star={x_star} reference={reference}"
            );
        }
    }
}

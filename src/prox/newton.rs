//! Safeguarded Newton solve for the `LogExp` prox root equation
//!
//!   x - v + (1/lambda) * sigmoid(x) = 0
//!
//! `sigmoid` is monotonically increasing, so the residual is strictly
//! increasing in `x` and the root is unique. `[v - 1/lambda, v]` always
//! brackets it (`sigmoid` is bounded in `(0, 1)`), so Newton's method can be
//! warm-started at `v` and safely fall back to bisection whenever a step
//! would leave the bracket, making the hybrid unconditionally convergent.

use crate::scalar::Scalar;

const MAX_ITER: usize = 60;

fn sigmoid<T: Scalar>(x: T) -> T {
    T::one() / (T::one() + (-x).exp_s())
}

fn residual<T: Scalar>(x: T, v: T, inv_lambda: T) -> T {
    x - v + inv_lambda * sigmoid(x)
}

/// Find the root of `residual` via a safeguarded Newton/bisection hybrid,
/// warm-started at `v`.
pub fn solve_log_exp_prox<T: Scalar>(v: T, lambda: T) -> T {
    let inv_lambda = T::one() / lambda;
    let mut lo = v - inv_lambda;
    let mut hi = v;

    let mut x = v;
    for _ in 0..MAX_ITER {
        let r = residual(x, v, inv_lambda);
        if r.abs_s() < T::from_f64(1e-14) {
            break;
        }
        if r > T::zero() {
            hi = x;
        } else {
            lo = x;
        }
        let s = sigmoid(x);
        let deriv = T::one() + inv_lambda * s * (T::one() - s);
        let step = x - r / deriv;
        x = if step > lo && step < hi {
            step
        } else {
            lo + (hi - lo) / T::from_f64(2.0)
        };
    }
    debug_assert!(
        residual(x, v, inv_lambda).abs_s() < T::from_f64(1e-6),
        "LogExp prox failed to converge within MAX_ITER"
    );
    x
}

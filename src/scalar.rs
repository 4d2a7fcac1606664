use nalgebra::RealField;

/// The scalar field the solver is instantiated over.
///
/// Fixed per instantiation (either `f32` or `f64`). `RealField` supplies the
/// arithmetic and ordering the engine and `nalgebra` backend need. The
/// helpers below are named with an `_s` suffix to avoid ambiguity with the
/// same-named methods `RealField`/`ComplexField` already provide — the prox
/// library leans on them directly on the hot per-coordinate path and needs
/// an unambiguous, generic way to call them.
pub trait Scalar: RealField + Copy + 'static {
    fn from_f64(v: f64) -> Self;
    fn to_f64_approx(self) -> f64;

    fn abs_s(self) -> Self;
    fn signum_s(self) -> Self;
    fn sqrt_s(self) -> Self;
    fn exp_s(self) -> Self;
    fn ln_s(self) -> Self;
    fn min_s(self, other: Self) -> Self;
    fn max_s(self, other: Self) -> Self;
    fn clamp_s(self, lo: Self, hi: Self) -> Self;
}

impl Scalar for f32 {
    fn from_f64(v: f64) -> Self {
        v as f32
    }
    fn to_f64_approx(self) -> f64 {
        self as f64
    }
    fn abs_s(self) -> Self {
        f32::abs(self)
    }
    fn signum_s(self) -> Self {
        if self == 0.0 {
            0.0
        } else {
            f32::signum(self)
        }
    }
    fn sqrt_s(self) -> Self {
        f32::sqrt(self)
    }
    fn exp_s(self) -> Self {
        f32::exp(self)
    }
    fn ln_s(self) -> Self {
        f32::ln(self)
    }
    fn min_s(self, other: Self) -> Self {
        f32::min(self, other)
    }
    fn max_s(self, other: Self) -> Self {
        f32::max(self, other)
    }
    fn clamp_s(self, lo: Self, hi: Self) -> Self {
        f32::clamp(self, lo, hi)
    }
}

impl Scalar for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }
    fn to_f64_approx(self) -> f64 {
        self
    }
    fn abs_s(self) -> Self {
        f64::abs(self)
    }
    fn signum_s(self) -> Self {
        if self == 0.0 {
            0.0
        } else {
            f64::signum(self)
        }
    }
    fn sqrt_s(self) -> Self {
        f64::sqrt(self)
    }
    fn exp_s(self) -> Self {
        f64::exp(self)
    }
    fn ln_s(self) -> Self {
        f64::ln(self)
    }
    fn min_s(self, other: Self) -> Self {
        f64::min(self, other)
    }
    fn max_s(self, other: Self) -> Self {
        f64::max(self, other)
    }
    fn clamp_s(self, lo: Self, hi: Self) -> Self {
        f64::clamp(self, lo, hi)
    }
}

//! Public entry point: problem/configuration data model and the `solve`
//! driver loop.

use crate::backend::{Backend, Dense};
use crate::engine::{Engine, Stats};
use crate::errors::AdmmError;
use crate::factor::Factor;
use crate::prox::FunctionObj;
use crate::scalar::Scalar;

/// Why the solve loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Solved,
    MaxIterReached,
    FactorizationFailed,
}

/// The graph-form problem and solver configuration.
///
/// Built through a fallible, chained builder (`new` + `with_*`) that
/// validates eagerly: invariant violations are reported as soon as they are
/// introduced, before any allocation in `solve`.
pub struct AdmmData<'a, T: Scalar> {
    a: &'a [T],
    m: usize,
    n: usize,
    f: &'a [FunctionObj<T>],
    g: &'a [FunctionObj<T>],
    rho: T,
    max_iter: usize,
    rel_tol: T,
    abs_tol: T,
    quiet: bool,
}

impl<'a, T: Scalar> AdmmData<'a, T> {
    /// `a` is a row-major `m x n` slice; `f` has length `m`, `g` has length
    /// `n`. Parameters take their defaults (`rho=1, max_iter=1000,
    /// rel_tol=1e-3, abs_tol=1e-4, quiet=false`) until overridden.
    pub fn new(
        a: &'a [T],
        m: usize,
        n: usize,
        f: &'a [FunctionObj<T>],
        g: &'a [FunctionObj<T>],
    ) -> Result<Self, AdmmError> {
        if m == 0 || n == 0 {
            return Err(AdmmError::InvalidDimensions { m, n });
        }
        if f.len() != m {
            return Err(AdmmError::FLengthMismatch {
                got: f.len(),
                expected: m,
            });
        }
        if g.len() != n {
            return Err(AdmmError::GLengthMismatch {
                got: g.len(),
                expected: n,
            });
        }
        if a.len() != m * n {
            return Err(AdmmError::ALengthMismatch {
                got: a.len(),
                expected: m * n,
            });
        }
        for (i, fi) in f.iter().enumerate() {
            fi.validate(i)?;
        }
        for (i, gi) in g.iter().enumerate() {
            gi.validate(i)?;
        }
        Ok(Self {
            a,
            m,
            n,
            f,
            g,
            rho: T::one(),
            max_iter: 1000,
            rel_tol: T::from_f64(1e-3),
            abs_tol: T::from_f64(1e-4),
            quiet: false,
        })
    }

    pub fn with_rho(mut self, rho: T) -> Result<Self, AdmmError> {
        if rho <= T::zero() {
            return Err(AdmmError::InvalidRho(rho.to_f64_approx()));
        }
        self.rho = rho;
        Ok(self)
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerances(mut self, rel_tol: T, abs_tol: T) -> Result<Self, AdmmError> {
        if rel_tol <= T::zero() || abs_tol <= T::zero() {
            return Err(AdmmError::InvalidTolerances {
                rel_tol: rel_tol.to_f64_approx(),
                abs_tol: abs_tol.to_f64_approx(),
            });
        }
        self.rel_tol = rel_tol;
        self.abs_tol = abs_tol;
        Ok(self)
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Run ADMM to convergence or `max_iter`, writing the final `x`/`y` into the
/// caller-owned buffers, generic over the backend.
pub fn solve_with<T: Scalar, B: Backend<T>>(
    data: &AdmmData<T>,
    x_out: &mut [T],
    y_out: &mut [T],
) -> Result<(Status, Stats<T>), AdmmError> {
    if x_out.len() != data.n {
        return Err(AdmmError::XLengthMismatch {
            got: x_out.len(),
            expected: data.n,
        });
    }
    if y_out.len() != data.m {
        return Err(AdmmError::YLengthMismatch {
            got: y_out.len(),
            expected: data.m,
        });
    }

    let a = B::matrix_from_row_major(data.m, data.n, data.a);
    let factor = match Factor::<T, B>::build(&a, data.m, data.n) {
        Ok(factor) => factor,
        Err(err) => {
            if !data.quiet {
                eprintln!("admm: factorization failed: {err}");
            }
            return Ok((
                Status::FactorizationFailed,
                Stats {
                    iterations: 0,
                    r_pri: T::zero(),
                    r_dual: T::zero(),
                    objective: T::zero(),
                },
            ));
        }
    };
    let mut engine = Engine::<T, B>::new(data.m, data.n, data.rho, factor);

    if !data.quiet {
        println!("iter        r_pri       eps_pri      r_dual      eps_dual    objective");
    }

    let mut status = Status::MaxIterReached;
    let mut last = (T::zero(), T::zero());
    let mut iterations = 0;
    for k in 1..=data.max_iter {
        let (r_pri, r_dual, eps_pri, eps_dual) =
            engine.step(&a, data.g, data.f, data.rel_tol, data.abs_tol);
        iterations = k;
        last = (r_pri, r_dual);

        if !data.quiet {
            let obj = engine.snapshot(k, r_pri, r_dual, data.g, data.f).objective;
            println!(
                "{k:4}  {:10.3e}  {:10.3e}  {:10.3e}  {:10.3e}  {:10.3e}",
                r_pri.to_f64_approx(),
                eps_pri.to_f64_approx(),
                r_dual.to_f64_approx(),
                eps_dual.to_f64_approx(),
                obj.to_f64_approx()
            );
        }

        if r_pri <= eps_pri && r_dual <= eps_dual {
            status = Status::Solved;
            break;
        }
    }

    x_out.copy_from_slice(engine.x());
    y_out.copy_from_slice(engine.y());
    let stats = engine.snapshot(iterations, last.0, last.1, data.g, data.f);

    if !data.quiet {
        println!("admm: {status:?} after {iterations} iterations");
    }

    Ok((status, stats))
}

/// Convenience wrapper using the shipped [`Dense`] backend.
pub fn solve<T: Scalar>(
    data: &AdmmData<T>,
    x_out: &mut [T],
    y_out: &mut [T],
) -> Result<(Status, Stats<T>), AdmmError> {
    solve_with::<T, Dense>(data, x_out, y_out)
}

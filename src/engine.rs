//! The ADMM iteration engine: prox step, graph-subspace projection, dual
//! update, and the primal/dual residual convergence test.

use crate::backend::{Backend, Trans};
use crate::factor::{Factor, Shape};
use crate::prox::FunctionObj;
use crate::scalar::Scalar;

/// Per-solve statistics, snapshotted on termination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats<T: Scalar> {
    pub iterations: usize,
    pub r_pri: T,
    pub r_dual: T,
    pub objective: T,
}

/// Working state for one `solve` call: primal/prox/dual iterates and
/// scratch buffers. Allocated at entry, dropped at exit.
pub struct Engine<T: Scalar, B: Backend<T>> {
    m: usize,
    n: usize,
    rho: T,
    x: Vec<T>,
    y: Vec<T>,
    x_prev: Vec<T>,
    y_prev: Vec<T>,
    x_tilde: Vec<T>,
    y_tilde: Vec<T>,
    x_bar: Vec<T>,
    y_bar: Vec<T>,
    scratch_n: Vec<T>,
    scratch_m: Vec<T>,
    factor: Factor<T, B>,
}

impl<T: Scalar, B: Backend<T>> Engine<T, B> {
    pub fn new(m: usize, n: usize, rho: T, factor: Factor<T, B>) -> Self {
        Self {
            m,
            n,
            rho,
            x: vec![T::zero(); n],
            y: vec![T::zero(); m],
            x_prev: vec![T::zero(); n],
            y_prev: vec![T::zero(); m],
            x_tilde: vec![T::zero(); n],
            y_tilde: vec![T::zero(); m],
            x_bar: vec![T::zero(); n],
            y_bar: vec![T::zero(); m],
            scratch_n: vec![T::zero(); n],
            scratch_m: vec![T::zero(); m],
            factor,
        }
    }

    /// Prox step: coordinate-wise, independent. Parallelized across
    /// coordinates via `rayon` once the coordinate count crosses a small
    /// threshold.
    fn prox_step(&mut self, g: &[FunctionObj<T>], f: &[FunctionObj<T>]) {
        const PARALLEL_THRESHOLD: usize = 256;
        let rho = self.rho;

        if self.n >= PARALLEL_THRESHOLD {
            use rayon::prelude::*;
            self.x_tilde
                .par_iter_mut()
                .zip(self.x.par_iter())
                .zip(self.x_bar.par_iter())
                .zip(g.par_iter())
                .for_each(|(((xt, &xi), &xb), gi)| {
                    *xt = gi.prox(xi - xb, rho);
                });
        } else {
            for i in 0..self.n {
                self.x_tilde[i] = g[i].prox(self.x[i] - self.x_bar[i], rho);
            }
        }

        if self.m >= PARALLEL_THRESHOLD {
            use rayon::prelude::*;
            self.y_tilde
                .par_iter_mut()
                .zip(self.y.par_iter())
                .zip(self.y_bar.par_iter())
                .zip(f.par_iter())
                .for_each(|(((yt, &yi), &yb), fj)| {
                    *yt = fj.prox(yi - yb, rho);
                });
        } else {
            for j in 0..self.m {
                self.y_tilde[j] = f[j].prox(self.y[j] - self.y_bar[j], rho);
            }
        }
    }

    /// Project `(x_tilde + x_bar, y_tilde + y_bar)` onto `{(x,y) : y = Ax}`.
    fn project_step(&mut self, a: &B::Matrix) {
        self.x_prev.copy_from_slice(&self.x);
        self.y_prev.copy_from_slice(&self.y);

        // s = x_tilde + x_bar, t = y_tilde + y_bar (reuse scratch buffers).
        for i in 0..self.n {
            self.scratch_n[i] = self.x_tilde[i] + self.x_bar[i];
        }
        for j in 0..self.m {
            self.scratch_m[j] = self.y_tilde[j] + self.y_bar[j];
        }

        match self.factor.shape {
            Shape::Tall => {
                // x <- (I + A^T A)^-1 (s + A^T t)
                let mut rhs = vec![T::zero(); self.n];
                B::gemv(a, &self.scratch_m, &mut rhs, Trans::Yes);
                for i in 0..self.n {
                    rhs[i] += self.scratch_n[i];
                }
                self.factor.solve_in_place(&mut rhs);
                self.x.copy_from_slice(&rhs);
                B::gemv(a, &self.x, &mut self.y, Trans::No);
            }
            Shape::Wide => {
                // s absorbs A^T t, then x = s - A^T (I + A A^T)^-1 A s
                let mut s = self.scratch_n.clone();
                let mut at_t = vec![T::zero(); self.n];
                B::gemv(a, &self.scratch_m, &mut at_t, Trans::Yes);
                for i in 0..self.n {
                    s[i] += at_t[i];
                }
                let mut a_s = vec![T::zero(); self.m];
                B::gemv(a, &s, &mut a_s, Trans::No);
                self.factor.solve_in_place(&mut a_s);
                let mut at_inner = vec![T::zero(); self.n];
                B::gemv(a, &a_s, &mut at_inner, Trans::Yes);
                for i in 0..self.n {
                    self.x[i] = s[i] - at_inner[i];
                }
                B::gemv(a, &self.x, &mut self.y, Trans::No);
            }
        }
    }

    /// Scaled dual update: `x_bar <- x_bar + x_tilde - x`, and likewise `y`.
    fn dual_update(&mut self) {
        for i in 0..self.n {
            self.x_bar[i] += self.x_tilde[i] - self.x[i];
        }
        for j in 0..self.m {
            self.y_bar[j] += self.y_tilde[j] - self.y[j];
        }
    }

    /// Primal/dual residuals and their tolerances for the convergence test.
    fn residuals(&self, rel_tol: T, abs_tol: T) -> (T, T, T, T) {
        let mut diff_x_tilde = vec![T::zero(); self.n];
        let mut diff_y_tilde = vec![T::zero(); self.m];
        for i in 0..self.n {
            diff_x_tilde[i] = self.x[i] - self.x_tilde[i];
        }
        for j in 0..self.m {
            diff_y_tilde[j] = self.y[j] - self.y_tilde[j];
        }
        let r_pri = B::nrm2(&diff_x_tilde) + B::nrm2(&diff_y_tilde);

        let mut diff_x_prev = vec![T::zero(); self.n];
        let mut diff_y_prev = vec![T::zero(); self.m];
        for i in 0..self.n {
            diff_x_prev[i] = self.x[i] - self.x_prev[i];
        }
        for j in 0..self.m {
            diff_y_prev[j] = self.y[j] - self.y_prev[j];
        }
        let r_dual = self.rho * (B::nrm2(&diff_x_prev) + B::nrm2(&diff_y_prev));

        let nx = B::nrm2(&self.x);
        let ny = B::nrm2(&self.y);
        let norm_xy = (nx * nx + ny * ny).sqrt_s();
        let nxt = B::nrm2(&self.x_tilde);
        let nyt = B::nrm2(&self.y_tilde);
        let norm_tilde = (nxt * nxt + nyt * nyt).sqrt_s();
        let nxb = B::nrm2(&self.x_bar);
        let nyb = B::nrm2(&self.y_bar);
        let norm_dual = (nxb * nxb + nyb * nyb).sqrt_s();

        let dim = T::from_f64((self.m + self.n) as f64).sqrt_s();
        let eps_pri = dim * abs_tol + rel_tol * norm_xy.max_s(norm_tilde);
        let eps_dual = dim * abs_tol + rel_tol * self.rho * norm_dual;

        (r_pri, r_dual, eps_pri, eps_dual)
    }

    fn objective(&self, g: &[FunctionObj<T>], f: &[FunctionObj<T>]) -> T {
        let mut total = T::zero();
        for i in 0..self.n {
            total += g[i].eval(self.x[i]);
        }
        for j in 0..self.m {
            total += f[j].eval(self.y[j]);
        }
        total
    }

    /// Run one full ADMM iteration (prox, project, dual update) and report
    /// the residuals and tolerances for the convergence test.
    pub fn step(
        &mut self,
        a: &B::Matrix,
        g: &[FunctionObj<T>],
        f: &[FunctionObj<T>],
        rel_tol: T,
        abs_tol: T,
    ) -> (T, T, T, T) {
        self.prox_step(g, f);
        self.project_step(a);
        self.dual_update();
        self.residuals(rel_tol, abs_tol)
    }

    pub fn snapshot(&self, iterations: usize, r_pri: T, r_dual: T, g: &[FunctionObj<T>], f: &[FunctionObj<T>]) -> Stats<T> {
        Stats {
            iterations,
            r_pri,
            r_dual,
            objective: self.objective(g, f),
        }
    }

    pub fn x(&self) -> &[T] {
        &self.x
    }

    pub fn y(&self) -> &[T] {
        &self.y
    }
}

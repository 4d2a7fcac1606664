//! Linear-algebra backend trait and the shipped dense (`nalgebra`) backend.
//!
//! The engine is written once against [`Backend`]; it never matches on
//! which concrete implementor it holds. A GPU or sparse backend is a
//! separate crate implementing the same seven operations.

use nalgebra::{Cholesky, DMatrix, DVector};

use crate::scalar::Scalar;

/// Whether a matrix-vector product uses `A` or `Aᵀ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trans {
    No,
    Yes,
}

/// The seven operations the ADMM engine needs from a dense linear-algebra
/// implementation.
pub trait Backend<T: Scalar> {
    /// Owned dense matrix type.
    type Matrix;
    /// Owned Cholesky factor type.
    type Factor;

    /// Build a backend matrix from a row-major `m x n` slice.
    fn matrix_from_row_major(m: usize, n: usize, data: &[T]) -> Self::Matrix;

    /// `y <- A x` (trans = No) or `y <- Aᵀ x` (trans = Yes).
    fn gemv(a: &Self::Matrix, x: &[T], y: &mut [T], trans: Trans);

    /// `y <- alpha * x + y`.
    fn axpy(alpha: T, x: &[T], y: &mut [T]);

    /// Euclidean norm of `x`.
    fn nrm2(x: &[T]) -> T;

    /// `G <- I + AᵀA` (`n x n`) if `wide` is false, else `G <- I + AAᵀ`
    /// (`m x m`).
    fn syrk(a: &Self::Matrix, wide: bool) -> Self::Matrix;

    /// Cholesky-factor a symmetric positive definite matrix `G = L Lᵀ`.
    fn potrf(g: Self::Matrix) -> Option<Self::Factor>;

    /// Solve `L Lᵀ z = r` in place, writing the result into `r`.
    fn potrs(factor: &Self::Factor, r: &mut [T]);
}

/// The shipped dense backend, built on `nalgebra::DMatrix`/`DVector` and
/// `nalgebra::Cholesky`.
pub struct Dense;

impl<T: Scalar> Backend<T> for Dense {
    type Matrix = DMatrix<T>;
    type Factor = Cholesky<T, nalgebra::Dyn>;

    fn matrix_from_row_major(m: usize, n: usize, data: &[T]) -> Self::Matrix {
        DMatrix::from_row_slice(m, n, data)
    }

    fn gemv(a: &Self::Matrix, x: &[T], y: &mut [T], trans: Trans) {
        let xv = DVector::from_row_slice(x);
        let result = match trans {
            Trans::No => a * xv,
            Trans::Yes => a.transpose() * xv,
        };
        y.copy_from_slice(result.as_slice());
    }

    fn axpy(alpha: T, x: &[T], y: &mut [T]) {
        for (yi, &xi) in y.iter_mut().zip(x.iter()) {
            *yi += alpha * xi;
        }
    }

    fn nrm2(x: &[T]) -> T {
        DVector::from_row_slice(x).norm()
    }

    fn syrk(a: &Self::Matrix, wide: bool) -> Self::Matrix {
        let g = if wide {
            a * a.transpose()
        } else {
            a.transpose() * a
        };
        let dim = g.nrows();
        let mut g = g;
        for i in 0..dim {
            g[(i, i)] += T::one();
        }
        g
    }

    fn potrf(g: Self::Matrix) -> Option<Self::Factor> {
        Cholesky::new(g)
    }

    fn potrs(factor: &Self::Factor, r: &mut [T]) {
        let rhs = DVector::from_row_slice(r);
        let z = factor.solve(&rhs);
        r.copy_from_slice(z.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemv_matches_hand_computation() {
        let a = Dense::matrix_from_row_major(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let x = [1.0, 1.0, 1.0];
        let mut y = [0.0; 2];
        Dense::gemv(&a, &x, &mut y, Trans::No);
        assert_eq!(y, [6.0, 15.0]);

        let xt = [1.0, 1.0];
        let mut yt = [0.0; 3];
        Dense::gemv(&a, &xt, &mut yt, Trans::Yes);
        assert_eq!(yt, [5.0, 7.0, 9.0]);
    }

    #[test]
    fn syrk_adds_identity() {
        let a = Dense::matrix_from_row_major(2, 2, &[1.0_f64, 0.0, 0.0, 1.0]);
        let g = Dense::syrk(&a, false);
        assert_eq!(g[(0, 0)], 2.0);
        assert_eq!(g[(1, 1)], 2.0);
        assert_eq!(g[(0, 1)], 0.0);
    }

    #[test]
    fn potrf_then_potrs_solves_identity_system() {
        let a = Dense::matrix_from_row_major(2, 2, &[0.0_f64, 0.0, 0.0, 0.0]);
        let g = Dense::syrk(&a, false);
        let factor = Dense::potrf(g).expect("I is positive definite");
        let mut r = [3.0, 4.0];
        Dense::potrs(&factor, &mut r);
        assert!((r[0] - 3.0).abs() < 1e-10);
        assert!((r[1] - 4.0).abs() < 1e-10);
    }
}

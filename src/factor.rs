//! One-time factorization of the graph-subspace projection matrix.
//!
//! Built once per `solve` call and reused for every iteration; rebuilding it
//! per iteration would defeat the entire performance argument for the
//! graph-form splitting.

use crate::backend::Backend;
use crate::errors::AdmmError;
use crate::scalar::Scalar;

/// Which normal-equations system was factored: `I + AᵀA` (`n x n`, used when
/// `m >= n`) or `I + AAᵀ` (`m x m`, used when `m < n`, via the
/// matrix-inversion lemma).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Tall,
    Wide,
}

/// The cached Cholesky factor plus the shape it was built for.
pub struct Factor<T: Scalar, B: Backend<T>> {
    pub shape: Shape,
    pub factor: B::Factor,
}

impl<T: Scalar, B: Backend<T>> Factor<T, B> {
    /// Factor `I + AᵀA` (`m >= n`) or `I + AAᵀ` (`m < n`), choosing the
    /// smaller of the two systems.
    pub fn build(a: &B::Matrix, m: usize, n: usize) -> Result<Self, AdmmError> {
        let shape = if m >= n { Shape::Tall } else { Shape::Wide };
        let wide = matches!(shape, Shape::Wide);
        let g = B::syrk(a, wide);
        let factor = B::potrf(g).ok_or(AdmmError::FactorizationFailed)?;
        Ok(Self { shape, factor })
    }

    /// Solve `L Lᵀ z = r` in place against the cached factor.
    pub fn solve_in_place(&self, r: &mut [T]) {
        B::potrs(&self.factor, r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Dense;

    #[test]
    fn picks_tall_shape_when_m_ge_n() {
        let a = Dense::matrix_from_row_major(3, 2, &[1.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let factor = Factor::<f64, Dense>::build(&a, 3, 2).unwrap();
        assert_eq!(factor.shape, Shape::Tall);
    }

    #[test]
    fn picks_wide_shape_when_m_lt_n() {
        let a = Dense::matrix_from_row_major(2, 3, &[1.0_f64, 0.0, 1.0, 0.0, 1.0, 1.0]);
        let factor = Factor::<f64, Dense>::build(&a, 2, 3).unwrap();
        assert_eq!(factor.shape, Shape::Wide);
    }

    #[test]
    fn factor_reproduces_known_solution() {
        // I + A^T A for A = [[1,0],[0,1]] is 2I; solving 2I z = [4, 6] gives
        // z = [2, 3].
        let a = Dense::matrix_from_row_major(2, 2, &[1.0_f64, 0.0, 0.0, 1.0]);
        let factor = Factor::<f64, Dense>::build(&a, 2, 2).unwrap();
        let mut r = [4.0, 6.0];
        factor.solve_in_place(&mut r);
        assert!((r[0] - 2.0).abs() < 1e-10);
        assert!((r[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn factor_identity_holds_for_random_tall_matrices() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xFACE);
        for _ in 0..10 {
            let (m, n) = (6, 4);
            let data: Vec<f64> = (0..m * n).map(|_| rng.gen_range(-5.0..5.0)).collect();
            let a = Dense::matrix_from_row_major(m, n, &data);
            let factor = Factor::<f64, Dense>::build(&a, m, n).unwrap();
            assert_eq!(factor.shape, Shape::Tall);

            let l = factor.factor.l();
            let reconstructed = l.clone() * l.transpose();
            let expected = a.transpose() * a.clone() + nalgebra::DMatrix::identity(n, n);

            let diff_norm = (reconstructed - expected.clone()).norm();
            let rel = diff_norm / expected.norm();
            assert!(rel < 1e-10, "relative Frobenius error {rel} too large");
        }
    }
}

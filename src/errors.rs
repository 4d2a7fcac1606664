use thiserror::Error;

/// Failures detected while building or solving an [`crate::admm::AdmmData`].
///
/// Construction-time failures (invalid dimensions, bad function parameters)
/// are always returned as `Err(AdmmError)`. Solve-time numerical failure is
/// instead reported as [`crate::admm::Status::FactorizationFailed`], since it
/// still leaves the caller's last completed iterate intact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdmmError {
    #[error("m and n must both be positive (m={m}, n={n})")]
    InvalidDimensions { m: usize, n: usize },

    #[error("f has length {got}, expected m={expected}")]
    FLengthMismatch { got: usize, expected: usize },

    #[error("g has length {got}, expected n={expected}")]
    GLengthMismatch { got: usize, expected: usize },

    #[error("x buffer has length {got}, expected n={expected}")]
    XLengthMismatch { got: usize, expected: usize },

    #[error("y buffer has length {got}, expected m={expected}")]
    YLengthMismatch { got: usize, expected: usize },

    #[error("a buffer has length {got}, expected m*n={expected}")]
    ALengthMismatch { got: usize, expected: usize },

    #[error("rho must be positive, got {0}")]
    InvalidRho(f64),

    #[error("rel_tol and abs_tol must be positive, got rel_tol={rel_tol}, abs_tol={abs_tol}")]
    InvalidTolerances { rel_tol: f64, abs_tol: f64 },

    #[error("function at index {index} has a=0, which is not allowed")]
    ZeroScale { index: usize },

    #[error("function at index {index} has c={value} < 0, which is not allowed")]
    NegativeC { index: usize, value: f64 },

    #[error("function at index {index} has e={value} < 0, which is not allowed")]
    NegativeE { index: usize, value: f64 },

    #[error("indicator function at index {index} must have c=1, d=0, e=0 (pure set membership)")]
    IndicatorParamsViolated { index: usize },

    #[error("Cholesky factorization failed: the normal-equations matrix is not positive definite")]
    FactorizationFailed,
}

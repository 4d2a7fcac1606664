//! A solver for convex optimization problems in **graph form**:
//!
//! ```text
//! minimize     f(y) + g(x)
//! subject to   y = A x
//! ```
//!
//! where `A` is a dense `m x n` matrix and `f`, `g` are separable sums of
//! scalar convex functions drawn from a fixed library ([`prox::Kind`]). The
//! solver is ADMM specialized to this splitting: a one-time Cholesky
//! factorization of the graph-subspace projection is reused across every
//! iteration, and the remaining per-iteration cost is a handful of
//! coordinate-wise prox evaluations plus two matrix-vector products.
//!
//! The [`admm::solve`] entry point drives the loop using the shipped
//! [`backend::Dense`] backend; [`admm::solve_with`] is generic over any
//! [`backend::Backend`] implementor.

pub mod admm;
pub mod backend;
pub mod engine;
pub mod errors;
pub mod factor;
pub mod prox;
pub mod scalar;

pub use admm::{solve, solve_with, AdmmData, Status};
pub use engine::Stats;
pub use errors::AdmmError;
pub use prox::{FunctionObj, Kind};
pub use scalar::Scalar;

pub mod expint;
pub mod probs;

pub use expint::{expi, expm1d, exp1, harmonic_number, transformed_expi, transformed_expi_scalar};
pub use probs::{
    check_probs_matrix, check_probs_matrix_with, check_probs_vector, truncate0, truncate0_vec,
    truncate0_with, Axis, TruncateOptions, DEFAULT_TRUNCATE_TOL,
};

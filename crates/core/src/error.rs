use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoranError {
    #[error("Invalid lineage count: {0}")]
    InvalidSize(String),

    #[error("Numerical assertion failed: {0}")]
    NumericalAssertion(String),

    #[error("Singular matrix encountered in {context}")]
    SingularMatrix { context: String },

    #[error("Ill-conditioned eigendecomposition in {context} (error = {error:.2e})")]
    IllConditioned { context: String, error: f64 },

    #[error("Dimension mismatch: expected {expected}, got {got} in {context}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, MoranError>;

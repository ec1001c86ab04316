use crate::error::{MoranError, Result};
use crate::types::{ComplexMatrix, DenseMatrix};

/// Invert a complex square matrix via LU decomposition.
///
/// Fails with [`MoranError::SingularMatrix`] when LU finds an exact zero pivot and
/// with [`MoranError::IllConditioned`] when the inverse contains non-finite values.
pub fn inverse_complex(a: &ComplexMatrix, context: &str) -> Result<ComplexMatrix> {
    if a.nrows() != a.ncols() {
        return Err(MoranError::DimensionMismatch {
            expected: a.nrows(),
            got: a.ncols(),
            context: format!("{context}: matrix must be square"),
        });
    }
    let inv = a.clone().try_inverse().ok_or_else(|| MoranError::SingularMatrix {
        context: context.to_string(),
    })?;
    if !is_finite_complex(&inv) {
        return Err(MoranError::IllConditioned {
            context: format!("{context}: inverse has non-finite entries"),
            error: f64::INFINITY,
        });
    }
    Ok(inv)
}

/// Whether every real and imaginary part is finite.
pub fn is_finite_complex(a: &ComplexMatrix) -> bool {
    a.iter().all(|z| z.re.is_finite() && z.im.is_finite())
}

/// Real part of a complex matrix.
pub fn real_part(a: &ComplexMatrix) -> DenseMatrix {
    a.map(|z| z.re)
}

/// Largest imaginary magnitude in a complex matrix.
pub fn max_imaginary(a: &ComplexMatrix) -> f64 {
    a.iter().fold(0.0, |acc: f64, z| acc.max(z.im.abs()))
}

/// Largest absolute entry.
pub fn max_abs(a: &DenseMatrix) -> f64 {
    a.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()))
}

/// Largest absolute entrywise difference between two matrices of equal shape.
pub fn max_abs_diff(a: &DenseMatrix, b: &DenseMatrix) -> Result<f64> {
    if a.shape() != b.shape() {
        return Err(MoranError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
            context: "max_abs_diff: shapes differ".to_string(),
        });
    }
    Ok(a.iter()
        .zip(b.iter())
        .fold(0.0, |acc: f64, (x, y)| acc.max((x - y).abs())))
}

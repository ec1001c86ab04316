//! Dense eigendecomposition of generator matrices.
//!
//! The Moran generator is not symmetric, so a general eigensolver (faer) is used
//! and the eigenvector matrix is inverted explicitly. With `M = P diag(d) P⁻¹`,
//! transition probabilities after time `t` are `P diag(exp(d t)) P⁻¹`.
//!
//! P⁻¹ loses accuracy as `n` grows; non-finite inverses are reported as errors and
//! [`EigenDecomposition::reconstruction_error`] measures how far the factorization
//! is from the generator.

use std::time::Instant;

use faer::complex_native::c64;
use faer::Mat;

use crate::error::{MoranError, Result};
use crate::matrix::dense::{inverse_complex, max_abs, max_abs_diff, max_imaginary, real_part};
use crate::matrix::{to_dense, SparseFormat};
use crate::memo::CachedProperty;
use crate::types::{ComplexMatrix, ComplexScalar, ComplexVector, DenseMatrix};

use super::rate_matrix::rate_matrix;

/// Reconstruction errors above this multiple of the generator's scale are logged.
const RECONSTRUCTION_WARN_TOL: f64 = 1e-8;

/// `(P, d, P⁻¹)` for a real square generator `M = P diag(d) P⁻¹`.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Right eigenvectors, one per column.
    p: ComplexMatrix,
    /// Eigenvalues, in the order of the columns of `p`.
    d: ComplexVector,
    /// Explicit inverse of `p`.
    p_inv: ComplexMatrix,
    /// The decomposed matrix, kept for reconstruction checks.
    generator: DenseMatrix,
    reconstruction_error: CachedProperty<f64>,
}

impl EigenDecomposition {
    /// Decompose a real square matrix.
    pub fn new(generator: DenseMatrix) -> Result<Self> {
        let dim = generator.nrows();
        if dim != generator.ncols() {
            return Err(MoranError::DimensionMismatch {
                expected: dim,
                got: generator.ncols(),
                context: "EigenDecomposition::new: matrix must be square".to_string(),
            });
        }
        if generator.iter().any(|x| !x.is_finite()) {
            return Err(MoranError::InvalidParameter(
                "EigenDecomposition::new: matrix has non-finite entries".to_string(),
            ));
        }

        let (p, d) = if dim == 0 {
            (ComplexMatrix::zeros(0, 0), ComplexVector::zeros(0))
        } else {
            eigen_dense(&generator)
        };
        let p_inv = inverse_complex(&p, "eigenvector inversion")?;

        let decomposition = Self {
            p,
            d,
            p_inv,
            generator,
            reconstruction_error: CachedProperty::new(),
        };

        let scale = max_abs(&decomposition.generator).max(1.0);
        let error = decomposition.reconstruction_error();
        if !error.is_finite() {
            return Err(MoranError::IllConditioned {
                context: format!("eigendecomposition of a {dim}x{dim} matrix"),
                error,
            });
        }
        if error > RECONSTRUCTION_WARN_TOL * scale {
            log::warn!(
                "eigendecomposition of {dim}x{dim} matrix reconstructs with error {error:.2e} (scale {scale:.2e})"
            );
        }
        Ok(decomposition)
    }

    /// Dimension of the decomposed matrix.
    pub fn dim(&self) -> usize {
        self.d.len()
    }

    /// Right eigenvectors as columns.
    pub fn p(&self) -> &ComplexMatrix {
        &self.p
    }

    /// Eigenvalues.
    pub fn d(&self) -> &ComplexVector {
        &self.d
    }

    /// Inverse of the eigenvector matrix.
    pub fn p_inv(&self) -> &ComplexMatrix {
        &self.p_inv
    }

    /// `(P, d, P⁻¹)`.
    pub fn parts(&self) -> (&ComplexMatrix, &ComplexVector, &ComplexMatrix) {
        (&self.p, &self.d, &self.p_inv)
    }

    /// The matrix that was decomposed.
    pub fn generator(&self) -> &DenseMatrix {
        &self.generator
    }

    /// `P diag(d) P⁻¹`.
    pub fn reconstruct(&self) -> ComplexMatrix {
        self.scaled_product(|lambda| lambda)
    }

    /// Largest absolute deviation of `P diag(d) P⁻¹` from the generator,
    /// counting both real and imaginary residue. Computed once.
    pub fn reconstruction_error(&self) -> f64 {
        *self.reconstruction_error.get_or_init(|| {
            let rebuilt = self.reconstruct();
            let real_error = max_abs_diff(&real_part(&rebuilt), &self.generator)
                .unwrap_or(f64::INFINITY);
            real_error.max(max_imaginary(&rebuilt))
        })
    }

    /// Fail with [`MoranError::IllConditioned`] if the reconstruction error exceeds `tol`.
    pub fn verify(&self, tol: f64) -> Result<()> {
        let error = self.reconstruction_error();
        if error <= tol {
            Ok(())
        } else {
            Err(MoranError::IllConditioned {
                context: format!("reconstruction of {0}x{0} generator exceeds {tol:.2e}", self.dim()),
                error,
            })
        }
    }

    /// Eigenvalues as real numbers. Fails if any imaginary part exceeds `tol`.
    pub fn real_eigenvalues(&self, tol: f64) -> Result<Vec<f64>> {
        self.d
            .iter()
            .map(|lambda| {
                if lambda.im.abs() <= tol {
                    Ok(lambda.re)
                } else {
                    Err(MoranError::NumericalAssertion(format!(
                        "eigenvalue {} + {}i is not real within {tol:.2e}",
                        lambda.re, lambda.im
                    )))
                }
            })
            .collect()
    }

    /// Transition matrix `P diag(exp(d t)) P⁻¹` after time `t`.
    ///
    /// Entry `(i, j)` is the probability of being in state `j` at time `t` having
    /// started in state `i`, up to rounding. Pass the result through
    /// [`crate::special::check_probs_matrix`] before treating it as probabilities.
    pub fn propagate(&self, t: f64) -> Result<DenseMatrix> {
        if !t.is_finite() || t < 0.0 {
            return Err(MoranError::InvalidParameter(format!(
                "propagation time must be finite and non-negative, got {t}"
            )));
        }
        Ok(real_part(&self.scaled_product(|lambda| (lambda * t).exp())))
    }

    /// `P diag(f(d)) P⁻¹`.
    fn scaled_product<F>(&self, f: F) -> ComplexMatrix
    where
        F: Fn(ComplexScalar) -> ComplexScalar,
    {
        let factors: Vec<ComplexScalar> = self.d.iter().map(|&lambda| f(lambda)).collect();
        let dim = self.dim();
        let scaled = ComplexMatrix::from_fn(dim, dim, |i, j| self.p[(i, j)] * factors[j]);
        scaled * &self.p_inv
    }
}

/// Run the general eigensolver and convert to nalgebra types.
fn eigen_dense(a: &DenseMatrix) -> (ComplexMatrix, ComplexVector) {
    let dim = a.nrows();
    let mat = Mat::<f64>::from_fn(dim, dim, |i, j| a[(i, j)]);
    let evd = mat.eigendecomposition::<c64>();

    let s = evd.s().column_vector();
    let u = evd.u();
    let to_complex = |z: c64| ComplexScalar::new(z.re, z.im);

    let d = ComplexVector::from_fn(dim, |i, _| to_complex(s.read(i)));
    let p = ComplexMatrix::from_fn(dim, dim, |i, j| to_complex(u.read(i, j)));
    (p, d)
}

/// Eigensystem of the Moran generator for `n` lineages, uncached.
///
/// Use [`crate::cache::MoranCache::get_eigensystem`] to share results across calls.
pub fn moran_eigensystem(n: usize) -> Result<EigenDecomposition> {
    let generator = to_dense(&rate_matrix(n, SparseFormat::Csr)?);
    eigensystem_of(n, generator)
}

pub(crate) fn eigensystem_of(n: usize, generator: DenseMatrix) -> Result<EigenDecomposition> {
    let start = Instant::now();
    let decomposition = EigenDecomposition::new(generator)?;
    log::debug!(
        "eigensystem for n = {n}: {:?}, reconstruction error {:.2e}",
        start.elapsed(),
        decomposition.reconstruction_error()
    );
    Ok(decomposition)
}

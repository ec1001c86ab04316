use std::fmt;

use sprs::TriMat;

use crate::error::{MoranError, Result};
use crate::types::{DenseMatrix, SparseMat};

/// Compressed storage layout of a sparse matrix.
///
/// The layout is part of a rate-matrix cache key: the same lineage count in two
/// layouts yields two cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SparseFormat {
    /// Compressed Sparse Row.
    #[default]
    Csr,
    /// Compressed Sparse Column.
    Csc,
}

impl SparseFormat {
    /// Whether a matrix is stored in this layout.
    pub fn matches(self, mat: &SparseMat) -> bool {
        match self {
            SparseFormat::Csr => mat.is_csr(),
            SparseFormat::Csc => mat.is_csc(),
        }
    }
}

impl fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SparseFormat::Csr => write!(f, "csr"),
            SparseFormat::Csc => write!(f, "csc"),
        }
    }
}

/// Incremental sparse matrix builder using triplet (COO) format.
///
/// Exact zeros are dropped on insertion so that structurally empty rows stay
/// empty in the compressed result.
#[derive(Debug)]
pub struct TripletBuilder {
    triplet: TriMat<f64>,
}

impl TripletBuilder {
    /// Create a new builder for a matrix of the given dimensions.
    pub fn new(nrow: usize, ncol: usize) -> Self {
        Self {
            triplet: TriMat::new((nrow, ncol)),
        }
    }

    /// Add a value at (row, col). Zeros are skipped, duplicates are summed.
    pub fn add(&mut self, row: usize, col: usize, val: f64) {
        if val != 0.0 {
            self.triplet.add_triplet(row, col, val);
        }
    }

    /// Compress into the requested storage layout.
    pub fn build(&self, format: SparseFormat) -> SparseMat {
        match format {
            SparseFormat::Csr => self.triplet.to_csr(),
            SparseFormat::Csc => self.triplet.to_csc(),
        }
    }

    /// Number of stored triplets.
    pub fn nnz(&self) -> usize {
        self.triplet.nnz()
    }
}

/// Densify a sparse matrix regardless of its storage layout.
pub fn to_dense(a: &SparseMat) -> DenseMatrix {
    let mut dense = DenseMatrix::zeros(a.rows(), a.cols());
    for (val, (row, col)) in a.iter() {
        dense[(row, col)] += *val;
    }
    dense
}

/// Multiply a sparse matrix by a dense vector: result = A * x.
pub fn spmv(a: &SparseMat, x: &[f64]) -> Result<Vec<f64>> {
    if a.cols() != x.len() {
        return Err(MoranError::DimensionMismatch {
            expected: a.cols(),
            got: x.len(),
            context: "spmv: vector length".to_string(),
        });
    }
    let mut result = vec![0.0; a.rows()];
    for (val, (row, col)) in a.iter() {
        result[row] += val * x[col];
    }
    Ok(result)
}

/// Sum of each row: A * 1.
pub fn row_sums(a: &SparseMat) -> Vec<f64> {
    let mut result = vec![0.0; a.rows()];
    for (val, (row, _)) in a.iter() {
        result[row] += *val;
    }
    result
}

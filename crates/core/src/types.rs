/// The scalar type used throughout the library.
pub type Scalar = f64;

/// Complex scalar used for eigenvalues and eigenvectors.
pub type ComplexScalar = nalgebra::Complex<Scalar>;

/// Dense matrix type (column-major).
pub type DenseMatrix = nalgebra::DMatrix<Scalar>;

/// Dense complex matrix, e.g. the eigenvector matrix of a non-symmetric generator.
pub type ComplexMatrix = nalgebra::DMatrix<ComplexScalar>;

/// Dense complex vector, e.g. the eigenvalues of a non-symmetric generator.
pub type ComplexVector = nalgebra::DVector<ComplexScalar>;

/// Sparse matrix type (CSR or CSC, see [`crate::matrix::SparseFormat`]).
pub type SparseMat = sprs::CsMat<Scalar>;

//! Sparse generator of the Moran birth–death chain.
//!
//! For `n` lineages the generator is the `(n + 1) × (n + 1)` tridiagonal matrix
//! with `i (n - i) / 2` on both off-diagonals of row `i` and the negated row sum
//! on the diagonal. Rows 0 and `n` are absorbing and hold no stored entries.

use crate::error::Result;
use crate::matrix::{SparseFormat, TripletBuilder};
use crate::types::SparseMat;

use super::rates::{BirthDeathRates, MoranRates};

/// The three bands of a tridiagonal generator.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalBands {
    /// `sub[k]` sits at `(k + 1, k)`.
    pub sub: Vec<f64>,
    /// `main[k]` sits at `(k, k)`.
    pub main: Vec<f64>,
    /// `sup[k]` sits at `(k, k + 1)`.
    pub sup: Vec<f64>,
}

impl TridiagonalBands {
    /// Compute the bands for a birth–death chain.
    pub fn from_rates<R: BirthDeathRates + ?Sized>(rates: &R) -> Self {
        let n = rates.n();
        let sup: Vec<f64> = (0..n).map(|i| rates.birth(i)).collect();
        let sub: Vec<f64> = (1..=n).map(|i| rates.death(i)).collect();

        let main = (0..=n)
            .map(|i| {
                let up = if i < n { sup[i] } else { 0.0 };
                let down = if i > 0 { sub[i - 1] } else { 0.0 };
                -(up + down)
            })
            .collect();

        Self { sub, main, sup }
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.main.len()
    }

    /// Assemble the sparse matrix in the requested layout.
    pub fn to_sparse(&self, format: SparseFormat) -> SparseMat {
        let dim = self.dim();
        let mut builder = TripletBuilder::new(dim, dim);
        for (k, &val) in self.main.iter().enumerate() {
            builder.add(k, k, val);
        }
        for (k, &val) in self.sup.iter().enumerate() {
            builder.add(k, k + 1, val);
        }
        for (k, &val) in self.sub.iter().enumerate() {
            builder.add(k + 1, k, val);
        }
        builder.build(format)
    }
}

/// Generator of an arbitrary birth–death chain.
pub fn generator_matrix<R: BirthDeathRates + ?Sized>(rates: &R, format: SparseFormat) -> SparseMat {
    TridiagonalBands::from_rates(rates).to_sparse(format)
}

/// The Moran generator for `n` lineages, uncached.
///
/// Use [`crate::cache::MoranCache::get_rate_matrix`] to share results across calls.
pub fn rate_matrix(n: usize, format: SparseFormat) -> Result<SparseMat> {
    let rates = MoranRates::new(n)?;
    Ok(generator_matrix(&rates, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{row_sums, to_dense};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_n2_generator() {
        let m = to_dense(&rate_matrix(2, SparseFormat::Csr).unwrap());
        let expected = crate::types::DenseMatrix::from_row_slice(
            3,
            3,
            &[0.0, 0.0, 0.0, 0.5, -1.0, 0.5, 0.0, 0.0, 0.0],
        );
        assert_eq!(m, expected);
    }

    #[test]
    fn test_bands_n4() {
        let bands = TridiagonalBands::from_rates(&MoranRates::new(4).unwrap());
        assert_eq!(bands.sup, vec![0.0, 1.5, 2.0, 1.5]);
        assert_eq!(bands.sub, vec![1.5, 2.0, 1.5, 0.0]);
        assert_eq!(bands.main, vec![0.0, -3.0, -4.0, -3.0, 0.0]);
    }

    #[test]
    fn test_zero_and_one_lineage() {
        let m0 = rate_matrix(0, SparseFormat::Csr).unwrap();
        assert_eq!((m0.rows(), m0.cols()), (1, 1));
        assert_eq!(m0.nnz(), 0);

        let m1 = rate_matrix(1, SparseFormat::Csc).unwrap();
        assert_eq!((m1.rows(), m1.cols()), (2, 2));
        assert_eq!(m1.nnz(), 0);
    }

    #[test]
    fn test_storage_layout() {
        assert!(rate_matrix(5, SparseFormat::Csr).unwrap().is_csr());
        assert!(rate_matrix(5, SparseFormat::Csc).unwrap().is_csc());
    }

    #[test]
    fn test_structure_is_deterministic() {
        let a = rate_matrix(7, SparseFormat::Csr).unwrap();
        let b = rate_matrix(7, SparseFormat::Csr).unwrap();
        assert_eq!(a.indptr().raw_storage(), b.indptr().raw_storage());
        assert_eq!(a.indices(), b.indices());
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_asymmetric_rates_keep_zero_row_sums() {
        #[derive(Debug)]
        struct Skewed;
        impl BirthDeathRates for Skewed {
            fn n(&self) -> usize {
                3
            }
            fn birth(&self, i: usize) -> f64 {
                [0.0, 2.0, 1.0, 0.0][i]
            }
            fn death(&self, i: usize) -> f64 {
                [0.0, 0.5, 3.0, 0.0][i]
            }
        }

        let m = generator_matrix(&Skewed, SparseFormat::Csr);
        for s in row_sums(&m) {
            assert_abs_diff_eq!(s, 0.0, epsilon = 1e-15);
        }
        let dense = to_dense(&m);
        assert_eq!(dense[(1, 1)], -2.5);
        assert_eq!(dense[(2, 2)], -4.0);
    }
}

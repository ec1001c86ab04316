//! Session-scoped cache of rate matrices and eigensystems.
//!
//! Downstream inference asks for the same lineage counts over and over, so a
//! [`MoranCache`] is created once per analysis and passed by reference to every
//! consumer. Entries live as long as the cache.
//!
//! ```ignore
//! let cache = MoranCache::builder().verify_reconstruction(1e-8).build();
//! let eig = cache.get_eigensystem(10)?;
//! let (p, d, p_inv) = eig.parts();
//! ```

use std::sync::Arc;

use crate::error::{MoranError, Result};
use crate::matrix::{to_dense, SparseFormat};
use crate::memo::{CacheStats, Memo};
use crate::moran::eigen::{eigensystem_of, EigenDecomposition};
use crate::moran::rate_matrix::rate_matrix;
use crate::types::SparseMat;

/// Shared store for [`get_rate_matrix`](MoranCache::get_rate_matrix) and
/// [`get_eigensystem`](MoranCache::get_eigensystem).
#[derive(Debug)]
pub struct MoranCache {
    rate_matrices: Memo<(usize, SparseFormat), SparseMat>,
    eigensystems: Memo<usize, EigenDecomposition>,
    eigen_format: SparseFormat,
    reconstruction_tol: Option<f64>,
}

impl Default for MoranCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MoranCache {
    /// A cache with default settings.
    pub fn new() -> Self {
        MoranCacheBuilder::new().build()
    }

    pub fn builder() -> MoranCacheBuilder {
        MoranCacheBuilder::new()
    }

    /// Moran generator for `n` lineages in the requested layout.
    pub fn get_rate_matrix(&self, n: usize, format: SparseFormat) -> Result<Arc<SparseMat>> {
        self.rate_matrices
            .get_or_try_compute((n, format), || rate_matrix(n, format))
    }

    /// `(P, d, P⁻¹)` of the Moran generator for `n` lineages, cached by `n`.
    ///
    /// The generator itself is taken from (and stored in) the rate-matrix table.
    pub fn get_eigensystem(&self, n: usize) -> Result<Arc<EigenDecomposition>> {
        self.eigensystems.get_or_try_compute(n, || {
            let sparse = self.get_rate_matrix(n, self.eigen_format)?;
            let decomposition = eigensystem_of(n, to_dense(&sparse))?;
            if let Some(tol) = self.reconstruction_tol {
                decomposition.verify(tol)?;
            }
            Ok::<_, MoranError>(decomposition)
        })
    }

    /// Hit/miss counters of the rate-matrix table.
    pub fn rate_matrix_stats(&self) -> CacheStats {
        self.rate_matrices.stats()
    }

    /// Hit/miss counters of the eigensystem table.
    pub fn eigensystem_stats(&self) -> CacheStats {
        self.eigensystems.stats()
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.rate_matrices.clear();
        self.eigensystems.clear();
    }
}

/// Builder for [`MoranCache`].
#[derive(Debug, Clone)]
pub struct MoranCacheBuilder {
    eigen_format: SparseFormat,
    reconstruction_tol: Option<f64>,
}

impl Default for MoranCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MoranCacheBuilder {
    /// CSR storage for the eigensystem's generator, no reconstruction check.
    pub fn new() -> Self {
        Self {
            eigen_format: SparseFormat::Csr,
            reconstruction_tol: None,
        }
    }

    /// Layout under which `get_eigensystem` stores the generator it decomposes.
    pub fn sparse_format(mut self, format: SparseFormat) -> Self {
        self.eigen_format = format;
        self
    }

    /// Reject eigensystems whose reconstruction error exceeds `tol`.
    pub fn verify_reconstruction(mut self, tol: f64) -> Self {
        self.reconstruction_tol = Some(tol);
        self
    }

    pub fn build(self) -> MoranCache {
        MoranCache {
            rate_matrices: Memo::new("rate_matrix"),
            eigensystems: Memo::new("eigensystem"),
            eigen_format: self.eigen_format,
            reconstruction_tol: self.reconstruction_tol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_matrix_cached_per_format() {
        let cache = MoranCache::new();
        let a = cache.get_rate_matrix(4, SparseFormat::Csr).unwrap();
        let b = cache.get_rate_matrix(4, SparseFormat::Csr).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let c = cache.get_rate_matrix(4, SparseFormat::Csc).unwrap();
        assert!(c.is_csc());
        assert_eq!(cache.rate_matrix_stats(), CacheStats { hits: 1, misses: 2 });
    }

    #[test]
    fn test_eigensystem_cached_and_reuses_generator() {
        let cache = MoranCache::new();
        cache.get_rate_matrix(3, SparseFormat::Csr).unwrap();

        let a = cache.get_eigensystem(3).unwrap();
        let b = cache.get_eigensystem(3).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.eigensystem_stats(), CacheStats { hits: 1, misses: 1 });
        // The generator came from the rate-matrix table.
        assert_eq!(cache.rate_matrix_stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_builder_format() {
        let cache = MoranCache::builder().sparse_format(SparseFormat::Csc).build();
        cache.get_eigensystem(2).unwrap();
        assert_eq!(cache.rate_matrix_stats().misses, 1);
        let csc = cache.get_rate_matrix(2, SparseFormat::Csc).unwrap();
        assert!(csc.is_csc());
        assert_eq!(cache.rate_matrix_stats().hits, 1);
    }

    #[test]
    fn test_failed_verification_is_not_cached() {
        let cache = MoranCache::builder().verify_reconstruction(-1.0).build();
        assert!(matches!(
            cache.get_eigensystem(3),
            Err(MoranError::IllConditioned { .. })
        ));
        assert_eq!(cache.eigensystem_stats().misses, 1);
        assert!(cache.get_eigensystem(3).is_err());
        assert_eq!(cache.eigensystem_stats().misses, 2);
    }

    #[test]
    fn test_clear() {
        let cache = MoranCache::new();
        cache.get_eigensystem(2).unwrap();
        cache.clear();
        assert_eq!(cache.eigensystem_stats(), CacheStats::default());
        assert_eq!(cache.rate_matrix_stats(), CacheStats::default());
    }

    #[test]
    fn test_cache_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MoranCache>();
    }
}

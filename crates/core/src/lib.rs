//! Moran-model generator matrices and the numerics needed to turn them into
//! transition probabilities.
//!
//! - [`moran`]: the sparse birth–death generator and its dense eigensystem.
//! - [`cache::MoranCache`]: per-session cache of both, keyed by lineage count.
//! - [`special`]: `expm1d`, `transformed_expi` and probability cleanup.
//! - [`memo`]: the caching primitives the above are built on.

pub mod cache;
pub mod error;
pub mod matrix;
pub mod memo;
pub mod moran;
pub mod special;
pub mod types;

pub use cache::{MoranCache, MoranCacheBuilder};
pub use error::{MoranError, Result};
pub use matrix::SparseFormat;
pub use moran::{moran_eigensystem, rate_matrix, EigenDecomposition};

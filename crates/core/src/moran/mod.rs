pub mod eigen;
pub mod rate_matrix;
pub mod rates;

pub use eigen::{moran_eigensystem, EigenDecomposition};
pub use rate_matrix::{generator_matrix, rate_matrix, TridiagonalBands};
pub use rates::{
    lineage_count_from_i64, parse_lineage_count, validate_lineage_count, BirthDeathRates,
    MoranRates,
};

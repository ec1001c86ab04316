pub mod dense;
pub mod sparse;

pub use sparse::{row_sums, spmv, to_dense, SparseFormat, TripletBuilder};

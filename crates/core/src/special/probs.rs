//! Cleanup of arrays that should be non-negative probabilities.
//!
//! Eigen-based propagation leaves rounding noise: tiny negative entries and row
//! sums a few ulps away from one. These routines remove that noise, but refuse
//! violations too large to be rounding, since those point at a bug upstream.

use crate::error::{MoranError, Result};
use crate::types::DenseMatrix;

/// Default relative tolerance for negative entries.
pub const DEFAULT_TRUNCATE_TOL: f64 = 1e-13;

/// Row sums must satisfy `|s - 1| <= ROW_SUM_ATOL + ROW_SUM_RTOL`.
pub const ROW_SUM_RTOL: f64 = 1e-5;
pub const ROW_SUM_ATOL: f64 = 1e-8;

/// Floor for the maximum of a group, so all-zero groups still compare.
const MAX_FLOOR: f64 = 1e-300;

/// Direction along which [`truncate0`] gathers its statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// One maximum / most-negative pair per row.
    Row,
    /// One maximum / most-negative pair per column.
    Column,
}

/// Settings for [`truncate0_with`] and [`check_probs_matrix_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncateOptions {
    /// `None` takes statistics over the whole array.
    pub axis: Option<Axis>,
    /// Zero everything below `tol × max` instead of below `2 × negative magnitude`.
    pub strict: bool,
    pub tol: f64,
}

impl Default for TruncateOptions {
    fn default() -> Self {
        Self {
            axis: None,
            strict: false,
            tol: DEFAULT_TRUNCATE_TOL,
        }
    }
}

impl TruncateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}

/// Maximum (floored) and negative magnitude of the most negative value.
#[derive(Debug, Clone, Copy)]
struct GroupBounds {
    max: f64,
    neg: f64,
}

impl GroupBounds {
    fn of<'a>(values: impl IntoIterator<Item = &'a f64>) -> Self {
        let (max, min) = values
            .into_iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), &v| (hi.max(v), lo.min(v)));
        Self {
            max: max.max(MAX_FLOOR),
            neg: (-min).max(0.0),
        }
    }

    fn check(&self, tol: f64, label: &str) -> Result<()> {
        if self.neg <= tol * self.max {
            Ok(())
        } else {
            Err(MoranError::NumericalAssertion(format!(
                "{label}: negative entry of magnitude {:.3e} exceeds {tol:.1e} x max {:.3e}",
                self.neg, self.max
            )))
        }
    }

    fn cutoff(&self, strict: bool, tol: f64) -> f64 {
        if strict {
            tol * self.max
        } else {
            2.0 * self.neg
        }
    }
}

fn zero_below<'a>(values: impl IntoIterator<Item = &'a mut f64>, cutoff: f64) -> usize {
    let mut zeroed = 0;
    for v in values {
        if *v < cutoff {
            if *v != 0.0 {
                zeroed += 1;
            }
            *v = 0.0;
        }
    }
    zeroed
}

fn check_finite<'a>(values: impl IntoIterator<Item = &'a f64>, label: &str) -> Result<()> {
    if values.into_iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(MoranError::NumericalAssertion(format!("{label}: non-finite entry")))
    }
}

/// Make `x` non-negative, tolerating only rounding-sized negative entries.
///
/// Per group (the whole matrix, each row, or each column, depending on `axis`),
/// `max` is the largest entry (at least 1e-300) and `neg` the magnitude of the
/// most negative one. Fails if any group has `neg > tol × max`. Otherwise, with
/// `strict` every entry below `tol × max` is zeroed, and without it every entry
/// below `2 × neg`. Works in place and hands back the same matrix.
pub fn truncate0(
    x: &mut DenseMatrix,
    axis: Option<Axis>,
    strict: bool,
    tol: f64,
) -> Result<&mut DenseMatrix> {
    check_finite(x.iter(), "truncate0")?;

    let zeroed = match axis {
        None => {
            let bounds = GroupBounds::of(x.iter());
            bounds.check(tol, "truncate0")?;
            zero_below(x.iter_mut(), bounds.cutoff(strict, tol))
        }
        Some(Axis::Row) => {
            let bounds: Vec<GroupBounds> =
                x.row_iter().map(|row| GroupBounds::of(row.iter())).collect();
            for (i, b) in bounds.iter().enumerate() {
                b.check(tol, &format!("truncate0 row {i}"))?;
            }
            x.row_iter_mut()
                .zip(bounds.iter())
                .map(|(mut row, b)| zero_below(row.iter_mut(), b.cutoff(strict, tol)))
                .sum()
        }
        Some(Axis::Column) => {
            let bounds: Vec<GroupBounds> =
                x.column_iter().map(|col| GroupBounds::of(col.iter())).collect();
            for (j, b) in bounds.iter().enumerate() {
                b.check(tol, &format!("truncate0 column {j}"))?;
            }
            x.column_iter_mut()
                .zip(bounds.iter())
                .map(|(mut col, b)| zero_below(col.iter_mut(), b.cutoff(strict, tol)))
                .sum()
        }
    };

    if zeroed > 0 {
        log::debug!("truncate0 zeroed {zeroed} entries");
    }
    Ok(x)
}

/// [`truncate0`] with its settings bundled.
pub fn truncate0_with<'a>(
    x: &'a mut DenseMatrix,
    options: &TruncateOptions,
) -> Result<&'a mut DenseMatrix> {
    truncate0(x, options.axis, options.strict, options.tol)
}

/// [`truncate0`] over a single vector.
pub fn truncate0_vec(x: &mut [f64], strict: bool, tol: f64) -> Result<&mut [f64]> {
    check_finite(x.iter(), "truncate0")?;
    let bounds = GroupBounds::of(x.iter());
    bounds.check(tol, "truncate0")?;
    let zeroed = zero_below(x.iter_mut(), bounds.cutoff(strict, tol));
    if zeroed > 0 {
        log::debug!("truncate0 zeroed {zeroed} entries");
    }
    Ok(x)
}

fn check_row_sum(sum: f64, label: &str) -> Result<()> {
    if (sum - 1.0).abs() <= ROW_SUM_ATOL + ROW_SUM_RTOL {
        Ok(())
    } else {
        Err(MoranError::NumericalAssertion(format!(
            "{label} sums to {sum}, expected 1"
        )))
    }
}

/// Validate and clean a row-stochastic matrix.
///
/// Every row must already sum to one within tolerance; then [`truncate0`] runs
/// with default settings and each row is rescaled to sum to exactly one.
pub fn check_probs_matrix(x: DenseMatrix) -> Result<DenseMatrix> {
    check_probs_matrix_with(x, &TruncateOptions::default())
}

/// [`check_probs_matrix`] with a custom truncation policy.
pub fn check_probs_matrix_with(mut x: DenseMatrix, options: &TruncateOptions) -> Result<DenseMatrix> {
    for (i, row) in x.row_iter().enumerate() {
        check_row_sum(row.sum(), &format!("row {i}"))?;
    }

    truncate0_with(&mut x, options)?;

    for mut row in x.row_iter_mut() {
        let sum = row.sum();
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
    Ok(x)
}

/// Validate and clean a single probability vector.
pub fn check_probs_vector(mut x: Vec<f64>) -> Result<Vec<f64>> {
    check_row_sum(x.iter().sum(), "probability vector")?;
    truncate0_vec(&mut x, false, DEFAULT_TRUNCATE_TOL)?;
    let sum: f64 = x.iter().sum();
    for v in x.iter_mut() {
        *v /= sum;
    }
    Ok(x)
}

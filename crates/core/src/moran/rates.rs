use crate::error::{MoranError, Result};

/// Transition rates of a birth–death chain on the states `0..=n`.
///
/// The generator built from these rates puts `birth(i)` at `(i, i+1)`,
/// `death(i)` at `(i, i-1)` and the negated row sum on the diagonal, so any
/// implementation yields rows that sum to zero.
pub trait BirthDeathRates: std::fmt::Debug {
    /// Largest state; the chain has `n + 1` states.
    fn n(&self) -> usize;

    /// Rate of moving from state `i` to `i + 1`. Must be 0 for `i == n`.
    fn birth(&self, i: usize) -> f64;

    /// Rate of moving from state `i` to `i - 1`. Must be 0 for `i == 0`.
    fn death(&self, i: usize) -> f64;

    /// Total rate of leaving state `i`.
    fn exit_rate(&self, i: usize) -> f64 {
        self.birth(i) + self.death(i)
    }
}

/// Moran drift among `n` lineages: from `i` derived lineages, births and deaths
/// each happen at rate `i (n - i) / 2`. States 0 and `n` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoranRates {
    n: usize,
}

impl MoranRates {
    pub fn new(n: usize) -> Result<Self> {
        validate_lineage_count(n)?;
        Ok(Self { n })
    }

    /// `i (n - i) / 2`, evaluated in floating point.
    pub fn rate(&self, i: usize) -> f64 {
        if i > self.n {
            return 0.0;
        }
        let i = i as f64;
        i * (self.n as f64 - i) / 2.0
    }
}

impl BirthDeathRates for MoranRates {
    fn n(&self) -> usize {
        self.n
    }

    fn birth(&self, i: usize) -> f64 {
        self.rate(i)
    }

    fn death(&self, i: usize) -> f64 {
        self.rate(i)
    }
}

/// Reject lineage counts whose matrix dimension `n + 1` cannot be represented.
pub fn validate_lineage_count(n: usize) -> Result<usize> {
    n.checked_add(1)
        .ok_or_else(|| MoranError::InvalidSize(format!("n = {n} overflows the matrix dimension")))?;
    Ok(n)
}

/// Convert a lineage count from a signed integer, rejecting negatives.
pub fn lineage_count_from_i64(n: i64) -> Result<usize> {
    let n = usize::try_from(n)
        .map_err(|_| MoranError::InvalidSize(format!("n = {n} must be non-negative")))?;
    validate_lineage_count(n)
}

/// Convert a lineage count parsed as a float (as demographic annotations carry
/// them), rejecting negative, non-finite and fractional values.
pub fn parse_lineage_count(n: f64) -> Result<usize> {
    if !n.is_finite() {
        return Err(MoranError::InvalidSize(format!("n = {n} is not finite")));
    }
    if n < 0.0 {
        return Err(MoranError::InvalidSize(format!("n = {n} must be non-negative")));
    }
    if n.fract() != 0.0 {
        return Err(MoranError::InvalidSize(format!("n = {n} is not an integer")));
    }
    if n >= usize::MAX as f64 {
        return Err(MoranError::InvalidSize(format!("n = {n} is too large")));
    }
    validate_lineage_count(n as usize)
}

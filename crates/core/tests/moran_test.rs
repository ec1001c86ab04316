//! Integration tests: generator structure, eigensystem accuracy and
//! propagation through the session cache.

use approx::assert_abs_diff_eq;
use moran_core::matrix::dense::max_abs;
use moran_core::matrix::{row_sums, to_dense};
use moran_core::moran::parse_lineage_count;
use moran_core::special::{check_probs_matrix_with, expm1d, TruncateOptions};
use moran_core::{MoranCache, MoranError, SparseFormat};

#[test]
fn test_generator_structure_for_range_of_n() {
    let cache = MoranCache::new();
    for n in 0..=30 {
        for format in [SparseFormat::Csr, SparseFormat::Csc] {
            let m = cache.get_rate_matrix(n, format).unwrap();
            assert_eq!((m.rows(), m.cols()), (n + 1, n + 1));
            assert!(format.matches(&m));

            for s in row_sums(&m) {
                assert_abs_diff_eq!(s, 0.0, epsilon = 1e-12);
            }

            let dense = to_dense(&m);
            for i in 0..=n {
                for j in 0..=n {
                    if i != j {
                        assert!(dense[(i, j)] >= 0.0);
                    }
                    if i.abs_diff(j) > 1 {
                        assert_eq!(dense[(i, j)], 0.0);
                    }
                }
                assert_eq!(dense[(0, i)], 0.0);
                assert_eq!(dense[(n, i)], 0.0);
            }
        }
    }
}

#[test]
fn test_two_lineage_generator() {
    let cache = MoranCache::new();
    let dense = to_dense(&cache.get_rate_matrix(2, SparseFormat::Csr).unwrap());
    let rows = [[0.0, 0.0, 0.0], [0.5, -1.0, 0.5], [0.0, 0.0, 0.0]];
    for (i, row) in rows.iter().enumerate() {
        for (j, &val) in row.iter().enumerate() {
            assert_eq!(dense[(i, j)], val);
        }
    }
}

#[test]
fn test_eigensystem_reconstructs_generator() {
    let cache = MoranCache::new();
    for n in 1..=50 {
        let eig = cache.get_eigensystem(n).unwrap();
        let generator = to_dense(&cache.get_rate_matrix(n, SparseFormat::Csr).unwrap());
        let scale = 1.0 + max_abs(&generator);

        let rebuilt = eig.reconstruct();
        for i in 0..=n {
            for j in 0..=n {
                assert_abs_diff_eq!(rebuilt[(i, j)].re, generator[(i, j)], epsilon = 1e-8 * scale);
                assert_abs_diff_eq!(rebuilt[(i, j)].im, 0.0, epsilon = 1e-8 * scale);
            }
        }
        assert!(eig.reconstruction_error() < 1e-8 * scale, "n = {n}");
    }
}

#[test]
fn test_eigenvalues_are_minus_binomial_coefficients() {
    let cache = MoranCache::new();
    for n in 2..=12 {
        let eig = cache.get_eigensystem(n).unwrap();
        let mut values = eig.real_eigenvalues(1e-8).unwrap();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut expected: Vec<f64> = (2..=n).map(|k| -((k * (k - 1)) as f64) / 2.0).collect();
        expected.extend([0.0, 0.0]);
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let scale = 1.0 + (n * n) as f64;
        for (got, want) in values.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-9 * scale);
        }
    }
}

#[test]
fn test_two_lineage_transition_probabilities() {
    // From one derived lineage the chain leaves at rate 1, splitting evenly.
    let cache = MoranCache::new();
    let eig = cache.get_eigensystem(2).unwrap();
    for &t in &[0.0, 0.1, 1.0, 5.0] {
        let probs = eig.propagate(t).unwrap();
        let stay = (-t).exp();
        assert_abs_diff_eq!(probs[(1, 1)], stay, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[(1, 0)], (1.0 - stay) / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[(1, 2)], (1.0 - stay) / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[(0, 0)], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[(2, 2)], 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_propagated_rows_are_distributions() {
    let cache = MoranCache::builder().verify_reconstruction(1e-6).build();
    let eig = cache.get_eigensystem(10).unwrap();
    let raw = eig.propagate(0.1).unwrap();
    let probs = check_probs_matrix_with(raw, &TruncateOptions::new().tol(1e-8)).unwrap();

    for row in probs.row_iter() {
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
    }
    assert!(probs.iter().all(|&p| p >= 0.0));
    assert_abs_diff_eq!(probs[(0, 0)], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[(10, 10)], 1.0, epsilon = 1e-12);
}

#[test]
fn test_integrated_sojourn_with_expm1d() {
    // ∫₀ᵗ e^{λs} ds = t · expm1d(λ t), including λ = 0.
    let cache = MoranCache::new();
    let eig = cache.get_eigensystem(4).unwrap();
    let t = 0.7;
    for lambda in eig.real_eigenvalues(1e-8).unwrap() {
        let integral = t * expm1d(lambda * t);
        if lambda.abs() < 1e-12 {
            assert_abs_diff_eq!(integral, t, epsilon = 1e-10);
        } else {
            assert_abs_diff_eq!(integral, ((lambda * t).exp() - 1.0) / lambda, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_invalid_lineage_counts_fail_before_building() {
    for bad in [-1.0, 2.5, f64::NAN] {
        assert!(matches!(parse_lineage_count(bad), Err(MoranError::InvalidSize(_))));
    }
    let cache = MoranCache::new();
    let n = parse_lineage_count(6.0).unwrap();
    assert_eq!(cache.get_rate_matrix(n, SparseFormat::Csr).unwrap().rows(), 7);
}

//! Exponential-integral transforms used to turn generator eigenvalues into
//! transition probabilities.

/// Euler–Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Below this magnitude `transformed_expi` switches to its power series.
const SERIES_THRESHOLD: f64 = 1.0 / 45.0;

/// Number of terms summed by the `transformed_expi` series.
const SERIES_TERMS: usize = 10;

const MAX_ITER: usize = 500;

/// Smallest value kept away from zero in the continued fraction.
const FPMIN: f64 = f64::MIN_POSITIVE / f64::EPSILON;

/// `(e^x - 1) / x`, continuous through the removable singularity at 0.
///
/// Returns exactly `1.0` at `x = 0` and `+inf` at `x = +inf`. Elsewhere the
/// numerator comes from `exp_m1`, so there is no cancellation for small `|x|`.
pub fn expm1d(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else if x == f64::INFINITY {
        f64::INFINITY
    } else {
        x.exp_m1() / x
    }
}

/// Exponential integral `E₁(x) = ∫₁^∞ e^{-xt}/t dt` for `x ≥ 0`.
///
/// `E₁(0) = +inf`; negative or NaN input gives NaN.
pub fn exp1(x: f64) -> f64 {
    if x.is_nan() || x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 {
        return f64::INFINITY;
    }
    if x == f64::INFINITY {
        return 0.0;
    }

    if x > 1.0 {
        // Modified Lentz evaluation of the continued fraction.
        let mut b = x + 1.0;
        let mut c = 1.0 / FPMIN;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..=MAX_ITER {
            let an = -((i * i) as f64);
            b += 2.0;
            d = 1.0 / (an * d + b);
            c = b + an / c;
            let del = c * d;
            h *= del;
            if (del - 1.0).abs() < f64::EPSILON {
                break;
            }
        }
        h * (-x).exp()
    } else {
        let mut ans = -x.ln() - EULER_GAMMA;
        let mut fact = 1.0;
        for i in 1..=MAX_ITER {
            let k = i as f64;
            fact *= -x / k;
            let del = -fact / k;
            ans += del;
            if del.abs() < ans.abs() * f64::EPSILON {
                break;
            }
        }
        ans
    }
}

/// Exponential integral `Ei(x)` (Cauchy principal value) for real `x`.
///
/// `Ei(x) = -E₁(-x)` for negative `x`, `Ei(0) = -inf`, `Ei(+inf) = +inf`.
pub fn expi(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x < 0.0 {
        return -exp1(-x);
    }
    if x == f64::INFINITY {
        return f64::INFINITY;
    }
    if x < FPMIN {
        return x.ln() + EULER_GAMMA;
    }

    if x <= -f64::EPSILON.ln() {
        // Power series: γ + ln x + Σ x^k / (k k!).
        let mut sum = 0.0;
        let mut fact = 1.0;
        for i in 1..=MAX_ITER {
            let k = i as f64;
            fact *= x / k;
            let term = fact / k;
            sum += term;
            if term < f64::EPSILON * sum {
                break;
            }
        }
        sum + x.ln() + EULER_GAMMA
    } else {
        // Asymptotic series, stopped at its smallest term.
        let mut sum = 0.0;
        let mut term = 1.0;
        for i in 1..=MAX_ITER {
            let prev = term;
            term *= i as f64 / x;
            if term < f64::EPSILON {
                break;
            }
            if term < prev {
                sum += term;
            } else {
                sum -= prev;
                break;
            }
        }
        x.exp() * (1.0 + sum) / x
    }
}

/// `-Ei(-1/x) e^{1/x} / x` for every element of `x`.
///
/// Elements with `|x| < 1/45` use a ten-term series, where the closed form
/// would cancel; the rest use the closed form.
pub fn transformed_expi(x: &[f64]) -> Vec<f64> {
    x.iter().map(|&v| transformed_expi_scalar(v)).collect()
}

/// Scalar form of [`transformed_expi`].
pub fn transformed_expi_scalar(x: f64) -> f64 {
    if x.abs() < SERIES_THRESHOLD {
        transformed_expi_series(x)
    } else {
        transformed_expi_naive(x)
    }
}

/// `1 - x + 2! x² - 3! x³ + …`, the asymptotic expansion truncated after ten terms.
pub(crate) fn transformed_expi_series(x: f64) -> f64 {
    let mut c = 1.0;
    let mut ret = 1.0;
    for k in 1..=SERIES_TERMS {
        c = -c * x * k as f64;
        ret += c;
    }
    ret
}

pub(crate) fn transformed_expi_naive(x: f64) -> f64 {
    let inv = 1.0 / x;
    -expi(-inv) * inv.exp() / x
}

/// Harmonic number `H(n) = Σ_{k=1}^{n} 1/k`.
pub fn harmonic_number(n: usize) -> f64 {
    (1..=n).map(|k| 1.0 / k as f64).sum()
}

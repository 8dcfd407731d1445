//! Statistical primitives behind the default drift tests.
//!
//! All functions are pure and deterministic. They return non-finite values
//! only when their input contains them; callers check the results.

use std::cmp::Ordering;
use std::collections::BTreeMap;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];
const GAMMA_MAX_ITERATIONS: usize = 500;
const GAMMA_EPSILON: f64 = 1e-14;

/// Natural log of the gamma function (Lanczos approximation), `x > 0`.
pub fn ln_gamma(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::NAN;
    }
    if x < 0.5 {
        // Reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFICIENTS[0];
    for (i, coefficient) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        sum += coefficient / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized upper incomplete gamma function `Q(a, x)`.
pub fn gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_continued_fraction(a, x)
    }
}

fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut denominator = a;
    for _ in 0..GAMMA_MAX_ITERATIONS {
        denominator += 1.0;
        term *= x / denominator;
        sum += term;
        if term.abs() < sum.abs() * GAMMA_EPSILON {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

// Modified Lentz evaluation of the continued fraction for Q(a, x).
fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let tiny = f64::MIN_POSITIVE / GAMMA_EPSILON;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / tiny;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=GAMMA_MAX_ITERATIONS {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < tiny {
            d = tiny;
        }
        c = b + an / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < GAMMA_EPSILON {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

/// Survival function of the chi-squared distribution.
pub fn chi_squared_sf(statistic: f64, degrees_of_freedom: f64) -> f64 {
    gamma_q(degrees_of_freedom / 2.0, statistic / 2.0)
}

/// Kolmogorov distribution survival function `Q_KS(lambda)`.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda < 1e-3 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut sign = 2.0;
    let mut sum = 0.0;
    let mut previous_term = 0.0_f64;
    for j in 1..=100 {
        let term = sign * (a2 * (j * j) as f64).exp();
        sum += term;
        if term.abs() <= 1e-10 * previous_term.abs() || term.abs() <= 1e-16 * sum.abs() {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous_term = term;
    }
    // Series failed to converge, which only happens for tiny lambda.
    1.0
}

/// Result of a two-sample Kolmogorov-Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

fn ecdf(sorted: &[f64], x: f64) -> f64 {
    sorted.partition_point(|v| *v <= x) as f64 / sorted.len() as f64
}

/// Two-sample Kolmogorov-Smirnov test with the asymptotic p-value
/// (Stephens' small-sample correction). Both samples must be non-empty.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> KsOutcome {
    let reference = sorted(reference);
    let current = sorted(current);

    let statistic = reference
        .iter()
        .chain(current.iter())
        .map(|&x| (ecdf(&reference, x) - ecdf(&current, x)).abs())
        .fold(0.0_f64, f64::max);

    let n = reference.len() as f64;
    let m = current.len() as f64;
    let effective = (n * m / (n + m)).sqrt();
    let lambda = (effective + 0.12 + 0.11 / effective) * statistic;

    KsOutcome {
        statistic,
        p_value: kolmogorov_sf(lambda),
    }
}

/// First Wasserstein distance between two empirical distributions.
pub fn wasserstein_distance(reference: &[f64], current: &[f64]) -> f64 {
    let reference = sorted(reference);
    let current = sorted(current);
    let mut all: Vec<f64> = reference.iter().chain(current.iter()).copied().collect();
    all.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    all.windows(2)
        .map(|pair| {
            let width = pair[1] - pair[0];
            width * (ecdf(&reference, pair[0]) - ecdf(&current, pair[0])).abs()
        })
        .sum()
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Category frequencies of both samples over the union of their categories.
///
/// Categories are ordered lexicographically so results are reproducible.
pub fn frequency_table(reference: &[String], current: &[String]) -> Vec<(String, f64, f64)> {
    let mut table: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for value in reference {
        table.entry(value.as_str()).or_default().0 += 1.0;
    }
    for value in current {
        table.entry(value.as_str()).or_default().1 += 1.0;
    }
    table
        .into_iter()
        .map(|(category, (r, c))| (category.to_string(), r, c))
        .collect()
}

/// Result of a chi-squared test of homogeneity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquaredOutcome {
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
}

/// Chi-squared test of homogeneity on the 2 x k table built by
/// [`frequency_table`]. Returns `None` when fewer than two categories exist.
pub fn chi_squared_homogeneity(table: &[(String, f64, f64)]) -> Option<ChiSquaredOutcome> {
    if table.len() < 2 {
        return None;
    }
    let reference_total: f64 = table.iter().map(|(_, r, _)| r).sum();
    let current_total: f64 = table.iter().map(|(_, _, c)| c).sum();
    let grand_total = reference_total + current_total;
    if reference_total == 0.0 || current_total == 0.0 {
        return None;
    }

    let mut statistic = 0.0;
    for (_, observed_reference, observed_current) in table {
        let column_total = observed_reference + observed_current;
        let expected_reference = reference_total * column_total / grand_total;
        let expected_current = current_total * column_total / grand_total;
        if expected_reference > 0.0 {
            statistic += (observed_reference - expected_reference).powi(2) / expected_reference;
        }
        if expected_current > 0.0 {
            statistic += (observed_current - expected_current).powi(2) / expected_current;
        }
    }

    let degrees_of_freedom = (table.len() - 1) as f64;
    Some(ChiSquaredOutcome {
        statistic,
        degrees_of_freedom,
        p_value: chi_squared_sf(statistic, degrees_of_freedom),
    })
}

/// Jensen-Shannon distance (natural log base) between the two frequency
/// columns of a table.
pub fn jensen_shannon_distance(table: &[(String, f64, f64)]) -> f64 {
    let reference_total: f64 = table.iter().map(|(_, r, _)| r).sum();
    let current_total: f64 = table.iter().map(|(_, _, c)| c).sum();
    if reference_total == 0.0 || current_total == 0.0 {
        return f64::NAN;
    }

    let kl = |p: f64, m: f64| if p > 0.0 { p * (p / m).ln() } else { 0.0 };
    let divergence: f64 = table
        .iter()
        .map(|(_, r, c)| {
            let p = r / reference_total;
            let q = c / current_total;
            let m = 0.5 * (p + q);
            0.5 * kl(p, m) + 0.5 * kl(q, m)
        })
        .sum();

    divergence.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_ln_gamma_known_values() {
        // Gamma(5) = 24, Gamma(0.5) = sqrt(pi)
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < TOLERANCE);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < TOLERANCE);
        assert!(ln_gamma(0.0).is_nan());
    }

    #[test]
    fn test_chi_squared_sf_known_values() {
        // df = 2 has a closed form: exp(-x / 2)
        assert!((chi_squared_sf(3.0, 2.0) - (-1.5_f64).exp()).abs() < TOLERANCE);
        // 95th percentile of chi2(1) is 3.841459
        assert!((chi_squared_sf(3.841_459, 1.0) - 0.05).abs() < 1e-5);
        assert_eq!(chi_squared_sf(0.0, 4.0), 1.0);
    }

    #[test]
    fn test_kolmogorov_sf_bounds() {
        assert_eq!(kolmogorov_sf(0.0), 1.0);
        // Critical value of the Kolmogorov distribution at alpha = 0.05
        assert!((kolmogorov_sf(1.358) - 0.05).abs() < 1e-3);
        assert!(kolmogorov_sf(3.0) < 1e-6);
    }

    #[test]
    fn test_ks_identical_samples() {
        let sample: Vec<f64> = (0..50).map(f64::from).collect();
        let outcome = ks_two_sample(&sample, &sample);
        assert_eq!(outcome.statistic, 0.0);
        assert_eq!(outcome.p_value, 1.0);
    }

    #[test]
    fn test_ks_disjoint_samples() {
        let reference: Vec<f64> = (20..30).map(f64::from).collect();
        let current: Vec<f64> = (90..100).map(f64::from).collect();
        let outcome = ks_two_sample(&reference, &current);
        assert_eq!(outcome.statistic, 1.0);
        assert!(outcome.p_value < 0.001);
    }

    #[test]
    fn test_ks_partial_overlap() {
        let reference = [1.0, 2.0, 3.0, 4.0];
        let current = [3.0, 4.0, 5.0, 6.0];
        let outcome = ks_two_sample(&reference, &current);
        assert!((outcome.statistic - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_wasserstein_shift() {
        let reference = [0.0, 1.0, 2.0];
        let current = [5.0, 6.0, 7.0];
        assert!((wasserstein_distance(&reference, &current) - 5.0).abs() < TOLERANCE);
        assert_eq!(wasserstein_distance(&reference, &reference), 0.0);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[4.0, 4.0]), 0.0);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_frequency_table_is_sorted_union() {
        let table = frequency_table(&labels(&["b", "a", "b"]), &labels(&["c", "a"]));
        assert_eq!(
            table,
            vec![
                ("a".to_string(), 1.0, 1.0),
                ("b".to_string(), 2.0, 0.0),
                ("c".to_string(), 0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_chi_squared_homogeneity() {
        let same = frequency_table(&labels(&["a", "b", "a", "b"]), &labels(&["a", "b", "a", "b"]));
        let outcome = chi_squared_homogeneity(&same).unwrap();
        assert_eq!(outcome.statistic, 0.0);
        assert_eq!(outcome.degrees_of_freedom, 1.0);
        assert_eq!(outcome.p_value, 1.0);

        let reference = vec!["a".to_string(); 50];
        let current = vec!["b".to_string(); 50];
        let disjoint = frequency_table(&reference, &current);
        let outcome = chi_squared_homogeneity(&disjoint).unwrap();
        assert!((outcome.statistic - 100.0).abs() < TOLERANCE);
        assert!(outcome.p_value < 1e-10);
    }

    #[test]
    fn test_chi_squared_requires_two_categories() {
        let table = frequency_table(&labels(&["a"]), &labels(&["a"]));
        assert!(chi_squared_homogeneity(&table).is_none());
    }

    #[test]
    fn test_jensen_shannon_distance() {
        let same = frequency_table(&labels(&["a", "b"]), &labels(&["b", "a"]));
        assert!(jensen_shannon_distance(&same).abs() < TOLERANCE);

        let disjoint = frequency_table(&labels(&["a"]), &labels(&["b"]));
        let expected = std::f64::consts::LN_2.sqrt();
        assert!((jensen_shannon_distance(&disjoint) - expected).abs() < TOLERANCE);
    }
}

//! Gaussian least-squares fit of a binned distribution.
//!
//! Minimises the Neyman chi-square
//!
//! ```text
//! chi2 = sum_i (y_i - f(x_i))^2 / y_i,   f(x) = A exp(-(x - mu)^2 / (2 sigma^2))
//! ```
//!
//! over non-empty bins with Levenberg–Marquardt. Parameter uncertainties are
//! the square roots of the diagonal of the inverse curvature matrix at the
//! minimum.

use serde::{Deserialize, Serialize};

use crate::constants::{FIT_TOLERANCE, MAX_FIT_ITERATIONS};
use crate::distribution::Histogram;

/// Outcome class of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    Converged,
    NotConverged,
    /// Zero width or too few populated bins: nothing to fit.
    Degenerate,
}

/// Starting point of the minimisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSeed {
    pub amplitude: f64,
    pub mean: f64,
    pub sigma: f64,
}

/// Fitted Gaussian parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussFit {
    pub amplitude: f64,
    pub mean: f64,
    pub mean_error: f64,
    pub sigma: f64,
    pub sigma_error: f64,
    pub chi2: f64,
    pub ndf: usize,
    pub status: FitStatus,
}

impl GaussFit {
    /// Result reported when there is no width to fit.
    #[must_use]
    pub fn degenerate(mean: f64) -> Self {
        Self {
            amplitude: 0.0,
            mean,
            mean_error: 0.0,
            sigma: 0.0,
            sigma_error: 0.0,
            chi2: 0.0,
            ndf: 0,
            status: FitStatus::Degenerate,
        }
    }
}

type Params = [f64; 3];
type Matrix = [[f64; 3]; 3];

/// Fit a Gaussian to the populated bins of `hist`.
#[must_use]
pub fn fit_gaussian(hist: &Histogram, seed: FitSeed) -> GaussFit {
    let points: Vec<(f64, f64)> = (0..hist.bins())
        .filter(|&i| hist.counts[i] > 0.0)
        .map(|i| (hist.bin_center(i), hist.counts[i]))
        .collect();

    if points.len() < 3 || !(seed.sigma > 0.0) || !seed.amplitude.is_finite() {
        return GaussFit::degenerate(seed.mean);
    }

    let mut params: Params = [seed.amplitude, seed.mean, seed.sigma];
    let mut chi2 = chi_square(&points, &params);
    let mut lambda = 1e-3;
    let mut status = FitStatus::NotConverged;

    for _ in 0..MAX_FIT_ITERATIONS {
        let (jtj, grad) = normal_equations(&points, &params);
        let mut damped = jtj;
        for (k, row) in damped.iter_mut().enumerate() {
            row[k] += lambda * jtj[k][k].max(f64::MIN_POSITIVE);
        }
        let Some(inv) = invert(&damped) else {
            lambda *= 10.0;
            if lambda > 1e12 {
                break;
            }
            continue;
        };
        let step = mat_vec(&inv, &grad);
        let candidate = [params[0] + step[0], params[1] + step[1], params[2] + step[2]];
        let candidate_chi2 = chi_square(&points, &candidate);

        if candidate_chi2.is_finite() && candidate_chi2 <= chi2 {
            let improvement = chi2 - candidate_chi2;
            params = candidate;
            chi2 = candidate_chi2;
            lambda = (lambda / 10.0).max(1e-12);
            if improvement <= FIT_TOLERANCE * chi2.max(1.0) {
                status = FitStatus::Converged;
                break;
            }
        } else {
            lambda *= 10.0;
            if lambda > 1e12 {
                // No downhill step left: the current point is a minimum.
                status = FitStatus::Converged;
                break;
            }
        }
    }

    let (jtj, _) = normal_equations(&points, &params);
    let errors = invert(&jtj).map_or([f64::NAN; 3], |cov| {
        [cov[0][0].abs().sqrt(), cov[1][1].abs().sqrt(), cov[2][2].abs().sqrt()]
    });
    if !errors.iter().all(|e| e.is_finite()) {
        status = FitStatus::NotConverged;
    }

    GaussFit {
        amplitude: params[0],
        mean: params[1],
        mean_error: finite_or_zero(errors[1]),
        sigma: params[2].abs(),
        sigma_error: finite_or_zero(errors[2]),
        chi2,
        ndf: points.len().saturating_sub(3),
        status,
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

fn gauss(x: f64, p: &Params) -> f64 {
    let z = (x - p[1]) / p[2];
    p[0] * (-0.5 * z * z).exp()
}

fn chi_square(points: &[(f64, f64)], p: &Params) -> f64 {
    points
        .iter()
        .map(|&(x, y)| (y - gauss(x, p)).powi(2) / y)
        .sum()
}

/// `J^T W J` and `J^T W r` for the current parameters.
fn normal_equations(points: &[(f64, f64)], p: &Params) -> (Matrix, Params) {
    let mut jtj = [[0.0; 3]; 3];
    let mut grad = [0.0; 3];
    let s2 = p[2] * p[2];
    for &(x, y) in points {
        let w = 1.0 / y;
        let e = (-(x - p[1]).powi(2) / (2.0 * s2)).exp();
        let f = p[0] * e;
        let d = x - p[1];
        let jac = [e, f * d / s2, f * d * d / (s2 * p[2])];
        let r = y - f;
        for a in 0..3 {
            grad[a] += w * jac[a] * r;
            for b in 0..3 {
                jtj[a][b] += w * jac[a] * jac[b];
            }
        }
    }
    (jtj, grad)
}

fn invert(m: &Matrix) -> Option<Matrix> {
    let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
    let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
    let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
    if !det.is_finite() || det == 0.0 {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([
        [
            c00 * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            c01 * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            c02 * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ])
}

fn mat_vec(m: &Matrix, v: &Params) -> Params {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exact Gaussian bin contents (evaluated at bin centres).
    fn gaussian_histogram(amplitude: f64, mean: f64, sigma: f64) -> Histogram {
        let mut h = Histogram::empty(mean - 5.0 * sigma, mean + 5.0 * sigma, 100).unwrap();
        for i in 0..h.bins() {
            let x = h.bin_center(i);
            h.counts[i] = gauss(x, &[amplitude, mean, sigma]);
        }
        h
    }

    #[test]
    fn recovers_exact_gaussian() {
        let h = gaussian_histogram(1000.0, 2.0, 0.5);
        let seed = FitSeed {
            amplitude: 700.0,
            mean: 2.2,
            sigma: 0.8,
        };
        let fit = fit_gaussian(&h, seed);
        assert_eq!(fit.status, FitStatus::Converged);
        assert!((fit.sigma - 0.5).abs() < 1e-4, "sigma = {}", fit.sigma);
        assert!((fit.mean - 2.0).abs() < 1e-4, "mean = {}", fit.mean);
        assert!(fit.sigma_error.is_finite());
        assert!(fit.sigma_error > 0.0);
    }

    #[test]
    fn too_few_bins_is_degenerate() {
        let h = Histogram::from_counts(0.0, 3.0, vec![0.0, 5.0, 0.0]).unwrap();
        let seed = FitSeed {
            amplitude: 5.0,
            mean: 1.5,
            sigma: 0.5,
        };
        let fit = fit_gaussian(&h, seed);
        assert_eq!(fit.status, FitStatus::Degenerate);
        assert_eq!(fit.sigma, 0.0);
        assert_eq!(fit.sigma_error, 0.0);
    }

    #[test]
    fn zero_seed_width_is_degenerate() {
        let h = gaussian_histogram(10.0, 0.0, 1.0);
        let seed = FitSeed {
            amplitude: 10.0,
            mean: 0.0,
            sigma: 0.0,
        };
        assert_eq!(fit_gaussian(&h, seed).status, FitStatus::Degenerate);
    }

    #[test]
    fn invert_identity() {
        let id = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert_eq!(invert(&id), Some(id));
        let singular = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]];
        assert!(invert(&singular).is_none());
    }
}

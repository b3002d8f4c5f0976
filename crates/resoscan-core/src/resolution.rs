//! Resolution estimator: reduces one distribution to RMS, quantile, and
//! Gaussian-core widths.
//!
//! Two independent width estimators are reported. The quantile resolution,
//! half the distance between the 16th and 84th percentiles, ignores tails and
//! is what curves are built from. The Gaussian sigma is fitted near the peak
//! and kept as a diagnostic.

use serde::{Deserialize, Serialize};

use crate::distribution::SampledDistribution;
use crate::errors::EstimateError;
use crate::fit::{fit_gaussian, FitSeed, FitStatus, GaussFit};
use crate::options::{EstimatorOptions, FitWindow};

const SQRT_TWO_PI: f64 = 2.506_628_274_631_000_5;

/// Widths extracted from one distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub entries: f64,
    pub mean: f64,
    pub rms: f64,
    pub rms_error: f64,
    /// `0.5 * (q_high - q_low)` over the core quantile pair.
    pub quantile_resolution: f64,
    /// Quantiles at the core pair, `(q_low, q_high)`.
    pub core_quantiles: (f64, f64),
    /// Quantiles at the tail pair, `(q_low, q_high)`.
    pub tail_quantiles: (f64, f64),
    /// Window the Gaussian was fitted over.
    pub fit_range: (f64, f64),
    pub gauss_mean: f64,
    pub gauss_sigma: f64,
    pub gauss_sigma_error: f64,
    pub fit_status: FitStatus,
}

/// Reduce `dist` to a [`ResolutionResult`].
///
/// A zero-width distribution is not an error: the fit window is clamped to
/// `min_fit_half_width` and a degenerate fit (sigma 0, error 0) is reported.
pub fn estimate(
    dist: &SampledDistribution,
    opts: &EstimatorOptions,
) -> Result<ResolutionResult, EstimateError> {
    opts.validate()?;

    let moments = dist.moments()?;
    let q = dist.quantiles(&[
        opts.tail_quantiles.low,
        opts.tail_quantiles.high,
        opts.core_quantiles.low,
        opts.core_quantiles.high,
    ])?;
    let tail = (q[0], q[1]);
    let core = (q[2], q[3]);
    let quantile_resolution = 0.5 * (core.1 - core.0);

    let (lo, hi) = fit_window(opts, moments.mean, moments.rms, tail);
    let fit = match dist.binned_in(lo, hi, opts.fit_bins) {
        Some(hist) if moments.rms > 0.0 => {
            let seed = FitSeed {
                amplitude: moments.entries * hist.bin_width() / (moments.rms * SQRT_TWO_PI),
                mean: moments.mean,
                sigma: moments.rms,
            };
            fit_gaussian(&hist, seed)
        }
        _ => GaussFit::degenerate(moments.mean),
    };

    if fit.status != FitStatus::Converged {
        tracing::debug!(status = ?fit.status, rms = moments.rms, "gaussian fit did not converge");
    }

    Ok(ResolutionResult {
        entries: moments.entries,
        mean: moments.mean,
        rms: moments.rms,
        rms_error: moments.rms_error(),
        quantile_resolution,
        core_quantiles: core,
        tail_quantiles: tail,
        fit_range: (lo, hi),
        gauss_mean: fit.mean,
        gauss_sigma: fit.sigma,
        gauss_sigma_error: fit.sigma_error,
        fit_status: fit.status,
    })
}

fn fit_window(opts: &EstimatorOptions, mean: f64, rms: f64, tail: (f64, f64)) -> (f64, f64) {
    let min_half = opts.min_fit_half_width;
    match opts.fit_window {
        FitWindow::Rms { n_rms } => {
            let half = (n_rms * rms).max(min_half);
            (mean - half, mean + half)
        }
        FitWindow::TailQuantiles => {
            if tail.1 - tail.0 >= 2.0 * min_half {
                tail
            } else {
                let centre = 0.5 * (tail.0 + tail.1);
                (centre - min_half, centre + min_half)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Histogram;
    use crate::options::QuantilePair;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn gaussian_samples(n: usize, mean: f64, sigma: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(mean, sigma).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn gaussian_sample_widths_agree() {
        let dist = SampledDistribution::Samples(gaussian_samples(50_000, 1.0, 2.0, 7));
        let r = estimate(&dist, &EstimatorOptions::default()).unwrap();
        assert!((r.quantile_resolution - 2.0).abs() < 0.1, "q = {}", r.quantile_resolution);
        assert!((r.rms - 2.0).abs() < 0.1, "rms = {}", r.rms);
        assert!((r.gauss_sigma - 2.0).abs() < 0.1, "sigma = {}", r.gauss_sigma);
        assert_eq!(r.fit_status, FitStatus::Converged);
        assert!(r.gauss_sigma_error > 0.0);
        assert!(r.tail_quantiles.0 < r.core_quantiles.0);
        assert!(r.core_quantiles.1 < r.tail_quantiles.1);
    }

    #[test]
    fn quantile_resolution_definition() {
        let dist = SampledDistribution::Samples((0..=100).map(f64::from).collect());
        let r = estimate(&dist, &EstimatorOptions::default()).unwrap();
        assert!((r.core_quantiles.0 - 16.0).abs() < 1e-9);
        assert!((r.core_quantiles.1 - 84.0).abs() < 1e-9);
        assert!((r.quantile_resolution - 34.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_distribution_does_not_fail() {
        let dist = SampledDistribution::Samples(vec![3.0; 100]);
        let r = estimate(&dist, &EstimatorOptions::default()).unwrap();
        assert_eq!(r.rms, 0.0);
        assert_eq!(r.quantile_resolution, 0.0);
        assert_eq!(r.fit_status, FitStatus::Degenerate);
        assert_eq!(r.gauss_sigma, 0.0);
        assert!(r.gauss_sigma_error.is_finite());
        assert!(r.fit_range.1 > r.fit_range.0);
    }

    #[test]
    fn single_bin_histogram_is_degenerate() {
        let mut counts = vec![0.0; 10];
        counts[7] = 500.0;
        let h = Histogram::from_counts(-5.0, 5.0, counts).unwrap();
        let r = estimate(&SampledDistribution::Histogram(h), &EstimatorOptions::default()).unwrap();
        assert_eq!(r.entries, 500.0);
        assert!((r.mean - 2.5).abs() < 1e-12);
        assert_eq!(r.rms, 0.0);
        assert_eq!(r.fit_status, FitStatus::Degenerate);
        assert!(r.gauss_sigma_error.is_finite());
        // Quantiles interpolate inside the occupied bin.
        assert!(r.quantile_resolution >= 0.0 && r.quantile_resolution <= 0.5);
        assert!(r.fit_range.1 > r.fit_range.0);
    }

    #[test]
    fn empty_distribution_is_an_error() {
        let dist = SampledDistribution::Samples(Vec::new());
        assert_eq!(
            estimate(&dist, &EstimatorOptions::default()),
            Err(EstimateError::Empty)
        );
    }

    #[test]
    fn histogram_input() {
        let samples = gaussian_samples(20_000, 0.0, 0.5, 11);
        let mut h = Histogram::empty(-5.0, 5.0, 200).unwrap();
        for x in samples {
            h.fill(x);
        }
        let r = estimate(&SampledDistribution::Histogram(h), &EstimatorOptions::default()).unwrap();
        assert!((r.quantile_resolution - 0.5).abs() < 0.03);
        assert!((r.gauss_sigma - 0.5).abs() < 0.03);
    }

    #[test]
    fn tail_quantile_window() {
        let dist = SampledDistribution::Samples(gaussian_samples(10_000, 0.0, 1.0, 3));
        let opts = EstimatorOptions {
            fit_window: FitWindow::TailQuantiles,
            ..Default::default()
        };
        let r = estimate(&dist, &opts).unwrap();
        assert_eq!(r.fit_range, r.tail_quantiles);
        assert!((r.gauss_sigma - 1.0).abs() < 0.1);
    }

    #[test]
    fn invalid_options_rejected() {
        let dist = SampledDistribution::Samples(vec![1.0, 2.0]);
        let opts = EstimatorOptions {
            tail_quantiles: QuantilePair::new(0.9, 0.1),
            ..Default::default()
        };
        assert!(matches!(
            estimate(&dist, &opts),
            Err(EstimateError::Options(_))
        ));
    }
}

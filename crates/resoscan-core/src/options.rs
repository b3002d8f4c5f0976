//! Resolution estimator options.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CORE_QUANTILE_HIGH, CORE_QUANTILE_LOW, DEFAULT_FIT_BINS, DEFAULT_FIT_N_RMS, MAX_FIT_BINS,
    MIN_FIT_BINS, MIN_FIT_HALF_WIDTH, TAIL_QUANTILE_HIGH, TAIL_QUANTILE_LOW,
};
use crate::errors::ConfigError;

/// A pair of probabilities `(low, high)` with `0 <= low < high <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantilePair {
    pub low: f64,
    pub high: f64,
}

impl QuantilePair {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn validate(&self, label: &str) -> Result<(), ConfigError> {
        let ok = (0.0..=1.0).contains(&self.low)
            && (0.0..=1.0).contains(&self.high)
            && self.low < self.high;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidEstimator(format!(
                "{label} quantiles ({}, {}) must satisfy 0 <= low < high <= 1",
                self.low, self.high
            )))
        }
    }
}

/// How the Gaussian fit window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FitWindow {
    /// `[mean - n_rms * rms, mean + n_rms * rms]`.
    Rms { n_rms: f64 },
    /// Between the tail quantiles.
    TailQuantiles,
}

/// Options for [`estimate`](crate::resolution::estimate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorOptions {
    /// Pair whose half-difference is the quantile resolution.
    pub core_quantiles: QuantilePair,
    /// Pair reported for tail diagnostics; also drives `FitWindow::TailQuantiles`.
    pub tail_quantiles: QuantilePair,
    pub fit_window: FitWindow,
    /// Bin count used to histogram unbinned samples for the fit.
    pub fit_bins: usize,
    /// Lower bound of the fit half-width.
    pub min_fit_half_width: f64,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            core_quantiles: QuantilePair::new(CORE_QUANTILE_LOW, CORE_QUANTILE_HIGH),
            tail_quantiles: QuantilePair::new(TAIL_QUANTILE_LOW, TAIL_QUANTILE_HIGH),
            fit_window: FitWindow::Rms {
                n_rms: DEFAULT_FIT_N_RMS,
            },
            fit_bins: DEFAULT_FIT_BINS,
            min_fit_half_width: MIN_FIT_HALF_WIDTH,
        }
    }
}

impl EstimatorOptions {
    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.core_quantiles.validate("core")?;
        self.tail_quantiles.validate("tail")?;
        if let FitWindow::Rms { n_rms } = self.fit_window {
            if !(n_rms.is_finite() && n_rms > 0.0) {
                return Err(ConfigError::InvalidEstimator(format!(
                    "fit window n_rms must be positive, got {n_rms}"
                )));
            }
        }
        if !(MIN_FIT_BINS..=MAX_FIT_BINS).contains(&self.fit_bins) {
            return Err(ConfigError::InvalidEstimator(format!(
                "fit_bins must be in {MIN_FIT_BINS}..={MAX_FIT_BINS}, got {}",
                self.fit_bins
            )));
        }
        if !(self.min_fit_half_width.is_finite() && self.min_fit_half_width > 0.0) {
            return Err(ConfigError::InvalidEstimator(
                "min_fit_half_width must be positive".into(),
            ));
        }
        Ok(())
    }
}

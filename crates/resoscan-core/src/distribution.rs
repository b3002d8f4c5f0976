//! Sampled distributions: unbinned observations or fixed-width histograms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::EstimateError;

/// Distributions keyed by column name, as returned by feature extraction.
pub type NamedDistributions = BTreeMap<String, SampledDistribution>;

/// One observable of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampledDistribution {
    /// Raw observations. Non-finite values are ignored.
    Samples(Vec<f64>),
    /// Pre-binned counts.
    Histogram(Histogram),
}

/// Entries, mean, and RMS of a distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub entries: f64,
    pub mean: f64,
    pub rms: f64,
}

impl Moments {
    /// Statistical uncertainty of the RMS, `rms / sqrt(2 N)`.
    #[must_use]
    pub fn rms_error(&self) -> f64 {
        if self.entries > 0.0 {
            self.rms / (2.0 * self.entries).sqrt()
        } else {
            0.0
        }
    }
}

impl SampledDistribution {
    /// Total number (or weight) of entries.
    #[must_use]
    pub fn entries(&self) -> f64 {
        match self {
            Self::Samples(v) => v.iter().filter(|x| x.is_finite()).count() as f64,
            Self::Histogram(h) => h.integral(),
        }
    }

    /// Mean and RMS about the mean.
    pub fn moments(&self) -> Result<Moments, EstimateError> {
        match self {
            Self::Samples(v) => {
                let finite: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
                if finite.is_empty() {
                    return Err(EstimateError::Empty);
                }
                let n = finite.len() as f64;
                let mean = finite.iter().sum::<f64>() / n;
                let var = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                Ok(Moments {
                    entries: n,
                    mean,
                    rms: var.sqrt(),
                })
            }
            Self::Histogram(h) => {
                h.validate()?;
                h.moments()
            }
        }
    }

    /// Quantiles at each probability in `probs`, in the same order.
    pub fn quantiles(&self, probs: &[f64]) -> Result<Vec<f64>, EstimateError> {
        match self {
            Self::Samples(v) => {
                let mut sorted: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
                if sorted.is_empty() {
                    return Err(EstimateError::Empty);
                }
                sorted.sort_by(f64::total_cmp);
                Ok(probs.iter().map(|&p| sorted_quantile(&sorted, p)).collect())
            }
            Self::Histogram(h) => {
                h.validate()?;
                if h.integral() <= 0.0 {
                    return Err(EstimateError::Empty);
                }
                Ok(probs.iter().map(|&p| h.quantile(p)).collect())
            }
        }
    }

    /// Histogram of the entries inside `[lo, hi]`.
    ///
    /// Samples are binned into `bins` equal bins; an existing histogram
    /// keeps its binning and is cut to the bins whose centre is in range.
    #[must_use]
    pub fn binned_in(&self, lo: f64, hi: f64, bins: usize) -> Option<Histogram> {
        match self {
            Self::Samples(v) => {
                let mut h = Histogram::empty(lo, hi, bins).ok()?;
                for &x in v {
                    h.fill(x);
                }
                Some(h)
            }
            Self::Histogram(h) => h.slice(lo, hi),
        }
    }
}

/// Linear interpolation between order statistics, `h = p (n - 1)`.
fn sorted_quantile(sorted: &[f64], p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    let h = p * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    match sorted.get(lo + 1) {
        Some(&next) => sorted[lo] + frac * (next - sorted[lo]),
        None => sorted[lo],
    }
}

/// Fixed-width histogram over `[low, high)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub low: f64,
    pub high: f64,
    pub counts: Vec<f64>,
}

impl Histogram {
    /// A histogram from explicit counts.
    pub fn from_counts(low: f64, high: f64, counts: Vec<f64>) -> Result<Self, EstimateError> {
        let h = Self { low, high, counts };
        h.validate()?;
        Ok(h)
    }

    /// An empty histogram with `bins` equal bins.
    pub fn empty(low: f64, high: f64, bins: usize) -> Result<Self, EstimateError> {
        Self::from_counts(low, high, vec![0.0; bins])
    }

    /// Check edges and counts.
    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.counts.is_empty() {
            return Err(EstimateError::MalformedHistogram("no bins".into()));
        }
        if !(self.low.is_finite() && self.high.is_finite() && self.low < self.high) {
            return Err(EstimateError::MalformedHistogram(format!(
                "bad edges [{}, {})",
                self.low, self.high
            )));
        }
        if self.counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(EstimateError::MalformedHistogram(
                "counts must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.counts.len() as f64
    }

    #[must_use]
    pub fn bin_center(&self, i: usize) -> f64 {
        self.low + (i as f64 + 0.5) * self.bin_width()
    }

    /// Sum of all bin contents.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Add one entry. Values outside the range are dropped.
    pub fn fill(&mut self, x: f64) {
        if !x.is_finite() || x < self.low || x >= self.high {
            return;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bin = ((x - self.low) / self.bin_width()) as usize;
        let last = self.counts.len() - 1;
        self.counts[bin.min(last)] += 1.0;
    }

    fn moments(&self) -> Result<Moments, EstimateError> {
        let total = self.integral();
        if total <= 0.0 {
            return Err(EstimateError::Empty);
        }
        let mean = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, c)| c * self.bin_center(i))
            .sum::<f64>()
            / total;
        let var = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, c)| c * (self.bin_center(i) - mean).powi(2))
            .sum::<f64>()
            / total;
        Ok(Moments {
            entries: total,
            mean,
            rms: var.sqrt(),
        })
    }

    /// Quantile with linear interpolation inside the crossing bin.
    fn quantile(&self, p: f64) -> f64 {
        let target = p.clamp(0.0, 1.0) * self.integral();
        let width = self.bin_width();
        let mut cum = 0.0;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > 0.0 && cum + c >= target {
                let frac = ((target - cum) / c).clamp(0.0, 1.0);
                return self.low + width * (i as f64 + frac);
            }
            cum += c;
        }
        self.high
    }

    /// Bins whose centre lies in `[lo, hi]`, as a new histogram.
    fn slice(&self, lo: f64, hi: f64) -> Option<Self> {
        let selected: Vec<usize> = (0..self.bins())
            .filter(|&i| {
                let c = self.bin_center(i);
                c >= lo && c <= hi
            })
            .collect();
        let (&first, &last) = (selected.first()?, selected.last()?);
        let width = self.bin_width();
        Some(Self {
            low: self.low + first as f64 * width,
            high: self.low + (last + 1) as f64 * width,
            counts: self.counts[first..=last].to_vec(),
        })
    }
}

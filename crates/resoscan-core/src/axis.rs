//! Axis ranges for curve and ratio panels.

use serde::{Deserialize, Serialize};

use crate::constants::{RATIO_PAD_HIGH, RATIO_PAD_LOW};

/// Closed display range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub low: f64,
    pub high: f64,
}

impl AxisRange {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Smallest range covering both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(self.low.min(other.low), self.high.max(other.high))
    }
}

/// `[10^floor(log10 min), 10^ceil(log10 max)]` over the positive finite
/// values. `None` when there are none.
#[must_use]
pub fn log_decade_range(values: impl IntoIterator<Item = f64>) -> Option<AxisRange> {
    let (min, max) = min_max(values.into_iter().filter(|v| v.is_finite() && *v > 0.0))?;
    Some(AxisRange::new(
        10f64.powf(min.log10().floor()),
        10f64.powf(max.log10().ceil()),
    ))
}

/// Observed `[min, max]` padded by 5% on each side.
#[must_use]
pub fn padded_ratio_range(min: f64, max: f64) -> AxisRange {
    AxisRange::new(min * RATIO_PAD_LOW, max * RATIO_PAD_HIGH)
}

pub(crate) fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_decades() {
        let r = log_decade_range([3.0, 42.0, 7.5]).unwrap();
        assert_eq!(r, AxisRange::new(1.0, 100.0));
        let r = log_decade_range([0.02, 0.5]).unwrap();
        assert!((r.low - 0.01).abs() < 1e-15);
        assert_eq!(r.high, 1.0);
    }

    #[test]
    fn exact_powers_stay_put() {
        assert_eq!(log_decade_range([10.0, 100.0]), Some(AxisRange::new(10.0, 100.0)));
    }

    #[test]
    fn non_positive_ignored() {
        assert_eq!(log_decade_range([0.0, -1.0, 5.0]), Some(AxisRange::new(1.0, 10.0)));
        assert_eq!(log_decade_range([0.0, f64::NAN]), None);
        assert_eq!(log_decade_range(Vec::new()), None);
    }

    #[test]
    fn ratio_padding() {
        let r = padded_ratio_range(0.8, 1.2);
        assert!((r.low - 0.76).abs() < 1e-12);
        assert!((r.high - 1.26).abs() < 1e-12);
    }

    #[test]
    fn union_covers_both() {
        let r = AxisRange::new(1.0, 10.0).union(AxisRange::new(0.1, 5.0));
        assert_eq!(r, AxisRange::new(0.1, 10.0));
    }
}

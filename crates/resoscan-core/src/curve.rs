//! Comparison aggregator: resolution curves over cos θ per momentum, and
//! point-wise ratios between two detector configurations.
//!
//! Aggregation is all-or-nothing. A missing record or a structural mismatch
//! between curves is an error; a partial curve is never returned.

use serde::{Deserialize, Serialize};

use crate::axis::{log_decade_range, min_max, padded_ratio_range, AxisRange};
use crate::errors::AggregationError;
use crate::grid::ParameterGrid;
use crate::observable::Observable;
use crate::record::RecordSource;

/// One `(x, y)` point of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Resolution versus cos θ for one configuration, observable, and momentum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationCurve {
    pub config_label: String,
    pub observable: String,
    pub momentum_gev: f64,
    /// Points in grid angle order.
    pub points: Vec<CurvePoint>,
}

/// All curves of one configuration and observable, one per momentum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveArchive {
    pub config_label: String,
    pub observable: String,
    pub axis_title: String,
    pub curves: Vec<ConfigurationCurve>,
    /// Log-decade range over every positive value.
    pub y_range: Option<AxisRange>,
}

impl CurveArchive {
    /// Momenta covered, in curve order.
    #[must_use]
    pub fn momenta(&self) -> Vec<f64> {
        self.curves.iter().map(|c| c.momentum_gev).collect()
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.curves.iter().flat_map(|c| c.points.iter().map(|p| p.y))
    }
}

/// Point-wise ratio `b / a` of two curves at one momentum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioCurve {
    pub momentum_gev: f64,
    pub points: Vec<CurvePoint>,
    /// Smallest ratio over points where both values are non-zero.
    pub min_ratio: Option<f64>,
    /// Largest ratio over points where both values are non-zero.
    pub max_ratio: Option<f64>,
}

/// Cross-configuration comparison of one observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub config_a: String,
    pub config_b: String,
    pub observable: String,
    pub ratios: Vec<RatioCurve>,
    /// Primary panel range covering both configurations.
    pub primary_range: Option<AxisRange>,
    /// Ratio panel range, padded around the observed ratios.
    pub ratio_range: Option<AxisRange>,
}

/// Build one curve per momentum (grid order) from the per-point records.
///
/// The curve value is the quantile resolution of each record.
pub fn build_curves(
    config_label: &str,
    observable: &Observable,
    grid: &ParameterGrid,
    source: &dyn RecordSource,
) -> Result<CurveArchive, AggregationError> {
    let mut curves = Vec::with_capacity(grid.momenta_gev().len());
    for &momentum in grid.momenta_gev() {
        let mut points = Vec::with_capacity(grid.angles_deg().len());
        for &angle in grid.angles_deg() {
            let point = grid.point(angle, momentum);
            let record = source.load(&observable.key, &grid.name(&point))?;
            points.push(CurvePoint {
                x: point.cos_theta(),
                y: record.res_quantile,
            });
        }
        curves.push(ConfigurationCurve {
            config_label: config_label.to_string(),
            observable: observable.key.clone(),
            momentum_gev: momentum,
            points,
        });
    }

    let mut archive = CurveArchive {
        config_label: config_label.to_string(),
        observable: observable.key.clone(),
        axis_title: observable.axis_title.clone(),
        curves,
        y_range: None,
    };
    archive.y_range = log_decade_range(archive.values());
    tracing::debug!(
        config = config_label,
        observable = %observable.key,
        curves = archive.curves.len(),
        "built resolution curves"
    );
    Ok(archive)
}

/// Point-wise `b / a`.
///
/// Both curves must have the same number of points and identical x values
/// at every index. A zero numerator gives a ratio of 0. A zero reference
/// value also gives 0 rather than an infinite ratio; such points are left
/// out of `min_ratio`/`max_ratio`.
pub fn ratio(
    a: &ConfigurationCurve,
    b: &ConfigurationCurve,
) -> Result<RatioCurve, AggregationError> {
    if a.points.len() != b.points.len() {
        return Err(AggregationError::PointCountMismatch {
            left: a.points.len(),
            right: b.points.len(),
        });
    }

    let mut points = Vec::with_capacity(a.points.len());
    let mut defined = Vec::with_capacity(a.points.len());
    for (index, (pa, pb)) in a.points.iter().zip(&b.points).enumerate() {
        if pa.x.to_bits() != pb.x.to_bits() {
            return Err(AggregationError::CoordinateMismatch {
                index,
                left: pa.x,
                right: pb.x,
            });
        }
        let y = if pa.y == 0.0 || pb.y == 0.0 {
            0.0
        } else {
            let r = pb.y / pa.y;
            defined.push(r);
            r
        };
        points.push(CurvePoint { x: pa.x, y });
    }

    let (min_ratio, max_ratio) = match min_max(defined.into_iter()) {
        Some((lo, hi)) => (Some(lo), Some(hi)),
        None => (None, None),
    };
    Ok(RatioCurve {
        momentum_gev: a.momentum_gev,
        points,
        min_ratio,
        max_ratio,
    })
}

/// Compare two archives of the same observable, pairing curves by momentum.
pub fn compare(a: &CurveArchive, b: &CurveArchive) -> Result<ComparisonReport, AggregationError> {
    if a.observable != b.observable {
        return Err(AggregationError::ObservableMismatch {
            left: a.observable.clone(),
            right: b.observable.clone(),
        });
    }
    let (ma, mb) = (a.momenta(), b.momenta());
    let same = ma.len() == mb.len() && ma.iter().zip(&mb).all(|(x, y)| x.to_bits() == y.to_bits());
    if !same {
        return Err(AggregationError::MomentumMismatch {
            left: ma,
            right: mb,
        });
    }

    let ratios = a
        .curves
        .iter()
        .zip(&b.curves)
        .map(|(ca, cb)| ratio(ca, cb))
        .collect::<Result<Vec<_>, _>>()?;

    let ratio_range = min_max(
        ratios
            .iter()
            .filter_map(|r| r.min_ratio)
            .chain(ratios.iter().filter_map(|r| r.max_ratio)),
    )
    .map(|(lo, hi)| padded_ratio_range(lo, hi));

    Ok(ComparisonReport {
        config_a: a.config_label.clone(),
        config_b: b.config_label.clone(),
        observable: a.observable.clone(),
        primary_range: log_decade_range(a.values().chain(b.values())),
        ratio_range,
        ratios,
    })
}

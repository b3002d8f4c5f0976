//! # resoscan-core
//!
//! Core library of the resoscan parameter-scan pipeline: the parameter grid
//! and its artifact naming, the resolution estimator with its Gaussian core
//! fit, and the curve aggregator that compares detector configurations.

pub mod axis;
pub mod constants;
pub mod curve;
pub mod descriptor;
pub mod distribution;
pub mod errors;
pub mod fit;
pub mod grid;
pub mod observable;
pub mod options;
pub mod particle;
pub mod record;
pub mod resolution;

// Re-exports
pub use axis::AxisRange;
pub use constants::exit_codes;
pub use curve::{
    build_curves, compare, ratio, ComparisonReport, ConfigurationCurve, CurveArchive, CurvePoint,
    RatioCurve,
};
pub use descriptor::GenerationDescriptor;
pub use distribution::{Histogram, NamedDistributions, SampledDistribution};
pub use errors::{AggregationError, ConfigError, EstimateError};
pub use grid::{ParameterGrid, ParameterPoint};
pub use observable::{default_observables, ColumnExpr, Observable};
pub use options::{EstimatorOptions, FitWindow, QuantilePair};
pub use particle::Particle;
pub use record::{RecordDir, RecordSource, ResolutionRecord};
pub use resolution::{estimate, ResolutionResult};

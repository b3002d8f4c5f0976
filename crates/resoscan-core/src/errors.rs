//! Error taxonomy shared by every stage of a scan.

use std::path::PathBuf;

/// Invalid configuration, detected before any stage runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// PDG id missing from the particle table.
    #[error("unknown particle id {0}")]
    UnknownParticle(i32),

    /// Grid axis is empty, out of range, or contains duplicates.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Detector configuration card not found.
    #[error("configuration card not found: {}", .0.display())]
    MissingCard(PathBuf),

    /// Requested stages cannot run together as given.
    #[error("invalid stage selection: {0}")]
    InvalidStages(String),

    /// Command template references an unknown placeholder or is empty.
    #[error("invalid command template: {0}")]
    InvalidTemplate(String),

    /// Estimator options are out of range.
    #[error("invalid estimator options: {0}")]
    InvalidEstimator(String),

    /// Scan configuration file could not be read or parsed.
    #[error("invalid scan configuration: {0}")]
    InvalidScanConfig(String),
}

/// Failure to reduce a distribution to a resolution result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    /// The distribution has no entries.
    #[error("distribution has no entries")]
    Empty,

    /// Histogram description is unusable.
    #[error("malformed histogram: {0}")]
    MalformedHistogram(String),

    /// Options rejected by the estimator.
    #[error(transparent)]
    Options(#[from] ConfigError),
}

/// Failure while assembling or comparing curves. Never yields a partial curve.
#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    /// A per-point numeric record is missing.
    #[error("missing resolution record {}", .0.display())]
    MissingRecord(PathBuf),

    /// A curve archive is missing.
    #[error("missing curve archive {}", .0.display())]
    MissingArchive(PathBuf),

    /// A record or archive exists but cannot be decoded.
    #[error("malformed artifact {}: {reason}", .path.display())]
    Malformed {
        /// Offending file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The two curves have different point counts.
    #[error("point count mismatch: {left} vs {right}")]
    PointCountMismatch {
        /// Points in the reference curve.
        left: usize,
        /// Points in the compared curve.
        right: usize,
    },

    /// The two curves disagree on an x coordinate.
    #[error("x values differ at index {index}: {left} vs {right}")]
    CoordinateMismatch {
        /// Point index.
        index: usize,
        /// x in the reference curve.
        left: f64,
        /// x in the compared curve.
        right: f64,
    },

    /// The two archives hold different observables.
    #[error("observable mismatch: {left} vs {right}")]
    ObservableMismatch {
        /// Observable of the reference archive.
        left: String,
        /// Observable of the compared archive.
        right: String,
    },

    /// The two archives do not cover the same momenta.
    #[error("momentum mismatch: {left:?} vs {right:?}")]
    MomentumMismatch {
        /// Momenta of the reference archive.
        left: Vec<f64>,
        /// Momenta of the compared archive.
        right: Vec<f64>,
    },

    /// Underlying I/O failure other than a missing file.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

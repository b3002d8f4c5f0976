//! Persisted numeric records: the contract between the estimator and the
//! curve aggregator.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::AggregationError;
use crate::fit::FitStatus;
use crate::resolution::ResolutionResult;

/// JSON form of a [`ResolutionResult`], one file per observable and point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub rms: f64,
    pub rms_err: f64,
    pub sigma: f64,
    pub sigma_err: f64,
    pub res_quantile: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub entries: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_status: Option<FitStatus>,
}

impl From<&ResolutionResult> for ResolutionRecord {
    fn from(r: &ResolutionResult) -> Self {
        Self {
            rms: r.rms,
            rms_err: r.rms_error,
            sigma: r.gauss_sigma,
            sigma_err: r.gauss_sigma_error,
            res_quantile: r.quantile_resolution,
            mean: r.mean,
            entries: r.entries,
            fit_status: Some(r.fit_status),
        }
    }
}

/// File name of the record for `observable` at the point named `point_name`.
#[must_use]
pub fn record_file_name(observable: &str, point_name: &str) -> String {
    format!("{observable}_{point_name}.json")
}

/// Where the aggregator reads per-point records from.
pub trait RecordSource: Send + Sync {
    /// Load the record of `observable` at `point_name`.
    ///
    /// A missing record is [`AggregationError::MissingRecord`].
    fn load(&self, observable: &str, point_name: &str)
        -> Result<ResolutionRecord, AggregationError>;
}

/// Records stored as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct RecordDir {
    root: PathBuf,
}

impl RecordDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, observable: &str, point_name: &str) -> PathBuf {
        self.root.join(record_file_name(observable, point_name))
    }

    /// Write `record`, overwriting any previous one.
    pub fn store(
        &self,
        observable: &str,
        point_name: &str,
        record: &ResolutionRecord,
    ) -> Result<PathBuf, AggregationError> {
        let path = self.path_for(observable, point_name);
        write_json(&path, record)?;
        Ok(path)
    }
}

impl RecordSource for RecordDir {
    fn load(
        &self,
        observable: &str,
        point_name: &str,
    ) -> Result<ResolutionRecord, AggregationError> {
        read_json(
            &self.path_for(observable, point_name),
            AggregationError::MissingRecord,
        )
    }
}

/// Serialize `value` as pretty JSON to `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AggregationError> {
    let content = serde_json::to_string_pretty(value).map_err(|e| AggregationError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(|source| AggregationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read JSON from `path`; a missing file becomes `missing(path)`.
pub fn read_json<T: DeserializeOwned>(
    path: &Path,
    missing: fn(PathBuf) -> AggregationError,
) -> Result<T, AggregationError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(missing(path.to_path_buf())),
        Err(source) => {
            return Err(AggregationError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|e| AggregationError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

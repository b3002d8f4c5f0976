//! On-disk layout of a scan. Every artifact path is derived from the output
//! root, a configuration label, and a point name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use resoscan_core::record::{record_file_name, RecordDir};

pub const DESCRIPTOR_EXT: &str = "input";
pub const EVENTS_EXT: &str = "hepmc";
pub const RESPONSE_EXT: &str = "root";
pub const DISTRIBUTIONS_SUFFIX: &str = ".distributions.json";

/// Paths under one output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn cards_dir(&self) -> PathBuf {
        self.root.join("cards")
    }

    #[must_use]
    pub fn generated_dir(&self) -> PathBuf {
        self.root.join("generated")
    }

    #[must_use]
    pub fn response_dir(&self, config: &str) -> PathBuf {
        self.root.join(format!("response_{config}"))
    }

    #[must_use]
    pub fn extracted_dir(&self, config: &str) -> PathBuf {
        self.root.join(format!("extracted_{config}"))
    }

    #[must_use]
    pub fn plots_dir(&self, config: &str) -> PathBuf {
        self.root.join(format!("plots_{config}"))
    }

    #[must_use]
    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.cards_dir().join(format!("{name}.{DESCRIPTOR_EXT}"))
    }

    #[must_use]
    pub fn events_path(&self, name: &str) -> PathBuf {
        self.generated_dir().join(format!("{name}.{EVENTS_EXT}"))
    }

    #[must_use]
    pub fn response_path(&self, config: &str, name: &str) -> PathBuf {
        self.response_dir(config).join(format!("{name}.{RESPONSE_EXT}"))
    }

    #[must_use]
    pub fn distributions_path(&self, config: &str, name: &str) -> PathBuf {
        self.extracted_dir(config)
            .join(format!("{name}{DISTRIBUTIONS_SUFFIX}"))
    }

    #[must_use]
    pub fn record_path(&self, config: &str, observable: &str, name: &str) -> PathBuf {
        self.extracted_dir(config)
            .join(record_file_name(observable, name))
    }

    /// Record store of one configuration.
    #[must_use]
    pub fn records(&self, config: &str) -> RecordDir {
        RecordDir::new(self.extracted_dir(config))
    }

    #[must_use]
    pub fn archive_path(&self, config: &str, observable: &str) -> PathBuf {
        self.plots_dir(config)
            .join(format!("{observable}_vs_theta.json"))
    }

    #[must_use]
    pub fn comparison_path(&self, config_a: &str, config_b: &str, observable: &str) -> PathBuf {
        self.root
            .join(format!("{config_a}_{config_b}_{observable}_vs_theta.json"))
    }
}

/// Files in `dir` with extension `ext`, as `(stem, path)` sorted by file name.
///
/// A missing directory has no inputs.
pub fn discover(dir: &Path, ext: &str) -> std::io::Result<Vec<(String, PathBuf)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut found = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            found.push((stem.to_string(), path.clone()));
        }
    }
    found.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn artifact_paths() {
        let l = RunLayout::new("out");
        let name = "mu_minus_theta_30_p_10";
        assert_eq!(l.descriptor_path(name), Path::new("out/cards/mu_minus_theta_30_p_10.input"));
        assert_eq!(l.events_path(name), Path::new("out/generated/mu_minus_theta_30_p_10.hepmc"));
        assert_eq!(
            l.response_path("IDEA", name),
            Path::new("out/response_IDEA/mu_minus_theta_30_p_10.root")
        );
        assert_eq!(
            l.distributions_path("IDEA", name),
            Path::new("out/extracted_IDEA/mu_minus_theta_30_p_10.distributions.json")
        );
        assert_eq!(
            l.record_path("IDEA", "d0", name),
            Path::new("out/extracted_IDEA/d0_mu_minus_theta_30_p_10.json")
        );
        assert_eq!(l.archive_path("IDEA", "k"), Path::new("out/plots_IDEA/k_vs_theta.json"));
        assert_eq!(
            l.comparison_path("A", "B", "p"),
            Path::new("out/A_B_p_vs_theta.json")
        );
    }

    #[test]
    fn discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(discover(&dir.path().join("nope"), "root").unwrap().is_empty());
    }

    #[test]
    fn discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for f in ["b.root", "a.root", "c.txt", "a.root.bak"] {
            std::fs::write(dir.path().join(f), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.root")).unwrap();
        let found = discover(dir.path(), "root").unwrap();
        let stems: Vec<&str> = found.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(stems, ["a", "b"]);
    }
}

//! Scan configuration: built once at start-up and passed by reference.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use resoscan_core::constants::{
    DEFAULT_ANGLES_DEG, DEFAULT_EVENTS, DEFAULT_MOMENTA_GEV, DEFAULT_PARTICLES_PER_EVENT,
    DEFAULT_PARTICLE_ID, DEFAULT_WORKERS,
};
use resoscan_core::errors::ConfigError;
use resoscan_core::grid::ParameterGrid;
use resoscan_core::observable::{default_observables, Observable};
use resoscan_core::options::EstimatorOptions;

use crate::operation::CommandTemplate;

pub const DEFAULT_GENERATOR: &str = "gunHEPMC3 {input} {output}";
pub const DEFAULT_SIMULATOR: &str = "DelphesHepMC_EDM4HEP {card} delphes_output.tcl {output} {input}";
pub const DEFAULT_EXTRACTOR: &str = "resoscan-extract {input} {output}";
pub const DEFAULT_CARD: &str = "IDEA_baseline";
pub const DEFAULT_CARD_DIR: &str = "delphes_cards";
pub const DEFAULT_OUTPUT: &str = "output";
pub const CARD_EXT: &str = "tcl";

/// Command templates of the external tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub generator: CommandTemplate,
    pub simulator: CommandTemplate,
    pub extractor: CommandTemplate,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            generator: CommandTemplate::builtin(DEFAULT_GENERATOR),
            simulator: CommandTemplate::builtin(DEFAULT_SIMULATOR),
            extractor: CommandTemplate::builtin(DEFAULT_EXTRACTOR),
        }
    }
}

/// What to scan and how to reduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub particle_id: i32,
    pub angles_deg: Vec<f64>,
    pub momenta_gev: Vec<f64>,
    pub events: u64,
    pub particles_per_event: u32,
    pub tools: ToolConfig,
    pub observables: Vec<Observable>,
    pub estimator: EstimatorOptions,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            particle_id: DEFAULT_PARTICLE_ID,
            angles_deg: DEFAULT_ANGLES_DEG.to_vec(),
            momenta_gev: DEFAULT_MOMENTA_GEV.to_vec(),
            events: DEFAULT_EVENTS,
            particles_per_event: DEFAULT_PARTICLES_PER_EVENT,
            tools: ToolConfig::default(),
            observables: default_observables(),
            estimator: EstimatorOptions::default(),
        }
    }
}

impl ScanConfig {
    /// Parse a JSON scan configuration; omitted fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::InvalidScanConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON scan configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidScanConfig(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// The validated grid.
    pub fn grid(&self) -> Result<ParameterGrid, ConfigError> {
        ParameterGrid::new(
            self.particle_id,
            self.angles_deg.iter().copied(),
            self.momenta_gev.iter().copied(),
            self.events,
            self.particles_per_event,
        )
    }

    /// Check the grid, observables, tool templates, and estimator options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid()?;
        self.estimator.validate()?;

        if self.observables.is_empty() {
            return Err(ConfigError::InvalidScanConfig("no observables".into()));
        }
        let mut keys = HashSet::new();
        for obs in &self.observables {
            let safe = !obs.key.is_empty()
                && obs
                    .key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !safe {
                return Err(ConfigError::InvalidScanConfig(format!(
                    "observable key '{}' must be non-empty ASCII alphanumerics",
                    obs.key
                )));
            }
            if !keys.insert(obs.key.as_str()) {
                return Err(ConfigError::InvalidScanConfig(format!(
                    "duplicate observable '{}'",
                    obs.key
                )));
            }
        }

        for (role, template) in [
            ("generator", &self.tools.generator),
            ("extractor", &self.tools.extractor),
        ] {
            if template.uses_card() {
                return Err(ConfigError::InvalidTemplate(format!(
                    "{role} template cannot use {{card}}: {template}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-invocation settings taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub output_root: PathBuf,
    /// Label of the detector configuration under study.
    pub card: String,
    pub card_dir: PathBuf,
    /// Second configuration for the compare stage.
    pub compare_with: Option<String>,
    pub workers: usize,
    pub dry_run: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT),
            card: DEFAULT_CARD.to_string(),
            card_dir: PathBuf::from(DEFAULT_CARD_DIR),
            compare_with: None,
            workers: DEFAULT_WORKERS,
            dry_run: false,
        }
    }
}

impl RunSettings {
    /// `<card_dir>/<card>.tcl`
    #[must_use]
    pub fn card_path(&self) -> PathBuf {
        self.card_dir.join(format!("{}.{CARD_EXT}", self.card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_the_reference_campaign() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        let grid = config.grid().unwrap();
        assert_eq!(grid.len(), 45);
        assert_eq!(grid.particle().name(), "mu_minus");
        assert_eq!(config.observables.len(), 4);
        assert_eq!(config.tools.simulator.to_string(), DEFAULT_SIMULATOR);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ScanConfig::from_json(
            r#"{"angles_deg":[30,60],"momenta_gev":[10,50],"events":500,
                "tools":{"generator":"mygun --in {input} --out {output}"}}"#,
        )
        .unwrap();
        assert_eq!(config.grid().unwrap().len(), 4);
        assert_eq!(config.events, 500);
        assert_eq!(config.particle_id, 13);
        assert_eq!(config.tools.generator.program(), "mygun");
        assert_eq!(config.tools.simulator.to_string(), DEFAULT_SIMULATOR);
    }

    #[test]
    fn invalid_configs_rejected() {
        for bad in [
            r#"{"particle_id": 999}"#,
            r#"{"angles_deg": []}"#,
            r#"{"momenta_gev": [10, 10]}"#,
            r#"{"observables": []}"#,
            r#"{"tools": {"generator": "gun {card}"}}"#,
            r#"{"tools": {"simulator": "sim {nope}"}}"#,
            r#"{"estimator": {"fit_bins": 1}}"#,
            r#"{"estimator": {"fit_bins": 1000000000}}"#,
            r#"{"unknown_field": 1}"#,
            "not json",
        ] {
            assert!(ScanConfig::from_json(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn duplicate_observables_rejected() {
        let mut config = ScanConfig::default();
        config.observables.push(config.observables[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.json");
        std::fs::write(&path, r#"{"particle_id": 211}"#).unwrap();
        let config = ScanConfig::load(&path).unwrap();
        assert_eq!(config.grid().unwrap().particle().name(), "pi_plus");
        assert!(ScanConfig::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn card_path() {
        let settings = RunSettings::default();
        assert_eq!(settings.card_path(), Path::new("delphes_cards/IDEA_baseline.tcl"));
    }
}

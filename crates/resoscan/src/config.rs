//! Application configuration from CLI flags and environment.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::Parser;

use resoscan_core::constants::DEFAULT_WORKERS;
use resoscan_core::errors::ConfigError;
use resoscan_orchestration::config::{
    RunSettings, ScanConfig, DEFAULT_CARD, DEFAULT_CARD_DIR, DEFAULT_OUTPUT,
};
use resoscan_orchestration::stage::Stage;

/// resoscan: detector resolution parameter scans.
///
/// Generates single-particle samples over a grid of polar angles and
/// momenta, runs them through a detector simulation, extracts residual
/// distributions, and summarizes resolution curves per configuration.
#[derive(Parser, Debug)]
#[command(name = "resoscan", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Write generator descriptors and generate events.
    #[arg(long)]
    pub generate: bool,

    /// Run the detector simulation on generated events.
    #[arg(long)]
    pub simulate: bool,

    /// Extract distributions and estimate resolutions.
    #[arg(long)]
    pub extract: bool,

    /// Build resolution curves from the estimates.
    #[arg(long)]
    pub summarize: bool,

    /// Ratio the curves of two configurations.
    #[arg(long)]
    pub compare: bool,

    /// Detector configuration card.
    #[arg(long, value_name = "NAME", env = "RESOSCAN_CARD", default_value = DEFAULT_CARD)]
    pub card: String,

    /// Directory holding `<NAME>.tcl` cards.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CARD_DIR)]
    pub card_dir: PathBuf,

    /// Second configuration for --compare.
    #[arg(long, value_name = "NAME")]
    pub compare_with: Option<String>,

    /// Output root directory.
    #[arg(short, long, value_name = "DIR", env = "RESOSCAN_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Number of concurrent tasks per stage.
    #[arg(
        short = 'j',
        long,
        default_value_t = DEFAULT_WORKERS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub workers: usize,

    /// Print the operations each task would perform, without running them.
    #[arg(long, visible_alias = "display-commands")]
    pub dry_run: bool,

    /// JSON scan configuration (grid, tools, observables, estimator).
    #[arg(long, value_name = "FILE")]
    pub scan_config: Option<PathBuf>,

    /// Debug-level logging and per-task results.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only report failures.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate shell completion.
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Requested stages in pipeline order.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        [
            (self.generate, Stage::Generate),
            (self.simulate, Stage::Simulate),
            (self.extract, Stage::Extract),
            (self.summarize, Stage::Summarize),
            (self.compare, Stage::Compare),
        ]
        .into_iter()
        .filter_map(|(on, stage)| on.then_some(stage))
        .collect()
    }

    #[must_use]
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            output_root: self.output.clone(),
            card: self.card.clone(),
            card_dir: self.card_dir.clone(),
            compare_with: self.compare_with.clone(),
            workers: self.workers,
            dry_run: self.dry_run,
        }
    }

    /// The scan configuration file, or the reference campaign.
    pub fn scan(&self) -> Result<ScanConfig, ConfigError> {
        match &self.scan_config {
            Some(path) => ScanConfig::load(path),
            None => Ok(ScanConfig::default()),
        }
    }
}

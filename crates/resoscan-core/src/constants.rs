//! Defaults for the reference scan campaign and the estimator.

/// Default particle: muon (PDG 13).
pub const DEFAULT_PARTICLE_ID: i32 = 13;

/// Default polar angles in degrees.
pub const DEFAULT_ANGLES_DEG: [f64; 9] = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];

/// Default momenta in GeV.
pub const DEFAULT_MOMENTA_GEV: [f64; 5] = [2.0, 5.0, 10.0, 50.0, 100.0];

/// Default number of generated events per sample.
pub const DEFAULT_EVENTS: u64 = 100_000;

/// Default number of particles per event.
pub const DEFAULT_PARTICLES_PER_EVENT: u32 = 1;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 12;

/// Lower probability of the core quantile pair (one-sigma equivalent).
pub const CORE_QUANTILE_LOW: f64 = 0.16;

/// Upper probability of the core quantile pair (one-sigma equivalent).
pub const CORE_QUANTILE_HIGH: f64 = 0.84;

/// Lower probability of the tail quantile pair.
pub const TAIL_QUANTILE_LOW: f64 = 0.001;

/// Upper probability of the tail quantile pair.
pub const TAIL_QUANTILE_HIGH: f64 = 0.999;

/// Half-width of the Gaussian fit window in units of RMS.
pub const DEFAULT_FIT_N_RMS: f64 = 3.0;

/// Number of bins used when fitting unbinned samples.
pub const DEFAULT_FIT_BINS: usize = 200;

/// Bounds accepted for the fit bin count.
pub const MIN_FIT_BINS: usize = 3;
pub const MAX_FIT_BINS: usize = 100_000;

/// Smallest fit half-width used for degenerate distributions.
pub const MIN_FIT_HALF_WIDTH: f64 = 1e-9;

/// Iteration cap for the Gaussian fit.
pub const MAX_FIT_ITERATIONS: usize = 200;

/// Relative chi-square change below which the fit is converged.
pub const FIT_TOLERANCE: f64 = 1e-9;

/// Padding factor applied below the smallest ratio.
pub const RATIO_PAD_LOW: f64 = 0.95;

/// Padding factor applied above the largest ratio.
pub const RATIO_PAD_HIGH: f64 = 1.05;

/// Process exit codes.
pub mod exit_codes {
    /// All requested stages completed without failed tasks.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// At least one task failed; stages still ran to completion.
    pub const ERROR_PARTIAL: i32 = 2;
    /// Invalid configuration, nothing was run.
    pub const ERROR_CONFIG: i32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_pairs_are_ordered() {
        assert!(TAIL_QUANTILE_LOW < CORE_QUANTILE_LOW);
        assert!(CORE_QUANTILE_LOW < CORE_QUANTILE_HIGH);
        assert!(CORE_QUANTILE_HIGH < TAIL_QUANTILE_HIGH);
    }

    #[test]
    fn default_grid_is_sorted() {
        assert!(DEFAULT_ANGLES_DEG.windows(2).all(|w| w[0] < w[1]));
        assert!(DEFAULT_MOMENTA_GEV.windows(2).all(|w| w[0] < w[1]));
    }
}

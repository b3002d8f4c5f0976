//! Parameter grid: the (particle, angle, momentum) points of a scan and
//! the deterministic names that key every artifact derived from them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::GenerationDescriptor;
use crate::errors::ConfigError;
use crate::particle::Particle;

/// One run condition of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterPoint {
    pub particle: Particle,
    pub angle_deg: f64,
    pub momentum_gev: f64,
}

impl ParameterPoint {
    /// cos(θ) of the polar angle.
    #[must_use]
    pub fn cos_theta(&self) -> f64 {
        self.angle_deg.to_radians().cos()
    }

    /// Artifact key: `<particle>_theta_<angle>_p_<momentum>`.
    ///
    /// Numbers use the shortest representation that round-trips, so two
    /// distinct finite values never share a name.
    #[must_use]
    pub fn name(&self) -> String {
        format!(
            "{}_theta_{}_p_{}",
            self.particle.name(),
            self.angle_deg,
            self.momentum_gev
        )
    }
}

impl fmt::Display for ParameterPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} θ={}° p={} GeV",
            self.particle, self.angle_deg, self.momentum_gev
        )
    }
}

/// A validated grid of run conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    particle: Particle,
    angles_deg: Vec<f64>,
    momenta_gev: Vec<f64>,
    events: u64,
    particles_per_event: u32,
}

impl ParameterGrid {
    /// Build a grid, rejecting unknown particles and unusable axes.
    pub fn new(
        particle_id: i32,
        angles_deg: impl IntoIterator<Item = f64>,
        momenta_gev: impl IntoIterator<Item = f64>,
        events: u64,
        particles_per_event: u32,
    ) -> Result<Self, ConfigError> {
        let particle = Particle::from_pdg(particle_id)?;
        let angles_deg: Vec<f64> = angles_deg.into_iter().collect();
        let momenta_gev: Vec<f64> = momenta_gev.into_iter().collect();

        validate_axis("angle", &angles_deg, |a| a > 0.0 && a <= 180.0)?;
        validate_axis("momentum", &momenta_gev, |p| p > 0.0)?;
        if events == 0 {
            return Err(ConfigError::InvalidGrid("event count must be at least 1".into()));
        }
        if particles_per_event == 0 {
            return Err(ConfigError::InvalidGrid(
                "particles per event must be at least 1".into(),
            ));
        }

        Ok(Self {
            particle,
            angles_deg,
            momenta_gev,
            events,
            particles_per_event,
        })
    }

    #[must_use]
    pub fn particle(&self) -> Particle {
        self.particle
    }

    #[must_use]
    pub fn angles_deg(&self) -> &[f64] {
        &self.angles_deg
    }

    #[must_use]
    pub fn momenta_gev(&self) -> &[f64] {
        &self.momenta_gev
    }

    #[must_use]
    pub fn events(&self) -> u64 {
        self.events
    }

    #[must_use]
    pub fn particles_per_event(&self) -> u32 {
        self.particles_per_event
    }

    /// Number of points in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.angles_deg.len() * self.momenta_gev.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points in angle-major, momentum-minor order.
    ///
    /// Curve building relies on this order. Each call starts a fresh pass.
    #[must_use]
    pub fn enumerate(&self) -> GridIter<'_> {
        GridIter {
            grid: self,
            index: 0,
        }
    }

    /// The point at a given angle and momentum.
    #[must_use]
    pub fn point(&self, angle_deg: f64, momentum_gev: f64) -> ParameterPoint {
        ParameterPoint {
            particle: self.particle,
            angle_deg,
            momentum_gev,
        }
    }

    /// Artifact key of a point. See [`ParameterPoint::name`].
    #[must_use]
    pub fn name(&self, point: &ParameterPoint) -> String {
        point.name()
    }

    /// Generation descriptor for a single point.
    #[must_use]
    pub fn descriptor(&self, point: &ParameterPoint) -> GenerationDescriptor {
        GenerationDescriptor {
            particles_per_event: self.particles_per_event,
            theta_range_deg: (point.angle_deg, point.angle_deg),
            momentum_range_gev: (point.momentum_gev, point.momentum_gev),
            pdg_ids: vec![point.particle.pdg_id()],
            events: self.events,
        }
    }
}

fn validate_axis(
    label: &str,
    values: &[f64],
    in_range: impl Fn(f64) -> bool,
) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::InvalidGrid(format!("no {label} values")));
    }
    let mut seen = HashSet::with_capacity(values.len());
    for &v in values {
        if !v.is_finite() || !in_range(v) {
            return Err(ConfigError::InvalidGrid(format!("{label} {v} out of range")));
        }
        // -0.0 never passes the range checks, so bit patterns identify values.
        if !seen.insert(v.to_bits()) {
            return Err(ConfigError::InvalidGrid(format!("duplicate {label} {v}")));
        }
    }
    Ok(())
}

/// Lazy iterator over a grid.
pub struct GridIter<'a> {
    grid: &'a ParameterGrid,
    index: usize,
}

impl Iterator for GridIter<'_> {
    type Item = ParameterPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.grid.len() {
            return None;
        }
        let n_mom = self.grid.momenta_gev.len();
        let angle = self.grid.angles_deg[self.index / n_mom];
        let momentum = self.grid.momenta_gev[self.index % n_mom];
        self.index += 1;
        Some(self.grid.point(angle, momentum))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridIter<'_> {}

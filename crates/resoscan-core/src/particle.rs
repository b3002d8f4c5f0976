//! PDG particle identifiers and their symbolic names.
//!
//! The table is closed: an id that is not listed is rejected when the grid
//! is built, so a malformed artifact name can never be produced.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ConfigError;

/// Every supported PDG id with the name used in artifact keys.
const PARTICLE_TABLE: &[(i32, &str)] = &[
    // Quarks
    (1, "d"),
    (-1, "d_bar"),
    (2, "u"),
    (-2, "u_bar"),
    (3, "s"),
    (-3, "s_bar"),
    (4, "c"),
    (-4, "c_bar"),
    (5, "b"),
    (-5, "b_bar"),
    (6, "t"),
    (-6, "t_bar"),
    (7, "b_prime"),
    (-7, "b_prime_bar"),
    (8, "t_prime"),
    (-8, "t_prime_bar"),
    // Leptons
    (11, "e_minus"),
    (-11, "e_plus"),
    (12, "nu_e"),
    (-12, "nu_e_bar"),
    (13, "mu_minus"),
    (-13, "mu_plus"),
    (14, "nu_mu"),
    (-14, "nu_mu_bar"),
    (15, "tau_minus"),
    (-15, "tau_plus"),
    (16, "nu_tau"),
    (-16, "nu_tau_bar"),
    (17, "tau_prime_minus"),
    (-17, "tau_prime_plus"),
    (18, "nu_tau_prime"),
    (-18, "nu_tau_prime_bar"),
    // Gauge bosons and hadrons known to the single-particle gun
    (22, "gamma"),
    (111, "pi0"),
    (211, "pi_plus"),
    (-211, "pi_minus"),
    (213, "rho_plus"),
    (-213, "rho_minus"),
    (130, "k_long"),
    (310, "k_short"),
    (2112, "neutron"),
    (2212, "proton"),
    (-2212, "antiproton"),
];

/// A validated PDG particle id. Serialized as the bare id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Particle {
    pdg_id: i32,
    name: &'static str,
}

impl Particle {
    /// Look up a PDG id in the particle table.
    pub fn from_pdg(pdg_id: i32) -> Result<Self, ConfigError> {
        PARTICLE_TABLE
            .iter()
            .find(|(id, _)| *id == pdg_id)
            .map(|&(pdg_id, name)| Self { pdg_id, name })
            .ok_or(ConfigError::UnknownParticle(pdg_id))
    }

    #[must_use]
    pub fn pdg_id(&self) -> i32 {
        self.pdg_id
    }

    /// Symbolic name used in artifact keys.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All ids in the table, in table order.
    pub fn known_ids() -> impl Iterator<Item = i32> {
        PARTICLE_TABLE.iter().map(|(id, _)| *id)
    }
}

impl TryFrom<i32> for Particle {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_pdg(value)
    }
}

impl From<Particle> for i32 {
    fn from(p: Particle) -> Self {
        p.pdg_id
    }
}

impl Serialize for Particle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.pdg_id)
    }
}

impl<'de> Deserialize<'de> for Particle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = i32::deserialize(deserializer)?;
        Self::from_pdg(id).map_err(<D::Error as serde::de::Error>::custom)
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

//! Generation descriptor: the plain key-value input of the event generator.

use std::fmt::Write as _;

use crate::errors::ConfigError;

/// Contents of one generator input file.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationDescriptor {
    pub particles_per_event: u32,
    pub theta_range_deg: (f64, f64),
    pub momentum_range_gev: (f64, f64),
    pub pdg_ids: Vec<i32>,
    pub events: u64,
}

impl GenerationDescriptor {
    /// Render as `key value` lines.
    ///
    /// Ranges are written with an explicit decimal point (`30.0,30.0`).
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let ids: Vec<String> = self.pdg_ids.iter().map(ToString::to_string).collect();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "npart {}", self.particles_per_event);
        let _ = writeln!(
            out,
            "theta_range {:?},{:?}",
            self.theta_range_deg.0, self.theta_range_deg.1
        );
        let _ = writeln!(
            out,
            "mom_range {:?},{:?}",
            self.momentum_range_gev.0, self.momentum_range_gev.1
        );
        let _ = writeln!(out, "pid_list {}", ids.join(","));
        let _ = writeln!(out, "nevents {}", self.events);
        out
    }

    /// Parse the text produced by [`render`](Self::render).
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut npart = None;
        let mut theta = None;
        let mut mom = None;
        let mut pids = None;
        let mut nevents = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (key, value) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| bad(format!("line without value: {line}")))?;
            let value = value.trim();
            match key {
                "npart" => npart = Some(parse_num::<u32>(key, value)?),
                "theta_range" => theta = Some(parse_range(key, value)?),
                "mom_range" => mom = Some(parse_range(key, value)?),
                "pid_list" => {
                    pids = Some(
                        value
                            .split(',')
                            .map(|v| parse_num::<i32>(key, v.trim()))
                            .collect::<Result<Vec<_>, _>>()?,
                    );
                }
                "nevents" => nevents = Some(parse_num::<u64>(key, value)?),
                other => return Err(bad(format!("unknown key {other}"))),
            }
        }

        Ok(Self {
            particles_per_event: npart.ok_or_else(|| bad("missing npart".into()))?,
            theta_range_deg: theta.ok_or_else(|| bad("missing theta_range".into()))?,
            momentum_range_gev: mom.ok_or_else(|| bad("missing mom_range".into()))?,
            pdg_ids: pids.ok_or_else(|| bad("missing pid_list".into()))?,
            events: nevents.ok_or_else(|| bad("missing nevents".into()))?,
        })
    }
}

fn bad(msg: String) -> ConfigError {
    ConfigError::InvalidGrid(format!("generation descriptor: {msg}"))
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| bad(format!("{key}: cannot parse {value:?}")))
}

fn parse_range(key: &str, value: &str) -> Result<(f64, f64), ConfigError> {
    let (lo, hi) = value
        .split_once(',')
        .ok_or_else(|| bad(format!("{key}: expected two comma-separated values")))?;
    Ok((parse_num(key, lo.trim())?, parse_num(key, hi.trim())?))
}

//! Polarization selectors.
//!
//! The propagator is always run for one linear polarization at a time; the
//! unpolarized case only exists at the level of derived quantities, where it is
//! the average of an s and a p run.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, TmmError};


/// Linear polarization of the incident plane wave.
///
/// `S` has its electric field perpendicular to the plane of incidence (TE), `P`
/// has it within the plane of incidence (TM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Polarization {
    #[serde(rename = "s", alias = "S")]
    S,
    #[serde(rename = "p", alias = "P")]
    P,
}

impl Polarization {
    pub const BOTH: [Polarization; 2] = [Polarization::S, Polarization::P];
}

impl TryFrom<char> for Polarization {
    type Error = TmmError;

    fn try_from(value: char) -> Result<Self> {
        match value {
            's' | 'S' => Ok(Polarization::S),
            'p' | 'P' => Ok(Polarization::P),
            other => Err(TmmError::validation(format!(
                "polarization must be 's' or 'p', got '{other}'"
            ))),
        }
    }
}

impl FromStr for Polarization {
    type Err = TmmError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Polarization::try_from(c),
            _ => Err(TmmError::validation(format!(
                "polarization must be 's' or 'p', got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Polarization::S => write!(f, "s"),
            Polarization::P => write!(f, "p"),
        }
    }
}

/// Polarization state used by the reflectance/absorptance/transmittance summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PolarizationMode {
    Polarized(Polarization),
    Unpolarized,
}

impl FromStr for PolarizationMode {
    type Err = TmmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "u" | "U" => Ok(PolarizationMode::Unpolarized),
            other => other.parse().map(PolarizationMode::Polarized),
        }
    }
}

impl TryFrom<String> for PolarizationMode {
    type Error = TmmError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for PolarizationMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PolarizationMode::Polarized(pol) => write!(f, "{pol}"),
            PolarizationMode::Unpolarized => write!(f, "u"),
        }
    }
}

//! Optical materials and the layer-by-layer description of a stack.
//!
//! A [`Material`] is either a constant complex refractive index or a table of
//! `n` and `k` against vacuum wavelength. An [`OpticStack`] is the user-facing
//! description of a structure (incidence medium, finite layers, substrate); it
//! resolves every material on a wavelength axis to produce a validated
//! [`Stack`] for the propagator.

use ndarray::Array1;
use ndarray_interp::interp1d::{Interp1DBuilder, Linear};
use num_complex::Complex64;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, TmmError};
use crate::grid::LayerGrid;
use crate::stack::Stack;


/// Refractive index model of a homogeneous medium.
///
/// In configuration files a constant index is written `{ n = [re, im] }` and a
/// table as `{ wavelengths = [...], n = [...], k = [...] }`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Material {
    /// Dispersion table; `wavelengths` must be strictly increasing.
    Tabulated {
        wavelengths: Vec<f64>,
        n: Vec<f64>,
        k: Vec<f64>,
    },
    Constant {
        n: Complex64,
    },
}

impl Material {
    /// Complex refractive index `n + ik` at one vacuum wavelength.
    pub fn index_at(&self, wavelength: f64) -> Result<Complex64> {
        let indices = self.indices_at(&[wavelength])?;
        indices
            .first()
            .copied()
            .ok_or_else(|| TmmError::validation("no refractive index was resolved"))
    }

    /// Complex refractive index at each of `wavelengths`.
    ///
    /// **Context**: Measured dispersion data rarely lands on the wavelengths of a
    /// simulation, so tabulated materials must be resampled.
    ///
    /// **How it Works**: Builds one linear interpolator each for `n` and `k` and
    /// evaluates them on the requested axis. Wavelengths outside the table are
    /// clamped to its nearest end and reported with a warning.
    pub fn indices_at(&self, wavelengths: &[f64]) -> Result<Vec<Complex64>> {
        match self {
            Material::Constant { n } => Ok(vec![*n; wavelengths.len()]),
            Material::Tabulated {
                wavelengths: table,
                n,
                k,
            } => {
                if table.is_empty() || table.len() != n.len() || table.len() != k.len() {
                    return Err(TmmError::validation(format!(
                        "material table needs equally long, non-empty columns, got {} wavelengths, {} n and {} k values",
                        table.len(),
                        n.len(),
                        k.len()
                    )));
                }
                if table.windows(2).any(|pair| !(pair[0] < pair[1])) {
                    return Err(TmmError::validation(
                        "material table wavelengths must be strictly increasing",
                    ));
                }
                if table.len() == 1 {
                    return Ok(vec![Complex64::new(n[0], k[0]); wavelengths.len()]);
                }

                let (lo, hi) = (table[0], table[table.len() - 1]);
                let axis: Vec<f64> = wavelengths
                    .iter()
                    .map(|&lam| {
                        if lam < lo || lam > hi {
                            warn!("wavelength {lam} is outside the material table [{lo}, {hi}], clamping");
                        }
                        lam.clamp(lo, hi)
                    })
                    .collect();

                let re = interpolate(table, n, &axis)?;
                let im = interpolate(table, k, &axis)?;
                Ok(re
                    .into_iter()
                    .zip(im)
                    .map(|(re, im)| Complex64::new(re, im))
                    .collect())
            }
        }
    }
}

fn interpolate(x: &[f64], y: &[f64], at: &[f64]) -> Result<Vec<f64>> {
    let interp = Interp1DBuilder::new(Array1::from(y.to_vec()))
        .x(Array1::from(x.to_vec()))
        .strategy(Linear::new())
        .build()
        .map_err(|err| TmmError::validation(format!("invalid material table: {err}")))?;
    at.iter()
        .map(|&x| {
            interp
                .interp_scalar(x)
                .map_err(|err| TmmError::validation(format!("material interpolation failed: {err}")))
        })
        .collect()
}

/// One finite film of the stack.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Layer {
    pub material: Material,
    pub thickness: f64,
}

/// A structure described by its materials rather than by resolved indices.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OpticStack {
    pub incidence: Material,
    #[serde(default)]
    pub layers: Vec<Layer>,
    pub substrate: Material,
}

impl OpticStack {
    /// Resolves every material on `wavelengths` and builds the validated stack,
    /// with semi-infinite incidence and substrate media.
    pub fn to_stack(&self, wavelengths: &[f64]) -> Result<Stack> {
        let mut rows = Vec::with_capacity(self.layers.len() + 2);
        let mut d = Vec::with_capacity(self.layers.len() + 2);

        rows.push(self.incidence.indices_at(wavelengths)?);
        d.push(f64::INFINITY);
        for layer in &self.layers {
            rows.push(layer.material.indices_at(wavelengths)?);
            d.push(layer.thickness);
        }
        rows.push(self.substrate.indices_at(wavelengths)?);
        d.push(f64::INFINITY);

        Stack::new(LayerGrid::from_layers(rows)?, d, wavelengths.to_vec())
    }
}

//! Validated description of a planar multilayer stack.
//!
//! A [`Stack`] is an ordered list of at least two layers. The first and last
//! layers are the semi-infinite incidence and exit media; every layer carries a
//! complex refractive index per wavelength and a real thickness. Construction
//! checks the geometry once, so downstream computations can assume it holds.

use ndarray::Array1;
use num_complex::Complex64;

use crate::error::{Result, TmmError};
use crate::grid::LayerGrid;


#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    n: LayerGrid<Complex64>,
    d: Vec<f64>,
    wavelengths: Array1<f64>,
}

impl Stack {
    /// Creates a stack from a (layer, wavelength) grid of refractive indices,
    /// per-layer thicknesses and the vacuum wavelengths.
    ///
    /// Fails with [`TmmError::Validation`] if the stack has fewer than two layers,
    /// if the index grid and thickness list disagree in length, if the boundary
    /// thicknesses are not infinite, if an interior thickness is negative or not
    /// finite, or if a wavelength is not a positive finite number.
    pub fn new(n: LayerGrid<Complex64>, d: Vec<f64>, wavelengths: Vec<f64>) -> Result<Self> {
        let num_layers = n.num_layers();
        if num_layers != d.len() {
            return Err(TmmError::validation(format!(
                "index list has {num_layers} layers but thickness list has {}",
                d.len()
            )));
        }
        if num_layers < 2 {
            return Err(TmmError::validation(
                "a stack needs at least an incidence and an exit medium",
            ));
        }
        if !d[0].is_infinite() || !d[num_layers - 1].is_infinite() {
            return Err(TmmError::validation(
                "thickness list must start and end with infinity",
            ));
        }
        if let Some((i, di)) = d[1..num_layers - 1]
            .iter()
            .enumerate()
            .find(|(_, di)| !di.is_finite() || **di < 0.0)
        {
            return Err(TmmError::validation(format!(
                "layer {} has invalid thickness {di}",
                i + 1
            )));
        }
        if wavelengths.is_empty() {
            return Err(TmmError::validation("at least one wavelength is required"));
        }
        if n.num_wavelengths() != wavelengths.len() {
            return Err(TmmError::validation(format!(
                "index grid has {} wavelength columns but {} wavelengths were given",
                n.num_wavelengths(),
                wavelengths.len()
            )));
        }
        if let Some(lam) = wavelengths.iter().find(|lam| !(lam.is_finite() && **lam > 0.0)) {
            return Err(TmmError::validation(format!(
                "wavelengths must be positive, got {lam}"
            )));
        }
        Ok(Self {
            n,
            d,
            wavelengths: Array1::from(wavelengths),
        })
    }

    /// Creates a stack whose refractive indices do not vary with wavelength.
    pub fn uniform(n: &[Complex64], d: Vec<f64>, wavelengths: Vec<f64>) -> Result<Self> {
        let grid = LayerGrid::broadcast(n, wavelengths.len());
        Self::new(grid, d, wavelengths)
    }

    /// The same stack illuminated from the other side.
    pub fn reversed(&self) -> Self {
        Self {
            n: self.n.reversed_layers(),
            d: self.d.iter().rev().copied().collect(),
            wavelengths: self.wavelengths.clone(),
        }
    }

    pub fn n(&self) -> &LayerGrid<Complex64> {
        &self.n
    }

    pub fn thicknesses(&self) -> &[f64] {
        &self.d
    }

    pub fn wavelengths(&self) -> &Array1<f64> {
        &self.wavelengths
    }

    pub fn num_layers(&self) -> usize {
        self.d.len()
    }

    pub fn num_wavelengths(&self) -> usize {
        self.wavelengths.len()
    }
}

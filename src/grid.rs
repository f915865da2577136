//! Two-dimensional (layer, wavelength) storage.
//!
//! Every per-layer quantity in a stack computation may vary with wavelength, so
//! it is stored as a dense grid whose rows are layers and whose columns are
//! wavelengths. Per-layer scalars are broadcast across the wavelength axis once,
//! at construction, instead of being replicated by hand with a stride.
//!
//! The grid provides:
//! - Construction from per-layer rows, per-wavelength columns, or broadcast scalars
//! - Bounds-checked element, row and column access
//! - Layer-order reversal for reversed illumination

use std::ops::Index;

use ndarray::{s, Array2, ArrayView1};

use crate::error::{Result, TmmError};


/// Dense grid indexed by `(layer, wavelength)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGrid<T> {
    data: Array2<T>,
}

impl<T: Clone> LayerGrid<T> {
    /// Builds a grid from one row per layer. All rows must have the same length.
    pub fn from_layers(rows: Vec<Vec<T>>) -> Result<Self> {
        let num_layers = rows.len();
        let num_wavelengths = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != num_wavelengths)
        {
            return Err(TmmError::validation(format!(
                "layer {i} has {} wavelength entries, expected {num_wavelengths}",
                row.len()
            )));
        }
        let flat: Vec<T> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((num_layers, num_wavelengths), flat)
            .map_err(|e| TmmError::validation(e.to_string()))?;
        Ok(Self { data })
    }

    /// Builds a grid from one column per wavelength. All columns must have the
    /// same length.
    pub fn from_columns(columns: Vec<Vec<T>>) -> Result<Self> {
        let num_wavelengths = columns.len();
        let num_layers = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|col| col.len() != num_layers) {
            return Err(TmmError::validation(
                "wavelength columns have differing numbers of layers",
            ));
        }
        let data = Array2::from_shape_fn((num_layers, num_wavelengths), |(l, w)| {
            columns[w][l].clone()
        });
        Ok(Self { data })
    }

    /// Replicates one value per layer across `num_wavelengths` columns.
    pub fn broadcast(per_layer: &[T], num_wavelengths: usize) -> Self {
        let data = Array2::from_shape_fn((per_layer.len(), num_wavelengths), |(l, _)| {
            per_layer[l].clone()
        });
        Self { data }
    }

    /// Same grid with the layer order reversed.
    pub fn reversed_layers(&self) -> Self {
        Self {
            data: self.data.slice(s![..;-1, ..]).to_owned(),
        }
    }
}

impl<T> LayerGrid<T> {
    pub fn num_layers(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_wavelengths(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, layer: usize, wavelength: usize) -> Option<&T> {
        self.data.get((layer, wavelength))
    }

    /// All wavelength entries of one layer.
    pub fn layer(&self, layer: usize) -> Option<ArrayView1<'_, T>> {
        (layer < self.num_layers()).then(|| self.data.row(layer))
    }

    /// All layer entries at one wavelength.
    pub fn column(&self, wavelength: usize) -> Option<ArrayView1<'_, T>> {
        (wavelength < self.num_wavelengths()).then(|| self.data.column(wavelength))
    }

    pub fn as_array(&self) -> &Array2<T> {
        &self.data
    }
}

impl<T> From<Array2<T>> for LayerGrid<T> {
    fn from(data: Array2<T>) -> Self {
        Self { data }
    }
}

impl<T> Index<(usize, usize)> for LayerGrid<T> {
    type Output = T;

    fn index(&self, (layer, wavelength): (usize, usize)) -> &T {
        &self.data[[layer, wavelength]]
    }
}

//! Position-resolved fields, Poynting flux and absorption.
//!
//! Given a [`StackResult`], this module evaluates the plane-wave fields at any
//! depth inside the stack and derives the normal component of the Poynting
//! vector and the local absorbed power density from them. It also maps global
//! depth coordinates onto `(layer, depth within layer)` pairs.
//!
//! The position resolver provides:
//! - [`position_resolved`]: flux, absorption density and field components at a
//!   point inside one layer
//! - [`find_in_structure`] and [`find_in_structure_inf`]: global depth to layer
//!   lookup
//! - [`layer_starts`]: depth at which each layer begins
//! - [`absorp_in_each_layer`]: fraction of incident power absorbed per layer
//!
//! All powers are normalized to the incident power. Depths are measured from
//! the front face of the layer, in the same length unit as the wavelengths.

use ndarray::Array1;
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Result, TmmError};
use crate::grid::LayerGrid;
use crate::polarization::Polarization;
use crate::result::StackResult;


/// Local optical quantities at one depth, one entry per wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFields {
    /// Normal component of the Poynting vector, relative to the incident power.
    pub poyn: Array1<f64>,
    /// Absorbed power per unit depth, relative to the incident power.
    pub absor: Array1<f64>,
    /// Field component along the stack plane, within the plane of incidence.
    pub ex: Array1<Complex64>,
    /// Field component perpendicular to the plane of incidence.
    pub ey: Array1<Complex64>,
    /// Field component along the stack normal.
    pub ez: Array1<Complex64>,
}

/// A global depth expressed as a layer index and a depth within that layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPosition {
    pub layer: usize,
    pub distance: f64,
}

/// Evaluates fields, Poynting flux and absorption density at `distance` into
/// `layer`.
///
/// **Context**: The overall `R` and `T` say nothing about where inside the stack
/// light is absorbed. Local absorption profiles are needed, for instance, to
/// estimate carrier generation in a solar-cell absorber.
///
/// **How it Works**: Propagates the layer's forward and backward amplitudes to
/// the requested depth with `e^{±i·kz·z}` and evaluates the polarization-specific
/// flux and absorption expressions. For p-polarization the absorption density
/// combines two differently conjugated squared magnitudes, so it is not the
/// mirror image of the s expression.
///
/// In layer 0 the incident and reflected waves have amplitudes `1` and `r`, and
/// `distance` must be zero or negative (measured back from the first interface).
/// In every other layer `distance` must lie in `[0, d]`.
pub fn position_resolved(layer: usize, distance: f64, data: &StackResult) -> Result<PositionFields> {
    let num_layers = data.num_layers();
    if layer >= num_layers {
        return Err(TmmError::geometry(format!(
            "layer {layer} does not exist in a stack of {num_layers} layers"
        )));
    }
    let thickness = data.stack.thicknesses()[layer];
    let in_range = if layer == 0 {
        distance <= 0.0
    } else {
        (0.0..=thickness).contains(&distance)
    };
    if !in_range {
        return Err(TmmError::geometry(format!(
            "distance {distance} lies outside layer {layer} of thickness {thickness}"
        )));
    }

    let i = Complex64::i();
    let one = Complex64::new(1.0, 0.0);
    let zero = Complex64::new(0.0, 0.0);
    let num_wl = data.num_wavelengths();
    let mut fields = PositionFields {
        poyn: Array1::zeros(num_wl),
        absor: Array1::zeros(num_wl),
        ex: Array1::zeros(num_wl),
        ey: Array1::zeros(num_wl),
        ez: Array1::zeros(num_wl),
    };

    for j in 0..num_wl {
        let (v, w) = if layer > 0 {
            let a = data.amplitudes[(layer, j)];
            (a.forward, a.backward)
        } else {
            (one, data.r[j])
        };
        let kz = data.kz[(layer, j)];
        let th = data.th[(layer, j)];
        let n = data.stack.n()[(layer, j)];
        let n_0 = data.stack.n()[(0, j)];
        let th_0 = data.th_0[j];

        let e_f = v * (i * kz * distance).exp();
        let e_b = w * (-i * kz * distance).exp();

        match data.pol {
            Polarization::S => {
                let norm = (n_0 * th_0.cos()).re;
                fields.poyn[j] = (n * th.cos() * (e_f + e_b).conj() * (e_f - e_b)).re / norm;
                fields.absor[j] = (n * th.cos() * kz * (e_f + e_b).norm_sqr()).im / norm;
                fields.ex[j] = zero;
                fields.ey[j] = e_f + e_b;
                fields.ez[j] = zero;
            }
            Polarization::P => {
                let norm = (n_0 * th_0.cos().conj()).re;
                fields.poyn[j] = (n * th.cos().conj() * (e_f + e_b) * (e_f - e_b).conj()).re / norm;
                fields.absor[j] = (n
                    * th.cos().conj()
                    * (kz * (e_f - e_b).norm_sqr() - kz.conj() * (e_f + e_b).norm_sqr()))
                .im
                    / norm;
                fields.ex[j] = (e_f - e_b) * th.cos();
                fields.ey[j] = zero;
                fields.ez[j] = -(e_f + e_b) * th.sin();
            }
        }
    }
    Ok(fields)
}

/// Locates global depths in a stack of finite layers.
///
/// `d_list` holds the finite layer thicknesses only, and returned layer indices
/// index into it: the first finite layer is 0. A depth exactly on a boundary
/// belongs to the layer starting there; depths past the last layer map to index
/// `d_list.len()`.
///
/// Fails with [`TmmError::Geometry`] if a thickness is not finite or a depth is
/// negative. Use [`find_in_structure_inf`] to place negative depths in the front
/// medium.
pub fn find_in_structure(d_list: &[f64], dists: &[f64]) -> Result<Vec<LayerPosition>> {
    if d_list.iter().any(|d| !d.is_finite()) {
        return Err(TmmError::geometry(
            "structure lookup requires finite layer thicknesses",
        ));
    }
    if let Some(dist) = dists.iter().find(|dist| !(**dist >= 0.0)) {
        return Err(TmmError::geometry(format!(
            "structure lookup requires non-negative depths, got {dist}"
        )));
    }

    let cum_sum: Vec<f64> = d_list
        .iter()
        .scan(0.0, |acc, d| {
            *acc += d;
            Some(*acc)
        })
        .collect();

    Ok(dists
        .iter()
        .map(|&dist| {
            let idx = cum_sum.partition_point(|&edge| edge <= dist);
            let start = if idx == 0 { 0.0 } else { cum_sum[idx - 1] };
            LayerPosition {
                layer: idx,
                distance: dist - start,
            }
        })
        .collect())
}

/// Locates global depths in a full stack whose first and last thicknesses are
/// infinite.
///
/// Layer indices follow the full stack, so the first finite layer is 1 and the
/// exit medium is `d_list.len() - 1`. Depth 0 is the first interface. Negative
/// depths lie in the front medium and are returned as layer 0 with the depth
/// unchanged.
///
/// Fails with [`TmmError::Validation`] unless both ends of `d_list` are infinite.
pub fn find_in_structure_inf(d_list: &[f64], dists: &[f64]) -> Result<Vec<LayerPosition>> {
    let infinite_ends = d_list.len() >= 2
        && d_list[0].is_infinite()
        && d_list[d_list.len() - 1].is_infinite();
    if !infinite_ends {
        return Err(TmmError::validation(
            "thickness list must start and end with semi-infinite media",
        ));
    }
    if dists.iter().any(|dist| dist.is_nan()) {
        return Err(TmmError::geometry("depths must not be NaN"));
    }
    let inner = &d_list[1..d_list.len() - 1];
    let non_negative: Vec<f64> = dists.iter().copied().filter(|dist| *dist >= 0.0).collect();
    let mut found = find_in_structure(inner, &non_negative)?.into_iter();

    dists
        .iter()
        .map(|&dist| {
            if dist < 0.0 {
                Ok(LayerPosition {
                    layer: 0,
                    distance: dist,
                })
            } else {
                found
                    .next()
                    .map(|position| LayerPosition {
                        layer: position.layer + 1,
                        ..position
                    })
                    .ok_or_else(|| TmmError::geometry("depth lookup lost track of a position"))
            }
        })
        .collect()
}

/// Depth at which each layer begins: `-∞` for the front medium, then 0 at the
/// first interface and the running sum of thicknesses after that.
pub fn layer_starts(d_list: &[f64]) -> Vec<f64> {
    let mut starts: Vec<f64> = Vec::with_capacity(d_list.len());
    for i in 0..d_list.len() {
        let start = match i {
            0 => f64::NEG_INFINITY,
            1 => 0.0,
            _ => starts[i - 1] + d_list[i - 1],
        };
        starts.push(start);
    }
    starts
}

/// Fraction of the incident power absorbed in each layer.
///
/// Row 0 is the power reflected back into the incidence medium and the last
/// row is the power transmitted into the exit medium, so every column sums to 1.
/// Small negative values caused by rounding in lossless layers are set to 0.
pub fn absorp_in_each_layer(data: &StackResult) -> Result<LayerGrid<f64>> {
    let num_layers = data.num_layers();
    let num_wl = data.num_wavelengths();
    let last = num_layers - 1;

    let mut entering = Array2::<f64>::zeros((num_layers, num_wl));
    entering.row_mut(0).fill(1.0);
    entering.row_mut(1).assign(&data.power_entering);
    for layer in 2..last {
        entering
            .row_mut(layer)
            .assign(&position_resolved(layer, 0.0, data)?.poyn);
    }
    entering.row_mut(last).assign(&data.transmittance);

    let mut absorbed = Array2::<f64>::zeros((num_layers, num_wl));
    for layer in 0..last {
        let diff = &entering.row(layer) - &entering.row(layer + 1);
        absorbed.row_mut(layer).assign(&diff);
    }
    absorbed.row_mut(last).assign(&entering.row(last));
    absorbed.mapv_inplace(|a| a.max(0.0));
    Ok(LayerGrid::from(absorbed))
}

//! Coherent transfer-matrix propagation through a multilayer stack.
//!
//! This module solves for the reflected, transmitted and internal plane-wave
//! amplitudes of a stack whose layers are all thin enough for light to stay
//! coherent. Each interior layer contributes one 2×2 matrix; the chained product
//! gives the overall `r` and `t`, and back-substitution from the exit medium gives
//! the amplitude pair inside every layer.
//!
//! The propagator provides:
//! - [`coh_tmm`]: illumination from the first layer
//! - [`coh_tmm_reverse`]: illumination from the last layer
//! - Independent evaluation of every wavelength column in parallel
//!
//! # Overflow guard
//!
//! The phase thickness `δ = kz·d` of a very thick or strongly absorbing layer can
//! have an imaginary part large enough to overflow `e^{−iδ}`. `Im(δ)` is clamped
//! to [`PHASE_IMAG_LIMIT`]; the light reaching the far side of such a layer is
//! then of order `e^{−100}` instead of exactly zero. The clamp changes results and
//! is never reported as an error.

use std::f64::consts::PI;

use nalgebra::Vector2;
use ndarray::Array1;
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Result, TmmError};
use crate::fresnel::{
    interface_r, interface_t, power_entering_from_r, reflectance_from_r, transmittance_from_t,
};
use crate::grid::LayerGrid;
use crate::matrix::TransferMatrix;
use crate::polarization::Polarization;
use crate::result::{Amplitudes, StackResult};
use crate::settings::{EPSILON, PHASE_IMAG_LIMIT, TOL};
use crate::snell::{is_forward_angle, list_snell, snell};
use crate::stack::Stack;


/// Runs the coherent transfer-matrix calculation for light incident from the
/// first layer of `stack` at angle `th_0`.
///
/// **Context**: This is the central computation of the crate: every derived
/// quantity (ellipsometry, unpolarized powers, position-resolved fields,
/// absorption per layer) is built from the [`StackResult`] it returns.
///
/// **How it Works**: Checks that `n₀·sin θ₀` is real and that `θ₀` is a forward
/// angle in the incidence medium, then solves every wavelength column
/// independently. Each column resolves the layer angles, builds the interior
/// layer matrices, chains them behind the entry interface, reads `r` and `t`
/// off the product and back-substitutes the layer amplitudes.
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use tmm::{coherent::coh_tmm, polarization::Polarization, stack::Stack};
///
/// let c = |re, im| Complex64::new(re, im);
/// let stack = Stack::uniform(
///     &[c(1.0, 0.0), c(2.0, 4.0), c(3.0, 0.3), c(1.0, 0.1)],
///     vec![f64::INFINITY, 2.0, 3.0, f64::INFINITY],
///     vec![100.0],
/// )
/// .unwrap();
/// let result = coh_tmm(Polarization::S, &stack, c(0.1, 0.0)).unwrap();
/// assert!((result.reflectance[0] - 0.3727).abs() < 1e-4);
/// ```
pub fn coh_tmm(pol: Polarization, stack: &Stack, th_0: Complex64) -> Result<StackResult> {
    let th_0 = Array1::from_elem(stack.num_wavelengths(), th_0);
    propagate(pol, stack, th_0)
}

/// Runs the coherent calculation for light incident from the last layer.
///
/// The entry angle in the exit medium is found by Snell's law separately for
/// every wavelength, since the exit medium's index may be dispersive. The stack
/// is then reversed and propagated as usual, so layer indices in the returned
/// result count from the old exit medium.
pub fn coh_tmm_reverse(pol: Polarization, stack: &Stack, th_0: Complex64) -> Result<StackResult> {
    let last = stack.num_layers() - 1;
    let th_f = (0..stack.num_wavelengths())
        .map(|j| snell(stack.n()[(0, j)], stack.n()[(last, j)], th_0))
        .collect::<Result<Vec<_>>>()?;
    propagate(pol, &stack.reversed(), Array1::from(th_f))
}

/// Solution of a single wavelength column.
struct Column {
    r: Complex64,
    t: Complex64,
    reflectance: f64,
    transmittance: f64,
    power_entering: f64,
    th: Vec<Complex64>,
    kz: Vec<Complex64>,
    amplitudes: Vec<Amplitudes>,
}

fn propagate(pol: Polarization, stack: &Stack, th_0: Array1<Complex64>) -> Result<StackResult> {
    for (j, th) in th_0.iter().enumerate() {
        let n_0 = stack.n()[(0, j)];
        if (n_0 * th.sin()).im.abs() > TOL * EPSILON {
            return Err(TmmError::validation(format!(
                "n0·sin(th0) must be real, got n0 = {n_0}, th0 = {th}"
            )));
        }
        if !is_forward_angle(n_0, *th)? {
            return Err(TmmError::validation(format!(
                "th0 = {th} is not a forward angle in the incidence medium n0 = {n_0}"
            )));
        }
    }

    let columns = (0..stack.num_wavelengths())
        .into_par_iter()
        .map(|j| solve_column(pol, stack, j, th_0[j]))
        .collect::<Result<Vec<_>>>()?;

    let r = columns.iter().map(|col| col.r).collect::<Array1<_>>();
    let t = columns.iter().map(|col| col.t).collect::<Array1<_>>();
    let reflectance = columns.iter().map(|col| col.reflectance).collect::<Array1<_>>();
    let transmittance = columns.iter().map(|col| col.transmittance).collect::<Array1<_>>();
    let power_entering = columns.iter().map(|col| col.power_entering).collect::<Array1<_>>();

    let mut th = Vec::with_capacity(columns.len());
    let mut kz = Vec::with_capacity(columns.len());
    let mut amplitudes = Vec::with_capacity(columns.len());
    for col in columns {
        th.push(col.th);
        kz.push(col.kz);
        amplitudes.push(col.amplitudes);
    }

    Ok(StackResult {
        r,
        t,
        reflectance,
        transmittance,
        power_entering,
        amplitudes: LayerGrid::from_columns(amplitudes)?,
        kz: LayerGrid::from_columns(kz)?,
        th: LayerGrid::from_columns(th)?,
        pol,
        stack: stack.clone(),
        th_0,
    })
}

fn solve_column(pol: Polarization, stack: &Stack, wavelength: usize, th_0: Complex64) -> Result<Column> {
    let n = stack.n().column(wavelength).ok_or_else(|| {
        TmmError::validation(format!("wavelength index {wavelength} out of range"))
    })?;
    let lam_vac = stack.wavelengths()[wavelength];
    let d = stack.thicknesses();
    let num_layers = n.len();
    let last = num_layers - 1;
    trace!(wavelength = lam_vac, num_layers, "solving column");

    let th = list_snell(n, th_0)?;
    let kz: Vec<Complex64> = n
        .iter()
        .zip(th.iter())
        .map(|(&n, &th)| 2.0 * PI * n * th.cos() / lam_vac)
        .collect();

    let (r_list, t_list): (Vec<Complex64>, Vec<Complex64>) = (0..last)
        .map(|i| {
            (
                interface_r(pol, n[i], n[i + 1], th[i], th[i + 1]),
                interface_t(pol, n[i], n[i + 1], th[i], th[i + 1]),
            )
        })
        .unzip();

    // one matrix per interior layer, layer i at index i - 1
    let layer_matrices: Vec<TransferMatrix> = (1..last)
        .map(|i| {
            let delta = clamp_phase(kz[i] * d[i], lam_vac, i);
            TransferMatrix::layer(delta, r_list[i], t_list[i])
        })
        .collect();

    let m_tilde = TransferMatrix::interface(r_list[0], t_list[0])
        * layer_matrices
            .iter()
            .fold(TransferMatrix::identity(), |acc, m| acc * *m);
    let r = m_tilde.reflection();
    let t = m_tilde.transmission();

    let zero = Complex64::new(0.0, 0.0);
    let mut amplitudes = vec![Amplitudes::default(); num_layers];
    let mut vw = Vector2::new(t, zero);
    amplitudes[last] = Amplitudes::new(t, zero);
    for i in (1..last).rev() {
        vw = layer_matrices[i - 1].apply(&vw);
        amplitudes[i] = Amplitudes::new(vw[0], vw[1]);
    }

    Ok(Column {
        r,
        t,
        reflectance: reflectance_from_r(r),
        transmittance: transmittance_from_t(pol, t, n[0], n[last], th_0, th[last]),
        power_entering: power_entering_from_r(pol, r, n[0], th_0),
        th: th.to_vec(),
        kz,
        amplitudes,
    })
}

fn clamp_phase(delta: Complex64, lam_vac: f64, layer: usize) -> Complex64 {
    if delta.im > PHASE_IMAG_LIMIT {
        debug!(
            layer,
            wavelength = lam_vac,
            im_delta = delta.im,
            "opaque layer, clamping phase thickness"
        );
        Complex64::new(delta.re, PHASE_IMAG_LIMIT)
    } else {
        delta
    }
}

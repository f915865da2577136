//! Quantities derived from a pair of s and p propagations.
//!
//! These functions provide:
//! - Ellipsometric `ψ` and `Δ` ([`ellips`])
//! - Unpolarized reflectance and transmittance ([`unpolarized_rt`])
//! - A reflectance/absorptance/transmittance summary with per-layer
//!   absorption for any [`PolarizationMode`] ([`calculate_rat`])

use ndarray::{s, Array1};
use num_complex::Complex64;
use tracing::debug;

use crate::coherent::coh_tmm;
use crate::error::Result;
use crate::grid::LayerGrid;
use crate::polarization::{Polarization, PolarizationMode};
use crate::position::absorp_in_each_layer;
use crate::stack::Stack;


/// Ellipsometric parameters, one entry per wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsometry {
    pub psi: Array1<f64>,
    pub delta: Array1<f64>,
}

/// Reflectance and transmittance of unpolarized light.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpolarizedRt {
    pub reflectance: Array1<f64>,
    pub transmittance: Array1<f64>,
}

/// Reflectance, absorptance and transmittance of a stack, plus the fraction of
/// the incident power absorbed in each finite layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Rat {
    pub reflectance: Array1<f64>,
    pub absorptance: Array1<f64>,
    pub transmittance: Array1<f64>,
    /// Rows are the finite layers in stack order; the two semi-infinite media
    /// are left out.
    pub absorbed_per_layer: LayerGrid<f64>,
}

/// Computes the ellipsometric parameters `ψ = atan(|r_p/r_s|)` and
/// `Δ = arg(−r_p/r_s)`.
///
/// The minus sign in `Δ` compensates the p-polarization sign convention, so a
/// structure with no polarization contrast has `Δ = 0`.
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use tmm::{derived::ellips, stack::Stack};
///
/// let stack = Stack::uniform(
///     &[Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0)],
///     vec![f64::INFINITY, f64::INFINITY],
///     vec![500.0],
/// )
/// .unwrap();
/// let e = ellips(&stack, Complex64::new(0.0, 0.0)).unwrap();
/// assert!((e.psi[0] - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
/// ```
pub fn ellips(stack: &Stack, th_0: Complex64) -> Result<Ellipsometry> {
    let s_data = coh_tmm(Polarization::S, stack, th_0)?;
    let p_data = coh_tmm(Polarization::P, stack, th_0)?;
    let ratio: Array1<Complex64> = &p_data.r / &s_data.r;
    Ok(Ellipsometry {
        psi: ratio.mapv(|z| z.norm().atan()),
        delta: ratio.mapv(|z| (-z).arg()),
    })
}

/// Averages the s and p reflectance and transmittance.
pub fn unpolarized_rt(stack: &Stack, th_0: Complex64) -> Result<UnpolarizedRt> {
    let s_data = coh_tmm(Polarization::S, stack, th_0)?;
    let p_data = coh_tmm(Polarization::P, stack, th_0)?;
    Ok(UnpolarizedRt {
        reflectance: (&s_data.reflectance + &p_data.reflectance) / 2.0,
        transmittance: (&s_data.transmittance + &p_data.transmittance) / 2.0,
    })
}

/// Summarizes a stack as reflectance, absorptance and transmittance.
///
/// **Context**: For device work the usual question is how much light is
/// reflected, how much is lost in each film and how much comes out the back.
/// Answering it means running the propagator once or twice and slicing the
/// per-layer absorption.
///
/// **How it Works**: Converts `angle_degrees` to a real launch angle, runs the
/// propagator for the requested polarization (both for `Unpolarized`, then
/// averages) and computes the per-layer absorption. Absorptance is
/// `1 − R − T`.
pub fn calculate_rat(stack: &Stack, angle_degrees: f64, mode: PolarizationMode) -> Result<Rat> {
    let th_0 = Complex64::new(angle_degrees.to_radians(), 0.0);
    let runs: Vec<Polarization> = match mode {
        PolarizationMode::Polarized(pol) => vec![pol],
        PolarizationMode::Unpolarized => Polarization::BOTH.to_vec(),
    };
    debug!("calculating R/A/T at {angle_degrees} degrees for {mode} polarization");

    let num_wl = stack.num_wavelengths();
    let num_layers = stack.num_layers();
    let mut reflectance = Array1::<f64>::zeros(num_wl);
    let mut transmittance = Array1::<f64>::zeros(num_wl);
    let mut absorbed = ndarray::Array2::<f64>::zeros((num_layers - 2, num_wl));

    let weight = 1.0 / runs.len() as f64;
    for pol in runs {
        let data = coh_tmm(pol, stack, th_0)?;
        let per_layer = absorp_in_each_layer(&data)?;
        reflectance.scaled_add(weight, &data.reflectance);
        transmittance.scaled_add(weight, &data.transmittance);
        absorbed.scaled_add(weight, &per_layer.as_array().slice(s![1..num_layers - 1, ..]));
    }

    let absorptance = 1.0 - &reflectance - &transmittance;
    Ok(Rat {
        reflectance,
        absorptance,
        transmittance,
        absorbed_per_layer: LayerGrid::from(absorbed),
    })
}

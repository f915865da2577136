//! Fresnel equations for a single planar interface.
//!
//! This module implements the reflection and transmission amplitudes for a plane
//! wave crossing the boundary between two homogeneous media, along with the power
//! quantities derived from them. All indices and angles are complex, so absorbing
//! media on either side are supported.
//!
//! The Fresnel calculations provide:
//! - Amplitude coefficients `r` and `t` for s and p polarizations
//! - Reflected and transmitted power fractions
//! - Power entering a stack from its reflection amplitude, valid for lossy
//!   incidence media
//! - Grazing-angle clamps for single-interface power calculations
//!
//! # Sign convention
//!
//! The p-polarization amplitudes follow the convention in which `r_p = −r_s` at
//! normal incidence, so ellipsometric `Δ` is measured from `−r_p/r_s`.

use std::f64::consts::FRAC_PI_2;

use num_complex::Complex64;

use crate::polarization::Polarization;
use crate::settings::GRAZING_TOLERANCE;


/// Computes the Fresnel reflection amplitude of an interface.
///
/// **Context**: A plane wave reaching the boundary between media `n_i` and `n_f`
/// is partly reflected. The reflected amplitude depends on polarization, and for
/// absorbing media both the indices and the angles are complex.
///
/// **How it Works**: Applies the Fresnel formula for the requested polarization
/// using `n·cos θ` on each side. The p-polarization formula cross-pairs indices
/// and cosines.
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use tmm::{fresnel, polarization::Polarization};
///
/// let zero = Complex64::new(0.0, 0.0);
/// let r = fresnel::interface_r(Polarization::S, 1.0.into(), 1.5.into(), zero, zero);
/// assert!((r.re + 0.2).abs() < 1e-12);
/// ```
pub fn interface_r(
    pol: Polarization,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> Complex64 {
    let cti = th_i.cos();
    let ctf = th_f.cos();
    match pol {
        Polarization::S => (n_i * cti - n_f * ctf) / (n_i * cti + n_f * ctf),
        Polarization::P => (n_f * cti - n_i * ctf) / (n_f * cti + n_i * ctf),
    }
}

/// Computes the Fresnel transmission amplitude of an interface.
///
/// **Context**: The transmitted amplitude fixes how much field crosses the
/// boundary; together with [`interface_r`] it forms the scattering matrix of the
/// interface used by the propagator.
///
/// **How it Works**: Same structure as [`interface_r`], with `2·n_i·cos θ_i` in
/// the numerator.
pub fn interface_t(
    pol: Polarization,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> Complex64 {
    let cti = th_i.cos();
    let ctf = th_f.cos();
    match pol {
        Polarization::S => 2.0 * n_i * cti / (n_i * cti + n_f * ctf),
        Polarization::P => 2.0 * n_i * cti / (n_f * cti + n_i * ctf),
    }
}

/// Fraction of incident power reflected, `|r|²`.
pub fn reflectance_from_r(r: Complex64) -> f64 {
    r.norm_sqr()
}

/// Fraction of incident power transmitted, from the transmission amplitude.
///
/// For p-polarization the cosines are conjugated on both sides of the ratio;
/// this is not the mirror image of the s-polarization expression.
pub fn transmittance_from_t(
    pol: Polarization,
    t: Complex64,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> f64 {
    let ratio = match pol {
        Polarization::S => (n_f * th_f.cos()).re / (n_i * th_i.cos()).re,
        Polarization::P => (n_f * th_f.cos().conj()).re / (n_i * th_i.cos().conj()).re,
    };
    t.norm_sqr() * ratio
}

/// Power entering the stack through its first interface, given the overall
/// reflection amplitude `r`.
///
/// **Context**: When the incidence medium absorbs, the reflected and incident
/// waves interfere in the Poynting vector, so the power entering is not `1 − R`.
///
/// **How it Works**: Evaluates the normal Poynting flux of the incident plus
/// reflected fields just in front of the interface, normalized to the incident
/// flux alone.
pub fn power_entering_from_r(pol: Polarization, r: Complex64, n_i: Complex64, th_i: Complex64) -> f64 {
    let one = Complex64::new(1.0, 0.0);
    match pol {
        Polarization::S => {
            let ncos = n_i * th_i.cos();
            (ncos * (one + r.conj()) * (one - r)).re / ncos.re
        }
        Polarization::P => {
            let ncos = n_i * th_i.cos().conj();
            (ncos * (one + r) * (one - r.conj())).re / ncos.re
        }
    }
}

fn is_grazing(th: Complex64) -> bool {
    th.re > FRAC_PI_2 - GRAZING_TOLERANCE
}

/// Reflected power of a single interface.
///
/// If the exit angle is within [`GRAZING_TOLERANCE`] of π/2 the light is taken to
/// be totally reflected and `R = 1`. A grazing incidence angle alone is not
/// clamped; the Fresnel value already tends to 1 there.
pub fn interface_reflectance(
    pol: Polarization,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> f64 {
    if is_grazing(th_f) {
        return 1.0;
    }
    reflectance_from_r(interface_r(pol, n_i, n_f, th_i, th_f))
}

/// Transmitted power of a single interface.
///
/// A grazing incidence angle means the light never reaches this interface, so
/// `T = 0` rather than dividing by a vanishing cosine.
pub fn interface_transmittance(
    pol: Polarization,
    n_i: Complex64,
    n_f: Complex64,
    th_i: Complex64,
    th_f: Complex64,
) -> f64 {
    if is_grazing(th_i) {
        return 0.0;
    }
    let t = interface_t(pol, n_i, n_f, th_i, th_f);
    transmittance_from_t(pol, t, n_i, n_f, th_i, th_f)
}

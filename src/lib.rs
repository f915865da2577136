//! Coherent transfer matrix method (TMM) for planar multilayer thin films.
//!
//! A stack of homogeneous layers is illuminated by a plane wave from a
//! semi-infinite incidence medium. For each wavelength the propagator resolves
//! the complex angle in every layer, chains 2×2 transfer matrices and returns
//! the reflection and transmission amplitudes together with the forward and
//! backward amplitudes inside each layer. Derived quantities (ellipsometry,
//! unpolarized power, local fields and absorption profiles) are built from that
//! result.

pub mod absorption;
pub mod coherent;
pub mod derived;
pub mod error;
pub mod fresnel;
pub mod grid;
pub mod material;
pub mod matrix;
pub mod polarization;
pub mod position;
pub mod result;
pub mod settings;
pub mod snell;
pub mod stack;

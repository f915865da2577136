use ndarray::Array1;
use num_complex::Complex64;

use crate::grid::LayerGrid;
use crate::polarization::Polarization;
use crate::stack::Stack;

/// Forward (`v`) and backward (`w`) field amplitudes at the front face of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Amplitudes {
    pub forward: Complex64,
    pub backward: Complex64,
}

impl Amplitudes {
    pub fn new(forward: Complex64, backward: Complex64) -> Self {
        Self { forward, backward }
    }
}

/// Outcome of one coherent propagation.
///
/// **Context**: Downstream analysis (ellipsometry, position-resolved fields,
/// absorption profiles) needs more than the overall `r` and `t`. It also needs the
/// angles, wavenumbers and amplitudes inside every layer, and the inputs that
/// produced them.
///
/// **How it Works**: Per-wavelength quantities are `Array1`s and per-layer
/// quantities are [`LayerGrid`]s indexed by `(layer, wavelength)`. The amplitude
/// pairs of the two semi-infinite media follow a fixed convention. The front
/// medium's pair is zero; the incident and reflected waves there are `1` and `r`.
/// The exit medium's pair is `(t, 0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackResult {
    pub r: Array1<Complex64>,
    pub t: Array1<Complex64>,
    pub reflectance: Array1<f64>,
    pub transmittance: Array1<f64>,
    pub power_entering: Array1<f64>,
    pub amplitudes: LayerGrid<Amplitudes>,
    pub kz: LayerGrid<Complex64>,
    pub th: LayerGrid<Complex64>,
    pub pol: Polarization,
    pub stack: Stack,
    pub th_0: Array1<Complex64>,
}

impl StackResult {
    pub fn num_layers(&self) -> usize {
        self.stack.num_layers()
    }

    pub fn num_wavelengths(&self) -> usize {
        self.stack.num_wavelengths()
    }

    pub fn wavelengths(&self) -> &Array1<f64> {
        self.stack.wavelengths()
    }
}

//! Closed-form absorption profile inside a single layer.
//!
//! Within one homogeneous layer the absorbed power density is a sum of two real
//! exponentials and a complex oscillating term,
//!
//! ```text
//! a(z) = A1·e^{a1·z} + A2·e^{−a1·z} + A3·e^{i·a3·z} + conj(A3)·e^{−i·a3·z}
//! ```
//!
//! with `a1 = 2·Im kz` and `a3 = 2·Re kz`. Storing the coefficients once lets the
//! profile be evaluated at many depths without re-running the propagator, and
//! lets profiles from separate runs (for example s and p) be combined.

use ndarray::{Array1, Array2, Zip};
use num_complex::Complex64;

use crate::error::{Result, TmmError};
use crate::polarization::Polarization;
use crate::result::StackResult;
use crate::settings::ANALYTIC_RATE_FLOOR;


/// Absorption profile coefficients for one layer, one entry per wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsorpAnalyticFn {
    /// `a1 = 2·Im kz`, the decay rate of the two exponential terms.
    pub attenuation: Array1<f64>,
    /// `a3 = 2·Re kz`, the spatial frequency of the interference term.
    pub wavenumber: Array1<f64>,
    /// Coefficient of the term growing with depth (`A1`), fed by the backward wave.
    pub backward_amp: Array1<f64>,
    /// Coefficient of the term decaying with depth (`A2`), fed by the forward wave.
    pub forward_amp: Array1<f64>,
    /// Coefficient of the interference term (`A3`).
    pub cross_amp: Array1<Complex64>,
    /// Thickness of the layer the profile was built for.
    pub thickness: f64,
}

impl AbsorpAnalyticFn {
    /// Builds the profile of `layer` from a propagation result.
    ///
    /// **Context**: Sampling [`crate::position::position_resolved`] on a fine
    /// depth grid repeats the same exponentials many times. The profile only
    /// depends on the layer's amplitudes and wavenumber, so it can be reduced to
    /// five coefficients per wavelength.
    ///
    /// **How it Works**: Reads `v`, `w`, `kz`, the complex angle and the index of
    /// the layer and folds the polarization-specific normalization into the
    /// coefficients. Rates below a tiny floor are set to zero so lossless layers
    /// evaluate without spurious growth. The front medium has no amplitude pair,
    /// so its profile is identically zero.
    pub fn fill_in(data: &StackResult, layer: usize) -> Result<Self> {
        let num_layers = data.num_layers();
        if layer >= num_layers {
            return Err(TmmError::geometry(format!(
                "layer {layer} does not exist in a stack of {num_layers} layers"
            )));
        }

        let num_wl = data.num_wavelengths();
        let mut profile = Self {
            attenuation: Array1::zeros(num_wl),
            wavenumber: Array1::zeros(num_wl),
            backward_amp: Array1::zeros(num_wl),
            forward_amp: Array1::zeros(num_wl),
            cross_amp: Array1::zeros(num_wl),
            thickness: data.stack.thicknesses()[layer],
        };

        for j in 0..num_wl {
            let (v, w) = if layer > 0 {
                let a = data.amplitudes[(layer, j)];
                (a.forward, a.backward)
            } else {
                (Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0))
            };
            let kz = data.kz[(layer, j)];
            let th = data.th[(layer, j)];
            let n = data.stack.n()[(layer, j)];
            let n_0 = data.stack.n()[(0, j)];
            let th_0 = data.th_0[j];

            profile.attenuation[j] = floor_rate(2.0 * kz.im);
            profile.wavenumber[j] = floor_rate(2.0 * kz.re);

            match data.pol {
                Polarization::S => {
                    let temp = (n * th.cos() * kz).im / (n_0 * th_0.cos()).re;
                    profile.backward_amp[j] = w.norm_sqr() * temp;
                    profile.forward_amp[j] = v.norm_sqr() * temp;
                    profile.cross_amp[j] = w.conj() * v * temp;
                }
                Polarization::P => {
                    let norm = (n_0 * th_0.cos().conj()).re;
                    let n_cos = n * th.conj().cos();
                    let temp = 2.0 * kz.im * n_cos.re / norm;
                    profile.backward_amp[j] = w.norm_sqr() * temp;
                    profile.forward_amp[j] = v.norm_sqr() * temp;
                    profile.cross_amp[j] = v * w.conj() * (-2.0 * kz.re * n_cos.im / norm);
                }
            }
        }
        Ok(profile)
    }

    /// Absorbed power density at depth `z`, one entry per wavelength.
    pub fn run(&self, z: f64) -> Array1<f64> {
        let i = Complex64::i();
        let mut out = Array1::zeros(self.attenuation.len());
        Zip::from(&mut out)
            .and(&self.attenuation)
            .and(&self.wavenumber)
            .and(&self.backward_amp)
            .and(&self.forward_amp)
            .and(&self.cross_amp)
            .for_each(|out, &a1, &a3, &amp1, &amp2, &amp3| {
                let oscillating = amp3 * (i * a3 * z).exp() + amp3.conj() * (-i * a3 * z).exp();
                *out = amp1 * (a1 * z).exp() + amp2 * (-a1 * z).exp() + oscillating.re;
            });
        out
    }

    /// Evaluates the profile at every depth in `zs`; rows are wavelengths and
    /// columns are depths.
    pub fn run_many(&self, zs: &[f64]) -> Array2<f64> {
        let mut out = Array2::zeros((self.attenuation.len(), zs.len()));
        for (k, &z) in zs.iter().enumerate() {
            out.column_mut(k).assign(&self.run(z));
        }
        out
    }

    /// Multiplies the profile by `factor` at every wavelength.
    ///
    /// Coefficients that overflow to infinity are set to zero; they come from
    /// terms that were already negligible before scaling.
    pub fn scale(&mut self, factor: f64) {
        self.backward_amp.mapv_inplace(|a| finite_or_zero(a * factor));
        self.forward_amp.mapv_inplace(|a| finite_or_zero(a * factor));
        self.cross_amp.mapv_inplace(|a| {
            let scaled = a * factor;
            if scaled.is_infinite() {
                Complex64::new(0.0, 0.0)
            } else {
                scaled
            }
        });
    }

    /// Multiplies the profile by a separate factor per wavelength.
    pub fn scale_each(&mut self, factors: &[f64]) -> Result<()> {
        if factors.len() != self.attenuation.len() {
            return Err(TmmError::validation(format!(
                "expected {} scale factors, got {}",
                self.attenuation.len(),
                factors.len()
            )));
        }
        for (j, &factor) in factors.iter().enumerate() {
            self.backward_amp[j] = finite_or_zero(self.backward_amp[j] * factor);
            self.forward_amp[j] = finite_or_zero(self.forward_amp[j] * factor);
            let scaled = self.cross_amp[j] * factor;
            self.cross_amp[j] = if scaled.is_infinite() {
                Complex64::new(0.0, 0.0)
            } else {
                scaled
            };
        }
        Ok(())
    }

    /// Adds another profile of the same layer, e.g. to combine s and p runs.
    ///
    /// Both profiles must share `a1` and `a3`; otherwise they describe different
    /// layers or wavelengths and [`TmmError::Validation`] is returned.
    pub fn add(&mut self, other: &AbsorpAnalyticFn) -> Result<()> {
        if self.attenuation != other.attenuation || self.wavenumber != other.wavenumber {
            return Err(TmmError::validation(
                "cannot add absorption profiles with different decay rates or wavenumbers",
            ));
        }
        self.backward_amp += &other.backward_amp;
        self.forward_amp += &other.forward_amp;
        self.cross_amp += &other.cross_amp;
        Ok(())
    }

    /// Mirrors the profile so that depth is measured from the back face of the
    /// layer, `new.run(z) == old.run(d − z)`.
    pub fn flip(&mut self) -> Result<()> {
        let d = self.thickness;
        if !d.is_finite() {
            return Err(TmmError::geometry(
                "cannot flip the absorption profile of a semi-infinite layer",
            ));
        }
        let i = Complex64::i();
        for j in 0..self.attenuation.len() {
            let a1 = self.attenuation[j];
            let a3 = self.wavenumber[j];
            let amp1 = self.backward_amp[j];
            let amp2 = self.forward_amp[j];
            self.backward_amp[j] = if amp2 == 0.0 { 0.0 } else { amp2 * (-a1 * d).exp() };
            self.forward_amp[j] = if amp1 == 0.0 { 0.0 } else { amp1 * (a1 * d).exp() };
            self.cross_amp[j] = (self.cross_amp[j] * (i * a3 * d).exp()).conj();
        }
        Ok(())
    }
}

fn floor_rate(rate: f64) -> f64 {
    if rate < ANALYTIC_RATE_FLOOR {
        0.0
    } else {
        rate
    }
}

fn finite_or_zero(a: f64) -> f64 {
    if a.is_infinite() {
        0.0
    } else {
        a
    }
}

//! Fixed 2×2 complex transfer matrices.
//!
//! A thin wrapper over `nalgebra::Matrix2<Complex64>` exposing only what the
//! coherent propagator needs: building interface and layer matrices, chaining
//! them, applying a matrix to an amplitude pair, and reading the overall
//! reflection and transmission amplitudes off the chained product.

use std::ops::{Div, Mul};

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;


/// Transfer matrix relating forward/backward amplitudes on either side of an
/// interface or layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferMatrix(Matrix2<Complex64>);

impl TransferMatrix {
    /// Row-major construction.
    pub fn new(m00: Complex64, m01: Complex64, m10: Complex64, m11: Complex64) -> Self {
        Self(Matrix2::new(m00, m01, m10, m11))
    }

    pub fn identity() -> Self {
        Self(Matrix2::identity())
    }

    /// Interface scattering matrix `[[1, r], [r, 1]] / t`.
    pub fn interface(r: Complex64, t: Complex64) -> Self {
        let one = Complex64::new(1.0, 0.0);
        Self::new(one, r, r, one) / t
    }

    /// Layer matrix: phase propagation through a layer of phase thickness `delta`
    /// followed by the interface at its back face,
    /// `diag(e^{−iδ}, e^{iδ}) · [[1, r], [r, 1]] / t`.
    pub fn layer(delta: Complex64, r: Complex64, t: Complex64) -> Self {
        let i = Complex64::i();
        let zero = Complex64::new(0.0, 0.0);
        let phase = Self::new((-i * delta).exp(), zero, zero, (i * delta).exp());
        phase * Self::interface(r, t)
    }

    /// Applies the matrix to a `(forward, backward)` amplitude pair.
    pub fn apply(&self, amplitudes: &Vector2<Complex64>) -> Vector2<Complex64> {
        self.0 * amplitudes
    }

    /// Overall reflection amplitude of a chained stack matrix, `M10 / M00`.
    pub fn reflection(&self) -> Complex64 {
        self.0[(1, 0)] / self.0[(0, 0)]
    }

    /// Overall transmission amplitude of a chained stack matrix, `1 / M00`.
    pub fn transmission(&self) -> Complex64 {
        self.0[(0, 0)].inv()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|z| z.is_finite())
    }
}

impl Mul for TransferMatrix {
    type Output = TransferMatrix;

    fn mul(self, rhs: TransferMatrix) -> TransferMatrix {
        TransferMatrix(self.0 * rhs.0)
    }
}

impl Div<Complex64> for TransferMatrix {
    type Output = TransferMatrix;

    fn div(self, rhs: Complex64) -> TransferMatrix {
        TransferMatrix(self.0.map(|z| z / rhs))
    }
}

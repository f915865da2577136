//! Complex Snell's law and forward-branch selection.
//!
//! In an absorbing medium the refraction angle is complex, and `asin` returns
//! only one of the two branches. The branch describing a wave that carries
//! energy away from the front of the stack is the "forward" one; this module
//! decides which branch that is and flips to `π − θ` when needed.
//!
//! The module provides:
//! - [`is_forward_angle`]: forward/backward decision with a consistency check
//! - [`snell`]: refraction across a single interface
//! - [`list_snell`]: angles in every layer of a stack, forward-fixed only in the
//!   two semi-infinite media

use std::f64::consts::PI;

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;

use crate::error::{Result, TmmError};
use crate::settings::{EPSILON, TOL};


/// Decides whether a wave at complex angle `theta` in a medium of index `n` is
/// travelling forward, i.e. carrying energy away from the front of the stack.
///
/// **Context**: For a lossy medium, `n·cos θ` must have a positive imaginary part
/// so that the wave decays as it propagates. For a lossless medium, the real part
/// must be positive so that energy flows forward. Gain media have no well-defined
/// forward direction.
///
/// **How it Works**: Uses the imaginary part of `n·cos θ` when it is clearly
/// non-zero and falls back to the real part otherwise. The answer is then
/// re-checked against `Re(n·cos θ̄)`; an index/angle pair for which the checks
/// disagree is rejected.
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use tmm::snell::is_forward_angle;
///
/// let forward = is_forward_angle(Complex64::new(1.5, 0.0), Complex64::new(0.2, 0.0)).unwrap();
/// assert!(forward);
/// ```
pub fn is_forward_angle(n: Complex64, theta: Complex64) -> Result<bool> {
    if n.re * n.im < 0.0 {
        return Err(TmmError::ambiguity(
            n,
            theta,
            "gain medium, the incoming and outgoing beams cannot be distinguished",
        ));
    }
    let tolerance = TOL * EPSILON;
    let ncostheta = n * theta.cos();
    let answer = if ncostheta.im.abs() > tolerance {
        ncostheta.im > 0.0
    } else {
        ncostheta.re > 0.0
    };

    let conj_check = (n * theta.conj().cos()).re;
    let consistent = if answer {
        ncostheta.im > -tolerance && ncostheta.re > -tolerance && conj_check > -tolerance
    } else {
        ncostheta.im < tolerance && ncostheta.re < tolerance && conj_check < tolerance
    };
    if !consistent {
        return Err(TmmError::ambiguity(
            n,
            theta,
            "the forward direction is inconsistent between the angle and its conjugate",
        ));
    }
    Ok(answer)
}

/// Refraction angle in medium 2 for a wave arriving from medium 1 at `th_1`,
/// on the forward branch.
pub fn snell(n_1: Complex64, n_2: Complex64, th_1: Complex64) -> Result<Complex64> {
    let th_2 = (n_1 * th_1.sin() / n_2).asin();
    if is_forward_angle(n_2, th_2)? {
        Ok(th_2)
    } else {
        Ok(PI - th_2)
    }
}

/// Propagation angle in every layer of a stack, given the angle `th_0` in the
/// first layer.
///
/// Only the first and last (semi-infinite) layers are moved onto the forward
/// branch. Interior layers keep the raw `asin` branch: the transfer matrix is
/// symmetric in the two branches there, and the amplitude pairs stored for those
/// layers are expressed in that branch.
pub fn list_snell(n_list: ArrayView1<Complex64>, th_0: Complex64) -> Result<Array1<Complex64>> {
    let num_layers = n_list.len();
    if num_layers == 0 {
        return Err(TmmError::validation("cannot resolve angles for an empty stack"));
    }
    let invariant = n_list[0] * th_0.sin();
    let mut angles: Array1<Complex64> = n_list.mapv(|n| (invariant / n).asin());

    for i in [0, num_layers - 1] {
        if !is_forward_angle(n_list[i], angles[i])? {
            angles[i] = PI - angles[i];
        }
    }
    Ok(angles)
}

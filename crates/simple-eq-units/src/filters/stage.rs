// SPDX-License-Identifier: LGPL-3.0-or-later

//! Single second-order filter stage.

use std::f64::consts::PI;

use num_complex::Complex64;
use simple_eq_lib::filters::{biquad_process_x1, biquad_process_x1_inplace, biquad_tick};
use simple_eq_lib::float::sanitize;
use simple_eq_lib::types::{Biquad, BiquadX1};

/// Processing seam shared by every stage a bank can hold.
///
/// Coefficient replacement keeps the delay memory, so a stage can be
/// retuned while audio runs through it.
pub trait BiquadStage {
    /// Run one sample through the stage.
    fn process(&mut self, sample: f32) -> f32;

    /// Run a buffer through the stage in place.
    fn process_inplace(&mut self, buf: &mut [f32]) {
        for sample in buf.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Swap in new coefficients, preserving the delay memory.
    fn replace_coefficients(&mut self, coeffs: &BiquadX1);

    /// Current coefficients.
    fn coefficients(&self) -> &BiquadX1;

    /// Linear magnitude of the transfer function at `freq` Hz.
    fn magnitude_at(&self, freq: f64, sample_rate: f64) -> f64 {
        section_magnitude(self.coefficients(), freq, sample_rate)
    }

    /// Zero the delay memory.
    fn clear(&mut self);

    /// Flush denormal (or non-finite) delay memory to zero.
    fn flush_denormals(&mut self) {}
}

/// Evaluate `|H(e^jw)|` for a section in the pre-negated convention.
///
/// `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 - a1 z^-1 - a2 z^-2)`
pub fn section_magnitude(c: &BiquadX1, freq: f64, sample_rate: f64) -> f64 {
    let w = 2.0 * PI * freq / sample_rate;
    let z1 = Complex64::from_polar(1.0, -w);
    let z2 = z1 * z1;

    let num = f64::from(c.b0) + z1 * f64::from(c.b1) + z2 * f64::from(c.b2);
    let den = 1.0 - z1 * f64::from(c.a1) - z2 * f64::from(c.a2);
    num.norm() / den.norm()
}

/// Biquad stage backed by the `simple-eq-lib` kernels.
///
/// Starts as an identity section with cleared memory.
#[derive(Debug, Clone, Default)]
pub struct FilterStage {
    bq: Biquad,
}

impl FilterStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coeffs(coeffs: BiquadX1) -> Self {
        Self {
            bq: Biquad::with_coeffs(coeffs),
        }
    }

    /// Process `src` into `dst` (length is the shorter of the two).
    pub fn process_to(&mut self, dst: &mut [f32], src: &[f32]) {
        biquad_process_x1(dst, src, &mut self.bq);
    }

    /// Delay memory.
    pub fn state(&self) -> [f32; 2] {
        self.bq.d
    }
}

impl BiquadStage for FilterStage {
    #[inline]
    fn process(&mut self, sample: f32) -> f32 {
        biquad_tick(&mut self.bq, sample)
    }

    fn process_inplace(&mut self, buf: &mut [f32]) {
        biquad_process_x1_inplace(buf, &mut self.bq);
    }

    fn replace_coefficients(&mut self, coeffs: &BiquadX1) {
        self.bq.coeffs = *coeffs;
    }

    fn coefficients(&self) -> &BiquadX1 {
        &self.bq.coeffs
    }

    fn clear(&mut self) {
        self.bq.reset();
    }

    fn flush_denormals(&mut self) {
        for d in self.bq.d.iter_mut() {
            *d = sanitize(*d);
        }
    }
}

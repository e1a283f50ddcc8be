// SPDX-License-Identifier: LGPL-3.0-or-later

//! Even-order Butterworth designs as cascaded second-order sections.
//!
//! An order-N design (N even, 2..=8) is decomposed into N/2 biquad
//! sections, one per conjugate pole pair. Pole pair `k` sits at angle
//! `theta = pi * (2k + 1) / (2N)` on the analog Butterworth circle; the
//! cutoff is pre-warped with `tan(pi * fc / fs)` and each section is mapped
//! to the z-plane with the bilinear transform. Every section has the same
//! cutoff but a different damping, so the cascade is maximally flat with a
//! -3 dB point at the cutoff.
//!
//! The low-cut band uses the highpass variant, the high-cut band the
//! lowpass one.

use std::f64::consts::PI;

use simple_eq_lib::types::BiquadX1;

use crate::error::{DesignError, check_frequency};
use crate::settings::ChainSettings;

/// Maximum supported filter order.
pub const MAX_ORDER: usize = 8;

/// Maximum number of cascaded sections (MAX_ORDER / 2).
pub const MAX_SECTIONS: usize = MAX_ORDER / 2;

/// Butterworth response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButterworthType {
    /// Passes frequencies below the cutoff.
    Lowpass,
    /// Passes frequencies above the cutoff.
    Highpass,
}

/// Ordered list of second-order sections produced by one design.
///
/// Section 0 is applied first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    sections: [BiquadX1; MAX_SECTIONS],
    len: usize,
}

impl Cascade {
    /// Number of sections (order / 2).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Designed sections, in processing order.
    pub fn sections(&self) -> &[BiquadX1] {
        &self.sections[..self.len]
    }

    pub fn get(&self, index: usize) -> Option<&BiquadX1> {
        self.sections().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BiquadX1> {
        self.sections().iter()
    }
}

impl<'a> IntoIterator for &'a Cascade {
    type Item = &'a BiquadX1;
    type IntoIter = std::slice::Iter<'a, BiquadX1>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Design an order-`order` Butterworth lowpass.
pub fn design_lowpass(freq: f64, sample_rate: f64, order: usize) -> Result<Cascade, DesignError> {
    design(ButterworthType::Lowpass, freq, sample_rate, order)
}

/// Design an order-`order` Butterworth highpass.
pub fn design_highpass(freq: f64, sample_rate: f64, order: usize) -> Result<Cascade, DesignError> {
    design(ButterworthType::Highpass, freq, sample_rate, order)
}

/// Design the low-cut cascade for a settings snapshot.
pub fn design_low_cut(settings: &ChainSettings, sample_rate: f64) -> Result<Cascade, DesignError> {
    design_highpass(
        f64::from(settings.low_cut_freq),
        sample_rate,
        settings.low_cut_slope.order(),
    )
}

/// Design the high-cut cascade for a settings snapshot.
pub fn design_high_cut(settings: &ChainSettings, sample_rate: f64) -> Result<Cascade, DesignError> {
    design_lowpass(
        f64::from(settings.high_cut_freq),
        sample_rate,
        settings.high_cut_slope.order(),
    )
}

/// Design a Butterworth cascade of the given type.
///
/// # Parameters
///
/// - `filter_type` -- lowpass or highpass
/// - `freq` -- cutoff in Hz, in `(0, sample_rate / 2)`
/// - `sample_rate` -- sample rate in Hz
/// - `order` -- even filter order in `2..=8`
///
/// Cutoffs so close to DC that a section loses its stability margin in
/// `f32` are rejected as an invalid `frequency`.
pub fn design(
    filter_type: ButterworthType,
    freq: f64,
    sample_rate: f64,
    order: usize,
) -> Result<Cascade, DesignError> {
    if order < 2 || order > MAX_ORDER || order % 2 != 0 {
        return Err(DesignError::InvalidParameter {
            name: "order",
            value: order as f64,
        });
    }
    check_frequency(freq, sample_rate)?;

    // Pre-warp the cutoff for the bilinear transform
    let wc = (PI * freq / sample_rate).tan();

    let mut cascade = Cascade {
        sections: [BiquadX1::IDENTITY; MAX_SECTIONS],
        len: order / 2,
    };
    for (k, section) in cascade.sections[..order / 2].iter_mut().enumerate() {
        let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
        *section = second_order_section(filter_type, wc, theta);
        if !section.is_stable() {
            return Err(DesignError::InvalidParameter {
                name: "frequency",
                value: freq,
            });
        }
    }
    Ok(cascade)
}

/// Coefficients for one conjugate pole pair.
///
/// Analog prototype `1 / (s^2 + 2 sin(theta) s + 1)`, scaled to `wc`.
fn second_order_section(filter_type: ButterworthType, wc: f64, theta: f64) -> BiquadX1 {
    let wc2 = wc * wc;
    let two_sin_theta = 2.0 * theta.sin();
    let inv_d = 1.0 / (1.0 + two_sin_theta * wc + wc2);

    // Shared denominator: 1 + a1_std z^-1 + a2_std z^-2
    let a1_std = 2.0 * (wc2 - 1.0) * inv_d;
    let a2_std = (1.0 - two_sin_theta * wc + wc2) * inv_d;

    let (b0, b1, b2) = match filter_type {
        // wc^2 * (1 + 2 z^-1 + z^-2)
        ButterworthType::Lowpass => {
            let g = wc2 * inv_d;
            (g, 2.0 * g, g)
        }
        // (1 - 2 z^-1 + z^-2)
        ButterworthType::Highpass => (inv_d, -2.0 * inv_d, inv_d),
    };

    BiquadX1 {
        b0: b0 as f32,
        b1: b1 as f32,
        b2: b2 as f32,
        a1: -a1_std as f32,
        a2: -a2_std as f32,
    }
}

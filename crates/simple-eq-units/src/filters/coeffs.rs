// SPDX-License-Identifier: LGPL-3.0-or-later

//! Peak (bell) coefficient design from the RBJ Audio EQ Cookbook.
//!
//! Design math runs in `f64`; the result is rounded to the `f32` storage
//! of [`BiquadX1`]. `a1` and `a2` come out **pre-negated** relative to the
//! cookbook formulas, matching the processing loop in
//! [`simple_eq_lib::filters`].

use std::f64::consts::PI;

use simple_eq_lib::types::BiquadX1;

use crate::error::{DesignError, check_frequency};
use crate::settings::ChainSettings;
use crate::units::db_to_gain;

/// Design a peaking equalizer section.
///
/// # Parameters
///
/// - `freq` -- center frequency in Hz, in `(0, sample_rate / 2)`
/// - `q` -- quality factor (must be > 0)
/// - `gain_db` -- gain at the center frequency in dB
/// - `sample_rate` -- sample rate in Hz
///
/// The gain is converted to a linear amplitude ratio first; the magnitude
/// at `freq` equals that ratio. Center frequencies so low that the
/// rounded section is no longer stable are rejected.
pub fn design_peak(
    freq: f64,
    q: f64,
    gain_db: f64,
    sample_rate: f64,
) -> Result<BiquadX1, DesignError> {
    check_frequency(freq, sample_rate)?;
    if !(q.is_finite() && q > 0.0) {
        return Err(DesignError::InvalidParameter {
            name: "Q",
            value: q,
        });
    }
    if !gain_db.is_finite() {
        return Err(DesignError::InvalidParameter {
            name: "gain",
            value: gain_db,
        });
    }

    let w0 = 2.0 * PI * freq / sample_rate;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);
    let a_lin = db_to_gain(gain_db).sqrt();

    let b0 = 1.0 + alpha * a_lin;
    let b1 = -2.0 * cos_w0;
    let b2 = 1.0 - alpha * a_lin;
    let a0 = 1.0 + alpha / a_lin;
    let a1_std = -2.0 * cos_w0;
    let a2_std = 1.0 - alpha / a_lin;

    let inv_a0 = 1.0 / a0;
    let section = BiquadX1 {
        b0: (b0 * inv_a0) as f32,
        b1: (b1 * inv_a0) as f32,
        b2: (b2 * inv_a0) as f32,
        a1: (-a1_std * inv_a0) as f32,
        a2: (-a2_std * inv_a0) as f32,
    };
    if !section.is_stable() {
        return Err(DesignError::InvalidParameter {
            name: "frequency",
            value: freq,
        });
    }
    Ok(section)
}

/// Design the peak section for a settings snapshot.
pub fn design_peak_filter(
    settings: &ChainSettings,
    sample_rate: f64,
) -> Result<BiquadX1, DesignError> {
    design_peak(
        f64::from(settings.peak_freq),
        f64::from(settings.peak_quality),
        f64::from(settings.peak_gain_db),
        sample_rate,
    )
}

// SPDX-License-Identifier: LGPL-3.0-or-later

//! Gain / decibel conversion.

/// Level reported for silence (and anything quieter).
pub const MINUS_INFINITY_DB: f64 = -100.0;

/// Convert decibels to linear gain (amplitude ratio).
///
/// # Arguments
/// * `db` - Level in decibels
///
/// # Returns
/// Linear gain; `0.0` at or below [`MINUS_INFINITY_DB`]
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    if db > MINUS_INFINITY_DB {
        10.0_f64.powf(db * 0.05)
    } else {
        0.0
    }
}

/// Convert linear gain (amplitude ratio) to decibels.
///
/// # Arguments
/// * `gain` - Linear gain (amplitude ratio)
///
/// # Returns
/// Level in decibels, floored at [`MINUS_INFINITY_DB`]
#[inline]
pub fn gain_to_db(gain: f64) -> f64 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MINUS_INFINITY_DB)
    } else {
        MINUS_INFINITY_DB
    }
}

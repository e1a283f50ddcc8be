// SPDX-License-Identifier: LGPL-3.0-or-later

//! Floating-point sanitization.
//!
//! Recursive filters decaying towards silence drift into the denormal
//! range, which is very slow on most CPUs. These helpers flush such
//! values (and NaN/infinity) to zero.

/// Sanitize a single float value: flush denormals, NaN, and infinity to zero.
#[inline]
pub fn sanitize(x: f32) -> f32 {
    if x.is_finite() && x.abs() >= f32::MIN_POSITIVE {
        x
    } else {
        0.0
    }
}

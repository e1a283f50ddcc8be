// SPDX-License-Identifier: LGPL-3.0-or-later

//! Biquad filter processing (transposed direct form II).
//!
//! **Important**: `a1` and `a2` are stored **pre-negated** compared to the
//! standard audio cookbook. The recurrence uses addition:
//! ```text
//!   s2   = b0 * x + d[0]
//!   p1   = b1 * x + a1 * s2
//!   p2   = b2 * x + a2 * s2
//!   d[0] = d[1] + p1
//!   d[1] = p2
//!   y    = s2
//! ```

use multiversion::multiversion;

use crate::types::Biquad;

/// Run one sample through a biquad section.
#[inline(always)]
pub fn biquad_tick(f: &mut Biquad, x: f32) -> f32 {
    let c = &f.coeffs;
    let d = &mut f.d;
    let s2 = c.b0 * x + d[0];
    let p1 = c.b1 * x + c.a1 * s2;
    let p2 = c.b2 * x + c.a2 * s2;
    d[0] = d[1] + p1;
    d[1] = p2;
    s2
}

/// Process audio from `src` into `dst` through a single biquad section.
///
/// Output length is `min(dst.len(), src.len())`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn biquad_process_x1(dst: &mut [f32], src: &[f32], f: &mut Biquad) {
    for (out, &inp) in dst.iter_mut().zip(src.iter()) {
        *out = biquad_tick(f, inp);
    }
}

/// Process audio in place through a single biquad section.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn biquad_process_x1_inplace(buf: &mut [f32], f: &mut Biquad) {
    for sample in buf.iter_mut() {
        *sample = biquad_tick(f, *sample);
    }
}

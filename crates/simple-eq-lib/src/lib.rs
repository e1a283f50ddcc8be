// SPDX-License-Identifier: LGPL-3.0-or-later

//! # simple-eq-lib
//!
//! Low-level DSP primitives used by `simple-eq-units` to build the
//! three-band equalizer chain. It includes:
//!
//! - **Types**: single-section biquad coefficients and delay state
//! - **Filters**: the biquad recurrence, per sample and per block
//! - **Float utilities**: denormal flushing, sanitization
//!
//! ## Design
//!
//! Block-processing functions use runtime SIMD dispatch via the
//! `multiversion` crate. Each annotated function is compiled for
//! AVX2+FMA, AVX, SSE4.1, and NEON targets; the best variant is
//! selected automatically at startup. The per-sample and per-block
//! forms evaluate the same expression tree, so they produce
//! bit-identical output.

pub mod filters;
pub mod float;
pub mod types;

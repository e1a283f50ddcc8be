// SPDX-License-Identifier: LGPL-3.0-or-later

//! # simple-eq-units
//!
//! Three-band equalizer signal chain built on top of [`simple_eq_lib`]:
//! a Butterworth low-cut bank, a parametric peak filter and a Butterworth
//! high-cut bank, run on two channels.
//!
//! - **Filters**: coefficient design, single stages, cut banks, the chain
//! - **Engine**: the stereo real-time entry point
//! - **Parameters**: the lock-free parameter store and its layout
//! - **Analyzer**: magnitude response for display, off the audio path
//!
//! ## Update protocol
//!
//! The control side writes the [`params::ParameterStore`], which raises one
//! change flag per consumer. The audio side calls
//! [`engine::EngineState::update_if_changed`] once per block: a single
//! atomic test-and-clear, then one snapshot and one batch coefficient
//! update for both channels. The [`analyzer::ResponseAnalyzer`] polls its
//! own flag and rebuilds an independent copy of the chain from the same
//! snapshot with the same design functions.

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod filters;
pub mod params;
pub mod settings;
pub mod units;

// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cut filter bank: four cascaded stages, some of them active.
//!
//! A bank always holds [`CUT_STAGES`] stages. Configuring it for a
//! [`Slope`] writes the designed sections into stages `0..slope.stages()`
//! and marks exactly those stages active; the rest keep whatever
//! coefficients and memory they had and are skipped during processing.

use crate::filters::butterworth::{Cascade, MAX_SECTIONS};
use crate::filters::stage::{BiquadStage, FilterStage};
use crate::settings::Slope;

/// Number of stages in a cut bank.
pub const CUT_STAGES: usize = MAX_SECTIONS;

/// Four-stage cut filter with per-stage activity flags.
#[derive(Debug, Clone)]
pub struct CutFilterBank<S = FilterStage> {
    stages: [S; CUT_STAGES],
    active: [bool; CUT_STAGES],
}

impl<S: BiquadStage + Default> Default for CutFilterBank<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BiquadStage + Default> CutFilterBank<S> {
    /// Create a bank with identity stages, all inactive.
    pub fn new() -> Self {
        Self {
            stages: std::array::from_fn(|_| S::default()),
            active: [false; CUT_STAGES],
        }
    }
}

impl<S: BiquadStage> CutFilterBank<S> {
    /// Apply a designed cascade for the given slope.
    ///
    /// Every stage is deactivated first; then the first `slope.stages()`
    /// stages receive their section and are activated. A cascade with
    /// fewer sections than the slope needs activates only what it has.
    pub fn configure(&mut self, cascade: &Cascade, slope: Slope) {
        self.active = [false; CUT_STAGES];
        let count = slope.stages().min(cascade.len());
        for (i, section) in cascade.sections()[..count].iter().enumerate() {
            self.stages[i].replace_coefficients(section);
            self.active[i] = true;
        }
    }

    /// Run one sample through the active stages, in index order.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let mut s = sample;
        for (stage, &active) in self.stages.iter_mut().zip(self.active.iter()) {
            if active {
                s = stage.process(s);
            }
        }
        s
    }

    /// Run a buffer through the active stages, one stage at a time.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        for (stage, &active) in self.stages.iter_mut().zip(self.active.iter()) {
            if active {
                stage.process_inplace(buf);
            }
        }
    }

    /// Product of the active stages' magnitudes at `freq` Hz.
    pub fn magnitude(&self, freq: f64, sample_rate: f64) -> f64 {
        self.stages
            .iter()
            .zip(self.active.iter())
            .filter(|(_, active)| **active)
            .map(|(stage, _)| stage.magnitude_at(freq, sample_rate))
            .product()
    }

    /// Number of active stages.
    pub fn active_stages(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    pub fn stage(&self, index: usize) -> Option<&S> {
        self.stages.get(index)
    }

    /// Zero all stage memory, active or not.
    pub fn clear(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
    }

    pub fn flush_denormals(&mut self) {
        for stage in &mut self.stages {
            stage.flush_denormals();
        }
    }
}

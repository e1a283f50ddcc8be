// SPDX-License-Identifier: LGPL-3.0-or-later

//! One channel's filter chain: low-cut bank, peak stage, high-cut bank.

use simple_eq_lib::types::BiquadX1;

use crate::error::DesignError;
use crate::filters::bank::CutFilterBank;
use crate::filters::butterworth::{Cascade, design_high_cut, design_low_cut};
use crate::filters::coeffs::design_peak_filter;
use crate::filters::stage::{BiquadStage, FilterStage};
use crate::settings::{ChainSettings, Slope};

/// Position of a section in the chain, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut,
    Peak,
    HighCut,
}

/// Coefficients designed from one settings snapshot.
///
/// Designed once and applied to every chain that must track the same
/// settings (both audio channels, the response view).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainDesign {
    pub low_cut: Result<Cascade, DesignError>,
    pub peak: Result<BiquadX1, DesignError>,
    pub high_cut: Result<Cascade, DesignError>,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl ChainDesign {
    /// Design all three sections for `settings` at `sample_rate`.
    pub fn new(settings: &ChainSettings, sample_rate: f64) -> Self {
        let design = Self {
            low_cut: design_low_cut(settings, sample_rate),
            peak: design_peak_filter(settings, sample_rate),
            high_cut: design_high_cut(settings, sample_rate),
            low_cut_slope: settings.low_cut_slope,
            high_cut_slope: settings.high_cut_slope,
            low_cut_bypassed: settings.low_cut_bypassed,
            peak_bypassed: settings.peak_bypassed,
            high_cut_bypassed: settings.high_cut_bypassed,
        };
        if let Err(e) = &design.low_cut {
            log::warn!("low cut rejected, keeping previous coefficients: {e}");
        }
        if let Err(e) = &design.peak {
            log::warn!("peak rejected, keeping previous coefficients: {e}");
        }
        if let Err(e) = &design.high_cut {
            log::warn!("high cut rejected, keeping previous coefficients: {e}");
        }
        design
    }

    /// First design error, in chain order.
    pub fn first_error(&self) -> Option<DesignError> {
        [
            self.low_cut.err(),
            self.peak.err(),
            self.high_cut.err(),
        ]
        .into_iter()
        .flatten()
        .next()
    }
}

/// Low-cut bank, then peak, then high-cut bank.
///
/// Bypass flags skip a whole section. A fresh chain is an identity.
#[derive(Debug, Clone, Default)]
pub struct ChannelChain {
    low_cut: CutFilterBank,
    peak: FilterStage,
    high_cut: CutFilterBank,
    low_cut_bypassed: bool,
    peak_bypassed: bool,
    high_cut_bypassed: bool,
}

impl ChannelChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Design and apply `settings` in one batch.
    ///
    /// See [`apply`](Self::apply).
    pub fn update(&mut self, settings: &ChainSettings, sample_rate: f64) -> Result<(), DesignError> {
        self.apply(&ChainDesign::new(settings, sample_rate))
    }

    /// Apply a batch design.
    ///
    /// Every valid section is applied and every bypass flag is set; a
    /// section whose design failed keeps its previous coefficients. Returns
    /// the first failure.
    pub fn apply(&mut self, design: &ChainDesign) -> Result<(), DesignError> {
        self.low_cut_bypassed = design.low_cut_bypassed;
        self.peak_bypassed = design.peak_bypassed;
        self.high_cut_bypassed = design.high_cut_bypassed;

        if let Ok(cascade) = &design.low_cut {
            self.low_cut.configure(cascade, design.low_cut_slope);
        }
        if let Ok(coeffs) = &design.peak {
            self.peak.replace_coefficients(coeffs);
        }
        if let Ok(cascade) = &design.high_cut {
            self.high_cut.configure(cascade, design.high_cut_slope);
        }

        match design.first_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Run one sample through the chain.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let mut s = sample;
        if !self.low_cut_bypassed {
            s = self.low_cut.process(s);
        }
        if !self.peak_bypassed {
            s = self.peak.process(s);
        }
        if !self.high_cut_bypassed {
            s = self.high_cut.process(s);
        }
        s
    }

    /// Run a block through the chain, one section at a time.
    ///
    /// Produces exactly the samples per-sample [`process`](Self::process)
    /// would.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        if !self.low_cut_bypassed {
            self.low_cut.process_inplace(buf);
        }
        if !self.peak_bypassed {
            self.peak.process_inplace(buf);
        }
        if !self.high_cut_bypassed {
            self.high_cut.process_inplace(buf);
        }
    }

    /// Linear magnitude of the non-bypassed sections at `freq` Hz.
    pub fn magnitude(&self, freq: f64, sample_rate: f64) -> f64 {
        let mut mag = 1.0;
        if !self.low_cut_bypassed {
            mag *= self.low_cut.magnitude(freq, sample_rate);
        }
        if !self.peak_bypassed {
            mag *= self.peak.magnitude_at(freq, sample_rate);
        }
        if !self.high_cut_bypassed {
            mag *= self.high_cut.magnitude(freq, sample_rate);
        }
        mag
    }

    pub fn is_bypassed(&self, position: ChainPosition) -> bool {
        match position {
            ChainPosition::LowCut => self.low_cut_bypassed,
            ChainPosition::Peak => self.peak_bypassed,
            ChainPosition::HighCut => self.high_cut_bypassed,
        }
    }

    pub fn set_bypassed(&mut self, position: ChainPosition, bypassed: bool) {
        match position {
            ChainPosition::LowCut => self.low_cut_bypassed = bypassed,
            ChainPosition::Peak => self.peak_bypassed = bypassed,
            ChainPosition::HighCut => self.high_cut_bypassed = bypassed,
        }
    }

    pub fn low_cut(&self) -> &CutFilterBank {
        &self.low_cut
    }

    pub fn peak(&self) -> &FilterStage {
        &self.peak
    }

    pub fn high_cut(&self) -> &CutFilterBank {
        &self.high_cut
    }

    /// Zero all delay memory, keeping coefficients.
    pub fn clear(&mut self) {
        self.low_cut.clear();
        self.peak.clear();
        self.high_cut.clear();
    }

    pub fn flush_denormals(&mut self) {
        self.low_cut.flush_denormals();
        self.peak.flush_denormals();
        self.high_cut.flush_denormals();
    }
}

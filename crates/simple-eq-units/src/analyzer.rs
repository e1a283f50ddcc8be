// SPDX-License-Identifier: LGPL-3.0-or-later

//! Magnitude response of the current settings, for display.
//!
//! The analyzer owns its own [`ChannelChain`], built from the same
//! snapshot and the same design functions as the audio chains, so the
//! curve it reports matches what is heard. It never touches audio state.

use crate::error::DesignError;
use crate::filters::chain::ChannelChain;
use crate::params::{Consumer, ParameterStore, get_chain_settings};
use crate::settings::ChainSettings;
use crate::units::gain_to_db;

/// Lowest frequency of the display axis in Hz.
pub const RESPONSE_MIN_FREQ: f64 = 20.0;

/// Highest frequency of the display axis in Hz.
pub const RESPONSE_MAX_FREQ: f64 = 20000.0;

/// Display range in dB, symmetric around 0 dB.
pub const RESPONSE_RANGE_DB: f64 = 24.0;

/// Map a proportion in `[0, 1]` onto a logarithmic `[min, max]` axis.
pub fn map_to_log10(proportion: f64, min: f64, max: f64) -> f64 {
    let log_min = min.log10();
    let log_max = max.log10();
    10.0_f64.powf(log_min + proportion * (log_max - log_min))
}

/// Inverse of [`map_to_log10`].
pub fn map_from_log10(value: f64, min: f64, max: f64) -> f64 {
    (value / min).log10() / (max / min).log10()
}

/// `points` log-spaced frequencies from `min` to `max`, both included.
pub fn log_frequency_axis(points: usize, min: f64, max: f64) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![min],
        n => (0..n)
            .map(|i| map_to_log10(i as f64 / (n - 1) as f64, min, max))
            .collect(),
    }
}

/// Map a level in dB linearly from `[min_db, max_db]` onto `[bottom, top]`.
///
/// Not clamped. A screen curve passes `bottom > top` since y grows
/// downwards.
pub fn db_to_display(db: f64, min_db: f64, max_db: f64, bottom: f64, top: f64) -> f64 {
    bottom + (db - min_db) / (max_db - min_db) * (top - bottom)
}

/// Response view over an independent copy of the chain.
#[derive(Debug, Clone)]
pub struct ResponseAnalyzer {
    chain: ChannelChain,
    sample_rate: f64,
    settings: Option<ChainSettings>,
}

impl ResponseAnalyzer {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            chain: ChannelChain::new(),
            sample_rate,
            settings: None,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Change the sample rate and redesign from the last settings.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<(), DesignError> {
        self.sample_rate = sample_rate;
        match self.settings {
            Some(settings) => self.chain.update(&settings, sample_rate),
            None => Ok(()),
        }
    }

    /// Rebuild the view chain from `settings`.
    pub fn update(&mut self, settings: &ChainSettings) -> Result<(), DesignError> {
        self.settings = Some(*settings);
        self.chain.update(settings, self.sample_rate)
    }

    /// Rebuild if the view change flag was raised.
    ///
    /// Returns true when the chain was rebuilt.
    pub fn poll(&mut self, store: &ParameterStore) -> bool {
        if !store.take_changed(Consumer::View) {
            return false;
        }
        let _ = self.update(&get_chain_settings(store));
        true
    }

    /// Settings the view chain was last built from.
    pub fn settings(&self) -> Option<&ChainSettings> {
        self.settings.as_ref()
    }

    pub fn chain(&self) -> &ChannelChain {
        &self.chain
    }

    /// Linear magnitude at `freq` Hz.
    pub fn magnitude(&self, freq: f64) -> f64 {
        self.chain.magnitude(freq, self.sample_rate)
    }

    /// Magnitude at `freq` Hz in dB.
    ///
    /// `20 * log10(magnitude)`, floored at
    /// [`MINUS_INFINITY_DB`](crate::units::MINUS_INFINITY_DB) so deep
    /// stopbands and exact zeros never yield `-inf`.
    pub fn magnitude_db(&self, freq: f64) -> f64 {
        gain_to_db(self.magnitude(freq))
    }

    /// Fill `out` with the dB magnitude at each of `freqs`.
    ///
    /// Only the shorter of the two slices is processed.
    pub fn magnitudes_db(&self, freqs: &[f64], out: &mut [f64]) {
        for (db, &f) in out.iter_mut().zip(freqs) {
            *db = self.magnitude_db(f);
        }
    }

    /// `(frequency, dB)` pairs over the display axis.
    pub fn response_curve(&self, points: usize) -> Vec<(f64, f64)> {
        log_frequency_axis(points, RESPONSE_MIN_FREQ, RESPONSE_MAX_FREQ)
            .into_iter()
            .map(|f| (f, self.magnitude_db(f)))
            .collect()
    }
}

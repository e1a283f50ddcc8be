// SPDX-License-Identifier: LGPL-3.0-or-later

//! User-facing equalizer settings.

/// Cut filter steepness.
///
/// Each step adds one cascaded second-order section (12 dB/octave).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slope {
    /// 12 dB/octave, Butterworth order 2.
    #[default]
    Db12,
    /// 24 dB/octave, Butterworth order 4.
    Db24,
    /// 36 dB/octave, Butterworth order 6.
    Db36,
    /// 48 dB/octave, Butterworth order 8.
    Db48,
}

impl Slope {
    /// All slopes, in index order.
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Slope for a choice index, clamped to the valid range.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Nearest slope to a rolloff in dB/octave.
    pub fn from_db_per_octave(db: u32) -> Self {
        let index = (db.saturating_sub(6) / 12) as usize;
        Self::from_index(index)
    }

    /// Choice index (0..=3).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of active cut stages.
    pub fn stages(self) -> usize {
        self.index() + 1
    }

    /// Butterworth filter order.
    pub fn order(self) -> usize {
        self.stages() * 2
    }

    /// Rolloff in dB/octave.
    pub fn db_per_octave(self) -> u32 {
        self.stages() as u32 * 12
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Slope::Db12 => "12 dB/Oct",
            Slope::Db24 => "24 dB/Oct",
            Slope::Db36 => "36 dB/Oct",
            Slope::Db48 => "48 dB/Oct",
        }
    }
}

/// Snapshot of every parameter the chain depends on.
///
/// Taken once per update so that both channels and the response view see
/// the same values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl Default for ChainSettings {
    /// Parameter layout defaults: both cuts wide open, flat peak.
    fn default() -> Self {
        Self {
            peak_freq: 10000.0,
            peak_gain_db: 0.0,
            peak_quality: 1.0,
            low_cut_freq: 20.0,
            high_cut_freq: 20000.0,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

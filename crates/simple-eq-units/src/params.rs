// SPDX-License-Identifier: LGPL-3.0-or-later

//! Parameter layout and the lock-free parameter store.
//!
//! Values are kept as `f32` bits in atomics, so the control side can
//! write while the audio side reads without locking. Every effective
//! change raises one flag per [`Consumer`]; each consumer clears its own
//! flag with a single test-and-clear and then takes a snapshot with
//! [`get_chain_settings`].

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::settings::{ChainSettings, Slope};

/// Value range of one parameter.
///
/// Normalization follows a skewed mapping:
/// `normalized = ((v - min) / (max - min)) ^ skew`. A skew below 1 spends
/// more of the normalized range on the low end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    /// Snapping step; `0.0` for continuous.
    pub interval: f32,
    pub skew: f32,
    pub default: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32, interval: f32, skew: f32, default: f32) -> Self {
        Self {
            min,
            max,
            interval,
            skew,
            default,
        }
    }

    /// Clamp to `[min, max]`.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Snap to the nearest legal value (interval grid, clamped).
    pub fn snap(&self, value: f32) -> f32 {
        let v = self.clamp(value);
        if self.interval > 0.0 {
            self.clamp(self.min + self.interval * ((v - self.min) / self.interval).round())
        } else {
            v
        }
    }

    /// Map a plain value to `[0, 1]`.
    pub fn convert_to_normalized(&self, value: f32) -> f32 {
        let proportion = ((self.clamp(value) - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    /// Map a normalized `[0, 1]` value back to the plain range.
    pub fn convert_from_normalized(&self, normalized: f32) -> f32 {
        let mut proportion = normalized.clamp(0.0, 1.0);
        if self.skew != 1.0 && proportion > 0.0 {
            proportion = (proportion.ln() / self.skew).exp();
        }
        self.min + (self.max - self.min) * proportion
    }
}

/// Frequency range shared by the three frequency parameters.
const fn frequency_range(default: f32) -> ParamRange {
    ParamRange::new(20.0, 20000.0, 1.0, 0.25, default)
}

const SLOPE_RANGE: ParamRange = ParamRange::new(0.0, 3.0, 1.0, 1.0, 0.0);
const BOOL_RANGE: ParamRange = ParamRange::new(0.0, 1.0, 1.0, 1.0, 0.0);

/// Kind of value a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    /// Index into [`Slope::ALL`].
    Choice,
    Bool,
}

/// Every parameter of the equalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    LowCutFreq,
    HighCutFreq,
    PeakFreq,
    PeakGain,
    PeakQuality,
    LowCutSlope,
    HighCutSlope,
    LowCutBypassed,
    PeakBypassed,
    HighCutBypassed,
}

/// Number of parameters.
pub const PARAM_COUNT: usize = 10;

impl ParamId {
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::LowCutFreq,
        ParamId::HighCutFreq,
        ParamId::PeakFreq,
        ParamId::PeakGain,
        ParamId::PeakQuality,
        ParamId::LowCutSlope,
        ParamId::HighCutSlope,
        ParamId::LowCutBypassed,
        ParamId::PeakBypassed,
        ParamId::HighCutBypassed,
    ];

    /// Stable string identifier (also the display name).
    pub fn id(self) -> &'static str {
        match self {
            ParamId::LowCutFreq => "LowCut Freq",
            ParamId::HighCutFreq => "HighCut Freq",
            ParamId::PeakFreq => "Peak Freq",
            ParamId::PeakGain => "Peak Gain",
            ParamId::PeakQuality => "Peak Q",
            ParamId::LowCutSlope => "LowCut Slope",
            ParamId::HighCutSlope => "HighCut Slope",
            ParamId::LowCutBypassed => "LowCut Bypassed",
            ParamId::PeakBypassed => "Peak Bypassed",
            ParamId::HighCutBypassed => "HighCut Bypassed",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn kind(self) -> ParamKind {
        match self {
            ParamId::LowCutSlope | ParamId::HighCutSlope => ParamKind::Choice,
            ParamId::LowCutBypassed | ParamId::PeakBypassed | ParamId::HighCutBypassed => {
                ParamKind::Bool
            }
            _ => ParamKind::Float,
        }
    }

    pub fn range(self) -> ParamRange {
        match self {
            ParamId::LowCutFreq => frequency_range(20.0),
            ParamId::HighCutFreq => frequency_range(20000.0),
            ParamId::PeakFreq => frequency_range(10000.0),
            ParamId::PeakGain => ParamRange::new(-24.0, 24.0, 0.5, 1.0, 0.0),
            ParamId::PeakQuality => ParamRange::new(0.1, 10.0, 0.05, 1.0, 1.0),
            ParamId::LowCutSlope | ParamId::HighCutSlope => SLOPE_RANGE,
            ParamId::LowCutBypassed | ParamId::PeakBypassed | ParamId::HighCutBypassed => {
                BOOL_RANGE
            }
        }
    }

    /// Unit suffix for display.
    pub fn unit(self) -> &'static str {
        match self {
            ParamId::LowCutFreq | ParamId::HighCutFreq | ParamId::PeakFreq => "Hz",
            ParamId::PeakGain => "dB",
            _ => "",
        }
    }

    /// Human-readable value.
    pub fn display(self, value: f32) -> String {
        match self.kind() {
            ParamKind::Choice => Slope::from_index(value.max(0.0) as usize)
                .label()
                .to_string(),
            ParamKind::Bool => (if value >= 0.5 { "Bypassed" } else { "Active" }).to_string(),
            ParamKind::Float => match self {
                ParamId::LowCutFreq | ParamId::HighCutFreq | ParamId::PeakFreq => {
                    format_frequency(value)
                }
                ParamId::PeakQuality => format!("{value:.2}"),
                _ => format!("{value:.1} {}", self.unit()),
            },
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Format a frequency as `"440 Hz"` or `"2.50 kHz"`.
pub fn format_frequency(hz: f32) -> String {
    if hz >= 1000.0 {
        format!("{:.2} kHz", hz / 1000.0)
    } else {
        format!("{hz:.0} Hz")
    }
}

/// Reader of the change flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumer {
    /// Real-time processing.
    Audio,
    /// Response display.
    View,
}

/// Lock-free store of every parameter value.
#[derive(Debug)]
pub struct ParameterStore {
    values: [AtomicU32; PARAM_COUNT],
    changed: [AtomicBool; 2],
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    /// Store holding every default. Both change flags start raised so each
    /// consumer builds its first chain.
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicU32::new(ParamId::ALL[i].range().default.to_bits())),
            changed: [AtomicBool::new(true), AtomicBool::new(true)],
        }
    }

    /// Write a plain value.
    ///
    /// The value is snapped to its range (nearest slope index, 0/1 for
    /// bools). Non-finite values are ignored. Returns true and raises both
    /// change flags when the stored value changed.
    pub fn set(&self, id: ParamId, value: f32) -> bool {
        if !value.is_finite() {
            log::warn!("ignoring non-finite value for {}", id.id());
            return false;
        }
        let snapped = id.range().snap(value);
        let old = self.values[id.index()].swap(snapped.to_bits(), Ordering::AcqRel);
        if old == snapped.to_bits() {
            return false;
        }
        log::trace!("{} = {}", id.id(), id.display(snapped));
        for flag in &self.changed {
            flag.store(true, Ordering::Release);
        }
        true
    }

    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Acquire))
    }

    pub fn set_bool(&self, id: ParamId, value: bool) -> bool {
        self.set(id, if value { 1.0 } else { 0.0 })
    }

    pub fn get_bool(&self, id: ParamId) -> bool {
        self.get(id) >= 0.5
    }

    pub fn set_slope(&self, id: ParamId, slope: Slope) -> bool {
        self.set(id, slope.index() as f32)
    }

    pub fn get_slope(&self, id: ParamId) -> Slope {
        Slope::from_index(self.get(id).max(0.0) as usize)
    }

    /// Write a normalized `[0, 1]` value.
    pub fn set_normalized(&self, id: ParamId, normalized: f32) -> bool {
        if !normalized.is_finite() {
            return false;
        }
        self.set(id, id.range().convert_from_normalized(normalized))
    }

    pub fn get_normalized(&self, id: ParamId) -> f32 {
        id.range().convert_to_normalized(self.get(id))
    }

    /// Test-and-clear the change flag of `consumer`.
    pub fn take_changed(&self, consumer: Consumer) -> bool {
        self.changed[consumer as usize].swap(false, Ordering::AcqRel)
    }

    /// Raise the change flag of `consumer` without changing any value.
    pub fn mark_changed(&self, consumer: Consumer) {
        self.changed[consumer as usize].store(true, Ordering::Release);
    }
}

/// Snapshot the store into chain settings.
pub fn get_chain_settings(store: &ParameterStore) -> ChainSettings {
    ChainSettings {
        peak_freq: store.get(ParamId::PeakFreq),
        peak_gain_db: store.get(ParamId::PeakGain),
        peak_quality: store.get(ParamId::PeakQuality),
        low_cut_freq: store.get(ParamId::LowCutFreq),
        high_cut_freq: store.get(ParamId::HighCutFreq),
        low_cut_slope: store.get_slope(ParamId::LowCutSlope),
        high_cut_slope: store.get_slope(ParamId::HighCutSlope),
        low_cut_bypassed: store.get_bool(ParamId::LowCutBypassed),
        peak_bypassed: store.get_bool(ParamId::PeakBypassed),
        high_cut_bypassed: store.get_bool(ParamId::HighCutBypassed),
    }
}

// SPDX-License-Identifier: LGPL-3.0-or-later

//! Stereo equalizer engine.
//!
//! Two [`ChannelChain`]s fed from one coefficient design per update, so
//! both channels always carry identical coefficients. Nothing here
//! allocates or blocks; the engine is meant to be driven from the real-time
//! thread.

use crate::error::DesignError;
use crate::filters::chain::{ChainDesign, ChannelChain};
use crate::params::{Consumer, ParameterStore, get_chain_settings};
use crate::settings::ChainSettings;

/// Audio channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

/// Processing state for a stereo stream.
#[derive(Debug, Clone)]
pub struct EngineState {
    left: ChannelChain,
    right: ChannelChain,
    sample_rate: f64,
}

impl EngineState {
    /// Create an engine with identity chains.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            left: ChannelChain::new(),
            right: ChannelChain::new(),
            sample_rate,
        }
    }

    /// (Re)start at `sample_rate`: clears all filter memory.
    ///
    /// Coefficients are not redesigned; call [`update`](Self::update)
    /// afterwards.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.left.clear();
        self.right.clear();
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Design once from `settings` and apply to both channels.
    pub fn update(&mut self, settings: &ChainSettings) -> Result<(), DesignError> {
        let design = ChainDesign::new(settings, self.sample_rate);
        let res = self.left.apply(&design);
        let right = self.right.apply(&design);
        debug_assert_eq!(res, right);
        log::debug!("committed chain at {} Hz", self.sample_rate);
        log::trace!("{settings:?}");
        res
    }

    /// Update from the store if the audio change flag was raised.
    ///
    /// Returns true when an update was performed. Design failures have
    /// already been logged and leave the affected sections unchanged.
    pub fn update_if_changed(&mut self, store: &ParameterStore) -> bool {
        if !store.take_changed(Consumer::Audio) {
            return false;
        }
        let _ = self.update(&get_chain_settings(store));
        true
    }

    /// Process one block of split channels in place.
    ///
    /// Frames beyond the shorter of the two slices are left untouched.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let n = left.len().min(right.len());
        self.left.process_inplace(&mut left[..n]);
        self.right.process_inplace(&mut right[..n]);
        self.flush_denormals();
    }

    /// Process one block of interleaved stereo frames in place.
    ///
    /// A trailing half frame is left untouched.
    pub fn process_interleaved(&mut self, frames: &mut [f32]) {
        for frame in frames.chunks_exact_mut(2) {
            frame[0] = self.left.process(frame[0]);
            frame[1] = self.right.process(frame[1]);
        }
        self.flush_denormals();
    }

    /// Process a single stereo frame.
    #[inline]
    pub fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.left.process(left), self.right.process(right))
    }

    pub fn chain(&self, channel: Channel) -> &ChannelChain {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    /// Flush denormal filter memory on both channels.
    pub fn flush_denormals(&mut self) {
        self.left.flush_denormals();
        self.right.flush_denormals();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::stage::BiquadStage;
    use crate::params::ParamId;
    use crate::settings::Slope;

    const SR: f64 = 48000.0;

    fn shaped() -> ChainSettings {
        ChainSettings {
            low_cut_freq: 120.0,
            low_cut_slope: Slope::Db36,
            high_cut_freq: 9000.0,
            high_cut_slope: Slope::Db24,
            peak_freq: 1500.0,
            peak_gain_db: -4.5,
            peak_quality: 2.0,
            ..ChainSettings::default()
        }
    }

    fn noise(len: usize, seed: u32) -> Vec<f32> {
        let mut s = seed;
        (0..len)
            .map(|_| {
                s = s.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (s >> 8) as f32 / (1u32 << 23) as f32 - 1.0
            })
            .collect()
    }

    #[test]
    fn channels_share_coefficients() {
        let mut engine = EngineState::new(SR);
        engine.update(&shaped()).unwrap();
        let l = engine.chain(Channel::Left);
        let r = engine.chain(Channel::Right);
        for f in [50.0, 1500.0, 12000.0] {
            assert_eq!(l.magnitude(f, SR), r.magnitude(f, SR));
        }
        assert_eq!(l.peak().coefficients(), r.peak().coefficients());
    }

    #[test]
    fn interleaved_matches_split() {
        let mut a = EngineState::new(SR);
        let mut b = EngineState::new(SR);
        a.update(&shaped()).unwrap();
        b.update(&shaped()).unwrap();

        let mut left = noise(512, 1);
        let mut right = noise(512, 2);
        let mut interleaved: Vec<f32> = left
            .iter()
            .zip(right.iter())
            .flat_map(|(&l, &r)| [l, r])
            .collect();

        a.process(&mut left, &mut right);
        b.process_interleaved(&mut interleaved);

        for i in 0..512 {
            assert_eq!(interleaved[2 * i], left[i], "left frame {i}");
            assert_eq!(interleaved[2 * i + 1], right[i], "right frame {i}");
        }
    }

    #[test]
    fn per_frame_matches_block() {
        let mut a = EngineState::new(SR);
        let mut b = EngineState::new(SR);
        a.update(&shaped()).unwrap();
        b.update(&shaped()).unwrap();

        let mut left = noise(256, 5);
        let mut right = noise(256, 6);
        let frames: Vec<(f32, f32)> = left.iter().copied().zip(right.iter().copied()).collect();
        a.process(&mut left, &mut right);

        for (i, (l, r)) in frames.into_iter().enumerate() {
            let (ol, or) = b.process_frame(l, r);
            assert_eq!(ol, left[i], "left frame {i}");
            assert_eq!(or, right[i], "right frame {i}");
        }
    }

    #[test]
    fn channels_are_independent() {
        let mut engine = EngineState::new(SR);
        engine.update(&shaped()).unwrap();
        let mut left = noise(256, 7);
        let mut right = vec![0.0; 256];
        engine.process(&mut left, &mut right);
        assert!(right.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn update_if_changed_consumes_audio_flag() {
        let store = ParameterStore::new();
        let mut engine = EngineState::new(SR);
        assert!(engine.update_if_changed(&store));
        assert!(!engine.update_if_changed(&store));

        store.set(ParamId::PeakFreq, 1000.0);
        store.set(ParamId::PeakGain, 6.0);
        assert!(engine.update_if_changed(&store));
        let db = 20.0 * engine.chain(Channel::Left).magnitude(1000.0, SR).log10();
        assert!((db - 6.0).abs() < 0.1, "got {db:.3}");
        // The view flag is untouched
        assert!(store.take_changed(Consumer::View));
    }

    #[test]
    fn prepare_clears_memory() {
        let mut engine = EngineState::new(SR);
        engine.update(&shaped()).unwrap();
        let mut left = vec![1.0; 128];
        let mut right = vec![1.0; 128];
        engine.process(&mut left, &mut right);
        engine.prepare(44100.0);
        assert_eq!(engine.sample_rate(), 44100.0);
        assert_eq!(engine.chain(Channel::Left).peak().state(), [0.0, 0.0]);
    }

    #[test]
    fn mismatched_split_lengths_use_shorter() {
        let mut engine = EngineState::new(SR);
        engine.update(&shaped()).unwrap();
        let mut left = vec![0.5; 8];
        let mut right = vec![0.5; 4];
        engine.process(&mut left, &mut right);
        assert!(left[4..].iter().all(|&x| x == 0.5));
    }

    #[test]
    fn silence_decays_without_denormals() {
        let mut engine = EngineState::new(SR);
        engine.update(&shaped()).unwrap();
        let mut left = noise(64, 3);
        let mut right = noise(64, 4);
        engine.process(&mut left, &mut right);
        for _ in 0..2000 {
            let mut l = vec![0.0; 64];
            let mut r = vec![0.0; 64];
            engine.process(&mut l, &mut r);
        }
        let d = engine.chain(Channel::Left).peak().state();
        assert!(d.iter().all(|x| *x == 0.0 || x.is_normal()), "{d:?}");
    }
}

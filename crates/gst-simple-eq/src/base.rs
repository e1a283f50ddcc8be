// SPDX-License-Identifier: LGPL-3.0-or-later

//! Caps and pad templates for the equalizer element.
//!
//! The element is an `AudioFilter` working in place on interleaved stereo
//! f32 buffers.

use once_cell::sync::Lazy;

/// Number of channels the equalizer processes.
pub const CHANNELS: i32 = 2;

/// Interleaved stereo f32 caps.
///
/// Use this in [`AudioFilterImpl::allowed_caps`] and
/// [`ElementImpl::pad_templates`] to avoid duplicating the caps builder.
pub static F32_STEREO_CAPS: Lazy<gstreamer::Caps> = Lazy::new(|| {
    gstreamer_audio::AudioCapsBuilder::new_interleaved()
        .format(gstreamer_audio::AUDIO_FORMAT_F32)
        .channels(CHANNELS)
        .build()
});

/// Create the src + sink pad templates for the in-place stereo filter.
pub fn stereo_pad_templates() -> Vec<gstreamer::PadTemplate> {
    let caps = &*F32_STEREO_CAPS;

    let src = gstreamer::PadTemplate::new(
        "src",
        gstreamer::PadDirection::Src,
        gstreamer::PadPresence::Always,
        caps,
    )
    .expect("failed to create src pad template");

    let sink = gstreamer::PadTemplate::new(
        "sink",
        gstreamer::PadDirection::Sink,
        gstreamer::PadPresence::Always,
        caps,
    )
    .expect("failed to create sink pad template");

    vec![src, sink]
}

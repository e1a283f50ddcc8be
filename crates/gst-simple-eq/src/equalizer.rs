// SPDX-License-Identifier: LGPL-3.0-or-later

//! GStreamer element wrapping [`simple_eq_units::engine::EngineState`].
//!
//! Provides the three-band equalizer as a GStreamer `AudioFilter` /
//! `BaseTransform` element working in place on interleaved stereo f32.
//!
//! Equalizer parameters live in a lock-free [`ParameterStore`]; property
//! writes go straight to the store and the streaming thread commits them
//! at the start of the next buffer. A [`ResponseAnalyzer`] mirrors the
//! chain for the `simple-eq-response` element message.

use gstreamer::glib;
use gstreamer::prelude::*;
use gstreamer::subclass::prelude::*;
use gstreamer_audio::subclass::prelude::*;

use simple_eq_units::analyzer::ResponseAnalyzer;
use simple_eq_units::engine::EngineState;
use simple_eq_units::params::{Consumer, ParamId, ParamKind, ParameterStore, get_chain_settings};
use simple_eq_units::settings::Slope;

use crate::base;
use once_cell::sync::Lazy;
use std::sync::Mutex;

static CAT: Lazy<gstreamer::DebugCategory> = Lazy::new(|| {
    gstreamer::DebugCategory::new(
        "simpleeq",
        gstreamer::DebugColorFlags::empty(),
        Some("Three-band equalizer"),
    )
});

/// Name of the element message carrying the magnitude response.
pub const RESPONSE_MESSAGE: &str = "simple-eq-response";

/// Default number of points on the response axis.
const DEFAULT_RESPONSE_POINTS: u32 = 128;
/// Largest accepted response axis.
const MAX_RESPONSE_POINTS: u32 = 4096;

// ── Property name constants ────────────────────────────────────────

const PROP_POST_RESPONSE: &str = "post-response";
const PROP_RESPONSE_POINTS: &str = "response-points";

/// GObject property name for every equalizer parameter.
const PARAM_PROPS: [(&str, ParamId); 10] = [
    ("lowcut-freq", ParamId::LowCutFreq),
    ("highcut-freq", ParamId::HighCutFreq),
    ("peak-freq", ParamId::PeakFreq),
    ("peak-gain", ParamId::PeakGain),
    ("peak-q", ParamId::PeakQuality),
    ("lowcut-slope", ParamId::LowCutSlope),
    ("highcut-slope", ParamId::HighCutSlope),
    ("lowcut-bypassed", ParamId::LowCutBypassed),
    ("peak-bypassed", ParamId::PeakBypassed),
    ("highcut-bypassed", ParamId::HighCutBypassed),
];

fn param_for_property(name: &str) -> Option<ParamId> {
    PARAM_PROPS
        .iter()
        .find(|(prop, _)| *prop == name)
        .map(|(_, id)| *id)
}

/// Blurb shown by `gst-inspect`.
fn param_blurb(id: ParamId) -> &'static str {
    match id {
        ParamId::LowCutFreq => "Low cut (highpass) cutoff in Hz",
        ParamId::HighCutFreq => "High cut (lowpass) cutoff in Hz",
        ParamId::PeakFreq => "Peak filter center frequency in Hz",
        ParamId::PeakGain => "Peak filter gain in dB",
        ParamId::PeakQuality => "Peak filter quality factor",
        ParamId::LowCutSlope => "Low cut slope in dB/octave (12, 24, 36 or 48)",
        ParamId::HighCutSlope => "High cut slope in dB/octave (12, 24, 36 or 48)",
        ParamId::LowCutBypassed => "Bypass the low cut filter",
        ParamId::PeakBypassed => "Bypass the peak filter",
        ParamId::HighCutBypassed => "Bypass the high cut filter",
    }
}

fn param_spec(prop: &str, id: ParamId) -> glib::ParamSpec {
    let range = id.range();
    match id.kind() {
        ParamKind::Float => glib::ParamSpecFloat::builder(prop)
            .nick(id.id())
            .blurb(param_blurb(id))
            .minimum(range.min)
            .maximum(range.max)
            .default_value(range.default)
            .mutable_playing()
            .build(),
        ParamKind::Choice => glib::ParamSpecUInt::builder(prop)
            .nick(id.id())
            .blurb(param_blurb(id))
            .minimum(Slope::Db12.db_per_octave())
            .maximum(Slope::Db48.db_per_octave())
            .default_value(Slope::from_index(range.default as usize).db_per_octave())
            .mutable_playing()
            .build(),
        ParamKind::Bool => glib::ParamSpecBoolean::builder(prop)
            .nick(id.id())
            .blurb(param_blurb(id))
            .default_value(range.default >= 0.5)
            .mutable_playing()
            .build(),
    }
}

// ── Element settings and streaming state ───────────────────────────

/// Element-level (non-equalizer) settings.
#[derive(Debug, Clone)]
struct ElementSettings {
    post_response: bool,
    response_points: u32,
}

impl Default for ElementSettings {
    fn default() -> Self {
        Self {
            post_response: false,
            response_points: DEFAULT_RESPONSE_POINTS,
        }
    }
}

/// Streaming state, present between `setup` and `stop`.
struct State {
    engine: EngineState,
}

impl State {
    fn new(sample_rate: f64, params: &ParameterStore) -> Self {
        let mut engine = EngineState::new(sample_rate);
        // Clear first: a write racing the snapshot raises the flag again
        let _ = params.take_changed(Consumer::Audio);
        if let Err(e) = engine.update(&get_chain_settings(params)) {
            gstreamer::warning!(CAT, "initial design rejected: {e}");
        }
        Self { engine }
    }
}

// ── Element definition ─────────────────────────────────────────────

/// GStreamer three-band equalizer element backed by `simple_eq_units`.
#[derive(Default)]
pub struct SimpleEq {
    params: ParameterStore,
    settings: Mutex<ElementSettings>,
    state: Mutex<Option<State>>,
    analyzer: Mutex<Option<ResponseAnalyzer>>,
}

#[glib::object_subclass]
impl ObjectSubclass for SimpleEq {
    const NAME: &'static str = "SimpleEq";
    type Type = super::SimpleEq;
    type ParentType = gstreamer_audio::AudioFilter;
}

impl SimpleEq {
    /// Rebuild the response view if parameters changed and post it.
    ///
    /// `force` posts even without a change (e.g. when posting is switched
    /// on).
    fn refresh_response(&self, force: bool) {
        let settings = self.settings.lock().expect("mutex poisoned").clone();

        let message = {
            let mut analyzer = self.analyzer.lock().expect("mutex poisoned");
            let Some(analyzer) = analyzer.as_mut() else {
                return;
            };
            let rebuilt = analyzer.poll(&self.params);
            if !settings.post_response || !(rebuilt || force) {
                return;
            }
            self.response_message(analyzer, settings.response_points as usize)
        };

        // Posted without holding any lock: sync bus handlers may call back
        if self.obj().post_message(message).is_err() {
            gstreamer::log!(CAT, imp = self, "no bus to post the response on");
        }
    }

    fn response_message(&self, analyzer: &ResponseAnalyzer, points: usize) -> gstreamer::Message {
        let curve = analyzer.response_curve(points);
        let frequencies =
            gstreamer::Array::from_values(curve.iter().map(|(f, _)| f.to_send_value()));
        let magnitudes =
            gstreamer::Array::from_values(curve.iter().map(|(_, db)| db.to_send_value()));
        let structure = gstreamer::Structure::builder(RESPONSE_MESSAGE)
            .field("frequencies", frequencies)
            .field("magnitudes", magnitudes)
            .build();
        gstreamer::message::Element::builder(structure)
            .src(&*self.obj())
            .build()
    }
}

impl ObjectImpl for SimpleEq {
    fn properties() -> &'static [glib::ParamSpec] {
        static PROPERTIES: Lazy<Vec<glib::ParamSpec>> = Lazy::new(|| {
            let mut props: Vec<glib::ParamSpec> = PARAM_PROPS
                .iter()
                .map(|(prop, id)| param_spec(prop, *id))
                .collect();
            props.push(
                glib::ParamSpecBoolean::builder(PROP_POST_RESPONSE)
                    .nick("Post Response")
                    .blurb("Post a simple-eq-response element message after every change")
                    .default_value(false)
                    .mutable_playing()
                    .build(),
            );
            props.push(
                glib::ParamSpecUInt::builder(PROP_RESPONSE_POINTS)
                    .nick("Response Points")
                    .blurb("Number of log-spaced frequencies in the response message")
                    .minimum(2)
                    .maximum(MAX_RESPONSE_POINTS)
                    .default_value(DEFAULT_RESPONSE_POINTS)
                    .mutable_playing()
                    .build(),
            );
            props
        });
        PROPERTIES.as_ref()
    }

    fn set_property(&self, _id: usize, value: &glib::Value, pspec: &glib::ParamSpec) {
        let name = pspec.name();
        match name {
            PROP_POST_RESPONSE => {
                let post: bool = value.get().expect("type checked");
                self.settings.lock().expect("mutex poisoned").post_response = post;
                self.refresh_response(post);
            }
            PROP_RESPONSE_POINTS => {
                self.settings.lock().expect("mutex poisoned").response_points =
                    value.get().expect("type checked");
                self.refresh_response(true);
            }
            _ => {
                let Some(id) = param_for_property(name) else {
                    return;
                };
                let changed = match id.kind() {
                    ParamKind::Float => self.params.set(id, value.get().expect("type checked")),
                    ParamKind::Choice => self.params.set_slope(
                        id,
                        Slope::from_db_per_octave(value.get().expect("type checked")),
                    ),
                    ParamKind::Bool => self.params.set_bool(id, value.get().expect("type checked")),
                };
                if changed {
                    gstreamer::debug!(
                        CAT,
                        imp = self,
                        "{} = {}",
                        id.id(),
                        id.display(self.params.get(id))
                    );
                    self.refresh_response(false);
                }
            }
        }
    }

    fn property(&self, _id: usize, pspec: &glib::ParamSpec) -> glib::Value {
        let name = pspec.name();
        match name {
            PROP_POST_RESPONSE => self
                .settings
                .lock()
                .expect("mutex poisoned")
                .post_response
                .to_value(),
            PROP_RESPONSE_POINTS => self
                .settings
                .lock()
                .expect("mutex poisoned")
                .response_points
                .to_value(),
            _ => {
                let id = param_for_property(name)
                    .unwrap_or_else(|| panic!("unknown property {}", name));
                match id.kind() {
                    ParamKind::Float => self.params.get(id).to_value(),
                    ParamKind::Choice => self.params.get_slope(id).db_per_octave().to_value(),
                    ParamKind::Bool => self.params.get_bool(id).to_value(),
                }
            }
        }
    }
}

impl GstObjectImpl for SimpleEq {}

impl ElementImpl for SimpleEq {
    fn metadata() -> Option<&'static gstreamer::subclass::ElementMetadata> {
        static ELEMENT_METADATA: Lazy<gstreamer::subclass::ElementMetadata> = Lazy::new(|| {
            gstreamer::subclass::ElementMetadata::new(
                "Simple EQ",
                "Filter/Effect/Audio",
                "Three-band equalizer: Butterworth low/high cut around a peak filter",
                "simple-eq-rs <noreply@simple-eq.dev>",
            )
        });
        Some(&*ELEMENT_METADATA)
    }

    fn pad_templates() -> &'static [gstreamer::PadTemplate] {
        static PAD_TEMPLATES: Lazy<Vec<gstreamer::PadTemplate>> =
            Lazy::new(base::stereo_pad_templates);
        PAD_TEMPLATES.as_ref()
    }
}

impl BaseTransformImpl for SimpleEq {
    const MODE: gstreamer_base::subclass::BaseTransformMode =
        gstreamer_base::subclass::BaseTransformMode::AlwaysInPlace;
    const PASSTHROUGH_ON_SAME_CAPS: bool = false;
    const TRANSFORM_IP_ON_PASSTHROUGH: bool = false;

    fn transform_ip(
        &self,
        buf: &mut gstreamer::BufferRef,
    ) -> Result<gstreamer::FlowSuccess, gstreamer::FlowError> {
        let mut state = self.state.lock().map_err(|_| {
            gstreamer::element_error!(self.obj(), gstreamer::CoreError::Failed, ["Mutex poisoned"]);
            gstreamer::FlowError::Error
        })?;

        let state = match *state {
            Some(ref mut s) => s,
            None => return Ok(gstreamer::FlowSuccess::Ok),
        };

        if state.engine.update_if_changed(&self.params) {
            gstreamer::trace!(CAT, imp = self, "coefficients committed");
        }

        let mut map = buf.map_writable().map_err(|_| {
            gstreamer::element_error!(
                self.obj(),
                gstreamer::CoreError::Failed,
                ["Failed to map buffer writable"]
            );
            gstreamer::FlowError::Error
        })?;

        // Safety: caps negotiation guarantees f32 interleaved audio.
        let samples: &mut [f32] = unsafe {
            let ptr = map.as_mut_ptr() as *mut f32;
            let len = map.len() / std::mem::size_of::<f32>();
            std::slice::from_raw_parts_mut(ptr, len)
        };

        state.engine.process_interleaved(samples);

        drop(map);
        Ok(gstreamer::FlowSuccess::Ok)
    }

    fn stop(&self) -> Result<(), gstreamer::ErrorMessage> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| gstreamer::error_msg!(gstreamer::CoreError::Failed, ["Mutex poisoned"]))?;
        *state = None;
        Ok(())
    }
}

impl AudioFilterImpl for SimpleEq {
    fn allowed_caps() -> &'static gstreamer::Caps {
        &base::F32_STEREO_CAPS
    }

    fn setup(&self, info: &gstreamer_audio::AudioInfo) -> Result<(), gstreamer::LoggableError> {
        self.parent_setup(info)?;

        if info.channels() != base::CHANNELS as u32 {
            return Err(gstreamer::loggable_error!(
                CAT,
                "expected {} channels, got {}",
                base::CHANNELS,
                info.channels()
            ));
        }
        let sample_rate = f64::from(info.rate());
        gstreamer::debug!(CAT, imp = self, "setup at {sample_rate} Hz");

        {
            let mut state = self.state.lock().map_err(|_| {
                gstreamer::loggable_error!(CAT, "Mutex poisoned in AudioFilterImpl::setup")
            })?;
            *state = Some(State::new(sample_rate, &self.params));
        }

        {
            let mut analyzer = self.analyzer.lock().map_err(|_| {
                gstreamer::loggable_error!(CAT, "Mutex poisoned in AudioFilterImpl::setup")
            })?;
            match analyzer.as_mut() {
                Some(a) => {
                    let _ = a.set_sample_rate(sample_rate);
                }
                None => *analyzer = Some(ResponseAnalyzer::new(sample_rate)),
            }
        }
        self.params.mark_changed(Consumer::View);
        self.refresh_response(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gstreamer::prelude::*;
    use gstreamer::subclass::prelude::*;
    use simple_eq_units::params::{Consumer, ParamId};
    use simple_eq_units::settings::Slope;

    fn init() {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            gstreamer::init().expect("Failed to initialize GStreamer");
            crate::plugin_register_static().expect("Failed to register simpleeq plugin");
        });
    }

    fn make_equalizer() -> gstreamer::Element {
        init();
        gstreamer::ElementFactory::make("simple-eq")
            .build()
            .expect("failed to create simple-eq")
    }

    fn stereo_pipeline(eq: &gstreamer::Element) -> gstreamer::Pipeline {
        let pipeline = gstreamer::Pipeline::new();
        let src = gstreamer::ElementFactory::make("audiotestsrc")
            .property("num-buffers", 5i32)
            .property("samplesperbuffer", 1024i32)
            .build()
            .expect("audiotestsrc");
        let capsfilter = gstreamer::ElementFactory::make("capsfilter")
            .property(
                "caps",
                gstreamer_audio::AudioCapsBuilder::new_interleaved()
                    .format(gstreamer_audio::AUDIO_FORMAT_F32)
                    .rate(48000)
                    .channels(2)
                    .build(),
            )
            .build()
            .expect("capsfilter");
        let sink = gstreamer::ElementFactory::make("fakesink")
            .build()
            .expect("fakesink");

        pipeline
            .add_many([&src, &capsfilter, eq, &sink])
            .expect("add elements");
        gstreamer::Element::link_many([&src, &capsfilter, eq, &sink]).expect("link elements");
        pipeline
    }

    #[test]
    fn element_creation() {
        let _elem = make_equalizer();
    }

    #[test]
    fn property_defaults() {
        let elem = make_equalizer();
        assert_eq!(elem.property::<f32>("lowcut-freq"), 20.0);
        assert_eq!(elem.property::<f32>("highcut-freq"), 20000.0);
        assert_eq!(elem.property::<f32>("peak-freq"), 10000.0);
        assert_eq!(elem.property::<f32>("peak-gain"), 0.0);
        assert_eq!(elem.property::<f32>("peak-q"), 1.0);
        assert_eq!(elem.property::<u32>("lowcut-slope"), 12);
        assert_eq!(elem.property::<u32>("highcut-slope"), 12);
        assert!(!elem.property::<bool>("lowcut-bypassed"));
        assert!(!elem.property::<bool>("peak-bypassed"));
        assert!(!elem.property::<bool>("highcut-bypassed"));
        assert!(!elem.property::<bool>("post-response"));
        assert_eq!(elem.property::<u32>("response-points"), 128);
    }

    #[test]
    fn property_set_get_roundtrip() {
        let elem = make_equalizer();
        elem.set_property("lowcut-freq", 80.0f32);
        elem.set_property("peak-freq", 1000.0f32);
        elem.set_property("peak-gain", 6.0f32);
        elem.set_property("peak-q", 2.0f32);
        elem.set_property("highcut-slope", 36u32);
        elem.set_property("peak-bypassed", true);

        assert_eq!(elem.property::<f32>("lowcut-freq"), 80.0);
        assert_eq!(elem.property::<f32>("peak-freq"), 1000.0);
        assert_eq!(elem.property::<f32>("peak-gain"), 6.0);
        assert_eq!(elem.property::<f32>("peak-q"), 2.0);
        assert_eq!(elem.property::<u32>("highcut-slope"), 36);
        assert!(elem.property::<bool>("peak-bypassed"));
    }

    #[test]
    fn values_snap_to_parameter_grid() {
        let elem = make_equalizer();
        elem.set_property("peak-gain", 3.3f32);
        assert_eq!(elem.property::<f32>("peak-gain"), 3.5);
        elem.set_property("lowcut-slope", 30u32);
        assert_eq!(elem.property::<u32>("lowcut-slope"), 36);
        elem.set_property("lowcut-slope", 17u32);
        assert_eq!(elem.property::<u32>("lowcut-slope"), 12);
    }

    #[test]
    fn properties_write_the_parameter_store() {
        let elem = make_equalizer();
        let eq = elem
            .downcast_ref::<crate::SimpleEq>()
            .expect("simple-eq element");
        let imp = eq.imp();
        let _ = imp.params.take_changed(Consumer::Audio);

        elem.set_property("highcut-freq", 9000.0f32);
        elem.set_property("lowcut-slope", 48u32);
        assert_eq!(imp.params.get(ParamId::HighCutFreq), 9000.0);
        assert_eq!(imp.params.get_slope(ParamId::LowCutSlope), Slope::Db48);
        assert!(imp.params.take_changed(Consumer::Audio));
    }

    #[test]
    fn param_property_names_are_unique() {
        let mut names: Vec<&str> = super::PARAM_PROPS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), super::PARAM_PROPS.len());
        for id in ParamId::ALL {
            assert!(super::PARAM_PROPS.iter().any(|(_, p)| *p == id), "{id:?}");
        }
    }

    #[test]
    fn pipeline_processes_audio() {
        init();
        let eq = make_equalizer();
        eq.set_property("lowcut-freq", 100.0f32);
        eq.set_property("lowcut-slope", 24u32);
        eq.set_property("peak-freq", 1000.0f32);
        eq.set_property("peak-gain", 6.0f32);
        eq.set_property("highcut-freq", 8000.0f32);
        let pipeline = stereo_pipeline(&eq);

        pipeline
            .set_state(gstreamer::State::Playing)
            .expect("set playing");

        let bus = pipeline.bus().expect("bus");
        for msg in bus.iter_timed(gstreamer::ClockTime::from_seconds(5)) {
            match msg.view() {
                gstreamer::MessageView::Eos(..) => break,
                gstreamer::MessageView::Error(err) => {
                    panic!("Pipeline error: {} ({:?})", err.error(), err.debug());
                }
                _ => {}
            }
        }

        pipeline
            .set_state(gstreamer::State::Null)
            .expect("set null");
    }

    #[test]
    fn pipeline_posts_response() {
        init();
        let eq = make_equalizer();
        eq.set_property("peak-freq", 1000.0f32);
        eq.set_property("peak-gain", 6.0f32);
        eq.set_property("response-points", 64u32);
        eq.set_property("post-response", true);
        let pipeline = stereo_pipeline(&eq);

        pipeline
            .set_state(gstreamer::State::Playing)
            .expect("set playing");

        let bus = pipeline.bus().expect("bus");
        let mut response = None;
        for msg in bus.iter_timed(gstreamer::ClockTime::from_seconds(5)) {
            match msg.view() {
                gstreamer::MessageView::Element(e) => {
                    if let Some(s) = e.structure().filter(|s| s.has_name(super::RESPONSE_MESSAGE)) {
                        response = Some(s.to_owned());
                    }
                }
                gstreamer::MessageView::Eos(..) => break,
                gstreamer::MessageView::Error(err) => {
                    panic!("Pipeline error: {} ({:?})", err.error(), err.debug());
                }
                _ => {}
            }
        }
        pipeline
            .set_state(gstreamer::State::Null)
            .expect("set null");

        let s = response.expect("no response message posted");
        let freqs = s.get::<gstreamer::Array>("frequencies").expect("frequencies");
        let mags = s.get::<gstreamer::Array>("magnitudes").expect("magnitudes");
        assert_eq!(freqs.len(), 64);
        assert_eq!(mags.len(), 64);

        let freqs: Vec<f64> = freqs.iter().map(|v| v.get().expect("f64")).collect();
        let mags: Vec<f64> = mags.iter().map(|v| v.get().expect("f64")).collect();
        assert!((freqs[0] - 20.0).abs() < 1e-9);
        assert!((freqs[63] - 20000.0).abs() < 1e-6);
        let max = mags.iter().cloned().fold(f64::MIN, f64::max);
        assert!(max > 5.0 && max < 6.1, "peak of {max} dB");
    }
}

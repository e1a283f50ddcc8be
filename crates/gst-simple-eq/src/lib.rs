// SPDX-License-Identifier: LGPL-3.0-or-later

//! GStreamer three-band equalizer plugin.
//!
//! This crate registers one GStreamer element backed by the
//! [`simple_eq_units`] engine:
//!
//! | Element     | Description                                           |
//! |-------------|-------------------------------------------------------|
//! | `simple-eq` | Butterworth low/high cut around a parametric peak     |
//!
//! Every equalizer parameter is a GObject property that can be changed
//! while playing. With `post-response` set, the element posts a
//! `simple-eq-response` element message carrying the magnitude response
//! after every committed change.

use gstreamer::glib;
use gstreamer::prelude::*;

mod base;
mod equalizer;

pub use equalizer::RESPONSE_MESSAGE;

glib::wrapper! {
    /// Public GLib type for the equalizer element.
    pub struct SimpleEq(ObjectSubclass<equalizer::SimpleEq>)
        @extends gstreamer_audio::AudioFilter, gstreamer_base::BaseTransform,
                 gstreamer::Element, gstreamer::Object;
}

/// GStreamer plugin entry point.
fn plugin_init(plugin: &gstreamer::Plugin) -> Result<(), glib::BoolError> {
    gstreamer::Element::register(
        Some(plugin),
        "simple-eq",
        gstreamer::Rank::NONE,
        SimpleEq::static_type(),
    )
}

gstreamer::plugin_define!(
    simpleeq,
    env!("CARGO_PKG_DESCRIPTION"),
    plugin_init,
    concat!(env!("CARGO_PKG_VERSION")),
    "LGPL",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_REPOSITORY"),
    "2026-10-14"
);

#[cfg(test)]
mod tests {
    fn init() {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            gstreamer::init().expect("Failed to initialize GStreamer");
            super::plugin_register_static().expect("Failed to register simpleeq plugin");
        });
    }

    #[test]
    fn plugin_loads() {
        init();
        let registry = gstreamer::Registry::get();
        let plugin = registry.find_plugin("simpleeq");
        assert!(plugin.is_some(), "simpleeq plugin should be registered");
    }

    #[test]
    fn element_registered() {
        init();
        assert!(
            gstreamer::ElementFactory::find("simple-eq").is_some(),
            "element factory 'simple-eq' should be registered"
        );
    }

    #[test]
    fn element_has_correct_metadata() {
        init();
        let factory =
            gstreamer::ElementFactory::find("simple-eq").expect("factory 'simple-eq' not found");
        assert_eq!(factory.metadata("long-name"), Some("Simple EQ"));
        assert_eq!(factory.metadata("klass"), Some("Filter/Effect/Audio"));
    }

    #[test]
    fn element_has_pad_templates() {
        init();
        let factory =
            gstreamer::ElementFactory::find("simple-eq").expect("factory 'simple-eq' not found");
        let templates = factory.static_pad_templates();
        let directions: Vec<_> = templates.iter().map(|t| t.direction()).collect();
        assert!(directions.contains(&gstreamer::PadDirection::Src));
        assert!(directions.contains(&gstreamer::PadDirection::Sink));
    }
}

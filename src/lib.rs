//! # floem-huesync
//!
//! Keeps hex color controls and their hue/brightness sliders consistent.
//!
//! Each widget group is a color control (the source of truth, holding
//! `#rrggbb`), a hue slider (0–360) and a brightness slider (0–100) that
//! name the color control through a `data-color-input` attribute. Editing a
//! slider rewrites the color and re-emits `input`/`change` on it; editing the
//! color moves the sliders. Saturation has no slider of its own and is
//! carried across slider edits.
//!
//! [`Discovery`] finds groups in a [`Document`], at start and whenever new
//! elements are inserted, and wires each one exactly once.
//!
//! ## Usage
//!
//! ```rust
//! use floem_huesync::{Discovery, Document, ElementSpec};
//!
//! let doc = Document::new();
//! let body = doc.body();
//! doc.append_new(body, ElementSpec::new("input").id("hourColor").value("#ff8000"));
//! let hue = doc.append_new(
//!     body,
//!     ElementSpec::new("input")
//!         .class("hue-slider")
//!         .attr("data-color-input", "hourColor")
//!         .attr("min", "0")
//!         .attr("max", "360"),
//! );
//! doc.append_new(
//!     body,
//!     ElementSpec::new("input")
//!         .class("brightness-slider")
//!         .attr("data-color-input", "hourColor"),
//! );
//!
//! let discovery = Discovery::start(&doc);
//! assert_eq!(discovery.len(), 1);
//! assert_eq!(doc.value(hue), "30");
//!
//! doc.user_input(hue, "210");
//! let color = doc.get_element_by_id("hourColor").unwrap();
//! assert_eq!(doc.value(color), "#0080ff");
//! ```

mod color;
mod config;
mod constants;
mod discovery;
mod document;
mod math;
mod selector;
#[cfg(feature = "views")]
mod slider_view;
mod sync;
mod track;

pub use color::{hex_eq, hex_to_hsv, hex_to_rgb8, hsv_to_hex, normalize_hex, Hsv};
pub use config::{
    bind_color_setting, default_color, ColorSetting, ConfigError, ConfigTransport, DeviceConfig,
    COLOR_DEFAULTS,
};
pub use constants::{
    BRIGHTNESS_SLIDER_CLASS, COLOR_INPUT_ATTR, HUE_SLIDER_CLASS, TRACK_BG_PROPERTY,
    TRACK_NEUTRAL,
};
pub use discovery::{brightness_slider_selector, hue_slider_selector, Discovery};
pub use document::{Document, ElementSpec, Event, EventKind, NodeId, WeakDocument};
pub use selector::{css_escape, Selector};
#[cfg(feature = "views")]
pub use slider_view::{brightness_slider, group_sliders, hue_slider, RangeSlider};
pub use sync::{GroupElements, GroupSynchronizer};
pub use track::{apply_hue_track, hue_range, render_hue_track, HueTrack};

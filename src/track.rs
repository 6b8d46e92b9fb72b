//! Hue slider track: filled with the selected hue up to the thumb, neutral
//! gray after it.

use crate::color::hsv_to_hex;
use crate::constants;
use crate::document::{Document, NodeId};
use crate::math;

/// Two-stop horizontal gradient for a hue slider's track.
#[derive(Debug, Clone, PartialEq)]
pub struct HueTrack {
    /// Fully saturated, fully bright color at the selected hue (`#rrggbb`).
    pub color: String,
    /// Where the fill ends, 0.0–100.0.
    pub percentage: f64,
}

impl HueTrack {
    /// CSS `linear-gradient` for the track background.
    pub fn css(&self) -> String {
        let c = &self.color;
        let p = self.percentage;
        let n = constants::TRACK_NEUTRAL;
        format!("linear-gradient(90deg, {c} 0%, {c} {p}%, {n} {p}%, {n} 100%)")
    }

    /// Fill position as a fraction, 0.0–1.0.
    pub fn fraction(&self) -> f64 {
        self.percentage / 100.0
    }
}

/// Compute the track for `hue` on a slider spanning `min..=max`.
///
/// A degenerate range (`max <= min`) is empty below `min` and full otherwise.
pub fn render_hue_track(hue: f64, min: f64, max: f64) -> HueTrack {
    let hue = math::wrap_hue(hue);
    let span = max - min;
    let position = if span > 0.0 {
        math::clamp((hue - min) / span, 0.0, 1.0)
    } else if hue < min {
        0.0
    } else {
        1.0
    };
    HueTrack {
        color: hsv_to_hex(hue, 1.0, 1.0),
        percentage: position * 100.0,
    }
}

/// Parse a numeric attribute the way a browser reads `min`/`max`.
pub(crate) fn numeric_attribute(doc: &Document, node: NodeId, name: &str, fallback: f64) -> f64 {
    doc.attribute(node, name)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(fallback)
}

/// The `min..=max` range of a hue slider.
pub fn hue_range(doc: &Document, slider: NodeId) -> (f64, f64) {
    (
        numeric_attribute(doc, slider, "min", constants::DEFAULT_HUE_MIN),
        numeric_attribute(doc, slider, "max", constants::DEFAULT_HUE_MAX),
    )
}

/// Render the track for `hue` and write it into the slider's style.
pub fn apply_hue_track(doc: &Document, slider: NodeId, hue: f64) -> HueTrack {
    let (min, max) = hue_range(doc, slider);
    let track = render_hue_track(hue, min, max);
    doc.set_style_property(slider, constants::TRACK_BG_PROPERTY, track.css());
    track
}

//! Element names, attribute keys, and styling constants.

/// Class carried by hue sliders.
pub const HUE_SLIDER_CLASS: &str = "hue-slider";

/// Class carried by brightness sliders.
pub const BRIGHTNESS_SLIDER_CLASS: &str = "brightness-slider";

/// Attribute on both sliders naming the id of their color control.
pub const COLOR_INPUT_ATTR: &str = "data-color-input";

/// Tag of every control element.
pub const INPUT_TAG: &str = "input";

/// Style property holding the hue slider's track gradient.
pub const TRACK_BG_PROPERTY: &str = "--slider-track-bg";

/// Unfilled part of the hue track.
pub const TRACK_NEUTRAL: &str = "#d8d8d8";

/// Hue slider range used when `min`/`max` are missing or unparseable.
pub const DEFAULT_HUE_MIN: f64 = 0.0;
pub const DEFAULT_HUE_MAX: f64 = 360.0;

/// Saturation assumed before the first valid color is seen.
pub const INITIAL_SATURATION: f64 = 1.0;

/// 1D slider track height
#[cfg(feature = "views")]
pub const SLIDER_HEIGHT: f32 = 16.0;

/// Thumb radius on 1D sliders
#[cfg(feature = "views")]
pub const THUMB_RADIUS: f64 = 7.0;

/// Gap between slider rows
#[cfg(feature = "views")]
pub const GAP: f32 = 8.0;
